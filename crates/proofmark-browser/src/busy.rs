//! Loading state for trigger controls.

use web_sys::Element;

use crate::describe_js;

pub const BUSY_CLASS: &str = "spinner-active";
pub const SPINNER_CLASS: &str = "loading-spinner";

/// Put `control` into (or take it out of) the loading state.
///
/// Idempotent both ways: at most one spinner child is ever present.
pub fn set_busy(control: &Element, busy: bool) {
    let classes = control.class_list();
    if busy {
        if let Err(e) = classes.add_1(BUSY_CLASS) {
            tracing::trace!(target: "proofmark::busy", error = %describe_js(e), "class add failed");
        }
        if control
            .query_selector(&format!(".{SPINNER_CLASS}"))
            .ok()
            .flatten()
            .is_some()
        {
            return;
        }
        let Some(document) = control.owner_document() else {
            return;
        };
        crate::style::ensure_stylesheet(&document);
        match document.create_element("div") {
            Ok(spinner) => {
                spinner.set_class_name(SPINNER_CLASS);
                if let Err(e) = control.append_child(&spinner) {
                    tracing::debug!(target: "proofmark::busy", error = %describe_js(e), "could not add spinner");
                }
            }
            Err(e) => tracing::debug!(target: "proofmark::busy", error = %describe_js(e), "could not create spinner"),
        }
    } else {
        if let Err(e) = classes.remove_1(BUSY_CLASS) {
            tracing::trace!(target: "proofmark::busy", error = %describe_js(e), "class remove failed");
        }
        if let Ok(spinners) = control.query_selector_all(&format!(".{SPINNER_CLASS}")) {
            for i in 0..spinners.length() {
                if let Some(node) = spinners.get(i) {
                    if let Some(parent) = node.parent_node() {
                        if let Err(e) = parent.remove_child(&node) {
                            tracing::trace!(target: "proofmark::busy", error = %describe_js(e), "spinner removal failed");
                        }
                    }
                }
            }
        }
    }
}

/// Whether `control` is currently in the loading state.
pub fn is_busy(control: &Element) -> bool {
    control.class_list().contains(BUSY_CLASS)
}
