//! Small DOM writes whose failure is not worth propagating.
//!
//! Attribute and style writes on elements we created ourselves only fail
//! for invalid names; they are logged at trace level and otherwise ignored.

use web_sys::{CssStyleDeclaration, Element};

use crate::describe_js;

pub fn set_attr(element: &Element, name: &str, value: &str) {
    if let Err(e) = element.set_attribute(name, value) {
        tracing::trace!(target: "proofmark::dom", name, error = %describe_js(e), "set_attribute failed");
    }
}

pub fn remove_attr(element: &Element, name: &str) {
    if let Err(e) = element.remove_attribute(name) {
        tracing::trace!(target: "proofmark::dom", name, error = %describe_js(e), "remove_attribute failed");
    }
}

/// Toggle the `hidden` attribute.
pub fn set_hidden(element: &Element, hidden: bool) {
    if hidden {
        set_attr(element, "hidden", "");
    } else {
        remove_attr(element, "hidden");
    }
}

pub fn set_style(style: &CssStyleDeclaration, property: &str, value: &str) {
    if let Err(e) = style.set_property(property, value) {
        tracing::trace!(target: "proofmark::dom", property, error = %describe_js(e), "set_property failed");
    }
}
