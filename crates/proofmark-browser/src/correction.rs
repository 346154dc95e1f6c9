//! Whole-text correction panel.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement, Node};

use proofmark_core::PlatformError;

use crate::describe_js;
use crate::dom::set_attr;
use crate::position::position_near;
use crate::style::ensure_stylesheet;

pub const CORRECTION_CLASS: &str = "proofmark-correction";

struct OpenPanel {
    overlay: Element,
    region: Element,
    corrected: String,
    _listeners: Vec<EventListener>,
}

impl Drop for OpenPanel {
    fn drop(&mut self) {
        self.overlay.remove();
    }
}

#[derive(Default)]
struct PanelInner {
    open: RefCell<Option<OpenPanel>>,
}

impl PanelInner {
    fn dismiss(&self) {
        let open = self.open.borrow_mut().take();
        drop(open);
    }

    fn accept(&self) {
        let Some(open) = self.open.borrow_mut().take() else {
            return;
        };
        replace_content(&open.region, &open.corrected);
        tracing::debug!(target: "proofmark::correction", "correction accepted");
    }
}

/// Replace everything in `region` with `text`.
///
/// Markers are lost; the region is re-scanned on the next input.
pub fn replace_content(region: &Element, text: &str) {
    if let Some(area) = region.dyn_ref::<HtmlTextAreaElement>() {
        area.set_value(text);
    } else if let Some(input) = region.dyn_ref::<HtmlInputElement>() {
        input.set_value(text);
    } else if let Some(html) = region.dyn_ref::<HtmlElement>() {
        html.set_inner_text(text);
    } else {
        region.set_text_content(Some(text));
    }
}

/// Singleton accept/dismiss panel for a full-text correction.
#[derive(Clone, Default)]
pub struct CorrectionPanel {
    inner: Rc<PanelInner>,
}

impl CorrectionPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `original` against `corrected` for `region`, positioned near
    /// `anchor`. Replaces any panel already open.
    pub fn show(
        &self,
        region: &Element,
        anchor: &Element,
        original: &str,
        corrected: &str,
    ) -> Result<(), PlatformError> {
        self.dismiss();
        let document = anchor.owner_document().ok_or("anchor has no document")?;
        let open = build(
            &document,
            &Rc::downgrade(&self.inner),
            region,
            anchor,
            original,
            corrected,
        )?;
        *self.inner.open.borrow_mut() = Some(open);
        Ok(())
    }

    pub fn accept(&self) {
        self.inner.accept();
    }

    pub fn dismiss(&self) {
        self.inner.dismiss();
    }

    pub fn is_open(&self) -> bool {
        self.inner.open.borrow().is_some()
    }

    pub fn overlay(&self) -> Option<Element> {
        self.inner.open.borrow().as_ref().map(|o| o.overlay.clone())
    }
}

fn element(document: &Document, tag: &str, class: &str) -> Result<Element, PlatformError> {
    let el = document
        .create_element(tag)
        .map_err(|e| format!("create_element failed: {}", describe_js(e)))?;
    if !class.is_empty() {
        el.set_class_name(class);
    }
    Ok(el)
}

fn append_all(parent: &Element, children: &[&Element]) -> Result<(), PlatformError> {
    for child in children {
        parent
            .append_child(child)
            .map_err(|e| format!("append_child failed: {}", describe_js(e)))?;
    }
    Ok(())
}

fn on_click(target: &Element, inner: &Weak<PanelInner>, act: fn(&PanelInner)) -> EventListener {
    let weak = inner.clone();
    EventListener::new(target, "click", move |_| {
        if let Some(inner) = weak.upgrade() {
            act(&inner);
        }
    })
}

fn build(
    document: &Document,
    inner: &Weak<PanelInner>,
    region: &Element,
    anchor: &Element,
    original: &str,
    corrected: &str,
) -> Result<OpenPanel, PlatformError> {
    ensure_stylesheet(document);
    let body = document.body().ok_or("document has no body")?;

    let overlay = element(document, "div", CORRECTION_CLASS)?;

    let header = element(document, "div", "proofmark-header")?;
    let title = element(document, "span", "")?;
    title.set_text_content(Some("Correct your text"));
    let close = element(document, "button", "proofmark-close")?;
    close.set_text_content(Some("\u{2715}"));
    set_attr(&close, "aria-label", "Close");
    append_all(&header, &[&title, &close])?;

    let before = element(document, "div", "proofmark-original")?;
    before.set_text_content(Some(original));
    let after = element(document, "div", "proofmark-corrected")?;
    after.set_text_content(Some(corrected));

    let buttons = element(document, "div", "proofmark-buttons")?;
    let accept = element(document, "button", "proofmark-accept")?;
    accept.set_text_content(Some("Accept"));
    let dismiss = element(document, "button", "proofmark-dismiss")?;
    dismiss.set_text_content(Some("Dismiss"));
    append_all(&buttons, &[&accept, &dismiss])?;

    append_all(&overlay, &[&header, &before, &after, &buttons])?;
    append_all(&body, &[&overlay])?;
    if let Some(html) = overlay.dyn_ref::<HtmlElement>() {
        position_near(html, anchor);
    }

    let mut listeners = vec![
        on_click(&accept, inner, PanelInner::accept),
        on_click(&dismiss, inner, PanelInner::dismiss),
        on_click(&close, inner, PanelInner::dismiss),
    ];

    let weak = inner.clone();
    let (inside, trigger) = (overlay.clone(), anchor.clone());
    listeners.push(EventListener::new(document, "click", move |event| {
        let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
        if inside.contains(target.as_ref()) || trigger.contains(target.as_ref()) {
            return;
        }
        if let Some(inner) = weak.upgrade() {
            inner.dismiss();
        }
    }));

    Ok(OpenPanel {
        overlay,
        region: region.clone(),
        corrected: corrected.to_string(),
        _listeners: listeners,
    })
}
