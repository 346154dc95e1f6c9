//! Hover popover offering replacements for a single marker.
//!
//! Only one popover is open at a time. Its outside-click listener exists
//! only while it is open.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Node};

use proofmark_core::{Category, PlatformError, SettingsStore};

use crate::caret::{capture_caret_offset, restore_caret_offset};
use crate::describe_js;
use crate::dom::{set_attr, set_style};
use crate::merge::{MarkerInfo, markers_in, unwrap_in_region};
use crate::position::position_near;
use crate::style::{ensure_stylesheet, rgba_u32_to_hex};

pub const POPOVER_CLASS: &str = "proofmark-popover";
const MAX_SUGGESTIONS: usize = 5;

struct OpenPopover {
    overlay: Element,
    marker: Element,
    region: Element,
    _listeners: Vec<EventListener>,
}

impl Drop for OpenPopover {
    fn drop(&mut self) {
        self.overlay.remove();
    }
}

struct PopoverInner {
    settings: Rc<dyn SettingsStore>,
    unwrap_delay_ms: u32,
    open: RefCell<Option<OpenPopover>>,
}

/// Singleton suggestion popover.
#[derive(Clone)]
pub struct SuggestionPopover {
    inner: Rc<PopoverInner>,
}

impl SuggestionPopover {
    pub fn new(settings: Rc<dyn SettingsStore>, unwrap_delay_ms: u32) -> Self {
        Self {
            inner: Rc::new(PopoverInner {
                settings,
                unwrap_delay_ms,
                open: RefCell::new(None),
            }),
        }
    }

    /// Open the popover for `marker`, closing any other one first.
    pub fn show(&self, marker: &Element, region: &Element) -> Result<(), PlatformError> {
        self.hide();
        let info = MarkerInfo::read(marker).ok_or("element is not a marker")?;
        let document = marker.owner_document().ok_or("marker has no document")?;
        let open = build(&document, &Rc::downgrade(&self.inner), marker, region, &info)?;
        *self.inner.open.borrow_mut() = Some(open);
        tracing::debug!(
            target: "proofmark::suggestion",
            id = %info.id,
            category = %info.category,
            "popover shown"
        );
        Ok(())
    }

    pub fn hide(&self) {
        self.inner.hide();
    }

    pub fn is_open(&self) -> bool {
        self.inner.open.borrow().is_some()
    }

    /// The marker the popover is currently open for.
    pub fn current_marker(&self) -> Option<Element> {
        self.inner.open.borrow().as_ref().map(|o| o.marker.clone())
    }

    /// The popover element itself, while open.
    pub fn overlay(&self) -> Option<Element> {
        self.inner.open.borrow().as_ref().map(|o| o.overlay.clone())
    }

    /// Replace the open marker's text with `suggestion`.
    pub fn apply(&self, suggestion: &str) {
        self.inner.apply(suggestion);
    }

    /// Drop the open marker, leaving its text as written.
    pub fn ignore(&self) {
        self.inner.ignore();
    }

    /// Add the open marker's word to the custom dictionary and unwrap every
    /// marker in the region carrying the same word.
    pub async fn add_to_dictionary(&self) {
        PopoverInner::add_to_dictionary(self.inner.clone()).await;
    }
}

impl PopoverInner {
    fn hide(&self) {
        let open = self.open.borrow_mut().take();
        drop(open);
    }

    fn take_open(&self) -> Option<(Element, Element)> {
        let open = self.open.borrow_mut().take()?;
        Some((open.marker.clone(), open.region.clone()))
    }

    fn apply(&self, suggestion: &str) {
        let Some((marker, region)) = self.take_open() else {
            return;
        };
        let offset = capture_caret_offset(&region).unwrap_or(0);
        marker.set_text_content(Some(suggestion));
        if let Some(html) = marker.dyn_ref::<HtmlElement>() {
            let style = html.style();
            set_style(&style, "border-bottom", "none");
            set_style(&style, "cursor", "text");
        }
        tracing::debug!(target: "proofmark::suggestion", suggestion, "suggestion applied");

        let finish = move || {
            if !region.contains(Some(&marker)) {
                return;
            }
            if let Err(e) = crate::merge::unwrap_marker(&marker) {
                tracing::warn!(target: "proofmark::suggestion", error = %e, "unwrap after apply failed");
                return;
            }
            if let Err(e) = restore_caret_offset(&region, offset) {
                tracing::warn!(target: "proofmark::suggestion", error = %e, "caret restore failed");
            }
        };
        Timeout::new(self.unwrap_delay_ms, finish).forget();
    }

    fn ignore(&self) {
        let Some((marker, region)) = self.take_open() else {
            return;
        };
        if let Err(e) = unwrap_in_region(&region, &marker) {
            tracing::warn!(target: "proofmark::suggestion", error = %e, "ignore failed");
        }
    }

    async fn add_to_dictionary(this: Rc<Self>) {
        let Some((marker, region)) = this.take_open() else {
            return;
        };
        let Some(info) = MarkerInfo::read(&marker) else {
            return;
        };
        match this.settings.add_to_custom_dictionary(&info.original).await {
            Ok(added) => tracing::info!(
                target: "proofmark::suggestion",
                word = %info.original,
                added,
                "word added to dictionary"
            ),
            Err(e) => {
                tracing::warn!(target: "proofmark::suggestion", error = %e, "dictionary update failed");
                return;
            }
        }
        let word = info.original.to_lowercase();
        for other in markers_in(&region) {
            let same = MarkerInfo::read(&other).is_some_and(|o| {
                o.category == Category::Spelling && o.original.to_lowercase() == word
            });
            if same || other.is_same_node(Some(&marker)) {
                if let Err(e) = unwrap_in_region(&region, &other) {
                    tracing::warn!(target: "proofmark::suggestion", error = %e, "unwrap failed");
                }
            }
        }
    }
}

fn create(document: &Document, tag: &str, class: &str) -> Result<Element, PlatformError> {
    let el = document
        .create_element(tag)
        .map_err(|e| format!("create_element failed: {}", describe_js(e)))?;
    el.set_class_name(class);
    Ok(el)
}

fn append(parent: &Element, child: &Element) -> Result<(), PlatformError> {
    parent
        .append_child(child)
        .map(|_| ())
        .map_err(|e| format!("append_child failed: {}", describe_js(e)).into())
}

fn build(
    document: &Document,
    inner: &Weak<PopoverInner>,
    marker: &Element,
    region: &Element,
    info: &MarkerInfo,
) -> Result<OpenPopover, PlatformError> {
    ensure_stylesheet(document);
    let body = document.body().ok_or("document has no body")?;
    let mut listeners = Vec::new();

    let overlay = create(document, "div", POPOVER_CLASS)?;
    set_attr(&overlay, "data-type", info.category.as_str());

    let header = create(document, "div", "proofmark-header")?;
    let label = create(document, "span", "")?;
    let dot = create(document, "span", "proofmark-dot")?;
    set_attr(
        &dot,
        "style",
        &format!("background-color: {}", rgba_u32_to_hex(info.category.color())),
    );
    append(&label, &dot)?;
    label
        .append_child(&document.create_text_node(info.category.label()))
        .map_err(|e| format!("append_child failed: {}", describe_js(e)))?;
    append(&header, &label)?;
    append(&overlay, &header)?;

    for suggestion in info.suggestions.iter().take(MAX_SUGGESTIONS) {
        let item = create(document, "div", "proofmark-item")?;
        item.set_text_content(Some(suggestion));
        let weak = inner.clone();
        let suggestion = suggestion.clone();
        listeners.push(EventListener::new(&item, "click", move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.apply(&suggestion);
            }
        }));
        append(&overlay, &item)?;
    }

    let footer = create(document, "div", "proofmark-footer")?;
    if info.category == Category::Spelling {
        let add = create(document, "div", "proofmark-action")?;
        set_attr(&add, "data-action", "dictionary");
        add.set_text_content(Some("Add to dictionary"));
        let weak = inner.clone();
        listeners.push(EventListener::new(&add, "click", move |_| {
            if let Some(inner) = weak.upgrade() {
                wasm_bindgen_futures::spawn_local(PopoverInner::add_to_dictionary(inner));
            }
        }));
        append(&footer, &add)?;
    }
    let ignore = create(document, "div", "proofmark-action")?;
    set_attr(&ignore, "data-action", "ignore");
    ignore.set_text_content(Some("Ignore"));
    let weak = inner.clone();
    listeners.push(EventListener::new(&ignore, "click", move |_| {
        if let Some(inner) = weak.upgrade() {
            inner.ignore();
        }
    }));
    append(&footer, &ignore)?;
    append(&overlay, &footer)?;

    append(&body, &overlay)?;
    if let Some(html) = overlay.dyn_ref::<HtmlElement>() {
        position_near(html, marker);
    }

    let weak = inner.clone();
    let (inside, anchor) = (overlay.clone(), marker.clone());
    listeners.push(EventListener::new(document, "click", move |event| {
        let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
        let target = target.as_ref();
        if inside.contains(target) || anchor.contains(target) {
            return;
        }
        if let Some(inner) = weak.upgrade() {
            inner.hide();
        }
    }));

    Ok(OpenPopover {
        overlay,
        marker: marker.clone(),
        region: region.clone(),
        _listeners: listeners,
    })
}
