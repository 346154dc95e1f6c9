//! Per-region trigger icons for full-text correction.
//!
//! An icon sits over the top-right corner of its region and appears while
//! the pointer is over the region. Clicking it requests a correction for the
//! whole region and opens the correction panel; the icon doubles as the
//! region's busy indicator.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use proofmark_browser::{
    CorrectionPanel, LiveChecker, PlatformError, set_attr, set_hidden, set_style,
};

pub const TRIGGER_CLASS: &str = "proofmark-trigger";
const HIDE_DELAY_MS: u32 = 200;
const INSET_TOP: f64 = 5.0;
const INSET_RIGHT: f64 = 30.0;

struct TriggerIcon {
    region: Element,
    icon: Element,
    _listeners: Vec<EventListener>,
}

impl Drop for TriggerIcon {
    fn drop(&mut self) {
        self.icon.remove();
    }
}

struct IconsInner {
    checker: LiveChecker,
    panel: CorrectionPanel,
    icons: RefCell<Vec<TriggerIcon>>,
}

/// Trigger icons for every region a `LiveChecker` tracks.
#[derive(Clone)]
pub struct TriggerIcons {
    inner: Rc<IconsInner>,
}

impl TriggerIcons {
    pub fn new(checker: LiveChecker, panel: CorrectionPanel) -> Self {
        Self {
            inner: Rc::new(IconsInner {
                checker,
                panel,
                icons: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Create icons for newly registered regions and drop icons whose region
    /// is gone. Returns how many icons were created.
    pub fn sync(&self) -> usize {
        let regions = self.inner.checker.elements();
        let stale: Vec<TriggerIcon> = {
            let mut icons = self.inner.icons.borrow_mut();
            let (keep, stale): (Vec<_>, Vec<_>) = icons
                .drain(..)
                .partition(|t| regions.iter().any(|r| r.is_same_node(Some(&t.region))));
            *icons = keep;
            stale
        };
        drop(stale);

        let mut created = 0;
        for region in regions {
            let exists = self
                .inner
                .icons
                .borrow()
                .iter()
                .any(|t| t.region.is_same_node(Some(&region)));
            if exists {
                continue;
            }
            match build(&Rc::downgrade(&self.inner), &region) {
                Ok(icon) => {
                    self.inner
                        .checker
                        .set_trigger(&region, Some(icon.icon.clone()));
                    self.inner.icons.borrow_mut().push(icon);
                    created += 1;
                }
                Err(e) => tracing::debug!(target: "proofmark::icons", error = %e, "no icon for region"),
            }
        }
        created
    }

    /// Hide every icon right away.
    pub fn hide_all(&self) {
        for icon in self.inner.icons.borrow().iter() {
            set_hidden(&icon.icon, true);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.icons.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IconsInner {
    fn may_show(&self) -> bool {
        self.checker.settings().get_all_settings().enabled && self.checker.config().icons_visible()
    }
}

fn place(icon: &Element, region: &Element) {
    let Some(window) = region.owner_document().and_then(|d| d.default_view()) else {
        return;
    };
    let rect = region.get_bounding_client_rect();
    let top = window.scroll_y().unwrap_or(0.0) + rect.top() + INSET_TOP;
    let left = window.scroll_x().unwrap_or(0.0) + rect.right() - INSET_RIGHT;
    if let Some(html) = icon.dyn_ref::<HtmlElement>() {
        let style = html.style();
        set_style(&style, "top", &format!("{top}px"));
        set_style(&style, "left", &format!("{left}px"));
    }
}

fn create_icon(document: &Document) -> Result<Element, PlatformError> {
    let icon = document
        .create_element("button")
        .map_err(|e| PlatformError::from(format!("create_element failed: {e:?}")))?;
    icon.set_class_name(TRIGGER_CLASS);
    icon.set_text_content(Some("Aa"));
    set_attr(&icon, "type", "button");
    set_attr(&icon, "title", "Click to apply corrections");
    set_hidden(&icon, true);
    let body = document.body().ok_or("document has no body")?;
    body.append_child(&icon)
        .map_err(|e| PlatformError::from(format!("append_child failed: {e:?}")))?;
    Ok(icon)
}

fn build(inner: &Weak<IconsInner>, region: &Element) -> Result<TriggerIcon, PlatformError> {
    let document = region.owner_document().ok_or("region has no document")?;
    proofmark_browser::style::ensure_stylesheet(&document);
    let icon = create_icon(&document)?;

    let show = {
        let (weak, icon, anchor) = (inner.clone(), icon.clone(), region.clone());
        EventListener::new(region, "mouseenter", move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if !inner.may_show() {
                return;
            }
            place(&icon, &anchor);
            set_hidden(&icon, false);
        })
    };

    let leave_region = {
        let icon = icon.clone();
        EventListener::new(region, "mouseleave", move |_| {
            let icon = icon.clone();
            let hide = move || {
                if !icon.matches(":hover").unwrap_or(false) {
                    set_hidden(&icon, true);
                }
            };
            Timeout::new(HIDE_DELAY_MS, hide).forget();
        })
    };

    let leave_icon = {
        let target = icon.clone();
        EventListener::new(&icon, "mouseleave", move |_| {
            set_hidden(&target, true);
        })
    };

    let click = {
        let (weak, region) = (inner.clone(), region.clone());
        EventListener::new(&icon, "click", move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if !inner.checker.settings().get_all_settings().enabled {
                return;
            }
            let checker = inner.checker.clone();
            let (panel, region) = (inner.panel.clone(), region.clone());
            wasm_bindgen_futures::spawn_local(async move {
                let opened = checker.correct_element(&region, &panel).await;
                tracing::debug!(target: "proofmark::icons", opened, "correction requested");
            });
        })
    };

    Ok(TriggerIcon {
        region: region.clone(),
        icon,
        _listeners: vec![show, leave_region, leave_icon, click],
    })
}
