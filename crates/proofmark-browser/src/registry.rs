//! Discovery and bookkeeping of editable regions.
//!
//! Per-region state (listeners, pending timers, marker hover handles) lives in
//! a side table keyed by [`RegionId`]; the DOM only carries the
//! [`REGISTERED_ATTR`] flag. Dropping a [`Region`] removes its listeners and
//! clears its timers.

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlIFrameElement};

use proofmark_core::RegionId;

use crate::dom::{remove_attr, set_attr};

/// Elements treated as editable regions.
pub const CANDIDATE_SELECTOR: &str =
    r#"[aria-label="Message Body"], textarea, input[type="text"], [contenteditable="true"]"#;

/// Attribute set on every registered region.
pub const REGISTERED_ATTR: &str = "data-live-check-registered";

/// How many nested same-origin frames discovery descends into.
const MAX_FRAME_DEPTH: usize = 4;

/// Find candidate regions in `document` and every reachable same-origin frame.
///
/// Frames whose document cannot be read (cross-origin) are skipped silently.
pub fn discover(document: &Document) -> Vec<Element> {
    let mut found = Vec::new();
    discover_into(document, 0, &mut found);
    found
}

fn discover_into(document: &Document, depth: usize, found: &mut Vec<Element>) {
    if let Ok(list) = document.query_selector_all(CANDIDATE_SELECTOR) {
        for i in 0..list.length() {
            let Some(element) = list.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            // A contenteditable nested in another candidate belongs to its ancestor.
            if found.iter().any(|outer| outer.contains(Some(&element))) {
                continue;
            }
            found.push(element);
        }
    }

    if depth >= MAX_FRAME_DEPTH {
        return;
    }
    let Ok(frames) = document.query_selector_all("iframe") else {
        return;
    };
    for i in 0..frames.length() {
        let Some(frame) = frames
            .get(i)
            .and_then(|n| n.dyn_into::<HtmlIFrameElement>().ok())
        else {
            continue;
        };
        match frame.content_document() {
            Some(inner) => discover_into(&inner, depth + 1, found),
            None => tracing::trace!(target: "proofmark::registry", "skipping unreadable frame"),
        }
    }
}

/// Hover handles for one marker.
pub(crate) struct MarkerHandles {
    pub(crate) marker: Element,
    pub(crate) _listeners: [EventListener; 2],
}

/// A registered region and everything attached to it.
pub struct Region {
    id: RegionId,
    element: Element,
    delay_ms: u32,
    listeners: Vec<EventListener>,
    pub(crate) debounce: Option<Timeout>,
    pub(crate) markers: Vec<MarkerHandles>,
    pub(crate) trigger: Option<Element>,
}

impl Region {
    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Debounce delay for live checks in this region.
    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Control showing busy state for whole-text work on this region.
    pub fn trigger(&self) -> Option<&Element> {
        self.trigger.as_ref()
    }

    /// Drop hover handles for markers that have left the document.
    pub(crate) fn prune_markers(&mut self) {
        self.markers.retain(|h| h.marker.is_connected());
    }
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("id", &self.id)
            .field("delay_ms", &self.delay_ms)
            .field("listeners", &self.listeners.len())
            .field("markers", &self.markers.len())
            .finish()
    }
}

/// Side table of attached regions.
#[derive(Debug, Default)]
pub struct RegionRegistry {
    regions: Vec<Region>,
    next_id: RegionId,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the region tracking `element`, if any.
    pub fn find(&self, element: &Element) -> Option<RegionId> {
        self.regions
            .iter()
            .find(|r| r.element.is_same_node(Some(element)))
            .map(|r| r.id)
    }

    /// Start tracking `element`.
    ///
    /// `listen` is called with the new id to create the region's listeners.
    /// Attaching an element that is already tracked returns its existing id
    /// and creates nothing. An element that carries [`REGISTERED_ATTR`] but
    /// is not in this table (left behind by an earlier instance) is taken
    /// over.
    pub fn attach(
        &mut self,
        element: &Element,
        delay_ms: u32,
        listen: impl FnOnce(RegionId, &Element) -> Vec<EventListener>,
    ) -> RegionId {
        if let Some(id) = self.find(element) {
            return id;
        }
        if element.has_attribute(REGISTERED_ATTR) {
            tracing::debug!(target: "proofmark::registry", "taking over orphaned region");
        }
        self.next_id += 1;
        let id = self.next_id;
        set_attr(element, REGISTERED_ATTR, "true");
        let listeners = listen(id, element);
        self.regions.push(Region {
            id,
            element: element.clone(),
            delay_ms,
            listeners,
            debounce: None,
            markers: Vec::new(),
            trigger: None,
        });
        tracing::debug!(target: "proofmark::registry", region = id, delay_ms, "region attached");
        id
    }

    /// Stop tracking `element`. Its listeners and timers go with the
    /// returned region.
    pub fn detach(&mut self, element: &Element) -> Option<Region> {
        let id = self.find(element)?;
        self.remove(id)
    }

    pub fn remove(&mut self, id: RegionId) -> Option<Region> {
        let index = self.regions.iter().position(|r| r.id == id)?;
        let region = self.regions.swap_remove(index);
        remove_attr(&region.element, REGISTERED_ATTR);
        tracing::debug!(target: "proofmark::registry", region = id, "region detached");
        Some(region)
    }

    /// Remove regions whose element has left the document.
    pub fn prune(&mut self) -> Vec<Region> {
        let mut gone = Vec::new();
        let mut i = 0;
        while i < self.regions.len() {
            if self.regions[i].element.is_connected() {
                i += 1;
            } else {
                gone.push(self.regions.swap_remove(i));
            }
        }
        if !gone.is_empty() {
            tracing::debug!(target: "proofmark::registry", count = gone.len(), "pruned detached regions");
        }
        gone
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn ids(&self) -> Vec<RegionId> {
        self.regions.iter().map(|r| r.id).collect()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
