//! `LiveChecker`: wires regions, the scheduler, the analysis service and the
//! span merger together.
//!
//! All state sits behind one `Rc`; listeners and timers only hold `Weak`
//! references so dropping the last `LiveChecker` tears everything down.
//! RefCell borrows are never held across an await.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use web_sys::{Document, Element};

use proofmark_core::{
    AnalysisService, CheckGate, CheckScheduler, CheckState, CheckTicket, Completion,
    ContextFilter, DictionaryFilter, FireOutcome, Generation, IssueFilter, MarkerIdGen, RegionId,
    SettingKey, Settings, SettingsError, SettingsStore,
};

use crate::busy::set_busy;
use crate::correction::CorrectionPanel;
use crate::dom::set_hidden;
use crate::merge::{is_markable, plain_text, reconcile, strip_markers};
use crate::notice::{DEFAULT_NOTICE_MS, NoticeKind, show_notice};
use crate::registry::{MarkerHandles, RegionRegistry, discover};
use crate::suggestion::SuggestionPopover;

/// Controller configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveConfig {
    debounce_ms: u32,
    hover_delay_ms: u32,
    unwrap_delay_ms: u32,
    live_checking_enabled: bool,
    icons_visible: bool,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            hover_delay_ms: 300,
            unwrap_delay_ms: 100,
            live_checking_enabled: true,
            icons_visible: true,
        }
    }
}

impl LiveConfig {
    /// Defaults with the toggles taken from persisted settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            live_checking_enabled: settings.live_checking_enabled,
            icons_visible: settings.icons_visible,
            ..Self::default()
        }
    }

    pub fn with_debounce_ms(mut self, ms: u32) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn with_hover_delay_ms(mut self, ms: u32) -> Self {
        self.hover_delay_ms = ms;
        self
    }

    pub fn with_unwrap_delay_ms(mut self, ms: u32) -> Self {
        self.unwrap_delay_ms = ms;
        self
    }

    pub fn debounce_ms(&self) -> u32 {
        self.debounce_ms
    }

    pub fn hover_delay_ms(&self) -> u32 {
        self.hover_delay_ms
    }

    pub fn unwrap_delay_ms(&self) -> u32 {
        self.unwrap_delay_ms
    }

    pub fn live_checking_enabled(&self) -> bool {
        self.live_checking_enabled
    }

    pub fn icons_visible(&self) -> bool {
        self.icons_visible
    }
}

/// What a check did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Response applied; this many new markers were created.
    Applied(usize),
    /// A newer check superseded this one; nothing was applied.
    Stale,
    /// Region text was blank.
    Empty,
    /// Service or DOM failure; nothing was applied.
    Failed,
    /// Region not registered, not markable, or checks are disabled.
    Skipped,
}

struct Inner {
    service: Rc<dyn AnalysisService>,
    settings: Rc<dyn SettingsStore>,
    config: RefCell<LiveConfig>,
    registry: RefCell<RegionRegistry>,
    scheduler: RefCell<CheckScheduler>,
    ids: RefCell<MarkerIdGen>,
    popover: SuggestionPopover,
    hover: RefCell<Option<Timeout>>,
}

/// Live checking for every registered region of a page.
#[derive(Clone)]
pub struct LiveChecker {
    inner: Rc<Inner>,
}

fn id_seed() -> u64 {
    let random = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
    (js_sys::Date::now() as u64) ^ (random << 20)
}

impl LiveChecker {
    pub fn new(
        service: Rc<dyn AnalysisService>,
        settings: Rc<dyn SettingsStore>,
        config: LiveConfig,
    ) -> Self {
        let popover = SuggestionPopover::new(settings.clone(), config.unwrap_delay_ms);
        Self {
            inner: Rc::new(Inner {
                service,
                settings,
                config: RefCell::new(config),
                registry: RefCell::new(RegionRegistry::new()),
                scheduler: RefCell::new(CheckScheduler::new()),
                ids: RefCell::new(MarkerIdGen::new(id_seed())),
                popover,
                hover: RefCell::new(None),
            }),
        }
    }

    pub fn config(&self) -> LiveConfig {
        self.inner.config.borrow().clone()
    }

    pub fn settings(&self) -> Rc<dyn SettingsStore> {
        self.inner.settings.clone()
    }

    pub fn service(&self) -> Rc<dyn AnalysisService> {
        self.inner.service.clone()
    }

    pub fn popover(&self) -> &SuggestionPopover {
        &self.inner.popover
    }

    /// Start tracking `element`. `delay_ms` overrides the configured debounce.
    ///
    /// Registering an already tracked element returns its existing id.
    pub fn register_element(&self, element: &Element, delay_ms: Option<u32>) -> RegionId {
        let delay = delay_ms.unwrap_or_else(|| self.inner.config.borrow().debounce_ms);
        let weak = Rc::downgrade(&self.inner);
        self.inner
            .registry
            .borrow_mut()
            .attach(element, delay, |id, el| input_listeners(&weak, id, el))
    }

    /// Stop tracking `element` and strip its markers. No-op when untracked.
    pub fn unregister_element(&self, element: &Element) {
        let region = self.inner.registry.borrow_mut().detach(element);
        let Some(region) = region else {
            return;
        };
        self.inner.scheduler.borrow_mut().remove(region.id());
        self.inner.hide_popover_within(element);
        strip_markers(element);
        drop(region);
    }

    pub fn is_registered(&self, element: &Element) -> bool {
        self.inner.registry.borrow().find(element).is_some()
    }

    /// Elements of every registered region.
    pub fn elements(&self) -> Vec<Element> {
        self.inner
            .registry
            .borrow()
            .iter()
            .map(|r| r.element().clone())
            .collect()
    }

    pub fn region_count(&self) -> usize {
        self.inner.registry.borrow().len()
    }

    /// Scheduler state of `element`'s region.
    pub fn check_state(&self, element: &Element) -> Option<CheckState> {
        let id = self.inner.registry.borrow().find(element)?;
        Some(self.inner.scheduler.borrow().state(id))
    }

    /// Use `trigger` as `element`'s busy indicator.
    pub fn set_trigger(&self, element: &Element, trigger: Option<Element>) {
        let mut registry = self.inner.registry.borrow_mut();
        let Some(id) = registry.find(element) else {
            return;
        };
        if let Some(region) = registry.get_mut(id) {
            region.trigger = trigger;
        }
    }

    /// Check `element` right away, bypassing the debounce.
    pub async fn run_check(&self, element: &Element) -> CheckOutcome {
        let Some(id) = self.inner.registry.borrow().find(element) else {
            return CheckOutcome::Skipped;
        };
        let settings = self.inner.settings.get_all_settings();
        if !is_markable(element) || !settings.enabled || !settings.any_category_enabled() {
            return CheckOutcome::Skipped;
        }
        let pending = self
            .inner
            .registry
            .borrow_mut()
            .get_mut(id)
            .and_then(|r| r.debounce.take());
        drop(pending);

        let text = plain_text(element);
        let outcome = self.inner.scheduler.borrow_mut().force(id, &text);
        match outcome {
            FireOutcome::Request(ticket) => Inner::perform(self.inner.clone(), ticket).await,
            FireOutcome::Empty => CheckOutcome::Empty,
            FireOutcome::Stale => CheckOutcome::Stale,
        }
    }

    /// Forget regions that left the document, then force a check on every
    /// remaining markable one. Returns how many checks were started; none
    /// while live checking is off.
    pub fn refresh_all_elements(&self) -> usize {
        self.prune();
        if !self.inner.config.borrow().live_checking_enabled {
            tracing::debug!(target: "proofmark::live", "refresh skipped, live checking off");
            return 0;
        }
        let elements: Vec<Element> = self
            .inner
            .registry
            .borrow()
            .iter()
            .map(|r| r.element().clone())
            .filter(is_markable)
            .collect();
        let count = elements.len();
        for element in elements {
            let checker = self.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let outcome = checker.run_check(&element).await;
                tracing::trace!(target: "proofmark::live", ?outcome, "refresh check finished");
            });
        }
        count
    }

    /// Turn live checking on or off and persist the choice.
    ///
    /// Off cancels pending checks and strips every marker; on refreshes all
    /// regions.
    pub async fn set_live_checking_enabled(&self, enabled: bool) -> Result<(), SettingsError> {
        self.inner.config.borrow_mut().live_checking_enabled = enabled;
        if enabled {
            self.refresh_all_elements();
        } else {
            self.inner.scheduler.borrow_mut().cancel_all();
            let elements: Vec<Element> = {
                let mut registry = self.inner.registry.borrow_mut();
                let ids = registry.ids();
                let mut elements = Vec::with_capacity(ids.len());
                let mut timers = Vec::new();
                for id in ids {
                    if let Some(region) = registry.get_mut(id) {
                        timers.extend(region.debounce.take());
                        elements.push(region.element().clone());
                    }
                }
                drop(registry);
                drop(timers);
                elements
            };
            self.inner.popover.hide();
            let stripped: usize = elements.iter().map(strip_markers).sum();
            tracing::debug!(target: "proofmark::live", stripped, "live checking disabled");
        }
        self.inner
            .settings
            .update_setting(SettingKey::LiveCheckingEnabled, enabled.into())
            .await
    }

    /// Show or hide trigger icons and persist the choice.
    pub async fn set_icons_visible(&self, visible: bool) -> Result<(), SettingsError> {
        self.inner.config.borrow_mut().icons_visible = visible;
        let triggers: Vec<Element> = self
            .inner
            .registry
            .borrow()
            .iter()
            .filter_map(|r| r.trigger().cloned())
            .collect();
        for trigger in &triggers {
            set_hidden(trigger, !visible);
        }
        self.inner
            .settings
            .update_setting(SettingKey::IconsVisible, visible.into())
            .await
    }

    /// Detach regions whose element is gone. Returns how many were removed.
    pub fn prune(&self) -> usize {
        let gone = self.inner.registry.borrow_mut().prune();
        let mut scheduler = self.inner.scheduler.borrow_mut();
        for region in &gone {
            scheduler.remove(region.id());
        }
        gone.len()
    }

    /// Discover candidates in `document` and its same-origin frames and
    /// register the new ones. Returns how many were newly registered.
    pub fn discover_and_register(&self, document: &Document) -> usize {
        self.prune();
        discover(document)
            .iter()
            .filter(|element| !self.is_registered(element))
            .map(|element| self.register_element(element, None))
            .count()
    }

    /// Request a full-text correction for `element` and open `panel` with
    /// the result. Failures and no-op corrections are reported as notices.
    pub async fn correct_element(&self, element: &Element, panel: &CorrectionPanel) -> bool {
        let Some(document) = element.owner_document() else {
            return false;
        };
        let text = plain_text(element);
        if text.trim().is_empty() {
            notify(&document, NoticeKind::Info, "Nothing to correct");
            return false;
        }

        let trigger = {
            let registry = self.inner.registry.borrow();
            registry
                .find(element)
                .and_then(|id| registry.get(id))
                .and_then(|r| r.trigger().cloned())
        };
        if let Some(t) = &trigger {
            set_busy(t, true);
        }
        let corrected = self.inner.service.correct(&text).await;
        if let Some(t) = &trigger {
            set_busy(t, false);
        }

        match corrected {
            None => {
                notify(&document, NoticeKind::Error, "Could not correct text");
                false
            }
            Some(corrected) if corrected.trim() == text.trim() => {
                notify(&document, NoticeKind::Success, "No corrections needed");
                false
            }
            Some(corrected) => {
                let anchor = trigger.as_ref().unwrap_or(element);
                match panel.show(element, anchor, &text, &corrected) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(target: "proofmark::live", error = %e, "could not open correction panel");
                        false
                    }
                }
            }
        }
    }
}

fn notify(document: &Document, kind: NoticeKind, message: &str) {
    if let Err(e) = show_notice(document, kind, message, DEFAULT_NOTICE_MS) {
        tracing::debug!(target: "proofmark::live", error = %e, "notice failed");
    }
}

fn input_listeners(inner: &Weak<Inner>, id: RegionId, element: &Element) -> Vec<EventListener> {
    if !is_markable(element) {
        return Vec::new();
    }
    let weak = inner.clone();
    vec![EventListener::new(element, "input", move |_| {
        if let Some(inner) = weak.upgrade() {
            inner.on_input(id);
        }
    })]
}

impl Inner {
    fn gate(&self) -> CheckGate {
        let settings = self.settings.get_all_settings();
        CheckGate::from_bool(
            self.config.borrow().live_checking_enabled
                && settings.enabled
                && settings.any_category_enabled(),
        )
    }

    fn on_input(self: &Rc<Self>, id: RegionId) {
        let gate = self.gate();
        let Some(generation) = self.scheduler.borrow_mut().input(id, gate) else {
            return;
        };
        let Some(delay) = self.registry.borrow().get(id).map(|r| r.delay_ms()) else {
            return;
        };
        let weak = Rc::downgrade(self);
        let timer = Timeout::new(delay, move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_debounce(id, generation);
            }
        });
        let previous = self
            .registry
            .borrow_mut()
            .get_mut(id)
            .and_then(|r| r.debounce.replace(timer));
        drop(previous);
    }

    fn on_debounce(self: &Rc<Self>, id: RegionId, generation: Generation) {
        let Some(element) = self.registry.borrow().get(id).map(|r| r.element().clone()) else {
            return;
        };
        let text = plain_text(&element);
        let outcome = self.scheduler.borrow_mut().fire(id, generation, &text);
        match outcome {
            FireOutcome::Request(ticket) => {
                let inner = self.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let outcome = Inner::perform(inner, ticket).await;
                    tracing::trace!(target: "proofmark::live", region = id, ?outcome, "live check finished");
                });
            }
            FireOutcome::Empty => {
                tracing::trace!(target: "proofmark::live", region = id, "blank region, not checking")
            }
            FireOutcome::Stale => {}
        }
    }

    fn trigger_of(&self, id: RegionId) -> Option<Element> {
        self.registry.borrow().get(id).and_then(|r| r.trigger().cloned())
    }

    async fn perform(self: Rc<Self>, ticket: CheckTicket) -> CheckOutcome {
        let id = ticket.region;
        let settings = self.settings.get_all_settings();
        let trigger = self.trigger_of(id);
        if let Some(t) = &trigger {
            set_busy(t, true);
        }

        let analysis = self
            .service
            .analyze(&ticket.text, &settings.analysis_options())
            .await;

        let completion = self.scheduler.borrow_mut().complete(&ticket);
        let still_requesting = matches!(self.scheduler.borrow().state(id), CheckState::Requesting(_));
        if let Some(t) = &trigger {
            if !still_requesting {
                set_busy(t, false);
            }
        }
        if completion == Completion::Stale {
            return CheckOutcome::Stale;
        }
        let Some(analysis) = analysis else {
            return CheckOutcome::Failed;
        };
        let Some(element) = self.registry.borrow().get(id).map(|r| r.element().clone()) else {
            return CheckOutcome::Stale;
        };

        let dictionary = DictionaryFilter::new(settings);
        let created = {
            let mut ids = self.ids.borrow_mut();
            let filters: [&dyn IssueFilter; 2] = [&dictionary, &ContextFilter];
            reconcile(&element, &analysis, &filters, &mut ids)
        };
        match created {
            Ok(markers) => {
                self.watch_markers(id, &markers);
                tracing::debug!(
                    target: "proofmark::live",
                    region = id,
                    issues = analysis.len(),
                    markers = markers.len(),
                    elapsed_ms = ticket.elapsed_ms() as u64,
                    "analysis applied"
                );
                CheckOutcome::Applied(markers.len())
            }
            Err(e) => {
                tracing::warn!(target: "proofmark::live", region = id, error = %e, "reconcile failed");
                CheckOutcome::Failed
            }
        }
    }

    /// Install hover-intent listeners on freshly created markers.
    fn watch_markers(self: &Rc<Self>, id: RegionId, markers: &[Element]) {
        let mut registry = self.registry.borrow_mut();
        let Some(region) = registry.get_mut(id) else {
            return;
        };
        region.prune_markers();
        let region_element = region.element().clone();
        for marker in markers {
            let enter = {
                let weak = Rc::downgrade(self);
                let (target, within) = (marker.clone(), region_element.clone());
                EventListener::new(marker, "mouseenter", move |_| {
                    if let Some(inner) = weak.upgrade() {
                        inner.hover_start(&target, &within);
                    }
                })
            };
            let leave = {
                let weak = Rc::downgrade(self);
                EventListener::new(marker, "mouseleave", move |_| {
                    if let Some(inner) = weak.upgrade() {
                        inner.hover_cancel();
                    }
                })
            };
            region.markers.push(MarkerHandles {
                marker: marker.clone(),
                _listeners: [enter, leave],
            });
        }
    }

    fn hover_start(&self, marker: &Element, region: &Element) {
        let delay = self.config.borrow().hover_delay_ms;
        let popover = self.popover.clone();
        let (marker, region) = (marker.clone(), region.clone());
        let timer = Timeout::new(delay, move || {
            if !marker.is_connected() {
                return;
            }
            if let Err(e) = popover.show(&marker, &region) {
                tracing::debug!(target: "proofmark::live", error = %e, "could not show popover");
            }
        });
        let previous = self.hover.borrow_mut().replace(timer);
        drop(previous);
    }

    fn hover_cancel(&self) {
        let pending = self.hover.borrow_mut().take();
        drop(pending);
    }

    fn hide_popover_within(&self, element: &Element) {
        if let Some(marker) = self.popover.current_marker() {
            if element.contains(Some(&marker)) {
                self.popover.hide();
            }
        }
    }
}
