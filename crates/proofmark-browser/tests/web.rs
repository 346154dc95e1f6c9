//! WASM browser tests for proofmark-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, Event, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

use proofmark_browser::caret::{capture_caret_offset, restore_caret_offset};
use proofmark_browser::merge::{markers_in, reconcile};
use proofmark_browser::{
    Analysis, AnalysisOptions, AnalysisService, Category, CheckOutcome, CorrectionPanel, Issue,
    LiveChecker, LiveConfig, MARKER_CLASS, MarkerIdGen, MarkerInfo, MemorySettingsStore,
    NoticeKind, REGISTERED_ATTR, ServiceError, Settings, SettingsStore, SuggestionPopover,
    Summary, SummaryRequest, Transcript, set_busy, set_hidden, show_notice, strip_markers,
    summarize_video,
};

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn editable(html: &str) -> Element {
    let doc = document();
    let el = doc.create_element("div").unwrap();
    el.set_attribute("contenteditable", "true").unwrap();
    el.set_inner_html(html);
    doc.body().unwrap().append_child(&el).unwrap();
    el
}

fn text_of(el: &Element) -> String {
    el.text_content().unwrap_or_default()
}

fn spelling(word: &str, suggestions: &[&str]) -> Analysis {
    let mut analysis = Analysis::default();
    analysis.spelling.push(Issue::new(
        word,
        Category::Spelling,
        suggestions.iter().map(|s| s.to_string()).collect(),
    ));
    analysis
}

fn store() -> Rc<MemorySettingsStore> {
    Rc::new(MemorySettingsStore::new(Settings::default()))
}

/// Analysis service answering from a queue of `(delay_ms, analysis)` and
/// counting calls. An empty queue answers with no issues.
#[derive(Default)]
struct Scripted {
    responses: RefCell<VecDeque<(u32, Analysis)>>,
    corrected: Option<String>,
    transcript: Option<Transcript>,
    calls: Cell<usize>,
}

impl Scripted {
    fn answering(responses: Vec<(u32, Analysis)>) -> Rc<Self> {
        Rc::new(Self {
            responses: RefCell::new(responses.into()),
            ..Self::default()
        })
    }
}

#[async_trait(?Send)]
impl AnalysisService for Scripted {
    async fn try_analyze(
        &self,
        _text: &str,
        _options: &AnalysisOptions,
    ) -> Result<Analysis, ServiceError> {
        self.calls.set(self.calls.get() + 1);
        let next = self.responses.borrow_mut().pop_front();
        let (delay, analysis) = next.unwrap_or_default();
        if delay > 0 {
            TimeoutFuture::new(delay).await;
        }
        Ok(analysis)
    }

    async fn try_correct(&self, _text: &str) -> Result<String, ServiceError> {
        self.calls.set(self.calls.get() + 1);
        self.corrected
            .clone()
            .ok_or_else(|| ServiceError::Malformed("missing correctedText".into()))
    }

    async fn try_transcript(&self, _video_id: &str) -> Result<Transcript, ServiceError> {
        self.transcript.clone().ok_or(ServiceError::EmptyTranscript)
    }

    async fn try_summarize(&self, request: &SummaryRequest) -> Result<Summary, ServiceError> {
        Ok(Summary {
            title: request.video_title.clone(),
            summary_points: vec![request.transcript.clone()],
            highlights: Vec::new(),
        })
    }
}

// === Caret tracker ===

#[wasm_bindgen_test]
fn test_caret_round_trip_every_offset() {
    let el = editable("Hello <b>bold</b> world");
    let len = text_of(&el).encode_utf16().count();
    for offset in 0..=len {
        restore_caret_offset(&el, offset).unwrap();
        assert_eq!(capture_caret_offset(&el).unwrap(), offset, "offset {offset}");
    }
    el.remove();
}

#[wasm_bindgen_test]
fn test_caret_restore_past_end_lands_at_end() {
    let el = editable("abc");
    restore_caret_offset(&el, 99).unwrap();
    assert_eq!(capture_caret_offset(&el).unwrap(), 3);
    el.remove();
}

#[wasm_bindgen_test]
fn test_caret_restore_without_text_is_noop() {
    let el = editable("");
    assert!(restore_caret_offset(&el, 4).is_ok());
    el.remove();
}

#[wasm_bindgen_test]
fn test_textarea_caret_clamps_to_value() {
    let doc = document();
    let area = doc.create_element("textarea").unwrap();
    area.unchecked_ref::<web_sys::HtmlTextAreaElement>().set_value("Helo");
    doc.body().unwrap().append_child(&area).unwrap();
    restore_caret_offset(&area, 2).unwrap();
    assert_eq!(capture_caret_offset(&area).unwrap(), 2);
    restore_caret_offset(&area, 99).unwrap();
    assert_eq!(capture_caret_offset(&area).unwrap(), 4);
    area.remove();
}

// === Span merger ===

#[wasm_bindgen_test]
fn test_non_matching_issues_change_nothing() {
    let el = editable("Helo wrold");
    let before = el.inner_html();
    let mut ids = MarkerIdGen::new(1);
    let created = reconcile(&el, &spelling("absent", &["present"]), &[], &mut ids).unwrap();
    assert!(created.is_empty());
    assert_eq!(el.inner_html(), before);
    el.remove();
}

#[wasm_bindgen_test]
fn test_single_spelling_marker() {
    let el = editable("Helo wrold");
    let mut ids = MarkerIdGen::new(1);
    let created = reconcile(&el, &spelling("Helo", &["Hello"]), &[], &mut ids).unwrap();
    assert_eq!(created.len(), 1);

    let marker = &created[0];
    assert_eq!(marker.tag_name(), "SPAN");
    assert!(marker.class_list().contains(MARKER_CLASS));
    assert_eq!(marker.get_attribute("data-type").as_deref(), Some("spelling"));
    assert_eq!(text_of(marker), "Helo");
    assert_eq!(text_of(&el), "Helo wrold");

    let info = MarkerInfo::read(marker).unwrap();
    assert_eq!(info.category, Category::Spelling);
    assert_eq!(info.original, "Helo");
    assert_eq!(info.suggestions, vec!["Hello".to_string()]);
    el.remove();
}

#[wasm_bindgen_test]
fn test_reconcile_twice_is_idempotent() {
    let el = editable("Helo wrold");
    let analysis = spelling("Helo", &["Hello"]);
    let mut ids = MarkerIdGen::new(1);
    reconcile(&el, &analysis, &[], &mut ids).unwrap();
    let once = el.inner_html();
    let again = reconcile(&el, &analysis, &[], &mut ids).unwrap();
    assert!(again.is_empty());
    assert_eq!(el.inner_html(), once);
    el.remove();
}

#[wasm_bindgen_test]
fn test_existing_structure_is_kept() {
    let el = editable("<b>Helo</b> wrold");
    let mut ids = MarkerIdGen::new(1);
    let created = reconcile(&el, &spelling("helo", &["Hello"]), &[], &mut ids).unwrap();
    assert_eq!(created.len(), 1);
    let bold = el.query_selector("b").unwrap().unwrap();
    assert!(bold.contains(Some(&created[0])));
    assert_eq!(text_of(&el), "Helo wrold");
    el.remove();
}

#[wasm_bindgen_test]
fn test_textarea_is_never_mutated() {
    let doc = document();
    let area = doc.create_element("textarea").unwrap();
    area.set_text_content(Some("Helo wrold"));
    doc.body().unwrap().append_child(&area).unwrap();
    let mut ids = MarkerIdGen::new(1);
    let created = reconcile(&area, &spelling("Helo", &["Hello"]), &[], &mut ids).unwrap();
    assert!(created.is_empty());
    assert_eq!(area.children().length(), 0);
    area.remove();
}

#[wasm_bindgen_test]
fn test_strip_markers_restores_text() {
    let el = editable("Helo wrold helo");
    let mut ids = MarkerIdGen::new(1);
    reconcile(&el, &spelling("helo", &["Hello"]), &[], &mut ids).unwrap();
    assert_eq!(markers_in(&el).len(), 2);
    assert_eq!(strip_markers(&el), 2);
    assert!(markers_in(&el).is_empty());
    assert_eq!(text_of(&el), "Helo wrold helo");
    el.remove();
}

// === Suggestion UI ===

#[wasm_bindgen_test]
async fn test_apply_suggestion() {
    let el = editable("Helo wrold");
    let mut ids = MarkerIdGen::new(1);
    let created = reconcile(&el, &spelling("Helo", &["Hello"]), &[], &mut ids).unwrap();

    let popover = SuggestionPopover::new(store(), 100);
    popover.show(&created[0], &el).unwrap();
    assert!(popover.is_open());
    let overlay = popover.overlay().unwrap();
    assert_eq!(overlay.query_selector_all(".proofmark-item").unwrap().length(), 1);

    popover.apply("Hello");
    assert!(!popover.is_open());
    assert!(!overlay.is_connected());
    assert_eq!(text_of(&el), "Hello wrold");

    TimeoutFuture::new(150).await;
    assert!(markers_in(&el).is_empty());
    assert_eq!(text_of(&el), "Hello wrold");
    el.remove();
}

#[wasm_bindgen_test]
fn test_popover_lists_at_most_five() {
    let el = editable("Helo");
    let mut ids = MarkerIdGen::new(1);
    let created = reconcile(
        &el,
        &spelling("Helo", &["a", "b", "c", "d", "e", "f", "g"]),
        &[],
        &mut ids,
    )
    .unwrap();
    let popover = SuggestionPopover::new(store(), 100);
    popover.show(&created[0], &el).unwrap();
    let overlay = popover.overlay().unwrap();
    assert_eq!(overlay.query_selector_all(".proofmark-item").unwrap().length(), 5);
    assert!(
        overlay
            .query_selector(r#"[data-action="dictionary"]"#)
            .unwrap()
            .is_some()
    );
    popover.hide();
    assert!(!overlay.is_connected());
    el.remove();
}

#[wasm_bindgen_test]
fn test_ignore_one_of_two_occurrences() {
    let el = editable("Helo and helo");
    let mut ids = MarkerIdGen::new(1);
    let created = reconcile(&el, &spelling("helo", &["hello"]), &[], &mut ids).unwrap();
    assert_eq!(created.len(), 2);
    assert_ne!(created[0].id(), created[1].id());

    let popover = SuggestionPopover::new(store(), 100);
    popover.show(&created[0], &el).unwrap();
    popover.ignore();

    let left = markers_in(&el);
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id(), created[1].id());
    assert_eq!(text_of(&el), "Helo and helo");
    el.remove();
}

#[wasm_bindgen_test]
async fn test_add_to_dictionary() {
    let el = editable("Helo and helo");
    let mut ids = MarkerIdGen::new(1);
    let created = reconcile(&el, &spelling("helo", &["hello"]), &[], &mut ids).unwrap();

    let settings = store();
    let popover = SuggestionPopover::new(settings.clone(), 100);
    popover.show(&created[0], &el).unwrap();
    popover.add_to_dictionary().await;

    assert!(markers_in(&el).is_empty());
    assert!(settings.get_all_settings().is_known_word("Helo"));
    el.remove();
}

#[wasm_bindgen_test]
fn test_showing_a_second_popover_replaces_the_first() {
    let el = editable("Helo wrold");
    let mut ids = MarkerIdGen::new(1);
    let mut analysis = spelling("Helo", &["Hello"]);
    analysis
        .grammar
        .push(Issue::new("wrold", Category::Grammar, vec!["world".into()]));
    let created = reconcile(&el, &analysis, &[], &mut ids).unwrap();
    assert_eq!(created.len(), 2);

    let popover = SuggestionPopover::new(store(), 100);
    popover.show(&created[0], &el).unwrap();
    let first = popover.overlay().unwrap();
    popover.show(&created[1], &el).unwrap();
    assert!(!first.is_connected());
    assert_eq!(
        document()
            .query_selector_all(".proofmark-popover")
            .unwrap()
            .length(),
        1
    );
    popover.hide();
    el.remove();
}

// === Live checker ===

fn checker(service: Rc<Scripted>, debounce_ms: u32) -> LiveChecker {
    LiveChecker::new(
        service,
        store(),
        LiveConfig::default().with_debounce_ms(debounce_ms),
    )
}

fn fire_input(el: &Element) {
    let event = Event::new("input").unwrap();
    el.dispatch_event(&event).unwrap();
}

#[wasm_bindgen_test]
async fn test_rapid_input_makes_one_request() {
    let service = Scripted::answering(vec![(0, spelling("Helo", &["Hello"]))]);
    let checker = checker(service.clone(), 50);
    let el = editable("Helo wrold");
    checker.register_element(&el, None);

    for _ in 0..5 {
        fire_input(&el);
        TimeoutFuture::new(10).await;
    }
    TimeoutFuture::new(200).await;

    assert_eq!(service.calls.get(), 1);
    assert_eq!(markers_in(&el).len(), 1);
    checker.unregister_element(&el);
    el.remove();
}

#[wasm_bindgen_test]
async fn test_stale_response_is_discarded() {
    let service = Scripted::answering(vec![
        (150, spelling("Helo", &["Hello"])),
        (0, Analysis::default()),
    ]);
    let checker = checker(service.clone(), 1000);
    let el = editable("Helo wrold");
    checker.register_element(&el, None);

    let first: Rc<Cell<Option<CheckOutcome>>> = Rc::new(Cell::new(None));
    {
        let (checker, el, first) = (checker.clone(), el.clone(), first.clone());
        wasm_bindgen_futures::spawn_local(async move {
            first.set(Some(checker.run_check(&el).await));
        });
    }
    TimeoutFuture::new(20).await;
    assert_eq!(checker.run_check(&el).await, CheckOutcome::Applied(0));

    TimeoutFuture::new(250).await;
    assert_eq!(first.get(), Some(CheckOutcome::Stale));
    assert!(markers_in(&el).is_empty());
    assert_eq!(service.calls.get(), 2);
    checker.unregister_element(&el);
    el.remove();
}

#[wasm_bindgen_test]
async fn test_run_check_applies_markers() {
    let service = Scripted::answering(vec![(0, spelling("Helo", &["Hello"]))]);
    let checker = checker(service, 1000);
    let el = editable("Helo wrold");
    checker.register_element(&el, None);
    assert_eq!(checker.run_check(&el).await, CheckOutcome::Applied(1));
    checker.unregister_element(&el);
    assert!(markers_in(&el).is_empty());
    el.remove();
}

#[wasm_bindgen_test]
async fn test_dictionary_words_are_not_marked() {
    let service = Scripted::answering(vec![(0, spelling("Helo", &["Hello"]))]);
    let settings = store();
    settings.add_to_custom_dictionary("helo").await.unwrap();
    let checker = LiveChecker::new(service, settings, LiveConfig::default());
    let el = editable("Helo wrold");
    checker.register_element(&el, None);
    assert_eq!(checker.run_check(&el).await, CheckOutcome::Applied(0));
    checker.unregister_element(&el);
    el.remove();
}

#[wasm_bindgen_test]
async fn test_unregistered_and_blank_regions() {
    let service = Scripted::answering(Vec::new());
    let checker = checker(service.clone(), 1000);
    let el = editable("   ");
    assert_eq!(checker.run_check(&el).await, CheckOutcome::Skipped);
    checker.register_element(&el, None);
    assert_eq!(checker.run_check(&el).await, CheckOutcome::Empty);
    assert_eq!(service.calls.get(), 0);
    checker.unregister_element(&el);
    el.remove();
}

#[wasm_bindgen_test]
async fn test_disabling_live_checks_strips_markers() {
    let service = Scripted::answering(vec![(0, spelling("Helo", &["Hello"]))]);
    let checker = checker(service.clone(), 20);
    let el = editable("Helo wrold");
    checker.register_element(&el, None);
    checker.run_check(&el).await;
    assert_eq!(markers_in(&el).len(), 1);

    checker.set_live_checking_enabled(false).await.unwrap();
    assert!(markers_in(&el).is_empty());
    assert!(!checker.config().live_checking_enabled());
    assert!(!checker.settings().get_all_settings().live_checking_enabled);

    fire_input(&el);
    TimeoutFuture::new(80).await;
    assert_eq!(service.calls.get(), 1);
    checker.unregister_element(&el);
    el.remove();
}

#[wasm_bindgen_test]
async fn test_refresh_does_nothing_while_live_checking_is_off() {
    let service = Scripted::answering(vec![
        (0, spelling("Helo", &["Hello"])),
        (0, spelling("Helo", &["Hello"])),
    ]);
    let checker = checker(service.clone(), 1000);
    let el = editable("Helo wrold");
    checker.register_element(&el, None);
    checker.run_check(&el).await;
    checker.set_live_checking_enabled(false).await.unwrap();
    assert!(markers_in(&el).is_empty());

    assert_eq!(checker.refresh_all_elements(), 0);
    TimeoutFuture::new(50).await;
    assert_eq!(service.calls.get(), 1);
    assert!(markers_in(&el).is_empty());

    checker.set_live_checking_enabled(true).await.unwrap();
    TimeoutFuture::new(50).await;
    assert_eq!(service.calls.get(), 2);
    assert_eq!(markers_in(&el).len(), 1);
    checker.unregister_element(&el);
    el.remove();
}

fn hover_checker(service: Rc<Scripted>) -> LiveChecker {
    LiveChecker::new(
        service,
        store(),
        LiveConfig::default()
            .with_debounce_ms(1000)
            .with_hover_delay_ms(30),
    )
}

fn dispatch(el: &Element, kind: &str) {
    el.dispatch_event(&Event::new(kind).unwrap()).unwrap();
}

#[wasm_bindgen_test]
async fn test_hover_opens_popover_after_delay() {
    let checker = hover_checker(Scripted::answering(vec![(0, spelling("Helo", &["Hello"]))]));
    let el = editable("Helo wrold");
    checker.register_element(&el, None);
    assert_eq!(checker.run_check(&el).await, CheckOutcome::Applied(1));
    let marker = markers_in(&el).remove(0);

    dispatch(&marker, "mouseenter");
    assert!(!checker.popover().is_open());
    TimeoutFuture::new(80).await;
    assert!(checker.popover().is_open());
    assert_eq!(
        checker.popover().current_marker().map(|m| m.id()),
        Some(marker.id())
    );

    checker.popover().hide();
    checker.unregister_element(&el);
    el.remove();
}

#[wasm_bindgen_test]
async fn test_leaving_before_delay_cancels_popover() {
    let checker = hover_checker(Scripted::answering(vec![(0, spelling("Helo", &["Hello"]))]));
    let el = editable("Helo wrold");
    checker.register_element(&el, None);
    checker.run_check(&el).await;
    let marker = markers_in(&el).remove(0);

    dispatch(&marker, "mouseenter");
    TimeoutFuture::new(10).await;
    dispatch(&marker, "mouseleave");
    TimeoutFuture::new(80).await;
    assert!(!checker.popover().is_open());
    assert!(document().query_selector(".proofmark-popover").unwrap().is_none());

    checker.unregister_element(&el);
    el.remove();
}

#[wasm_bindgen_test]
fn test_outside_click_closes_popover_and_panel() {
    let body: HtmlElement = document().body().unwrap();
    let el = editable("Helo wrold");
    let mut ids = MarkerIdGen::new(1);
    let created = reconcile(&el, &spelling("Helo", &["Hello"]), &[], &mut ids).unwrap();

    // Clicks inside an overlay keep it open; a click elsewhere closes it.
    let popover = SuggestionPopover::new(store(), 100);
    popover.show(&created[0], &el).unwrap();
    popover
        .overlay()
        .unwrap()
        .unchecked_ref::<HtmlElement>()
        .click();
    assert!(popover.is_open());
    body.click();
    assert!(!popover.is_open());
    assert!(document().query_selector(".proofmark-popover").unwrap().is_none());

    let panel = CorrectionPanel::new();
    panel.show(&el, &el, "Helo wrold", "Hello world").unwrap();
    panel
        .overlay()
        .unwrap()
        .query_selector(".proofmark-original")
        .unwrap()
        .unwrap()
        .unchecked_ref::<HtmlElement>()
        .click();
    assert!(panel.is_open());
    body.click();
    assert!(!panel.is_open());
    assert!(document().query_selector(".proofmark-correction").unwrap().is_none());

    // The document listeners went away with the overlays.
    body.click();
    assert!(!popover.is_open());
    assert!(!panel.is_open());
    assert_eq!(text_of(&el), "Helo wrold");
    assert_eq!(markers_in(&el).len(), 1);
    el.remove();
}

#[wasm_bindgen_test]
async fn test_icons_visibility_toggles_triggers() {
    let checker = checker(Scripted::answering(Vec::new()), 1000);
    let el = editable("Helo");
    checker.register_element(&el, None);
    let trigger = document().create_element("button").unwrap();
    checker.set_trigger(&el, Some(trigger.clone()));

    checker.set_icons_visible(false).await.unwrap();
    assert!(trigger.has_attribute("hidden"));
    assert!(!checker.config().icons_visible());
    assert!(!checker.settings().get_all_settings().icons_visible);

    checker.set_icons_visible(true).await.unwrap();
    assert!(!trigger.has_attribute("hidden"));
    checker.unregister_element(&el);
    el.remove();
}

#[wasm_bindgen_test]
fn test_register_is_idempotent_and_detach_then_rediscover() {
    let checker = checker(Scripted::answering(Vec::new()), 1000);
    let el = editable("Helo");
    let id = checker.register_element(&el, None);
    assert_eq!(checker.register_element(&el, Some(10)), id);
    assert_eq!(el.get_attribute(REGISTERED_ATTR).as_deref(), Some("true"));

    checker.unregister_element(&el);
    assert!(!checker.is_registered(&el));
    assert!(!el.has_attribute(REGISTERED_ATTR));
    checker.unregister_element(&el);

    checker.discover_and_register(&document());
    assert!(checker.is_registered(&el));
    assert!(el.has_attribute(REGISTERED_ATTR));

    el.remove();
    checker.prune();
    assert!(!checker.is_registered(&el));
}

// === Correction UI ===

#[wasm_bindgen_test]
async fn test_correction_accept_replaces_content() {
    let service = Rc::new(Scripted {
        corrected: Some("Hello world".into()),
        ..Scripted::default()
    });
    let checker = checker(service, 1000);
    let el = editable("Helo wrold");
    checker.register_element(&el, None);

    let panel = CorrectionPanel::new();
    assert!(checker.correct_element(&el, &panel).await);
    assert!(panel.is_open());
    let overlay = panel.overlay().unwrap();
    assert_eq!(
        overlay
            .query_selector(".proofmark-corrected")
            .unwrap()
            .and_then(|e| e.text_content())
            .as_deref(),
        Some("Hello world")
    );

    panel.accept();
    assert!(!panel.is_open());
    assert!(!overlay.is_connected());
    assert_eq!(text_of(&el), "Hello world");
    checker.unregister_element(&el);
    el.remove();
}

#[wasm_bindgen_test]
async fn test_correction_failure_shows_notice() {
    let checker = checker(Scripted::answering(Vec::new()), 1000);
    let el = editable("Helo wrold");
    let panel = CorrectionPanel::new();
    assert!(!checker.correct_element(&el, &panel).await);
    assert!(!panel.is_open());
    let notice = document()
        .query_selector(r#".proofmark-notice[data-kind="error"]"#)
        .unwrap();
    assert!(notice.is_some());
    notice.unwrap().remove();
    el.remove();
}

#[wasm_bindgen_test]
fn test_correction_dismiss_keeps_content() {
    let el = editable("Helo wrold");
    let panel = CorrectionPanel::new();
    panel.show(&el, &el, "Helo wrold", "Hello world").unwrap();
    panel.dismiss();
    assert!(!panel.is_open());
    assert_eq!(text_of(&el), "Helo wrold");
    el.remove();
}

// === Busy indicator and notices ===

#[wasm_bindgen_test]
fn test_busy_is_idempotent() {
    let doc = document();
    let control = doc.create_element("button").unwrap();
    doc.body().unwrap().append_child(&control).unwrap();

    set_busy(&control, true);
    set_busy(&control, true);
    assert!(control.class_list().contains("spinner-active"));
    assert_eq!(control.query_selector_all(".loading-spinner").unwrap().length(), 1);

    set_busy(&control, false);
    set_busy(&control, false);
    assert!(!control.class_list().contains("spinner-active"));
    assert_eq!(control.query_selector_all(".loading-spinner").unwrap().length(), 0);
    control.remove();
}

#[wasm_bindgen_test]
fn test_set_hidden_toggles_attribute() {
    let control = document().create_element("button").unwrap();
    set_hidden(&control, true);
    set_hidden(&control, true);
    assert_eq!(control.get_attribute("hidden").as_deref(), Some(""));
    set_hidden(&control, false);
    assert!(!control.has_attribute("hidden"));
    set_hidden(&control, false);
    assert!(!control.has_attribute("hidden"));
}

#[wasm_bindgen_test]
fn test_notice_dismisses_on_click() {
    let notice = show_notice(&document(), NoticeKind::Warning, "Heads up", 5000).unwrap();
    assert!(notice.is_connected());
    assert_eq!(notice.get_attribute("data-kind").as_deref(), Some("warning"));
    assert_eq!(text_of(&notice), "Heads up");
    notice.unchecked_ref::<HtmlElement>().click();
    assert!(!notice.is_connected());
}

// === Video summary ===

#[wasm_bindgen_test]
async fn test_summarize_video() {
    let service = Scripted {
        transcript: Some(Transcript {
            transcript: "first we talk, then we walk".into(),
            ..Transcript::default()
        }),
        ..Scripted::default()
    };
    let summary = summarize_video(&service, &document(), "abc123", "Talks")
        .await
        .unwrap();
    assert_eq!(summary.title, "Talks");
    assert_eq!(summary.summary_points, vec!["first we talk, then we walk".to_string()]);
}

#[wasm_bindgen_test]
async fn test_summarize_video_without_transcript_shows_notice() {
    let service = Scripted::default();
    let summary = summarize_video(&service, &document(), "abc123", "Talks").await;
    assert!(summary.is_none());
    let notice = document()
        .query_selector(r#".proofmark-notice[data-kind="error"]"#)
        .unwrap()
        .unwrap();
    assert_eq!(text_of(&notice), "Could not fetch the video transcript");
    notice.remove();
}
