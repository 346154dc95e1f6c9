//! `LiveChecker` as seen from JavaScript.

use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::Element;

use proofmark_browser::{
    AnalysisService, CheckOutcome, CorrectionPanel, HttpAnalysisClient, LiveChecker, LiveConfig,
    ServiceConfig, SettingKey, SettingValue, SettingsError, SettingsStore, summarize_video,
};

use crate::icons::TriggerIcons;
use crate::observer::{RESCAN_DELAY_MS, RescanObserver};
use crate::storage::LocalStorageSettingsStore;

fn outcome_name(outcome: CheckOutcome) -> &'static str {
    match outcome {
        CheckOutcome::Applied(_) => "applied",
        CheckOutcome::Stale => "stale",
        CheckOutcome::Empty => "empty",
        CheckOutcome::Failed => "failed",
        CheckOutcome::Skipped => "skipped",
    }
}

fn settings_error(e: SettingsError) -> JsValue {
    JsError::new(&e.to_string()).into()
}

/// Live checking for the current page.
#[wasm_bindgen(js_name = LiveChecker)]
pub struct JsLiveChecker {
    checker: LiveChecker,
    icons: TriggerIcons,
    observer: Option<RescanObserver>,
}

#[wasm_bindgen(js_class = LiveChecker)]
impl JsLiveChecker {
    /// Create a checker using settings from `localStorage`. `baseUrl`
    /// overrides the analysis service location.
    #[wasm_bindgen(constructor)]
    pub fn new(base_url: Option<String>) -> JsLiveChecker {
        let config = match base_url {
            Some(base_url) => ServiceConfig { base_url },
            None => ServiceConfig::default(),
        };
        let service: Rc<dyn AnalysisService> = Rc::new(HttpAnalysisClient::new(config));
        let settings = Rc::new(LocalStorageSettingsStore::load());
        let live = LiveConfig::from_settings(&settings.get_all_settings());
        let checker = LiveChecker::new(service, settings, live);
        let icons = TriggerIcons::new(checker.clone(), CorrectionPanel::new());
        JsLiveChecker {
            checker,
            icons,
            observer: None,
        }
    }

    /// Register every candidate region on the page and keep doing so as the
    /// page changes.
    pub fn start(&mut self) -> Result<u32, JsError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsError::new("no document"))?;
        let found = self.scan();

        let (checker, icons, doc) = (self.checker.clone(), self.icons.clone(), document.clone());
        let observer = RescanObserver::observe(&document, RESCAN_DELAY_MS, move || {
            let added = checker.discover_and_register(&doc);
            icons.sync();
            if added > 0 {
                tracing::debug!(target: "proofmark::api", added, "new regions after rescan");
            }
        })
        .map_err(|e| JsError::new(&e.to_string()))?;
        self.observer = Some(observer);
        tracing::info!(target: "proofmark::api", regions = found, "live checking started");
        Ok(found)
    }

    /// Stop watching the page. Registered regions stay registered.
    pub fn stop(&mut self) {
        self.observer = None;
    }

    /// One discovery pass. Returns the number of newly registered regions.
    pub fn scan(&self) -> u32 {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return 0;
        };
        let added = self.checker.discover_and_register(&document);
        self.icons.sync();
        added as u32
    }

    #[wasm_bindgen(js_name = registerElement)]
    pub fn register_element(&self, element: Element, delay_ms: Option<u32>) {
        self.checker.register_element(&element, delay_ms);
        self.icons.sync();
    }

    #[wasm_bindgen(js_name = unregisterElement)]
    pub fn unregister_element(&self, element: Element) {
        self.checker.unregister_element(&element);
        self.icons.sync();
    }

    /// Check `element` now. Resolves to `"applied"`, `"stale"`, `"empty"`,
    /// `"failed"` or `"skipped"`.
    #[wasm_bindgen(js_name = runCheck)]
    pub fn run_check(&self, element: Element) -> Promise {
        let checker = self.checker.clone();
        future_to_promise(async move {
            let outcome = checker.run_check(&element).await;
            Ok(JsValue::from_str(outcome_name(outcome)))
        })
    }

    #[wasm_bindgen(js_name = refreshAllElements)]
    pub fn refresh_all_elements(&self) -> u32 {
        self.checker.refresh_all_elements() as u32
    }

    #[wasm_bindgen(js_name = setLiveCheckingEnabled)]
    pub fn set_live_checking_enabled(&self, enabled: bool) -> Promise {
        let checker = self.checker.clone();
        future_to_promise(async move {
            checker
                .set_live_checking_enabled(enabled)
                .await
                .map_err(settings_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = setIconsVisible)]
    pub fn set_icons_visible(&self, visible: bool) -> Promise {
        let (checker, icons) = (self.checker.clone(), self.icons.clone());
        future_to_promise(async move {
            if !visible {
                icons.hide_all();
            }
            checker.set_icons_visible(visible).await.map_err(settings_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = getSetting)]
    pub fn get_setting(&self, key: &str) -> Result<JsValue, JsError> {
        let key: SettingKey = key.parse().map_err(|e: SettingsError| JsError::new(&e.to_string()))?;
        let value = self.checker.settings().get_setting(key);
        serde_wasm_bindgen::to_value(&value)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = getAllSettings)]
    pub fn get_all_settings(&self) -> Result<JsValue, JsError> {
        let settings = self.checker.settings().get_all_settings();
        serde_wasm_bindgen::to_value(&settings)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = updateSetting)]
    pub fn update_setting(&self, key: String, value: JsValue) -> Promise {
        let settings = self.checker.settings();
        future_to_promise(async move {
            let key: SettingKey = key.parse().map_err(settings_error)?;
            let value: SettingValue = serde_wasm_bindgen::from_value(value)
                .map_err(|e| JsError::new(&format!("Invalid setting value: {}", e)))?;
            settings.update_setting(key, value).await.map_err(settings_error)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Resolves to `true` when the word was not already in the dictionary.
    #[wasm_bindgen(js_name = addToCustomDictionary)]
    pub fn add_to_custom_dictionary(&self, word: String) -> Promise {
        let settings = self.checker.settings();
        future_to_promise(async move {
            let added = settings
                .add_to_custom_dictionary(&word)
                .await
                .map_err(settings_error)?;
            Ok(JsValue::from_bool(added))
        })
    }

    #[wasm_bindgen(js_name = removeFromCustomDictionary)]
    pub fn remove_from_custom_dictionary(&self, word: String) -> Promise {
        let settings = self.checker.settings();
        future_to_promise(async move {
            let removed = settings
                .remove_from_custom_dictionary(&word)
                .await
                .map_err(settings_error)?;
            Ok(JsValue::from_bool(removed))
        })
    }

    /// Summarize a video. Resolves to the summary, or `null` on failure
    /// (a notice is shown on the page).
    #[wasm_bindgen(js_name = summarizeVideo)]
    pub fn summarize_video(&self, video_id: String, title: String) -> Promise {
        let service = self.checker.service();
        future_to_promise(async move {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| JsError::new("no document"))?;
            match summarize_video(service.as_ref(), &document, &video_id, &title).await {
                Some(summary) => serde_wasm_bindgen::to_value(&summary)
                    .map_err(|e| JsValue::from(JsError::new(&format!("Serialization error: {}", e)))),
                None => Ok(JsValue::NULL),
            }
        })
    }
}
