//! One-line auto-expiring notices for whole-document actions.

use std::fmt;

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use proofmark_core::PlatformError;

use crate::dom::{set_attr, set_style};

pub const NOTICE_CLASS: &str = "proofmark-notice";
pub const DEFAULT_NOTICE_MS: u32 = 2000;
const FADE_MS: u32 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Info => "info",
            NoticeKind::Success => "success",
            NoticeKind::Warning => "warning",
            NoticeKind::Error => "error",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Show `message` in the corner of `document` for `duration_ms`.
///
/// Clicking the notice dismisses it early. Returns the notice element.
pub fn show_notice(
    document: &Document,
    kind: NoticeKind,
    message: &str,
    duration_ms: u32,
) -> Result<Element, PlatformError> {
    crate::style::ensure_stylesheet(document);
    let body = document.body().ok_or("document has no body")?;

    let notice = document
        .create_element("div")
        .map_err(|e| format!("create_element failed: {}", crate::describe_js(e)))?;
    notice.set_class_name(NOTICE_CLASS);
    set_attr(&notice, "data-kind", kind.as_str());
    set_attr(&notice, "role", "status");
    notice.set_text_content(Some(message));
    body.append_child(&notice)
        .map_err(|e| format!("append_child failed: {}", crate::describe_js(e)))?;

    let dismiss = {
        let target = notice.clone();
        EventListener::once(&notice, "click", move |_| target.remove())
    };

    let expiring = notice.clone();
    Timeout::new(duration_ms, move || {
        set_style(
            &expiring.unchecked_ref::<web_sys::HtmlElement>().style(),
            "opacity",
            "0",
        );
        Timeout::new(FADE_MS, move || {
            drop(dismiss);
            expiring.remove();
        })
        .forget();
    })
    .forget();

    tracing::debug!(target: "proofmark::notice", %kind, message, "notice shown");
    Ok(notice)
}
