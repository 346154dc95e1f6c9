//! Browser DOM layer for proofmark live checking.
//!
//! This crate layers `web-sys` over `proofmark-core`. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `caret`: Selection API capture/restore of plain-text caret offsets
//! - `registry`: candidate discovery across same-origin frames, attach/detach side-table
//! - `merge`: wrapping planned occurrences in marker spans, unwrapping them again
//! - `suggestion`: hover popover for a single marker
//! - `correction`: whole-text accept/dismiss panel
//! - `notice`, `busy`: transient feedback
//! - `dom`: logged attribute and style writes
//! - `summary`: transcript fetch plus summarization for a video
//! - `controller`: `LiveChecker`, which wires the above to the scheduler and service
//!
//! # Re-exports
//!
//! This crate re-exports `proofmark-core` for convenience, so consumers
//! only need to depend on `proofmark-browser`.

pub use proofmark_core;
pub use proofmark_core::*;

pub mod busy;
pub mod caret;
pub mod controller;
pub mod correction;
pub mod dom;
pub mod merge;
pub mod notice;
pub mod position;
pub mod registry;
pub mod style;
pub mod suggestion;
pub mod summary;

pub use busy::set_busy;
pub use caret::BrowserCaret;
pub use controller::{CheckOutcome, LiveChecker, LiveConfig};
pub use correction::CorrectionPanel;
pub use merge::{MARKER_CLASS, MarkerInfo, reconcile, strip_markers, unwrap_marker};
pub use notice::{NoticeKind, show_notice};
pub use registry::{CANDIDATE_SELECTOR, REGISTERED_ATTR, Region, RegionRegistry, discover};
pub use suggestion::SuggestionPopover;
pub use summary::summarize_video;
pub use dom::{remove_attr, set_attr, set_hidden, set_style};

use wasm_bindgen::JsValue;

/// Render a thrown JS value for logs and `PlatformError`s.
pub(crate) fn describe_js(err: JsValue) -> String {
    match gloo_utils::errors::JsError::try_from(err.clone()) {
        Ok(e) => e.to_string(),
        Err(_) => format!("{err:?}"),
    }
}
