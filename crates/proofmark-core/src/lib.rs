//! proofmark-core: pure Rust logic for live proofreading annotations.
//!
//! This crate provides:
//! - `Issue`, `Analysis`, `Category` - the data flagged by the analysis service
//! - `Settings` and the `SettingsStore` trait - feature toggles and the custom dictionary
//! - `plan_markers` - which text occurrences become markers, with overlap resolution
//! - `caret` - plain-text caret offset arithmetic shared with the DOM layer
//! - `IssueFilter` - dictionary, disabled-category and writing-context vetoes
//! - `CheckScheduler` - per-region debounce / request / stale-result state machine
//! - `AnalysisService` - the remote service contract, plus an HTTP client
//!
//! Nothing here touches the DOM; `proofmark-browser` layers `web-sys` on top.

pub mod caret;
pub mod filter;
pub mod matcher;
pub mod platform;
pub mod scheduler;
pub mod service;
pub mod settings;
pub mod types;

pub use caret::{CaretPosition, clamp_offset, locate_offset, utf16_len, utf16_offset_of_byte};
pub use filter::{
    ContextFilter, ContextProfile, DictionaryFilter, IssueFilter, Strictness, WritingContext,
};
pub use matcher::{MarkerPlan, Placement, TextRun, plan_markers};
pub use platform::{CaretPlatform, PlatformError};
pub use scheduler::{
    CheckGate, CheckScheduler, CheckState, CheckTicket, Completion, FireOutcome, Generation,
    RegionId,
};
pub use service::{
    AnalysisOptions, AnalysisService, DEFAULT_BASE_URL, HttpAnalysisClient, ServiceConfig,
    ServiceError, Summary, SummaryHighlight, SummaryRequest, Transcript, TranscriptSegment,
};
pub use settings::{
    MemorySettingsStore, SettingKey, SettingValue, Settings, SettingsError, SettingsStore,
};
pub use smol_str::SmolStr;
pub use types::{Analysis, Category, Issue, MarkerIdGen};
