//! Remote analysis service contract and its HTTP implementation.
//!
//! Callers use the `Option`-returning methods: every failure (transport,
//! status, unparsable body, blank input) is logged and collapses to `None`.
//! The `try_*` methods underneath carry the actual error for implementors
//! and tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Analysis;

pub const DEFAULT_BASE_URL: &str = "https://extension-yt-sck.vercel.app/api";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service responded with status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("nothing to send")]
    EmptyInput,

    #[error("service returned an empty transcript")]
    EmptyTranscript,
}

/// Where the service lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceConfig {
    pub base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

impl ServiceConfig {
    /// Full URL for an endpoint path such as `"correct"`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Which checks the service should run. Absent options mean "check everything".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisOptions {
    pub check_spelling: bool,
    pub check_grammar: bool,
    pub check_style: bool,
    pub ignore_uppercase: bool,
    pub custom_dictionary: Vec<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            check_spelling: true,
            check_grammar: true,
            check_style: true,
            ignore_uppercase: true,
            custom_dictionary: Vec::new(),
        }
    }
}

/// One caption line with its position in the video, in seconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSegment {
    pub text: String,
    pub offset: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transcript {
    pub transcript: String,
    pub timestamped_transcript: Vec<TranscriptSegment>,
    pub duration: Option<f64>,
    pub lang: Option<String>,
}

/// Body of a summary request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub transcript: String,
    pub video_title: String,
    /// Timestamps already present in the video description.
    pub existing_timestamps: Vec<String>,
    pub duration: Option<f64>,
    pub lang: Option<String>,
    pub timestamped_transcript: Vec<TranscriptSegment>,
}

impl SummaryRequest {
    pub fn new(transcript: Transcript, video_title: impl Into<String>) -> Self {
        Self {
            transcript: transcript.transcript,
            video_title: video_title.into(),
            existing_timestamps: Vec::new(),
            duration: transcript.duration,
            lang: transcript.lang,
            timestamped_transcript: transcript.timestamped_transcript,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryHighlight {
    /// `MM:SS` or `H:MM:SS`.
    pub timestamp: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
    pub title: String,
    pub summary_points: Vec<String>,
    pub highlights: Vec<SummaryHighlight>,
}

#[derive(Serialize)]
struct AnalyzeBody<'a> {
    text: &'a str,
    options: &'a AnalysisOptions,
}

#[derive(Serialize)]
struct CorrectBody<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CorrectResponse {
    corrected_text: Option<String>,
}

/// The text-analysis backend.
#[async_trait(?Send)]
pub trait AnalysisService {
    async fn try_analyze(
        &self,
        text: &str,
        options: &AnalysisOptions,
    ) -> Result<Analysis, ServiceError>;

    async fn try_correct(&self, text: &str) -> Result<String, ServiceError>;

    async fn try_transcript(&self, video_id: &str) -> Result<Transcript, ServiceError>;

    async fn try_summarize(&self, request: &SummaryRequest) -> Result<Summary, ServiceError>;

    /// Issues grouped by category, or `None` on any failure.
    async fn analyze(&self, text: &str, options: &AnalysisOptions) -> Option<Analysis> {
        if text.trim().is_empty() {
            return None;
        }
        self.try_analyze(text, options)
            .await
            .inspect_err(|e| tracing::warn!(target: "proofmark::service", error = %e, "analysis failed"))
            .ok()
    }

    /// Fully corrected text, or `None` on any failure.
    async fn correct(&self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        self.try_correct(text)
            .await
            .inspect_err(|e| tracing::warn!(target: "proofmark::service", error = %e, "correction failed"))
            .ok()
    }

    async fn transcript(&self, video_id: &str) -> Option<Transcript> {
        if video_id.trim().is_empty() {
            return None;
        }
        self.try_transcript(video_id)
            .await
            .inspect_err(|e| {
                tracing::warn!(target: "proofmark::service", video_id, error = %e, "transcript fetch failed")
            })
            .ok()
    }

    async fn summarize(&self, request: &SummaryRequest) -> Option<Summary> {
        if request.transcript.trim().is_empty() {
            return None;
        }
        self.try_summarize(request)
            .await
            .inspect_err(|e| tracing::warn!(target: "proofmark::service", error = %e, "summary failed"))
            .ok()
    }
}

/// `AnalysisService` over HTTP+JSON. Uses `fetch` when built for wasm.
#[derive(Debug, Clone, Default)]
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    config: ServiceConfig,
}

impl HttpAnalysisClient {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ServiceError::Status(status.as_u16()))
        }
    }
}

#[async_trait(?Send)]
impl AnalysisService for HttpAnalysisClient {
    async fn try_analyze(
        &self,
        text: &str,
        options: &AnalysisOptions,
    ) -> Result<Analysis, ServiceError> {
        let response = self
            .client
            .post(self.config.endpoint("enhanced-analysis"))
            .json(&AnalyzeBody { text, options })
            .send()
            .await?;
        let payload: Value = Self::check_status(response)?.json().await?;
        if !payload.is_object() {
            return Err(ServiceError::Malformed("analysis is not an object".into()));
        }
        Ok(Analysis::from_json(&payload))
    }

    async fn try_correct(&self, text: &str) -> Result<String, ServiceError> {
        if text.trim().is_empty() {
            return Err(ServiceError::EmptyInput);
        }
        let response = self
            .client
            .post(self.config.endpoint("correct"))
            .json(&CorrectBody { text })
            .send()
            .await?;
        let body: CorrectResponse = Self::check_status(response)?.json().await?;
        body.corrected_text
            .ok_or_else(|| ServiceError::Malformed("missing correctedText".into()))
    }

    async fn try_transcript(&self, video_id: &str) -> Result<Transcript, ServiceError> {
        if video_id.trim().is_empty() {
            return Err(ServiceError::EmptyInput);
        }
        let response = self
            .client
            .get(self.config.endpoint("transcript"))
            .query(&[("videoId", video_id)])
            .send()
            .await?;
        let transcript: Transcript = Self::check_status(response)?.json().await?;
        if transcript.transcript.trim().is_empty() {
            return Err(ServiceError::EmptyTranscript);
        }
        Ok(transcript)
    }

    async fn try_summarize(&self, request: &SummaryRequest) -> Result<Summary, ServiceError> {
        if request.transcript.trim().is_empty() {
            return Err(ServiceError::EmptyInput);
        }
        let response = self
            .client
            .post(self.config.endpoint("summarize"))
            .json(request)
            .send()
            .await?;
        Ok(Self::check_status(response)?.json().await?)
    }
}
