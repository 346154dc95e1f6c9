//! Video summary action: transcript fetch chained into summarization.

use web_sys::Document;

use proofmark_core::{AnalysisService, Summary, SummaryRequest};

use crate::notice::{DEFAULT_NOTICE_MS, NoticeKind, show_notice};

/// Fetch the transcript for `video_id` and summarize it.
///
/// Either step failing shows an error notice in `document` and yields `None`.
pub async fn summarize_video(
    service: &dyn AnalysisService,
    document: &Document,
    video_id: &str,
    title: &str,
) -> Option<Summary> {
    let Some(transcript) = service.transcript(video_id).await else {
        fail(document, "Could not fetch the video transcript");
        return None;
    };
    let request = SummaryRequest::new(transcript, title);
    match service.summarize(&request).await {
        Some(summary) => {
            tracing::debug!(
                target: "proofmark::summary",
                video_id,
                points = summary.summary_points.len(),
                highlights = summary.highlights.len(),
                "video summarized"
            );
            Some(summary)
        }
        None => {
            fail(document, "Could not summarize the video");
            None
        }
    }
}

fn fail(document: &Document, message: &str) {
    if let Err(e) = show_notice(document, NoticeKind::Error, message, DEFAULT_NOTICE_MS) {
        tracing::debug!(target: "proofmark::summary", error = %e, "notice failed");
    }
}
