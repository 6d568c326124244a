//! Span helpers for extraction runs

use crate::attributes::*;

/// Counters describing one extraction run
#[derive(Debug, Clone, Default)]
pub struct ExtractionSummary {
    pub document_title: String,
    pub tools_extracted: usize,
    pub operations_skipped: usize,
    pub tools_renamed: usize,
}

/// Record a span carrying the run counters and log the outcome.
///
/// Skipped operations raise the event to `WARN` so they stay visible at
/// the default filter level.
pub fn record_extraction_summary(summary: &ExtractionSummary) {
    let span = tracing::info_span!(
        EXTRACTION_SPAN,
        { DOCUMENT_TITLE } = %summary.document_title,
        { TOOLS_EXTRACTED } = summary.tools_extracted,
        { OPERATIONS_SKIPPED } = summary.operations_skipped,
        { TOOLS_RENAMED } = summary.tools_renamed,
    );
    let _guard = span.enter();

    if summary.operations_skipped > 0 {
        tracing::warn!(
            target: SYSTEM_NAME,
            "{}: extracted {} tools, skipped {} operations",
            summary.document_title,
            summary.tools_extracted,
            summary.operations_skipped
        );
    } else {
        tracing::info!(
            target: SYSTEM_NAME,
            "{}: extracted {} tools",
            summary.document_title,
            summary.tools_extracted
        );
    }
}
