//! # ZDK Telemetry
//!
//! Structured logging for the ZDK tool generator: one call installs a
//! `tracing` subscriber, and [`record_extraction_summary`] emits the
//! per-run counters under stable field names.

mod spans;
mod tracer;

pub use spans::{ExtractionSummary, record_extraction_summary};
pub use tracer::{LogFormat, init_logging};

/// Span and field names used in log output.
pub mod attributes {
    pub const EXTRACTION_SPAN: &str = "toolgen.extraction";
    pub const DOCUMENT_TITLE: &str = "toolgen.document.title";
    pub const TOOLS_EXTRACTED: &str = "toolgen.tools.extracted";
    pub const OPERATIONS_SKIPPED: &str = "toolgen.operations.skipped";
    pub const TOOLS_RENAMED: &str = "toolgen.tools.renamed";

    pub const SYSTEM_NAME: &str = "zdk.toolgen";
}
