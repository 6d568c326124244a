//! # ZDK OpenAPI Tool Extractor
//!
//! Turns an OpenAPI v3 document into callable tool descriptors, one per
//! API operation.
//!
//! ## Features
//!
//! - Load fully-dereferenced OpenAPI v3 documents (JSON and YAML)
//! - Deterministic, unique, identifier-safe tool names
//! - Path-level parameter inheritance with per-operation overrides
//! - One flat JSON input schema per operation, request body included
//! - Execution bindings telling a runtime where each input value goes
//! - Operation or global security requirements
//! - JSON and TypeScript renderers for the extracted set
//!
//! Operations that cannot be normalized are skipped and reported on the
//! [`Extraction`]; only a document without a usable `paths` object fails
//! the whole run.
//!
//! ## Example
//!
//! ```no_run
//! use zdk_openapi::{ApiDocument, ExtractOptions, Extractor, render_json};
//!
//! # fn main() -> Result<(), zdk_openapi::OpenApiError> {
//! let document = ApiDocument::from_file("./api/openapi.yaml")?;
//! let extraction = Extractor::new(ExtractOptions::default()).extract(&document)?;
//!
//! println!(
//!     "Extracted {} tools, skipped {}",
//!     extraction.extracted_count(),
//!     extraction.skipped_count()
//! );
//! println!("{}", render_json(&extraction)?);
//! # Ok(())
//! # }
//! ```

mod body;
mod document;
mod error;
mod extractor;
mod naming;
mod params;
mod render;
mod toolset;
mod types;

pub use body::{NESTED_BODY_PROPERTY, select_content_type};
pub use document::ApiDocument;
pub use error::{OpenApiError, Result, SkipReason};
pub use extractor::{ExtractOptions, Extractor, extract};
pub use naming::{MIN_NAME_LENGTH, base_name, sanitize_name, synthesize_name};
pub use render::{escape_template_literal, render_json, render_typescript};
pub use toolset::ToolCatalog;
pub use types::{
    BodyBinding, ExecutionParameter, Extraction, HttpMethod, InputSchema, ObjectType,
    ParameterLocation, RenamedTool, SecurityRequirement, SkippedOperation, ToolDescriptor,
};

/// Re-exported so callers can inspect [`Extraction::security_schemes`].
pub use openapiv3::SecurityScheme;
