//! Error types for OpenAPI tool extraction.

use thiserror::Error;

/// Result type for OpenAPI operations.
pub type Result<T> = std::result::Result<T, OpenApiError>;

/// Errors that abort a whole extraction run.
///
/// Problems confined to a single operation never surface here; they are
/// reported as [`SkipReason`]s on the extraction result instead.
#[derive(Error, Debug)]
pub enum OpenApiError {
    /// The document does not have the minimal structure needed to extract
    /// tools (no `paths` object, malformed global security, ...).
    #[error("Malformed OpenAPI document: {0}")]
    MalformedSpec(String),

    /// OpenAPI spec parsing error
    #[error("Failed to parse OpenAPI spec: {0}")]
    ParseError(String),

    /// The source text is neither JSON nor YAML we can map onto JSON.
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Why a single operation was left out of the output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A parameter declares an `in` value outside path/query/header/cookie.
    #[error("parameter '{name}' has unrecognized location '{location}'")]
    UnrecognizedLocation { name: String, location: String },

    /// A parameter object is missing its name or location, or is not an object.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A `$ref` survived dereferencing.
    #[error("unresolved reference '{0}'")]
    UnresolvedReference(String),

    /// A schema fragment is not a JSON object.
    #[error("invalid schema for '{0}'")]
    InvalidSchema(String),

    /// The operation's `security` list is not a list of requirement objects.
    #[error("invalid security requirements: {0}")]
    InvalidSecurity(String),

    /// The operation object itself has the wrong shape.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// An input property name is claimed twice and cannot be disambiguated.
    #[error("property '{0}' conflicts with the nested request body")]
    PropertyConflict(String),

    /// Deprecated operations were excluded by configuration.
    #[error("operation is deprecated")]
    Deprecated,
}
