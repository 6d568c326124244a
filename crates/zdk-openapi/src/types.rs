//! Data structures produced by tool extraction.

use crate::error::SkipReason;
use indexmap::IndexMap;
use openapiv3::SecurityScheme;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Location where a parameter appears in the request.
///
/// The declaration order is also the order parameters are laid out in a
/// descriptor (path, then query, then header, then cookie).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Path parameter (e.g., /users/{id})
    Path,
    /// Query parameter (e.g., ?search=value)
    Query,
    /// Header parameter (e.g., X-Custom-Header)
    Header,
    /// Cookie parameter
    Cookie,
}

impl ParameterLocation {
    /// Parse the value of a parameter's `in` field.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP methods that carry operations in a path item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Canonical traversal order within a single path item.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Lower-cased verb, as used for path item keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a resolved input value goes when the operation is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParameter {
    /// Parameter name as declared in the document
    pub name: String,
    /// Location of the parameter
    #[serde(rename = "in")]
    pub location: ParameterLocation,
}

/// Marker serialized as `"type": "object"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectType {
    #[default]
    #[serde(rename = "object")]
    Object,
}

/// The JSON schema a tool accepts as input. Always an object schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub kind: ObjectType,
    pub properties: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl InputSchema {
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    pub(crate) fn mark_required(&mut self, name: &str) {
        if !self.is_required(name) {
            self.required.push(name.to_string());
        }
    }
}

/// One security alternative: scheme name to required scopes.
///
/// A descriptor's requirements list is a disjunction of these; every
/// scheme inside a single requirement must be satisfied together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityRequirement(pub IndexMap<String, Vec<String>>);

impl SecurityRequirement {
    pub fn scopes(&self, scheme: &str) -> Option<&[String]> {
        self.0.get(scheme).map(Vec::as_slice)
    }

    pub fn schemes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// How the request body maps onto the tool input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum BodyBinding {
    /// Body object properties live at the top level of the input schema.
    Flattened { fields: Vec<String> },
    /// The whole body is a single input property.
    Nested { property: String },
}

/// The invocation-ready description of one API operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique, identifier-safe tool name
    pub name: String,
    /// The operation's own `operationId`, if it had one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    pub tags: Vec<String>,
    /// Verbatim description text; escaping is the renderer's job
    pub description: String,
    pub input_schema: InputSchema,
    pub method: HttpMethod,
    /// Path with `{placeholders}` preserved
    pub path_template: String,
    pub execution_parameters: Vec<ExecutionParameter>,
    pub request_body_content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_binding: Option<BodyBinding>,
    pub security_requirements: Vec<SecurityRequirement>,
}

/// An operation that was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedOperation {
    pub path: String,
    /// `None` when the whole path item was unusable
    pub method: Option<HttpMethod>,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.method {
            Some(method) => write!(f, "{} {}: {}", method.as_str().to_uppercase(), self.path, self.reason),
            None => write!(f, "{}: {}", self.path, self.reason),
        }
    }
}

/// A tool whose preferred name was taken by an earlier operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedTool {
    pub requested: String,
    pub assigned: String,
    pub path: String,
    pub method: HttpMethod,
}

/// Everything one extraction run produces.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// `info.title` of the source document
    pub title: Option<String>,
    /// `info.version` of the source document
    pub version: Option<String>,
    /// Descriptors in document traversal order
    pub tools: Vec<ToolDescriptor>,
    /// `components.securitySchemes`, for the serializer's auxiliary block
    pub security_schemes: IndexMap<String, SecurityScheme>,
    pub skipped: Vec<SkippedOperation>,
    pub renamed: Vec<RenamedTool>,
}

impl Extraction {
    pub fn extracted_count(&self) -> usize {
        self.tools.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }
}
