//! Loading of already-dereferenced OpenAPI documents.
//!
//! The document is kept as a JSON tree with source key order preserved, so
//! paths, parameters and schema properties come out in declaration order.
//! Structural checks here are limited to what extraction cannot work
//! without; everything below the path item level is validated per
//! operation by the extractor.

use crate::error::{OpenApiError, Result};
use crate::types::SecurityRequirement;
use indexmap::IndexMap;
use openapiv3::{ReferenceOr, SecurityScheme};
use serde_json::{Map, Number, Value};
use std::path::Path;
use tracing::{debug, warn};

/// A fully-dereferenced OpenAPI v3 document.
#[derive(Debug, Clone)]
pub struct ApiDocument {
    root: Value,
}

impl ApiDocument {
    /// Load a document from a file.
    ///
    /// `.json` files are read as JSON; anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!("Loaded {} bytes from {}", content.len(), path.display());

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let root = if is_json {
            serde_json::from_str(&content)?
        } else {
            yaml_to_json(serde_yaml::from_str(&content)?)?
        };

        Self::from_value(root)
    }

    /// Parse a document from a string.
    ///
    /// Tries JSON first, then YAML.
    pub fn from_str(content: &str) -> Result<Self> {
        let root = match serde_json::from_str::<Value>(content) {
            Ok(value) => value,
            Err(json_err) => {
                let yaml: serde_yaml::Value = serde_yaml::from_str(content).map_err(|yaml_err| {
                    OpenApiError::ParseError(format!(
                        "not JSON ({json_err}) and not YAML ({yaml_err})"
                    ))
                })?;
                yaml_to_json(yaml)?
            }
        };

        Self::from_value(root)
    }

    /// Wrap an in-memory JSON tree.
    ///
    /// Fails with [`OpenApiError::MalformedSpec`] unless the root is an
    /// object with a `paths` object.
    pub fn from_value(root: Value) -> Result<Self> {
        let object = root
            .as_object()
            .ok_or_else(|| OpenApiError::MalformedSpec("document root is not an object".into()))?;

        match object.get("paths") {
            Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(OpenApiError::MalformedSpec(
                    "'paths' is not an object".into(),
                ));
            }
            None => {
                return Err(OpenApiError::MalformedSpec(
                    "document has no 'paths' object".into(),
                ));
            }
        }

        match object.get("openapi").and_then(Value::as_str) {
            Some(version) if version.starts_with('3') => {}
            Some(version) => warn!("Unexpected OpenAPI version '{}', extracting anyway", version),
            None => warn!("Document has no 'openapi' version field, extracting anyway"),
        }

        Ok(Self { root })
    }

    /// `info.title`, if present.
    pub fn title(&self) -> Option<&str> {
        self.root.pointer("/info/title").and_then(Value::as_str)
    }

    /// `info.version`, if present.
    pub fn version(&self) -> Option<&str> {
        self.root.pointer("/info/version").and_then(Value::as_str)
    }

    /// The raw JSON tree.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Path items in declaration order.
    pub(crate) fn paths(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.root
            .get("paths")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|paths| paths.iter())
    }

    /// Document-wide security requirements.
    ///
    /// A present but malformed list is fatal: it would silently change the
    /// authentication of every operation that inherits it.
    pub fn global_security(&self) -> Result<Vec<SecurityRequirement>> {
        match self.root.get("security") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                OpenApiError::MalformedSpec(format!("invalid global 'security': {e}"))
            }),
        }
    }

    /// `components.securitySchemes`, typed.
    ///
    /// Entries that are references or do not match the scheme object model
    /// are dropped with a warning.
    pub fn security_schemes(&self) -> IndexMap<String, SecurityScheme> {
        let mut schemes = IndexMap::new();

        let Some(entries) = self
            .root
            .pointer("/components/securitySchemes")
            .and_then(Value::as_object)
        else {
            return schemes;
        };

        for (name, raw) in entries {
            match serde_json::from_value::<ReferenceOr<SecurityScheme>>(raw.clone()) {
                Ok(ReferenceOr::Item(scheme)) => {
                    schemes.insert(name.clone(), scheme);
                }
                Ok(ReferenceOr::Reference { reference }) => {
                    warn!("Security scheme '{}' is an unresolved reference to {}", name, reference);
                }
                Err(e) => {
                    warn!("Ignoring invalid security scheme '{}': {}", name, e);
                }
            }
        }

        schemes
    }
}

/// Map a YAML tree onto JSON, stringifying scalar mapping keys
/// (`200:` response codes and the like).
fn yaml_to_json(value: serde_yaml::Value) -> Result<Value> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                Number::from_f64(f).map(Value::Number).ok_or_else(|| {
                    OpenApiError::UnsupportedFormat(format!("non-finite number {n}"))
                })?
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect::<Result<_>>()?)
        }
        Yaml::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => {
                        return Err(OpenApiError::UnsupportedFormat(format!(
                            "unsupported mapping key {other:?}"
                        )));
                    }
                };
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}
