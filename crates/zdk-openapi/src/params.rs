//! Parameter parsing and path-level inheritance.

use crate::error::SkipReason;
use crate::types::ParameterLocation;
use serde_json::{Value, json};

/// A parameter declaration normalized for extraction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParameterSpec {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    /// Property schema, with the parameter description folded in
    pub schema: Value,
}

impl ParameterSpec {
    fn same_identity(&self, other: &ParameterSpec) -> bool {
        self.name == other.name && self.location == other.location
    }
}

/// Parse a `parameters` list (path item or operation level).
pub(crate) fn parse_parameters(raw: Option<&Value>) -> Result<Vec<ParameterSpec>, SkipReason> {
    let entries = match raw {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(SkipReason::InvalidParameter(
                "'parameters' is not a list".into(),
            ));
        }
    };

    entries.iter().map(parse_parameter).collect()
}

fn parse_parameter(raw: &Value) -> Result<ParameterSpec, SkipReason> {
    let object = raw
        .as_object()
        .ok_or_else(|| SkipReason::InvalidParameter("parameter entry is not an object".into()))?;

    if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
        return Err(SkipReason::UnresolvedReference(reference.to_string()));
    }

    let name = object
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| SkipReason::InvalidParameter("parameter has no name".into()))?;

    let location_str = object.get("in").and_then(Value::as_str).ok_or_else(|| {
        SkipReason::InvalidParameter(format!("parameter '{name}' has no location"))
    })?;

    let location =
        ParameterLocation::parse(location_str).ok_or_else(|| SkipReason::UnrecognizedLocation {
            name: name.to_string(),
            location: location_str.to_string(),
        })?;

    let required = match object.get("required") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(required)) => *required,
        Some(_) => {
            return Err(SkipReason::InvalidParameter(format!(
                "parameter '{name}' has a non-boolean 'required'"
            )));
        }
    };

    let mut schema = match (object.get("schema"), object.get("content")) {
        (Some(schema), _) => schema.clone(),
        (None, Some(Value::Object(content))) => content
            .values()
            .next()
            .and_then(|media| media.get("schema"))
            .cloned()
            .unwrap_or_else(|| json!({"type": "string"})),
        (None, _) => json!({"type": "string"}),
    };

    if !schema.is_object() {
        return Err(SkipReason::InvalidSchema(name.to_string()));
    }

    if let Some(reference) = find_reference(&schema) {
        return Err(SkipReason::UnresolvedReference(reference));
    }

    if let (Some(schema_object), Some(description)) = (
        schema.as_object_mut(),
        object.get("description").and_then(Value::as_str),
    ) {
        if !schema_object.contains_key("description") {
            schema_object.insert("description".into(), Value::String(description.to_string()));
        }
    }

    Ok(ParameterSpec {
        name: name.to_string(),
        location,
        required,
        schema,
    })
}

/// Combine path-level and operation-level parameters.
///
/// `(name, location)` is the identity: an operation parameter replaces the
/// inherited one in place, anything new is appended. The result is then
/// stably ordered by location.
pub(crate) fn merge_parameters(
    inherited: &[ParameterSpec],
    own: Vec<ParameterSpec>,
) -> Vec<ParameterSpec> {
    let mut merged: Vec<ParameterSpec> = inherited.to_vec();

    for param in own {
        match merged.iter_mut().find(|p| p.same_identity(&param)) {
            Some(existing) => *existing = param,
            None => merged.push(param),
        }
    }

    merged.sort_by_key(|p| p.location);
    merged
}

/// First `$ref` string found anywhere in `value`.
pub(crate) fn find_reference(value: &Value) -> Option<String> {
    match value {
        Value::Object(object) => {
            if let Some(Value::String(reference)) = object.get("$ref") {
                return Some(reference.clone());
            }
            object.values().find_map(find_reference)
        }
        Value::Array(items) => items.iter().find_map(find_reference),
        _ => None,
    }
}
