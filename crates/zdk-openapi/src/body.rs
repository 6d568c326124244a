//! Request body handling: content type choice and the flatten-or-nest rule.
//!
//! A body is flattened into the top-level input properties only when its
//! schema is a plain object with at least one declared property. Arrays,
//! primitives, `oneOf`/`anyOf` unions, free-form maps and missing schemas
//! are nested whole under a single `requestBody` property.

use crate::error::SkipReason;
use crate::params::find_reference;
use indexmap::IndexMap;
use serde_json::Value;

/// Input property used for a nested body.
pub const NESTED_BODY_PROPERTY: &str = "requestBody";

/// A request body reduced to the chosen media type.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RequestBodySpec {
    pub content_type: String,
    pub schema: Option<Value>,
    pub required: bool,
    pub description: Option<String>,
}

/// Properties and required names of an object-shaped schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ObjectShape {
    pub properties: IndexMap<String, Value>,
    pub required: Vec<String>,
}

/// Pick the content type for a body offering several.
///
/// Fixed preference: exactly `application/json`, then the first other JSON
/// media type (`*/json`, `*+json`), then the first declared type.
/// Parameters such as `; charset=utf-8` are ignored for ranking.
pub fn select_content_type<'a, I>(content_types: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    content_types.into_iter().min_by_key(|ct| json_rank(ct))
}

fn json_rank(content_type: &str) -> u8 {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence == "application/json" {
        0
    } else if essence.ends_with("/json") || essence.ends_with("+json") {
        1
    } else {
        2
    }
}

/// Parse an operation's `requestBody`.
///
/// A body without any content entries counts as no body.
pub(crate) fn parse_request_body(raw: &Value) -> Result<Option<RequestBodySpec>, SkipReason> {
    let object = raw
        .as_object()
        .ok_or_else(|| SkipReason::InvalidOperation("'requestBody' is not an object".into()))?;

    if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
        return Err(SkipReason::UnresolvedReference(reference.to_string()));
    }

    let content = match object.get("content") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(content)) => content,
        Some(_) => {
            return Err(SkipReason::InvalidOperation(
                "'requestBody.content' is not an object".into(),
            ));
        }
    };

    let Some(content_type) = select_content_type(content.keys().map(String::as_str)) else {
        return Ok(None);
    };

    let schema = match content[content_type].get("schema") {
        None | Some(Value::Null) => None,
        Some(schema @ Value::Object(_)) => {
            if let Some(reference) = find_reference(schema) {
                return Err(SkipReason::UnresolvedReference(reference));
            }
            Some(schema.clone())
        }
        Some(_) => return Err(SkipReason::InvalidSchema(NESTED_BODY_PROPERTY.into())),
    };

    let required = match object.get("required") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(required)) => *required,
        Some(_) => {
            return Err(SkipReason::InvalidOperation(
                "'requestBody.required' is not a boolean".into(),
            ));
        }
    };

    Ok(Some(RequestBodySpec {
        content_type: content_type.to_string(),
        schema,
        required,
        description: object
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
    }))
}

/// The flattenable shape of `schema`, if it has one.
///
/// `allOf` members are merged in order when every member is itself
/// object-shaped; later members replace same-named properties.
pub(crate) fn object_shape(schema: &Value) -> Option<ObjectShape> {
    let shape = collect_shape(schema)?;
    (!shape.properties.is_empty()).then_some(shape)
}

fn collect_shape(schema: &Value) -> Option<ObjectShape> {
    let object = schema.as_object()?;

    if object.contains_key("oneOf") || object.contains_key("anyOf") {
        return None;
    }

    match object.get("type") {
        None => {}
        Some(Value::String(kind)) if kind == "object" => {}
        Some(_) => return None,
    }

    let all_of = match object.get("allOf") {
        None => None,
        Some(Value::Array(members)) => Some(members),
        Some(_) => return None,
    };

    if object.get("type").is_none() && all_of.is_none() && !object.contains_key("properties") {
        return None;
    }

    let mut shape = ObjectShape::default();

    for member in all_of.into_iter().flatten() {
        let member = collect_shape(member)?;
        shape.properties.extend(member.properties);
        for name in member.required {
            push_unique(&mut shape.required, name);
        }
    }

    if let Some(properties) = object.get("properties") {
        let properties = properties.as_object()?;
        for (name, property) in properties {
            shape.properties.insert(name.clone(), property.clone());
        }
    }

    if let Some(required) = object.get("required") {
        for name in required.as_array()? {
            push_unique(&mut shape.required, name.as_str()?.to_string());
        }
    }

    Some(shape)
}

fn push_unique(names: &mut Vec<String>, name: String) {
    if !names.contains(&name) {
        names.push(name);
    }
}
