//! Operation → tool descriptor extraction.
//!
//! Walks the paths of an [`ApiDocument`] in declaration order and, within
//! each path item, the methods in [`HttpMethod::ALL`] order. Every
//! operation becomes one [`ToolDescriptor`] or one [`SkippedOperation`];
//! only document-level problems abort the run.

use crate::body::{NESTED_BODY_PROPERTY, RequestBodySpec, object_shape, parse_request_body};
use crate::document::ApiDocument;
use crate::error::{OpenApiError, Result, SkipReason};
use crate::naming::{NameRegistry, base_name};
use crate::params::{ParameterSpec, merge_parameters, parse_parameters};
use crate::types::{
    BodyBinding, ExecutionParameter, Extraction, HttpMethod, InputSchema, RenamedTool,
    SecurityRequirement, SkippedOperation, ToolDescriptor,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info_span, warn};

/// Path item keys that are not operations.
const PATH_ITEM_METADATA: [&str; 5] = ["parameters", "summary", "description", "servers", "$ref"];

fn default_max_name_length() -> Option<usize> {
    Some(64)
}

/// `0` reads as "no limit", matching the command-line flag.
fn deserialize_name_cap<'de, D>(deserializer: D) -> std::result::Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let cap = Option::<usize>::deserialize(deserializer)?;
    Ok(cap.filter(|&len| len > 0))
}

fn default_true() -> bool {
    true
}

/// Knobs for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Treat an unrecognized parameter location as a fatal
    /// [`OpenApiError::MalformedSpec`] instead of skipping the operation.
    pub strict_locations: bool,

    /// Upper bound on tool name length, disambiguation suffix included.
    /// `None` or `0` disables the limit; caps below [`MIN_NAME_LENGTH`]
    /// are raised to it.
    ///
    /// [`MIN_NAME_LENGTH`]: crate::MIN_NAME_LENGTH
    #[serde(
        default = "default_max_name_length",
        deserialize_with = "deserialize_name_cap"
    )]
    pub max_name_length: Option<usize>,

    /// Keep operations flagged `deprecated: true`.
    #[serde(default = "default_true")]
    pub include_deprecated: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            strict_locations: false,
            max_name_length: default_max_name_length(),
            include_deprecated: true,
        }
    }
}

/// Extract tools from `document` with default options.
pub fn extract(document: &ApiDocument) -> Result<Extraction> {
    Extractor::default().extract(document)
}

/// Turns a dereferenced document into tool descriptors.
///
/// Holds no state between runs; one extractor can be reused and shared.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    options: ExtractOptions,
}

impl Extractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Run extraction over the whole document.
    ///
    /// # Example
    ///
    /// ```
    /// use zdk_openapi::{ApiDocument, Extractor};
    ///
    /// let doc = ApiDocument::from_str(r#"
    /// openapi: 3.0.0
    /// info: {title: Example, version: "1"}
    /// paths:
    ///   /users/{id}:
    ///     get:
    ///       parameters:
    ///         - {name: id, in: path, required: true, schema: {type: string}}
    /// "#)?;
    ///
    /// let extraction = Extractor::default().extract(&doc)?;
    /// assert_eq!(extraction.tools[0].name, "get_users_id");
    /// # Ok::<(), zdk_openapi::OpenApiError>(())
    /// ```
    pub fn extract(&self, document: &ApiDocument) -> Result<Extraction> {
        let span = info_span!("extract_tools", title = document.title().unwrap_or_default());
        let _guard = span.enter();

        let global_security = document.global_security()?;
        let mut names = NameRegistry::new(self.options.max_name_length);

        let mut extraction = Extraction {
            title: document.title().map(str::to_string),
            version: document.version().map(str::to_string),
            security_schemes: document.security_schemes(),
            ..Default::default()
        };

        for (path, item) in document.paths() {
            let Some(item) = item.as_object() else {
                self.skip(&mut extraction, path, None, SkipReason::InvalidOperation(
                    "path item is not an object".into(),
                ))?;
                continue;
            };

            if let Some(reference) = item.get("$ref").and_then(Value::as_str) {
                self.skip(
                    &mut extraction,
                    path,
                    None,
                    SkipReason::UnresolvedReference(reference.to_string()),
                )?;
                continue;
            }

            for key in item.keys() {
                let known = PATH_ITEM_METADATA.contains(&key.as_str())
                    || key.starts_with("x-")
                    || HttpMethod::ALL.iter().any(|m| m.as_str() == key.as_str());
                if !known {
                    debug!("Ignoring '{}' under {}", key, path);
                }
            }

            let inherited = match parse_parameters(item.get("parameters")) {
                Ok(params) => params,
                Err(reason) => {
                    for method in HttpMethod::ALL {
                        if item.contains_key(method.as_str()) {
                            self.skip(&mut extraction, path, Some(method), reason.clone())?;
                        }
                    }
                    continue;
                }
            };

            for method in HttpMethod::ALL {
                let Some(operation) = item.get(method.as_str()) else {
                    continue;
                };

                match self.build_descriptor(path, method, operation, &inherited, &global_security)
                {
                    Ok(mut descriptor) => {
                        let assigned = names.assign(&descriptor.name);
                        if assigned != descriptor.name {
                            warn!(
                                "Tool name '{}' already taken, using '{}' for {} {}",
                                descriptor.name,
                                assigned,
                                method.as_str().to_uppercase(),
                                path
                            );
                            extraction.renamed.push(RenamedTool {
                                requested: std::mem::take(&mut descriptor.name),
                                assigned: assigned.clone(),
                                path: path.clone(),
                                method,
                            });
                        }
                        descriptor.name = assigned;
                        debug!("Extracted tool '{}' from {} {}", descriptor.name, method, path);
                        extraction.tools.push(descriptor);
                    }
                    Err(reason) => self.skip(&mut extraction, path, Some(method), reason)?,
                }
            }
        }

        debug!(
            extracted = extraction.extracted_count(),
            skipped = extraction.skipped_count(),
            renamed = extraction.renamed.len(),
            "Extraction finished"
        );

        Ok(extraction)
    }

    /// Record a skipped operation, or fail the run when the options make
    /// this kind of problem fatal.
    fn skip(
        &self,
        extraction: &mut Extraction,
        path: &str,
        method: Option<HttpMethod>,
        reason: SkipReason,
    ) -> Result<()> {
        let skipped = SkippedOperation {
            path: path.to_string(),
            method,
            reason,
        };

        if self.options.strict_locations
            && matches!(skipped.reason, SkipReason::UnrecognizedLocation { .. })
        {
            return Err(OpenApiError::MalformedSpec(skipped.to_string()));
        }

        warn!("Skipping {}", skipped);
        extraction.skipped.push(skipped);
        Ok(())
    }

    /// Normalize one operation. The returned descriptor carries its base
    /// name; uniqueness is settled by the caller.
    fn build_descriptor(
        &self,
        path: &str,
        method: HttpMethod,
        operation: &Value,
        inherited: &[ParameterSpec],
        global_security: &[SecurityRequirement],
    ) -> std::result::Result<ToolDescriptor, SkipReason> {
        let operation = operation
            .as_object()
            .ok_or_else(|| SkipReason::InvalidOperation("operation is not an object".into()))?;

        if !self.options.include_deprecated
            && operation.get("deprecated").and_then(Value::as_bool) == Some(true)
        {
            return Err(SkipReason::Deprecated);
        }

        let operation_id = optional_str(operation, "operationId")?;
        let name = base_name(operation_id, method, path);

        let parameters = merge_parameters(inherited, parse_parameters(operation.get("parameters"))?);

        let mut input_schema = InputSchema::default();
        let mut execution_parameters = Vec::with_capacity(parameters.len());

        for param in parameters {
            if input_schema.properties.contains_key(&param.name) {
                warn!(
                    "{} {}: '{}' is declared in several locations; the {} one only adds an execution binding",
                    method.as_str().to_uppercase(),
                    path,
                    param.name,
                    param.location
                );
            } else {
                input_schema
                    .properties
                    .insert(param.name.clone(), param.schema);
            }
            // any required binding makes the shared input required
            if param.required {
                input_schema.mark_required(&param.name);
            }
            execution_parameters.push(ExecutionParameter {
                name: param.name,
                location: param.location,
            });
        }

        let body = match operation.get("requestBody") {
            None | Some(Value::Null) => None,
            Some(raw) => parse_request_body(raw)?,
        };

        let (request_body_content_type, body_binding) = match body {
            Some(body) => {
                let binding = bind_body(&mut input_schema, &body)?;
                (Some(body.content_type), Some(binding))
            }
            None => (None, None),
        };

        let security_requirements = match operation.get("security") {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => serde_json::from_value::<Vec<SecurityRequirement>>(raw.clone())
                .map_err(|e| SkipReason::InvalidSecurity(e.to_string()))?,
        };
        let security_requirements = if security_requirements.is_empty() {
            global_security.to_vec()
        } else {
            security_requirements
        };

        let description = optional_str(operation, "description")?
            .filter(|d| !d.trim().is_empty())
            .or(optional_str(operation, "summary")?)
            .unwrap_or_default()
            .to_string();

        Ok(ToolDescriptor {
            name,
            operation_id: operation_id.map(str::to_string),
            tags: parse_tags(operation)?,
            description,
            input_schema,
            method,
            path_template: path.to_string(),
            execution_parameters,
            request_body_content_type,
            body_binding,
            security_requirements,
        })
    }
}

/// Put the body into the input schema, flattened when it is object-shaped
/// and none of its properties collide with a parameter, nested otherwise.
fn bind_body(
    input_schema: &mut InputSchema,
    body: &RequestBodySpec,
) -> std::result::Result<BodyBinding, SkipReason> {
    let shape = body.schema.as_ref().and_then(object_shape);

    if let Some(shape) = shape {
        let collisions: Vec<&String> = shape
            .properties
            .keys()
            .filter(|name| input_schema.properties.contains_key(name.as_str()))
            .collect();

        if collisions.is_empty() {
            let fields: Vec<String> = shape.properties.keys().cloned().collect();
            input_schema.properties.extend(shape.properties);
            for name in &shape.required {
                input_schema.mark_required(name);
            }
            return Ok(BodyBinding::Flattened { fields });
        }

        debug!(
            "Body properties {:?} collide with parameters, nesting the body",
            collisions
        );
    }

    if input_schema.properties.contains_key(NESTED_BODY_PROPERTY) {
        return Err(SkipReason::PropertyConflict(NESTED_BODY_PROPERTY.into()));
    }

    let mut schema = body
        .schema
        .clone()
        .unwrap_or_else(|| Value::Object(Map::new()));
    if let (Some(object), Some(description)) = (schema.as_object_mut(), &body.description) {
        object
            .entry("description")
            .or_insert_with(|| Value::String(description.clone()));
    }

    input_schema
        .properties
        .insert(NESTED_BODY_PROPERTY.to_string(), schema);
    if body.required {
        input_schema.mark_required(NESTED_BODY_PROPERTY);
    }

    Ok(BodyBinding::Nested {
        property: NESTED_BODY_PROPERTY.to_string(),
    })
}

fn optional_str<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> std::result::Result<Option<&'a str>, SkipReason> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(SkipReason::InvalidOperation(format!("'{key}' is not a string"))),
    }
}

/// Tags in declaration order, duplicates dropped.
fn parse_tags(operation: &Map<String, Value>) -> std::result::Result<Vec<String>, SkipReason> {
    let Some(raw) = operation.get("tags") else {
        return Ok(Vec::new());
    };

    let items = raw
        .as_array()
        .ok_or_else(|| SkipReason::InvalidOperation("'tags' is not a list".into()))?;

    let mut tags: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let tag = item
            .as_str()
            .ok_or_else(|| SkipReason::InvalidOperation("'tags' must contain strings".into()))?;
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    Ok(tags)
}
