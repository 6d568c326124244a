//! Integration tests for tool extraction from a full OpenAPI document.
//!
//! Uses tests/fixtures/petstore.yaml, which exercises path-level
//! parameters, multiple body content types, nested bodies, security
//! inheritance, name collisions and an unsupported parameter location.

use serde_json::json;
use std::collections::HashSet;
use std::path::PathBuf;
use zdk_openapi::{
    ApiDocument, BodyBinding, ExecutionParameter, ExtractOptions, Extraction, Extractor,
    HttpMethod, OpenApiError, ParameterLocation, SecurityScheme, SkipReason, ToolCatalog,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn petstore() -> Extraction {
    let document = ApiDocument::from_file(fixture("petstore.yaml")).unwrap();
    Extractor::default().extract(&document).unwrap()
}

#[test]
fn test_petstore_summary() {
    let extraction = petstore();

    assert_eq!(extraction.title.as_deref(), Some("Petstore"));
    assert_eq!(extraction.version.as_deref(), Some("1.4.0"));
    assert_eq!(extraction.extracted_count(), 7);
    assert_eq!(extraction.skipped_count(), 1);

    let names: Vec<&str> = extraction.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "list_pets",
            "create_pet",
            "show_pet_by_id",
            "delete_pets_pet_id",
            "replace_pets",
            "get_item",
            "get_item_2",
        ]
    );
}

#[test]
fn test_names_are_unique() {
    let extraction = petstore();
    let unique: HashSet<&str> = extraction.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(unique.len(), extraction.tools.len());

    assert_eq!(extraction.renamed.len(), 1);
    assert_eq!(extraction.renamed[0].requested, "get_item");
    assert_eq!(extraction.renamed[0].assigned, "get_item_2");
    assert_eq!(extraction.renamed[0].path, "/legacy/item");
}

#[test]
fn test_path_parameter_operation() {
    let extraction = petstore();
    let tool = extraction.tool("show_pet_by_id").unwrap();

    assert_eq!(tool.method, HttpMethod::Get);
    assert_eq!(tool.path_template, "/pets/{petId}");
    assert_eq!(
        tool.execution_parameters,
        vec![ExecutionParameter {
            name: "petId".into(),
            location: ParameterLocation::Path,
        }]
    );
    assert_eq!(tool.input_schema.required, vec!["petId"]);
    assert_eq!(
        tool.input_schema.property("petId"),
        Some(&json!({"type": "string", "description": "The id of the pet"}))
    );
}

#[test]
fn test_operation_parameter_overrides_path_parameter() {
    let extraction = petstore();
    let tool = extraction.tool("delete_pets_pet_id").unwrap();

    assert_eq!(tool.description, "Delete a pet");
    assert_eq!(tool.operation_id, None);
    assert_eq!(tool.execution_parameters.len(), 1);
    assert_eq!(
        tool.input_schema.property("petId"),
        Some(&json!({"type": "integer", "format": "int64"}))
    );
}

#[test]
fn test_json_body_is_flattened() {
    let extraction = petstore();
    let tool = extraction.tool("create_pet").unwrap();

    assert_eq!(tool.request_body_content_type.as_deref(), Some("application/json"));
    assert_eq!(
        tool.body_binding,
        Some(BodyBinding::Flattened {
            fields: vec!["name".into(), "tag".into()],
        })
    );
    assert_eq!(tool.input_schema.required, vec!["name"]);
    assert!(tool.execution_parameters.is_empty());
    assert_eq!(tool.tags, vec!["pets", "admin"]);
}

#[test]
fn test_array_body_is_nested() {
    let extraction = petstore();
    let tool = extraction.tool("replace_pets").unwrap();

    assert_eq!(tool.input_schema.properties.len(), 1);
    assert_eq!(tool.input_schema.property("requestBody").unwrap()["type"], "array");
    assert!(tool.input_schema.required.is_empty());
    assert_eq!(
        tool.body_binding,
        Some(BodyBinding::Nested {
            property: "requestBody".into(),
        })
    );
}

#[test]
fn test_security_inheritance() {
    let extraction = petstore();

    let list = extraction.tool("list_pets").unwrap();
    assert_eq!(list.security_requirements.len(), 1);
    assert_eq!(list.security_requirements[0].scopes("ApiKeyAuth"), Some(&[][..]));

    let create = extraction.tool("create_pet").unwrap();
    assert_eq!(create.security_requirements.len(), 1);
    assert_eq!(
        create.security_requirements[0].schemes().collect::<Vec<_>>(),
        vec!["OAuth"]
    );

    assert_eq!(extraction.security_schemes.len(), 2);
    assert!(matches!(
        extraction.security_schemes["OAuth"],
        SecurityScheme::OAuth2 { .. }
    ));
}

#[test]
fn test_required_completeness() {
    let extraction = petstore();
    let list = extraction.tool("list_pets").unwrap();

    assert!(list.input_schema.required.is_empty());
    assert_eq!(
        list.input_schema.properties.keys().collect::<Vec<_>>(),
        vec!["limit", "X-Request-Id"]
    );
    assert_eq!(
        list.input_schema.property("limit").unwrap()["description"],
        "How many items to return at one time (max 100)"
    );
}

#[test]
fn test_description_is_verbatim() {
    let extraction = petstore();
    let create = extraction.tool("create_pet").unwrap();
    assert_eq!(
        create.description,
        "Create a pet. Templates like `${name}` are stored as-is,\nand a trailing backslash \\ is kept.\n"
    );
}

#[test]
fn test_unsupported_location_is_skipped() {
    let extraction = petstore();
    let skipped = &extraction.skipped[0];

    assert_eq!(skipped.path, "/upload");
    assert_eq!(skipped.method, Some(HttpMethod::Post));
    assert_eq!(
        skipped.reason,
        SkipReason::UnrecognizedLocation {
            name: "file".into(),
            location: "formData".into(),
        }
    );
    assert_eq!(
        skipped.to_string(),
        "POST /upload: parameter 'file' has unrecognized location 'formData'"
    );
}

#[test]
fn test_strict_mode_fails_whole_run() {
    let document = ApiDocument::from_file(fixture("petstore.yaml")).unwrap();
    let result = Extractor::new(ExtractOptions {
        strict_locations: true,
        ..Default::default()
    })
    .extract(&document);

    assert!(matches!(result, Err(OpenApiError::MalformedSpec(_))));
}

#[test]
fn test_skip_deprecated() {
    let document = ApiDocument::from_file(fixture("petstore.yaml")).unwrap();
    let extraction = Extractor::new(ExtractOptions {
        include_deprecated: false,
        ..Default::default()
    })
    .extract(&document)
    .unwrap();

    assert!(extraction.tool("get_item_2").is_none());
    assert!(extraction.renamed.is_empty());
    assert_eq!(extraction.skipped_count(), 2);
}

#[test]
fn test_extraction_is_deterministic() {
    let first = petstore();
    let second = petstore();
    assert_eq!(first.tools, second.tools);
}

#[test]
fn test_catalog_over_fixture() {
    let catalog = ToolCatalog::from_file(fixture("petstore.yaml")).unwrap();
    assert_eq!(catalog.len(), 7);
    assert_eq!(catalog.get("get_item_2").unwrap().path_template, "/legacy/item");
}

#[test]
fn test_missing_paths_is_fatal() {
    let result = ToolCatalog::from_str("openapi: 3.0.0\ninfo:\n  title: Empty\n  version: '1'\n");
    assert!(matches!(result, Err(OpenApiError::MalformedSpec(_))));
}
