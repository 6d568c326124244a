//! Serializers for extraction results.
//!
//! Two targets: a JSON document and a TypeScript module holding a
//! `Map` literal. Descriptions go into TypeScript template literals, so
//! they pass through [`escape_template_literal`]; every other string is
//! written as a JSON string literal, which TypeScript accepts verbatim.

use crate::error::Result;
use crate::types::{Extraction, ToolDescriptor};
use serde_json::{Map, Value, json};
use std::fmt::Write as _;

/// Escape text for use between backticks in a JS/TS template literal.
///
/// Only backslashes, backticks, `${` and carriage returns are touched, so
/// the evaluated literal is exactly the input text. A raw CR would be
/// normalized to LF inside the literal, hence `\r`.
pub fn escape_template_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '\r' => out.push_str("\\r"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            _ => out.push(c),
        }
    }

    out
}

/// Render `{ "tools": { name: descriptor }, "securitySchemes": {...} }`.
pub fn render_json(extraction: &Extraction) -> Result<String> {
    let mut tools = Map::new();
    for tool in &extraction.tools {
        tools.insert(tool.name.clone(), serde_json::to_value(tool)?);
    }

    let document = json!({
        "tools": tools,
        "securitySchemes": serde_json::to_value(&extraction.security_schemes)?,
    });

    Ok(serde_json::to_string_pretty(&document)?)
}

/// Render a TypeScript module exporting `toolDefinitionMap` and
/// `securitySchemes`.
pub fn render_typescript(extraction: &Extraction) -> Result<String> {
    let mut out = String::new();

    let title = extraction.title.as_deref().unwrap_or("OpenAPI document");
    let _ = writeln!(out, "// Tool definitions generated from {}", line_comment(title));
    if let Some(version) = &extraction.version {
        let _ = writeln!(out, "// API version {}", line_comment(version));
    }
    out.push('\n');

    out.push_str("export const toolDefinitionMap = new Map([\n");
    for tool in &extraction.tools {
        render_tool(&mut out, tool)?;
    }
    out.push_str("]);\n\n");

    let _ = writeln!(
        out,
        "export const securitySchemes = {};",
        serde_json::to_string_pretty(&extraction.security_schemes)?
    );

    Ok(out)
}

fn render_tool(out: &mut String, tool: &ToolDescriptor) -> Result<()> {
    let name = serde_json::to_string(&tool.name)?;
    let content_type = match &tool.request_body_content_type {
        Some(content_type) => serde_json::to_string(content_type)?,
        None => "undefined".to_string(),
    };
    let body_binding = match &tool.body_binding {
        Some(binding) => serde_json::to_string(binding)?,
        None => "undefined".to_string(),
    };

    let _ = writeln!(out, "  [{name}, {{");
    let _ = writeln!(out, "    name: {name},");
    let _ = writeln!(out, "    tags: {},", serde_json::to_string(&tool.tags)?);
    let _ = writeln!(
        out,
        "    description: `{}`,",
        escape_template_literal(&tool.description)
    );
    let _ = writeln!(
        out,
        "    inputSchema: {},",
        indent(&serde_json::to_string_pretty(&tool.input_schema)?, "    ")
    );
    let _ = writeln!(out, "    method: {},", Value::from(tool.method.as_str()));
    let _ = writeln!(
        out,
        "    pathTemplate: {},",
        serde_json::to_string(&tool.path_template)?
    );
    let _ = writeln!(
        out,
        "    executionParameters: {},",
        serde_json::to_string(&tool.execution_parameters)?
    );
    let _ = writeln!(out, "    requestBodyContentType: {content_type},");
    let _ = writeln!(out, "    bodyBinding: {body_binding},");
    let _ = writeln!(
        out,
        "    securityRequirements: {}",
        serde_json::to_string(&tool.security_requirements)?
    );
    out.push_str("  }],\n");
    Ok(())
}

/// Indent every line after the first.
fn indent(text: &str, prefix: &str) -> String {
    text.replace('\n', &format!("\n{prefix}"))
}

fn line_comment(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ApiDocument;
    use crate::extractor::extract;

    /// Evaluate a template literal body the way a JS engine would for the
    /// escapes `escape_template_literal` produces.
    fn unescape(literal: &str) -> String {
        let mut out = String::new();
        let mut chars = literal.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('r') => out.push('\r'),
                    Some(next) => out.push(next),
                    None => {}
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_escape_template_literal() {
        assert_eq!(escape_template_literal("plain text"), "plain text");
        assert_eq!(escape_template_literal("a`b"), "a\\`b");
        assert_eq!(escape_template_literal("${x}"), "\\${x}");
        assert_eq!(escape_template_literal("cost: $5 {each}"), "cost: $5 {each}");
        assert_eq!(escape_template_literal("C:\\path"), "C:\\\\path");
        assert_eq!(escape_template_literal("a\r\nb"), "a\\r\nb");
    }

    #[test]
    fn test_escaped_text_round_trips() {
        let samples = [
            "Use `curl` to call ${BASE_URL}/users",
            "trailing backslash \\",
            "\\` already looks escaped",
            "$${{nested}}",
            "multi\nline\ttext with ünïcode",
            "a\r\nb",
            "\r",
            "windows\\path\r\n",
        ];
        for sample in samples {
            let escaped = escape_template_literal(sample);
            assert_eq!(unescape(&escaped), sample);
            // no unescaped backtick or interpolation start survives
            let neutral = escaped.replace("\\\\", "_").replace("\\`", "_").replace("\\$", "_");
            assert!(!neutral.contains('`'));
            assert!(!neutral.contains("${"));
            assert!(!escaped.contains('\r'));
        }
    }

    const SPEC: &str = r#"
openapi: 3.0.0
info:
  title: Render API
  version: "7"
components:
  securitySchemes:
    ApiKeyAuth:
      type: apiKey
      in: header
      name: X-API-Key
security:
  - ApiKeyAuth: []
paths:
  /notes/{id}:
    put:
      operationId: updateNote
      description: "Replaces a note. Use `${id}` literally."
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      requestBody:
        required: true
        content:
          application/json:
            schema:
              type: object
              properties:
                body:
                  type: string
              required: [body]
"#;

    #[test]
    fn test_render_json() {
        let extraction = extract(&ApiDocument::from_str(SPEC).unwrap()).unwrap();
        let rendered: Value = serde_json::from_str(&render_json(&extraction).unwrap()).unwrap();

        let tool = &rendered["tools"]["update_note"];
        assert_eq!(tool["method"], "put");
        assert_eq!(tool["pathTemplate"], "/notes/{id}");
        assert_eq!(tool["requestBodyContentType"], "application/json");
        assert_eq!(tool["executionParameters"], json!([{"name": "id", "in": "path"}]));
        assert_eq!(tool["inputSchema"]["required"], json!(["id", "body"]));
        assert_eq!(tool["securityRequirements"], json!([{"ApiKeyAuth": []}]));
        assert_eq!(tool["description"], "Replaces a note. Use `${id}` literally.");
        assert_eq!(rendered["securitySchemes"]["ApiKeyAuth"]["type"], "apiKey");
    }

    #[test]
    fn test_render_typescript() {
        let extraction = extract(&ApiDocument::from_str(SPEC).unwrap()).unwrap();
        let rendered = render_typescript(&extraction).unwrap();

        assert!(rendered.starts_with("// Tool definitions generated from Render API\n// API version 7\n"));
        assert!(rendered.contains("export const toolDefinitionMap = new Map([\n  [\"update_note\", {"));
        assert!(rendered.contains("description: `Replaces a note. Use \\`\\${id}\\` literally.`,"));
        assert!(rendered.contains("method: \"put\","));
        assert!(rendered.contains("requestBodyContentType: \"application/json\","));
        assert!(rendered.contains(r#"bodyBinding: {"mode":"flattened","fields":["body"]},"#));
        assert!(rendered.contains(r#"executionParameters: [{"name":"id","in":"path"}],"#));
        assert!(rendered.contains("export const securitySchemes = {"));
        assert!(rendered.trim_end().ends_with("};"));
    }

    #[test]
    fn test_render_typescript_without_body() {
        let doc = ApiDocument::from_str(r#"{"openapi": "3.0.0", "paths": {"/ping": {"get": {}}}}"#)
            .unwrap();
        let rendered = render_typescript(&extract(&doc).unwrap()).unwrap();

        assert!(rendered.starts_with("// Tool definitions generated from OpenAPI document\n\n"));
        assert!(rendered.contains("requestBodyContentType: undefined,"));
        assert!(rendered.contains("bodyBinding: undefined,"));
        assert!(rendered.contains("export const securitySchemes = {};"));
    }
}
