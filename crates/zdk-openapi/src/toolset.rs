//! Name-keyed tool catalog.

use crate::document::ApiDocument;
use crate::error::Result;
use crate::extractor::{ExtractOptions, Extractor};
use crate::types::{Extraction, ToolDescriptor};
use indexmap::IndexMap;
use std::path::Path;
use tracing::{debug, info};

/// The descriptors of one OpenAPI document, keyed by tool name.
///
/// Iteration follows document traversal order.
///
/// # Example
///
/// ```no_run
/// use zdk_openapi::ToolCatalog;
///
/// let catalog = ToolCatalog::from_file("./api/openapi.yaml")?;
/// println!("Generated {} tools", catalog.len());
/// # Ok::<(), zdk_openapi::OpenApiError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: IndexMap<String, ToolDescriptor>,
}

impl ToolCatalog {
    /// Load a spec file and extract its tools with default options.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading OpenAPI spec from file: {}", path.display());
        let document = ApiDocument::from_file(path)?;
        Self::from_document(&document, ExtractOptions::default())
    }

    /// Parse a spec string and extract its tools with default options.
    ///
    /// Automatically detects JSON or YAML format.
    ///
    /// # Example
    ///
    /// ```
    /// use zdk_openapi::ToolCatalog;
    ///
    /// let spec = r#"
    /// openapi: 3.0.0
    /// info:
    ///   title: Example API
    ///   version: 1.0.0
    /// paths:
    ///   /users:
    ///     get:
    ///       operationId: listUsers
    ///       summary: List all users
    /// "#;
    ///
    /// let catalog = ToolCatalog::from_str(spec)?;
    /// assert!(catalog.get("list_users").is_some());
    /// # Ok::<(), zdk_openapi::OpenApiError>(())
    /// ```
    pub fn from_str(content: &str) -> Result<Self> {
        debug!("Parsing OpenAPI spec from string");
        let document = ApiDocument::from_str(content)?;
        Self::from_document(&document, ExtractOptions::default())
    }

    /// Extract from an already-loaded document.
    pub fn from_document(document: &ApiDocument, options: ExtractOptions) -> Result<Self> {
        let extraction = Extractor::new(options).extract(document)?;
        Ok(Self::from(extraction))
    }

    /// Get a specific tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// Get the names of all tools in the catalog.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.values()
    }

    /// Get the number of tools in the catalog.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl From<Extraction> for ToolCatalog {
    fn from(extraction: Extraction) -> Self {
        // names are unique per extraction, so no entry is overwritten
        let tools = extraction
            .tools
            .into_iter()
            .map(|tool| (tool.name.clone(), tool))
            .collect();
        Self { tools }
    }
}

impl<'a> IntoIterator for &'a ToolCatalog {
    type Item = &'a ToolDescriptor;
    type IntoIter = indexmap::map::Values<'a, String, ToolDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SPEC: &str = r#"
openapi: 3.0.0
info:
  title: Test API
  version: 1.0.0
servers:
  - url: https://api.example.com
paths:
  /users:
    get:
      operationId: listUsers
      summary: List all users
      responses:
        '200':
          description: Success
  /users/{id}:
    get:
      operationId: getUser
      summary: Get user by ID
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      responses:
        '200':
          description: Success
"#;

    #[test]
    fn test_catalog_from_str() {
        let catalog = ToolCatalog::from_str(TEST_SPEC).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_empty());
        assert_eq!(catalog.names(), vec!["list_users", "get_user"]);
    }

    #[test]
    fn test_get_tool_by_name() {
        let catalog = ToolCatalog::from_str(TEST_SPEC).unwrap();

        let tool = catalog.get("get_user").unwrap();
        assert_eq!(tool.path_template, "/users/{id}");
        assert_eq!(tool.description, "Get user by ID");

        assert!(catalog.get("nonexistent").is_none());
    }

    #[test]
    fn test_iteration_follows_document_order() {
        let catalog = ToolCatalog::from_str(TEST_SPEC).unwrap();
        let paths: Vec<&str> = catalog.iter().map(|t| t.path_template.as_str()).collect();
        assert_eq!(paths, vec!["/users", "/users/{id}"]);
        assert_eq!((&catalog).into_iter().count(), 2);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = ToolCatalog::from(Extraction::default());
        assert!(catalog.is_empty());
        assert!(catalog.names().is_empty());
    }
}
