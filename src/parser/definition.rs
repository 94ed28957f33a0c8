// ABOUTME: Definition data structures and the definition loader
// ABOUTME: Decodes a definition, applies field defaults, validates it and builds typed specs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::path::Path;
use tracing::debug;

use super::document::{self, DocumentFormat};
use super::error::{DocumentKind, ParserError, Result};
use super::schema::{self, Schema};
use crate::vars::VarMap;

/// Root document: global variables plus the ordered list of templates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Definition {
    #[serde(default)]
    pub vars: VariableBlock,
    pub templates: Vec<TemplateSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VariableBlock {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub global: VarMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateSpec {
    pub src: String,
    /// Empty means "no file target": output goes to stdout
    pub dest: String,
    #[serde(default)]
    pub local_vars: VarMap,
    #[serde(default)]
    pub include_vars: Vec<String>,
}

impl Definition {
    /// Load and validate the definition file at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let document = document::decode_file(path)?;
        Self::from_document(document, path)
    }

    /// Parse definition text in the given format; `origin` labels errors
    pub fn parse_str(content: &str, format: DocumentFormat, origin: &Path) -> Result<Self> {
        let document = document::decode_str(content, format, origin)?;
        Self::from_document(document, origin)
    }

    fn from_document(mut document: JsonValue, origin: &Path) -> Result<Self> {
        apply_defaults(&mut document);

        debug!(
            "Validating parsed definition file {}: {}",
            origin.display(),
            document
        );

        let violations = schema::validate(&document, Schema::Definition);
        if !violations.is_empty() {
            return Err(ParserError::Schema {
                kind: DocumentKind::Definition,
                path: origin.to_path_buf(),
                violations,
            });
        }

        serde_json::from_value(document).map_err(|source| ParserError::Shape {
            kind: DocumentKind::Definition,
            path: origin.to_path_buf(),
            source,
        })
    }
}

impl TemplateSpec {
    pub fn new(src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
            local_vars: VarMap::new(),
            include_vars: Vec::new(),
        }
    }

    pub fn writes_to_stdout(&self) -> bool {
        self.dest.is_empty()
    }
}

/// Fill in optional fields so validation sees the defaulted document
fn apply_defaults(document: &mut JsonValue) {
    let Some(root) = document.as_object_mut() else {
        return;
    };

    let vars = root
        .entry("vars")
        .or_insert_with(|| JsonValue::Object(Map::new()));
    if let Some(vars) = vars.as_object_mut() {
        vars.entry("include")
            .or_insert_with(|| JsonValue::Array(Vec::new()));
        vars.entry("global")
            .or_insert_with(|| JsonValue::Object(Map::new()));
    }

    if let Some(templates) = root.get_mut("templates").and_then(JsonValue::as_array_mut) {
        for template in templates.iter_mut().filter_map(JsonValue::as_object_mut) {
            template
                .entry("local_vars")
                .or_insert_with(|| JsonValue::Object(Map::new()));
            template
                .entry("include_vars")
                .or_insert_with(|| JsonValue::Array(Vec::new()));
        }
    }
}
