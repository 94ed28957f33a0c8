// ABOUTME: Include-vars documents: external files contributing a single vars mapping
// ABOUTME: Decoded and validated against the include-vars schema before use

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::document;
use super::error::{DocumentKind, ParserError, Result};
use super::schema::{self, Schema};
use crate::vars::VarMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IncludeVarsFile {
    pub vars: VarMap,
}

impl IncludeVarsFile {
    /// Load and validate the include-vars file at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let document = document::decode_file(path)?;

        debug!("Loaded vars file {}: {}", path.display(), document);

        let violations = schema::validate(&document, Schema::IncludeVars);
        if !violations.is_empty() {
            return Err(ParserError::Schema {
                kind: DocumentKind::IncludeVars,
                path: path.to_path_buf(),
                violations,
            });
        }

        serde_json::from_value(document).map_err(|source| ParserError::Shape {
            kind: DocumentKind::IncludeVars,
            path: path.to_path_buf(),
            source,
        })
    }
}
