// ABOUTME: Error types for definition and include-vars document loading
// ABOUTME: Separates decode failures from structural schema violations

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use super::document::DocumentFormat;
use super::schema::SchemaViolation;

/// Which kind of document failed to load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Definition,
    IncludeVars,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Definition => write!(f, "definition"),
            DocumentKind::IncludeVars => write!(f, "include-vars file"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {format} document {}: {message}", path.display())]
    Decode {
        path: PathBuf,
        format: DocumentFormat,
        message: String,
    },

    #[error("{kind} {} failed schema validation: {}", path.display(), join_violations(violations))]
    Schema {
        kind: DocumentKind,
        path: PathBuf,
        violations: Vec<SchemaViolation>,
    },

    #[error("Invalid {kind} {}: {source}", path.display())]
    Shape {
        kind: DocumentKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ParserError {
    /// Schema violations carried by this error, if any
    pub fn violations(&self) -> &[SchemaViolation] {
        match self {
            ParserError::Schema { violations, .. } => violations,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, ParserError>;
