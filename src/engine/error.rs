// ABOUTME: Error types for rendering definitions and writing destinations
// ABOUTME: Wraps parser, resolver and template failures alongside filesystem errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Parser error: {0}")]
    Parser(#[from] crate::parser::ParserError),

    #[error("Variable resolution error: {0}")]
    Resolve(#[from] crate::vars::ResolveError),

    #[error("Template error: {0}")]
    Template(#[from] crate::template::TemplateError),

    #[error("Unable to read template source {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to create file {}: {source}", path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to write {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to apply file metadata to {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rendering of {} cancelled", definition.display())]
    Cancelled { definition: PathBuf },

    #[error("Join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl EngineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Cancelled { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
