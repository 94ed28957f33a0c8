// ABOUTME: Error types for variable resolution
// ABOUTME: Distinguishes unreadable include paths from invalid include documents

use std::path::PathBuf;
use thiserror::Error;

use crate::parser::ParserError;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Include vars file {} could not be read: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid include vars file: {0}")]
    Invalid(#[from] ParserError),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
