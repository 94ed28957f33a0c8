// ABOUTME: Parser module for definition and include-vars documents
// ABOUTME: Exports document decoding, schema validation, and definition data structures

pub mod definition;
pub mod document;
pub mod error;
pub mod include_vars;
pub mod schema;

pub use definition::{Definition, TemplateSpec, VariableBlock};
pub use document::DocumentFormat;
pub use error::{DocumentKind, ParserError, Result};
pub use include_vars::IncludeVarsFile;
pub use schema::{Schema, SchemaViolation, ViolationKind};
