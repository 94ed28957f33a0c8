// ABOUTME: Error types for template engine operations
// ABOUTME: Covers delimiter configuration, template parsing, and evaluation failures

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Bad delimiters argument: {0}")]
    InvalidDelimiters(String),

    #[error("Unclosed template delimiter '{left}' on line {line}")]
    UnclosedDelimiter { left: String, line: usize },

    #[error("Unable to parse template {name}: {message}")]
    SyntaxError { name: String, message: String },

    #[error("Template error in {name}: {source}")]
    RenderError {
        name: String,
        #[source]
        source: handlebars::RenderError,
    },
}

pub type Result<T> = std::result::Result<T, TemplateError>;
