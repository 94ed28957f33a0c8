// ABOUTME: Main library module for the kompoze template renderer
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod engine;
pub mod parser;
pub mod template;
pub mod vars;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use engine::{RenderOptions, RenderScheduler, RenderSettings, RunReport, TemplateRenderer};
pub use parser::{Definition, IncludeVarsFile, TemplateSpec};
pub use template::{Delimiters, TemplateEngine};
pub use vars::{merge_override, resolve_include_vars, VarMap};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
