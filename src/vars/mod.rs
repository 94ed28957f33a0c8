// ABOUTME: Variable resolution and merge module
// ABOUTME: Loads include-vars files and combines variable layers with override semantics

pub mod error;
pub mod merge;
pub mod resolver;

pub use error::{ResolveError, Result};
pub use merge::merge_override;
pub use resolver::{absolute_path, resolve_include_vars};

/// A variable mapping: string keys to arbitrary JSON-like values
pub type VarMap = serde_json::Map<String, serde_json::Value>;

/// Build the scope for one template: global variables merged over local ones
pub fn resolved_scope(local: &VarMap, global: &VarMap) -> VarMap {
    merge_override(local, global)
}
