// ABOUTME: Include-vars resolution: loads each included file and layers it over a mapping
// ABOUTME: Later includes override earlier ones; paths resolve against the base path

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::{ResolveError, Result};
use super::merge::merge_override;
use super::VarMap;
use crate::parser::{IncludeVarsFile, ParserError};

/// Make `path` absolute relative to `base_path` unless it already is
pub fn absolute_path(base_path: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_path.join(path)
    }
}

/// Layer every include file, in order, over `target` and return the result
pub fn resolve_include_vars(
    base_path: &Path,
    include_paths: &[String],
    target: &VarMap,
) -> Result<VarMap> {
    let mut resolved = target.clone();

    for include in include_paths {
        let path = absolute_path(base_path, include);
        info!("Loading include vars file: {}", path.display());

        let file = IncludeVarsFile::load(&path).map_err(|err| match err {
            ParserError::Io { path, source } => ResolveError::Unreadable { path, source },
            other => ResolveError::Invalid(other),
        })?;

        debug!("Merging {} variable(s) from {}", file.vars.len(), path.display());
        resolved = merge_override(&resolved, &file.vars);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value as JsonValue};
    use std::fs;
    use tempfile::TempDir;

    fn write_vars(dir: &TempDir, name: &str, body: &str) {
        fs::write(dir.path().join(name), body).unwrap();
    }

    #[test]
    fn test_later_includes_override_earlier() {
        let dir = TempDir::new().unwrap();
        write_vars(&dir, "f1.toml", "[vars]\nx = 1\n");
        write_vars(&dir, "f2.toml", "[vars]\nx = 2\n");

        let forward = resolve_include_vars(
            dir.path(),
            &["f1.toml".to_string(), "f2.toml".to_string()],
            &VarMap::new(),
        )
        .unwrap();
        assert_eq!(forward["x"], json!(2));

        let reversed = resolve_include_vars(
            dir.path(),
            &["f2.toml".to_string(), "f1.toml".to_string()],
            &VarMap::new(),
        )
        .unwrap();
        assert_eq!(reversed["x"], json!(1));
    }

    #[test]
    fn test_includes_override_target_and_keep_untouched_keys() {
        let dir = TempDir::new().unwrap();
        write_vars(&dir, "db.toml", "[vars.db]\nhost = \"db.prod\"\n");

        let mut target = VarMap::new();
        target.insert("name".to_string(), json!("svc"));
        target.insert("db".to_string(), json!({ "host": "localhost", "port": 5432 }));

        let resolved = resolve_include_vars(dir.path(), &["db.toml".to_string()], &target).unwrap();

        assert_eq!(
            JsonValue::Object(resolved),
            json!({ "name": "svc", "db": { "host": "db.prod", "port": 5432 } })
        );
        assert_eq!(target["db"]["host"], json!("localhost"));
    }

    #[test]
    fn test_absolute_include_ignores_base_path() {
        let dir = TempDir::new().unwrap();
        write_vars(&dir, "abs.toml", "[vars]\nfrom = \"absolute\"\n");
        let absolute = dir.path().join("abs.toml").to_string_lossy().to_string();

        let resolved =
            resolve_include_vars(Path::new("/nonexistent"), &[absolute], &VarMap::new()).unwrap();
        assert_eq!(resolved["from"], json!("absolute"));
    }

    #[test]
    fn test_missing_include_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let err = resolve_include_vars(dir.path(), &["missing.toml".to_string()], &VarMap::new())
            .unwrap_err();
        assert!(matches!(err, ResolveError::Unreadable { .. }));
    }

    #[test]
    fn test_invalid_include_is_rejected_before_merge() {
        let dir = TempDir::new().unwrap();
        write_vars(&dir, "good.toml", "[vars]\nx = 1\n");
        write_vars(&dir, "bad.toml", "x = 2\n");

        let err = resolve_include_vars(
            dir.path(),
            &["good.toml".to_string(), "bad.toml".to_string()],
            &VarMap::new(),
        )
        .unwrap_err();

        match err {
            ResolveError::Invalid(ParserError::Schema { violations, .. }) => {
                assert_eq!(violations.len(), 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
