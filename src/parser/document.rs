// ABOUTME: Decoding of TOML, YAML and JSON documents into their JSON form
// ABOUTME: All schema checks and typed deserialization work on the decoded value

use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::path::Path;

use super::error::{ParserError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Toml,
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Pick a format from the file extension, falling back to TOML
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            Some("json") => DocumentFormat::Json,
            _ => DocumentFormat::Toml,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Toml => "TOML",
            DocumentFormat::Yaml => "YAML",
            DocumentFormat::Json => "JSON",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read and decode the document at `path`
pub fn decode_file(path: &Path) -> Result<JsonValue> {
    let content = std::fs::read_to_string(path).map_err(|source| ParserError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_str(&content, DocumentFormat::from_path(path), path)
}

/// Decode document text; `origin` only labels errors
pub fn decode_str(content: &str, format: DocumentFormat, origin: &Path) -> Result<JsonValue> {
    let decode_error = |message: String| ParserError::Decode {
        path: origin.to_path_buf(),
        format,
        message,
    };

    match format {
        DocumentFormat::Toml => {
            let table: toml::Table =
                toml::from_str(content).map_err(|e| decode_error(e.to_string()))?;
            Ok(toml_to_json(toml::Value::Table(table)))
        }
        DocumentFormat::Yaml => {
            let value: JsonValue =
                serde_yaml::from_str(content).map_err(|e| decode_error(e.to_string()))?;
            // An empty YAML document decodes to null
            Ok(if value.is_null() {
                JsonValue::Object(Map::new())
            } else {
                value
            })
        }
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(|e| decode_error(e.to_string()))
        }
    }
}

fn toml_to_json(value: toml::Value) -> JsonValue {
    match value {
        toml::Value::String(s) => JsonValue::String(s),
        toml::Value::Integer(i) => JsonValue::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        toml::Value::Boolean(b) => JsonValue::Bool(b),
        toml::Value::Datetime(dt) => JsonValue::String(dt.to_string()),
        toml::Value::Array(items) => JsonValue::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => JsonValue::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("definition.toml")),
            DocumentFormat::Toml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("vars/prod.YML")),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("vars.json")),
            DocumentFormat::Json
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("definition")),
            DocumentFormat::Toml
        );
    }

    #[test]
    fn test_decode_toml_with_nested_tables() {
        let toml = r#"
[vars]
include = ["common.toml"]

[vars.global]
replicas = 3
released = 1979-05-27T07:32:00Z

[[templates]]
src = "compose.tmpl"
dest = "docker-compose.yml"
"#;

        let value = decode_str(toml, DocumentFormat::Toml, Path::new("inline")).unwrap();
        assert_eq!(value["vars"]["include"][0], "common.toml");
        assert_eq!(value["vars"]["global"]["replicas"], 3);
        assert_eq!(value["vars"]["global"]["released"], "1979-05-27T07:32:00Z");
        assert_eq!(value["templates"][0]["dest"], "docker-compose.yml");
    }

    #[test]
    fn test_decode_empty_yaml_is_empty_object() {
        let value = decode_str("", DocumentFormat::Yaml, Path::new("empty.yaml")).unwrap();
        assert!(value.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_decode_error_names_format() {
        let err = decode_str("vars = [", DocumentFormat::Toml, Path::new("broken.toml"))
            .unwrap_err();
        assert!(matches!(err, ParserError::Decode { format: DocumentFormat::Toml, .. }));
        assert!(err.to_string().contains("broken.toml"));
    }
}
