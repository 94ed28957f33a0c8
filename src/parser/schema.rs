// ABOUTME: JSON Schema validation for decoded definition and include-vars documents
// ABOUTME: Compiles each schema once and maps every validation error to a violation

use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::primitive_type::PrimitiveType;
use jsonschema::{JSONSchema, ValidationError};
use serde_json::{json, Value as JsonValue};
use std::fmt;
use std::sync::OnceLock;

/// Document shapes with a compiled schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Definition,
    IncludeVars,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    MissingField(String),
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    TooFewItems {
        min: usize,
        found: usize,
    },
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON pointer to the offending value; empty for the document root
    pub path: String,
    pub kind: ViolationKind,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.path.is_empty() { "/" } else { &self.path };
        match &self.kind {
            ViolationKind::MissingField(field) => {
                write!(f, "{}: missing required field '{}'", at, field)
            }
            ViolationKind::TypeMismatch { expected, found } => {
                write!(f, "{}: expected {}, found {}", at, expected, found)
            }
            ViolationKind::TooFewItems { min, found } => {
                write!(f, "{}: expected at least {} item(s), found {}", at, min, found)
            }
            ViolationKind::Other(message) => write!(f, "{}: {}", at, message),
        }
    }
}

impl Schema {
    /// Raw JSON Schema document for this shape
    fn document(self) -> JsonValue {
        match self {
            Schema::Definition => json!({
                "type": "object",
                "required": ["templates"],
                "properties": {
                    "vars": {
                        "type": "object",
                        "properties": {
                            "include": { "type": "array", "items": { "type": "string" } },
                            "global": { "type": "object" }
                        }
                    },
                    "templates": {
                        "type": "array",
                        "minItems": 1,
                        "items": {
                            "type": "object",
                            "required": ["src", "dest"],
                            "properties": {
                                "src": { "type": "string" },
                                "dest": { "type": "string" },
                                "local_vars": { "type": "object" },
                                "include_vars": { "type": "array", "items": { "type": "string" } }
                            }
                        }
                    }
                }
            }),
            Schema::IncludeVars => json!({
                "type": "object",
                "required": ["vars"],
                "properties": {
                    "vars": { "type": "object" }
                }
            }),
        }
    }

    fn compiled(self) -> Result<&'static JSONSchema, &'static str> {
        static DEFINITION: OnceLock<Result<JSONSchema, String>> = OnceLock::new();
        static INCLUDE_VARS: OnceLock<Result<JSONSchema, String>> = OnceLock::new();

        let cell = match self {
            Schema::Definition => &DEFINITION,
            Schema::IncludeVars => &INCLUDE_VARS,
        };
        cell.get_or_init(|| {
            JSONSchema::compile(&self.document()).map_err(|e| format!("invalid schema: {}", e))
        })
        .as_ref()
        .map_err(String::as_str)
    }
}

/// Validate `document` against `schema`, returning every violation
pub fn validate(document: &JsonValue, schema: Schema) -> Vec<SchemaViolation> {
    let validator = match schema.compiled() {
        Ok(validator) => validator,
        Err(message) => {
            return vec![SchemaViolation {
                path: String::new(),
                kind: ViolationKind::Other(message.to_string()),
            }]
        }
    };

    match validator.validate(document) {
        Ok(()) => Vec::new(),
        Err(errors) => errors.map(|error| to_violation(&error)).collect(),
    }
}

fn to_violation(error: &ValidationError<'_>) -> SchemaViolation {
    let kind = match &error.kind {
        ValidationErrorKind::Required { property } => ViolationKind::MissingField(
            property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string()),
        ),
        ValidationErrorKind::Type {
            kind: TypeKind::Single(expected),
        } => ViolationKind::TypeMismatch {
            expected: primitive_name(expected),
            found: json_type_name(&error.instance),
        },
        ValidationErrorKind::MinItems { limit } => ViolationKind::TooFewItems {
            min: *limit as usize,
            found: error.instance.as_array().map_or(0, Vec::len),
        },
        _ => ViolationKind::Other(error.to_string()),
    };

    SchemaViolation {
        path: error.instance_path.to_string(),
        kind,
    }
}

fn primitive_name(primitive: &PrimitiveType) -> &'static str {
    match primitive {
        PrimitiveType::Array => "array",
        PrimitiveType::Boolean => "boolean",
        PrimitiveType::Integer => "integer",
        PrimitiveType::Null => "null",
        PrimitiveType::Number => "number",
        PrimitiveType::Object => "object",
        PrimitiveType::String => "string",
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
