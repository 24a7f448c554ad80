//! Instance validation
//!
//! Parses candidate JSON text and checks it against a schema with the
//! `jsonschema` engine (Draft 7). Every error is mapped back to a line and
//! column in the original text where the offending token can be found.

use std::sync::OnceLock;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema};
use regex::Regex;
use serde_json::{Number, Value};
use tracing::debug;

use super::locate::{byte_offset, escape_segment, line_column, SourceMap};
use super::{ValidationError, ValidationResult};
use crate::config::ValidationConfig;
use crate::schema::SchemaNode;

/// Path reported for parse failures and whole-document errors
pub const ROOT_PATH: &str = "/";

/// Validate `text` against `schema` with default settings
pub fn validate_json(text: &str, schema: &SchemaNode) -> ValidationResult {
    InstanceValidator::default().validate(text, schema)
}

/// Stateless instance validator carrying its settings
#[derive(Debug, Clone, Default)]
pub struct InstanceValidator {
    config: ValidationConfig,
}

impl InstanceValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, text: &str, schema: &SchemaNode) -> ValidationResult {
        let instance: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "candidate document is not valid JSON");
                // serde_json counts columns in bytes
                let offset = byte_offset(text, e.line(), e.column());
                let (line, column) = line_column(text, offset);
                let error = ValidationError::new(ROOT_PATH, e.to_string()).at(line, column);
                return ValidationResult::from_errors(vec![error]);
            }
        };

        let schema_value = compilable(schema).to_value();
        let compiled = match self.compile(&schema_value) {
            Ok(compiled) => compiled,
            Err(message) => {
                return ValidationResult::from_errors(vec![ValidationError::new(ROOT_PATH, message)]);
            }
        };

        let errors = match compiled.validate(&instance) {
            Ok(()) => Vec::new(),
            Err(violations) => {
                let source = SourceMap::new(text);
                violations
                    .map(|violation| {
                        let path = violation_path(&violation.instance_path.to_string(), &violation.kind);
                        let error = ValidationError::new(path.clone(), violation.to_string());
                        match source.locate(&path) {
                            Some((line, column)) => error.at(line, column),
                            None => error,
                        }
                    })
                    .collect()
            }
        };

        debug!(errors = errors.len(), "validated candidate document");
        ValidationResult::from_errors(errors)
    }

    fn compile(&self, schema: &Value) -> Result<JSONSchema, String> {
        let mut options = JSONSchema::options();
        options.with_draft(Draft::Draft7);
        if self.config.check_formats {
            options
                .with_format("uuid", is_uuid)
                .with_format("tel", is_tel)
                .with_format("textarea", any_text)
                .with_format("html", any_text);
        }
        options
            .compile(schema)
            .map_err(|e| format!("Schema cannot be used for validation: {}", e))
    }
}

/// Drop constraints the Draft 7 meta-schema rejects but an editor session can
/// hold, so a half-finished schema still checks instances. The conflict itself
/// is reported by the validation tree.
fn compilable(schema: &SchemaNode) -> SchemaNode {
    let Some(node) = schema.as_typed_ref() else {
        return schema.clone();
    };
    let mut node = node.clone();
    let non_positive = node
        .multiple_of
        .as_ref()
        .and_then(Number::as_f64)
        .map_or(false, |step| step <= 0.0);
    if non_positive {
        node.multiple_of = None;
    }
    node.items = node.items.as_ref().map(compilable);
    for child in node.properties.values_mut() {
        *child = compilable(child);
    }
    node.into()
}

/// Pointer for an error. A missing required member is reported at its own path.
///
/// A missing member named `""` is `"/"` under JSON pointer rules, the same text
/// as [`ROOT_PATH`]; its message still names the member.
fn violation_path(instance_path: &str, kind: &ValidationErrorKind) -> String {
    let base = if instance_path.is_empty() { "" } else { instance_path };
    match kind {
        ValidationErrorKind::Required { property } => {
            let name = match property {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{}/{}", base, escape_segment(&name))
        }
        _ if base.is_empty() => ROOT_PATH.to_string(),
        _ => base.to_string(),
    }
}

fn is_uuid(value: &str) -> bool {
    static UUID: OnceLock<Regex> = OnceLock::new();
    UUID.get_or_init(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
            .expect("static uuid pattern")
    })
    .is_match(value)
}

fn is_tel(value: &str) -> bool {
    static TEL: OnceLock<Regex> = OnceLock::new();
    TEL.get_or_init(|| Regex::new(r"^\+?[0-9 ()./-]{3,}$").expect("static tel pattern"))
        .is_match(value)
}

fn any_text(_: &str) -> bool {
    true
}
