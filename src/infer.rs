//! Schema inference from example documents
//!
//! Inference works over a set of sample values that must share one schema:
//! a single document is a set of one, and the elements of an array are the
//! samples for its `items`. Samples that agree on a JSON kind merge; samples
//! that disagree produce a permissive (`true`) schema instead of a guess.

use std::sync::OnceLock;

use indexmap::{IndexMap, IndexSet};
use jsonschema::{Draft, JSONSchema};
use regex::Regex;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::InferenceConfig;
use crate::schema::{is_whole, SchemaKind, SchemaNode, TypedNode};

/// Infer a schema from one document with default settings
pub fn infer_schema(value: &Value) -> SchemaNode {
    Inferrer::default().infer(value)
}

/// Infer one schema that accepts every sample
pub fn infer_from_samples(samples: &[Value]) -> SchemaNode {
    Inferrer::default().infer_samples(samples)
}

#[derive(Debug, Clone, Default)]
pub struct Inferrer {
    config: InferenceConfig,
}

impl Inferrer {
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    pub fn infer(&self, value: &Value) -> SchemaNode {
        self.merge(&[value])
    }

    pub fn infer_samples(&self, samples: &[Value]) -> SchemaNode {
        let refs: Vec<&Value> = samples.iter().collect();
        debug!(samples = refs.len(), "inferring schema");
        self.merge(&refs)
    }

    fn merge(&self, samples: &[&Value]) -> SchemaNode {
        let Some(first) = samples.first() else {
            return SchemaNode::Permissive;
        };
        let kind = SchemaKind::of_value(first);
        if samples.iter().any(|v| SchemaKind::of_value(v) != kind) {
            return SchemaNode::Permissive;
        }

        match kind {
            SchemaKind::Object => self.merge_objects(samples),
            SchemaKind::Array => self.merge_arrays(samples),
            SchemaKind::String => self.merge_strings(samples),
            SchemaKind::Number | SchemaKind::Integer => {
                let whole = samples
                    .iter()
                    .all(|v| matches!(v, Value::Number(n) if is_whole(n)));
                if self.config.integers && whole {
                    SchemaNode::typed(SchemaKind::Integer)
                } else {
                    SchemaNode::typed(SchemaKind::Number)
                }
            }
            SchemaKind::Boolean | SchemaKind::Null => SchemaNode::typed(kind),
        }
    }

    fn merge_objects(&self, samples: &[&Value]) -> SchemaNode {
        let objects: Vec<&Map<String, Value>> =
            samples.iter().filter_map(|v| v.as_object()).collect();

        // member name -> values seen for it, in first-seen order
        let mut members: IndexMap<&str, Vec<&Value>> = IndexMap::new();
        for object in &objects {
            for (name, value) in object.iter() {
                members.entry(name.as_str()).or_default().push(value);
            }
        }

        let mut node = TypedNode::new(SchemaKind::Object);
        let mut required = IndexSet::new();
        for (name, values) in &members {
            if values.len() == objects.len() {
                required.insert(name.to_string());
            }
            node.properties.insert(name.to_string(), self.merge(values));
        }
        node.required = required;
        node.into()
    }

    fn merge_arrays(&self, samples: &[&Value]) -> SchemaNode {
        let elements: Vec<&Value> = samples
            .iter()
            .filter_map(|v| v.as_array())
            .flatten()
            .collect();
        let mut node = TypedNode::new(SchemaKind::Array);
        node.items = Some(self.merge(&elements));
        node.into()
    }

    fn merge_strings(&self, samples: &[&Value]) -> SchemaNode {
        let mut node = TypedNode::new(SchemaKind::String);
        if self.config.detect_formats {
            let mut formats = samples.iter().filter_map(|v| v.as_str()).map(detect_format);
            if let Some(first) = formats.next().flatten() {
                if formats.all(|f| f == Some(first)) {
                    node.format = Some(first.to_string());
                }
            }
        }
        node.into()
    }
}

struct FormatRule {
    name: &'static str,
    shape: Regex,
    /// The validation engine's own check for this format, so an inferred
    /// format never rejects the sample it came from
    engine: Option<JSONSchema>,
}

fn format_rules() -> &'static [FormatRule] {
    static RULES: OnceLock<Vec<FormatRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (
                "date-time",
                r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])[Tt]([01]\d|2[0-3]):[0-5]\d:[0-5]\d(\.\d+)?([Zz]|[+-]([01]\d|2[0-3]):[0-5]\d)$",
            ),
            ("date", r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$"),
            (
                "time",
                r"^([01]\d|2[0-3]):[0-5]\d:[0-5]\d(\.\d+)?([Zz]|[+-]([01]\d|2[0-3]):[0-5]\d)$",
            ),
            ("email", r"^[^\s@]+@[^\s@]+\.[^\s@]+$"),
            ("uri", r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s]+$"),
            (
                "uuid",
                r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
            ),
        ]
        .into_iter()
        .filter_map(|(name, pattern)| {
            let shape = Regex::new(pattern).ok()?;
            let engine = JSONSchema::options()
                .with_draft(Draft::Draft7)
                .compile(&json!({ "type": "string", "format": name }))
                .ok();
            Some(FormatRule {
                name,
                shape,
                engine,
            })
        })
        .collect()
    })
}

/// Recognize a well-known string format
pub fn detect_format(value: &str) -> Option<&'static str> {
    let rule = format_rules()
        .iter()
        .find(|rule| rule.shape.is_match(value))?;
    let accepted = rule
        .engine
        .as_ref()
        .map_or(true, |engine| engine.is_valid(&Value::String(value.to_string())));
    accepted.then_some(rule.name)
}
