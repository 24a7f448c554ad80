//! Schema node model
//!
//! A schema is an ordered, recursive tree. Boolean schemas (`true`/`false`) are
//! explicit variants; everything else is a [`TypedNode`] behind an `Arc`, so an
//! edit only copies the nodes on the path it touches and untouched subtrees stay
//! shared with the previous version.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::{Result, SchemaError};

/// JSON type named by a schema's `type` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl SchemaKind {
    pub fn from_json_type(type_str: &str) -> Option<Self> {
        match type_str {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }

    /// Kind of a JSON value. Every number reports as `Number`.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Object | Self::Array)
    }

    /// Whether `value` has this JSON type (draft-07 rules: `1.0` is an integer)
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Integer, Value::Number(n)) => is_whole(n),
            (Self::Number, Value::Number(_)) => true,
            (kind, value) => *kind == Self::of_value(value),
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn is_whole(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false)
}

/// An object-form schema node.
///
/// Constraint fields are grouped by the kind they apply to. Keywords this model
/// does not name are kept in `extra`, in document order, so a round-trip through
/// the editor never drops them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    // string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    // number / integer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,

    // array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<SchemaNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    // object
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub required: IndexSet<String>,

    /// Keywords not modeled above (`title`, `$schema`, `additionalProperties`, `not`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TypedNode {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    /// The kind used for editing. A node without `type` edits as an object.
    pub fn effective_kind(&self) -> SchemaKind {
        self.kind.unwrap_or(SchemaKind::Object)
    }

    /// Drop `enum` and every constraint that does not apply to `kind`.
    pub fn retain_constraints_for(&mut self, kind: SchemaKind) {
        self.enum_values = None;
        if kind != SchemaKind::String {
            self.min_length = None;
            self.max_length = None;
            self.pattern = None;
            self.format = None;
        }
        if !kind.is_numeric() {
            self.minimum = None;
            self.maximum = None;
            self.exclusive_minimum = None;
            self.exclusive_maximum = None;
            self.multiple_of = None;
        }
        if kind != SchemaKind::Array {
            self.items = None;
            self.min_items = None;
            self.max_items = None;
            self.unique_items = None;
        }
        if kind != SchemaKind::Object {
            self.properties.clear();
            self.required.clear();
        }
    }

    /// Copy the `kind`-specific constraints (and `enum`) of `source` onto `self`.
    pub fn merge_constraints_from(&mut self, source: &TypedNode, kind: SchemaKind) {
        if source.enum_values.is_some() {
            self.enum_values = source.enum_values.clone();
        }
        match kind {
            SchemaKind::String => {
                self.min_length = source.min_length.or(self.min_length);
                self.max_length = source.max_length.or(self.max_length);
                self.pattern = source.pattern.clone().or(self.pattern.take());
                self.format = source.format.clone().or(self.format.take());
            }
            SchemaKind::Number | SchemaKind::Integer => {
                self.minimum = source.minimum.clone().or(self.minimum.take());
                self.maximum = source.maximum.clone().or(self.maximum.take());
                self.exclusive_minimum =
                    source.exclusive_minimum.clone().or(self.exclusive_minimum.take());
                self.exclusive_maximum =
                    source.exclusive_maximum.clone().or(self.exclusive_maximum.take());
                self.multiple_of = source.multiple_of.clone().or(self.multiple_of.take());
            }
            SchemaKind::Array => {
                self.items = source.items.clone().or(self.items.take());
                self.min_items = source.min_items.or(self.min_items);
                self.max_items = source.max_items.or(self.max_items);
                self.unique_items = source.unique_items.or(self.unique_items);
            }
            SchemaKind::Object => {
                for (name, schema) in &source.properties {
                    self.properties.insert(name.clone(), schema.clone());
                }
                for name in &source.required {
                    self.required.insert(name.clone());
                }
            }
            SchemaKind::Boolean | SchemaKind::Null => {}
        }
        for (key, value) in &source.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

// Property and required order are part of a schema's identity, so equality is
// order-sensitive where the map types alone would not be.
impl PartialEq for TypedNode {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.description == other.description
            && self.enum_values == other.enum_values
            && self.min_length == other.min_length
            && self.max_length == other.max_length
            && self.pattern == other.pattern
            && self.format == other.format
            && self.minimum == other.minimum
            && self.maximum == other.maximum
            && self.exclusive_minimum == other.exclusive_minimum
            && self.exclusive_maximum == other.exclusive_maximum
            && self.multiple_of == other.multiple_of
            && self.items == other.items
            && self.min_items == other.min_items
            && self.max_items == other.max_items
            && self.unique_items == other.unique_items
            && self.properties.iter().eq(other.properties.iter())
            && self.required.iter().eq(other.required.iter())
            && self.extra.iter().eq(other.extra.iter())
    }
}

/// A schema node: one of the two boolean forms, or an object-form node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `true`: every value is valid
    Permissive,
    /// `false`: no value is valid
    Restrictive,
    Typed(Arc<TypedNode>),
}

impl Default for SchemaNode {
    fn default() -> Self {
        Self::typed(SchemaKind::Object)
    }
}

impl From<TypedNode> for SchemaNode {
    fn from(node: TypedNode) -> Self {
        Self::Typed(Arc::new(node))
    }
}

impl SchemaNode {
    /// A typed node with no constraints
    pub fn typed(kind: SchemaKind) -> Self {
        TypedNode::new(kind).into()
    }

    pub fn is_permissive(&self) -> bool {
        matches!(self, Self::Permissive)
    }

    pub fn is_restrictive(&self) -> bool {
        matches!(self, Self::Restrictive)
    }

    pub fn as_typed_ref(&self) -> Option<&TypedNode> {
        match self {
            Self::Typed(node) => Some(node),
            _ => None,
        }
    }

    /// Coerce to an editable typed node.
    ///
    /// `true` becomes `{}`. `false` becomes `{"not": {}}`, which still rejects
    /// every value.
    pub fn as_typed(&self) -> TypedNode {
        match self {
            Self::Typed(node) => (**node).clone(),
            Self::Permissive => TypedNode::default(),
            Self::Restrictive => {
                let mut node = TypedNode::default();
                node.extra.insert("not".to_string(), Value::Object(Map::new()));
                node
            }
        }
    }

    /// Apply `f` to the typed node, or return `default` for boolean nodes
    pub fn with_typed<R>(&self, f: impl FnOnce(&TypedNode) -> R, default: R) -> R {
        match self {
            Self::Typed(node) => f(node),
            _ => default,
        }
    }

    /// Copy the typed projection, apply `edit`, and wrap the result as a new node
    pub(crate) fn edit_typed(&self, edit: impl FnOnce(&mut TypedNode)) -> SchemaNode {
        let mut node = self.as_typed();
        edit(&mut node);
        node.into()
    }

    pub fn kind(&self) -> Option<SchemaKind> {
        self.with_typed(|s| s.kind, None)
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Typed(node) => node.description.as_deref(),
            _ => None,
        }
    }

    /// Identity comparison: true when both handles point at the same node
    pub fn ptr_eq(&self, other: &SchemaNode) -> bool {
        match (self, other) {
            (Self::Typed(a), Self::Typed(b)) => Arc::ptr_eq(a, b),
            (Self::Permissive, Self::Permissive) | (Self::Restrictive, Self::Restrictive) => true,
            _ => false,
        }
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| SchemaError::InvalidFormat(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Permissive => Value::Bool(true),
            Self::Restrictive => Value::Bool(false),
            // A TypedNode only holds JSON-native data, so this cannot fail
            Self::Typed(node) => serde_json::to_value(&**node).unwrap_or(Value::Bool(true)),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Permissive => serializer.serialize_bool(true),
            Self::Restrictive => serializer.serialize_bool(false),
            Self::Typed(node) => node.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bool(bool),
            Typed(TypedNode),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Bool(true) => SchemaNode::Permissive,
            Repr::Bool(false) => SchemaNode::Restrictive,
            Repr::Typed(node) => node.into(),
        })
    }
}
