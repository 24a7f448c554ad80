//! Schema self-consistency tree
//!
//! Mirrors the schema's shape and records, per node, whether the node's own
//! constraints can ever be satisfied. Instance data plays no part here.
//!
//! ## Checks
//! 1. **Ranges**: `minLength`/`maxLength`, `minimum`/`maximum`,
//!    `exclusiveMinimum`/`exclusiveMaximum`, `minItems`/`maxItems`
//! 2. **Enum conflicts**: an `enum` whose every member breaks the node's bounds,
//!    or a member of the wrong JSON type
//! 3. **Divisor**: `multipleOf` must be positive

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Number, Value};
use tracing::trace;

use super::{ValidationError, ValidationResult};
use crate::messages::{MessageKey, MessageTable};
use crate::schema::{SchemaKind, SchemaNode, TypedNode};

/// Key under which an array node's items appear in `children`
pub const ITEMS_KEY: &str = "items";

/// Validation annotation for one schema node
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationTreeNode {
    pub own_validation: ValidationResult,
    /// Property name (object) or `"items"` (array) to child annotation, in schema order
    pub children: IndexMap<String, ValidationTreeNode>,
    /// Errors anywhere below this node, not counting its own
    pub cumulative_children_errors: usize,
}

impl ValidationTreeNode {
    pub fn has_own_errors(&self) -> bool {
        !self.own_validation.valid
    }

    /// Own errors plus every descendant error
    pub fn total_errors(&self) -> usize {
        self.own_validation.error_count() + self.cumulative_children_errors
    }

    pub fn child(&self, key: &str) -> Option<&ValidationTreeNode> {
        self.children.get(key)
    }

    /// Flatten to `(dotted location, error)` pairs, own errors first.
    /// The root's errors carry an empty location.
    pub fn collect_errors(&self) -> Vec<(String, ValidationError)> {
        let mut out = Vec::new();
        self.collect_into("", &mut out);
        out
    }

    fn collect_into(&self, location: &str, out: &mut Vec<(String, ValidationError)>) {
        for error in &self.own_validation.errors {
            out.push((location.to_string(), error.clone()));
        }
        for (key, child) in &self.children {
            let child_location = if location.is_empty() {
                key.clone()
            } else {
                format!("{}.{}", location, key)
            };
            child.collect_into(&child_location, out);
        }
    }
}

/// Build the validation tree for `schema`
pub fn build_validation_tree(schema: &SchemaNode, messages: &dyn MessageTable) -> ValidationTreeNode {
    let checker = ConflictChecker { messages };
    checker.build(schema, 0)
}

struct ConflictChecker<'a> {
    messages: &'a dyn MessageTable,
}

impl ConflictChecker<'_> {
    fn build(&self, schema: &SchemaNode, depth: usize) -> ValidationTreeNode {
        let Some(node) = schema.as_typed_ref() else {
            return ValidationTreeNode::default();
        };

        let own_validation = ValidationResult::from_errors(self.check(node));
        let mut children = IndexMap::new();

        match node.effective_kind() {
            SchemaKind::Object => {
                for (name, child) in &node.properties {
                    trace!(property = %name, depth, "checking property");
                    children.insert(name.clone(), self.build(child, depth + 1));
                }
            }
            SchemaKind::Array => {
                if let Some(items) = &node.items {
                    children.insert(ITEMS_KEY.to_string(), self.build(items, depth + 1));
                }
            }
            _ => {}
        }

        let cumulative_children_errors = children.values().map(ValidationTreeNode::total_errors).sum();

        ValidationTreeNode {
            own_validation,
            children,
            cumulative_children_errors,
        }
    }

    fn check(&self, node: &TypedNode) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        match node.effective_kind() {
            SchemaKind::String => self.check_string(node, &mut errors),
            SchemaKind::Number | SchemaKind::Integer => self.check_numeric(node, &mut errors),
            SchemaKind::Array => self.check_array(node, &mut errors),
            SchemaKind::Boolean | SchemaKind::Null | SchemaKind::Object => {}
        }
        self.check_enum_types(node, &mut errors);
        errors
    }

    fn error(&self, key: MessageKey) -> ValidationError {
        ValidationError::new(key.token(), self.messages.message(key))
    }

    fn check_string(&self, node: &TypedNode, errors: &mut Vec<ValidationError>) {
        if let (Some(min), Some(max)) = (node.min_length, node.max_length) {
            if min > max {
                errors.push(self.error(MessageKey::LengthRange));
            }
        }

        if node.min_length.is_none() && node.max_length.is_none() {
            return;
        }
        let Some(members) = non_empty(&node.enum_values) else { return };
        let satisfiable = members.iter().any(|member| match member.as_str() {
            Some(s) => {
                let len = s.chars().count() as u64;
                node.min_length.map_or(true, |min| len >= min)
                    && node.max_length.map_or(true, |max| len <= max)
            }
            None => false,
        });
        if !satisfiable {
            errors.push(self.error(MessageKey::EnumLengthConflict));
        }
    }

    fn check_numeric(&self, node: &TypedNode, errors: &mut Vec<ValidationError>) {
        let minimum = as_f64(&node.minimum);
        let maximum = as_f64(&node.maximum);
        let exclusive_minimum = as_f64(&node.exclusive_minimum);
        let exclusive_maximum = as_f64(&node.exclusive_maximum);

        if let (Some(min), Some(max)) = (minimum, maximum) {
            if min > max {
                errors.push(self.error(MessageKey::ValueRange));
            }
        }
        if let (Some(min), Some(max)) = (exclusive_minimum, exclusive_maximum) {
            if min >= max {
                errors.push(self.error(MessageKey::ExclusiveRange));
            }
        }
        if let Some(step) = as_f64(&node.multiple_of) {
            if step <= 0.0 {
                errors.push(self.error(MessageKey::MultipleOfNotPositive));
            }
        }

        let bounded = minimum.is_some()
            || maximum.is_some()
            || exclusive_minimum.is_some()
            || exclusive_maximum.is_some();
        if !bounded {
            return;
        }
        let Some(members) = non_empty(&node.enum_values) else { return };
        let satisfiable = members.iter().filter_map(Value::as_f64).any(|v| {
            minimum.map_or(true, |min| v >= min)
                && maximum.map_or(true, |max| v <= max)
                && exclusive_minimum.map_or(true, |min| v > min)
                && exclusive_maximum.map_or(true, |max| v < max)
        });
        if !satisfiable {
            errors.push(self.error(MessageKey::EnumRangeConflict));
        }
    }

    fn check_array(&self, node: &TypedNode, errors: &mut Vec<ValidationError>) {
        if let (Some(min), Some(max)) = (node.min_items, node.max_items) {
            if min > max {
                errors.push(self.error(MessageKey::ItemsRange));
            }
        }
    }

    fn check_enum_types(&self, node: &TypedNode, errors: &mut Vec<ValidationError>) {
        let Some(kind) = node.kind.filter(SchemaKind::is_scalar) else { return };
        let Some(members) = non_empty(&node.enum_values) else { return };
        if members.iter().any(|member| !kind.accepts(member)) {
            errors.push(self.error(MessageKey::EnumTypeConflict));
        }
    }
}

fn non_empty(values: &Option<Vec<Value>>) -> Option<&[Value]> {
    values.as_deref().filter(|v| !v.is_empty())
}

fn as_f64(n: &Option<Number>) -> Option<f64> {
    n.as_ref().and_then(Number::as_f64)
}
