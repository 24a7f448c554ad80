//! Order-preserving schema edits
//!
//! Every operation takes the current node by reference and returns a new one.
//! Nothing here fails: unknown names and out-of-range indices are no-ops, and a
//! no-op hands back a clone of the input that is [`SchemaNode::ptr_eq`] to it.
//! Constraint consistency is not checked here; see [`crate::validation::tree`].

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::schema::{SchemaKind, SchemaNode, TypedNode};

/// One property of an object node, as the editor lists it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyEntry {
    pub name: String,
    pub schema: SchemaNode,
    pub required: bool,
    pub position: usize,
}

/// Input for creating or updating one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDraft {
    pub name: String,
    pub kind: SchemaKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    /// Constraints for the new field; its `type` and `description` are ignored
    #[serde(default = "permissive")]
    pub validation: SchemaNode,
}

fn permissive() -> SchemaNode {
    SchemaNode::Permissive
}

impl FieldDraft {
    pub fn new(name: impl Into<String>, kind: SchemaKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            required: false,
            validation: SchemaNode::Permissive,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validation(mut self, validation: SchemaNode) -> Self {
        self.validation = validation;
        self
    }
}

/// List the declared properties in order. Empty for boolean and non-object nodes.
pub fn properties_of(node: &SchemaNode) -> Vec<PropertyEntry> {
    node.with_typed(
        |s| {
            s.properties
                .iter()
                .enumerate()
                .map(|(position, (name, schema))| PropertyEntry {
                    name: name.clone(),
                    schema: schema.clone(),
                    required: s.required.contains(name),
                    position,
                })
                .collect()
        },
        Vec::new(),
    )
}

/// Build the schema for a new or edited field
pub fn field_schema_of(draft: &FieldDraft) -> SchemaNode {
    let mut node = TypedNode::new(draft.kind);
    if let SchemaNode::Typed(validation) = &draft.validation {
        node.merge_constraints_from(validation, draft.kind);
    }
    let description = draft.description.trim();
    if !description.is_empty() {
        node.description = Some(description.to_string());
    }
    node.into()
}

/// Insert or replace a property. New names go last; existing ones keep their slot.
pub fn set_property(parent: &SchemaNode, name: &str, schema: SchemaNode) -> SchemaNode {
    debug!(property = name, "set property");
    parent.edit_typed(|s| {
        // IndexMap::insert keeps the slot of an existing key
        s.properties.insert(name.to_string(), schema);
    })
}

/// Rename a property in place, carrying its requiredness over.
///
/// Renaming onto a name held by a different property is a no-op.
pub fn rename_property(
    parent: &SchemaNode,
    old_name: &str,
    new_name: &str,
    schema: SchemaNode,
) -> SchemaNode {
    if old_name == new_name {
        return set_property(parent, new_name, schema);
    }
    let (has_old, has_new) = parent.with_typed(
        |s| (s.properties.contains_key(old_name), s.properties.contains_key(new_name)),
        (false, false),
    );
    if !has_old || has_new {
        debug!(old_name, new_name, "rename skipped");
        return parent.clone();
    }

    debug!(old_name, new_name, "rename property");
    parent.edit_typed(|s| {
        let mut schema = Some(schema);
        s.properties = std::mem::take(&mut s.properties)
            .into_iter()
            .map(|(key, value)| {
                if key == old_name {
                    (new_name.to_string(), schema.take().unwrap_or(value))
                } else {
                    (key, value)
                }
            })
            .collect::<IndexMap<_, _>>();
        s.required = std::mem::take(&mut s.required)
            .into_iter()
            .map(|key| if key == old_name { new_name.to_string() } else { key })
            .collect::<IndexSet<_>>();
    })
}

/// Delete a property from both `properties` and `required`
pub fn remove_property(parent: &SchemaNode, name: &str) -> SchemaNode {
    let declared = parent.with_typed(
        |s| s.properties.contains_key(name) || s.required.contains(name),
        false,
    );
    if !declared {
        return parent.clone();
    }
    debug!(property = name, "remove property");
    parent.edit_typed(|s| {
        s.properties.shift_remove(name);
        s.required.shift_remove(name);
    })
}

/// Add or drop `name` from `required`. Undeclared names are ignored.
pub fn set_required(parent: &SchemaNode, name: &str, required: bool) -> SchemaNode {
    let (declared, currently) = parent.with_typed(
        |s| (s.properties.contains_key(name), s.required.contains(name)),
        (false, false),
    );
    if !declared || currently == required {
        return parent.clone();
    }
    debug!(property = name, required, "set required");
    parent.edit_typed(|s| {
        if required {
            s.required.insert(name.to_string());
        } else {
            s.required.shift_remove(name);
        }
    })
}

/// Move the property at `from_index` to `to_index`, shifting the ones between
pub fn reorder_property(parent: &SchemaNode, from_index: usize, to_index: usize) -> SchemaNode {
    let len = parent.with_typed(|s| s.properties.len(), 0);
    if from_index == to_index || from_index >= len || to_index >= len {
        return parent.clone();
    }
    debug!(from_index, to_index, "reorder property");
    parent.edit_typed(|s| s.properties.move_index(from_index, to_index))
}

/// The items schema of an array node, `{"type": "string"}` when unset
pub fn items_of(node: &SchemaNode) -> SchemaNode {
    node.with_typed(|s| s.items.clone(), None)
        .unwrap_or_else(|| SchemaNode::typed(SchemaKind::String))
}

pub fn set_items(node: &SchemaNode, schema: SchemaNode) -> SchemaNode {
    node.edit_typed(|s| s.items = Some(schema))
}

/// Change a node's type, keeping its description and unmodeled keywords.
pub fn set_kind(node: &SchemaNode, kind: SchemaKind) -> SchemaNode {
    if node.kind() == Some(kind) {
        return node.clone();
    }
    debug!(kind = %kind, "set kind");
    node.edit_typed(|s| {
        s.kind = Some(kind);
        s.retain_constraints_for(kind);
    })
}

/// Set or clear (on blank input) a node's description
pub fn set_description(node: &SchemaNode, description: &str) -> SchemaNode {
    let description = description.trim();
    let next = (!description.is_empty()).then(|| description.to_string());
    if node.description().map(str::to_string) == next {
        return node.clone();
    }
    node.edit_typed(|s| s.description = next)
}

/// Add a field from a draft, marking it required when the draft says so
pub fn add_field(parent: &SchemaNode, draft: &FieldDraft) -> SchemaNode {
    let next = set_property(parent, &draft.name, field_schema_of(draft));
    if draft.required {
        set_required(&next, &draft.name, true)
    } else {
        next
    }
}

/// Apply an edited draft to the field currently called `old_name`.
///
/// A rename that cannot happen leaves the whole parent untouched, including
/// the requiredness of whatever property already holds the new name.
pub fn edit_field(parent: &SchemaNode, old_name: &str, draft: &FieldDraft) -> SchemaNode {
    let schema = field_schema_of(draft);
    let next = if old_name != draft.name {
        let renamed = rename_property(parent, old_name, &draft.name, schema);
        if renamed.ptr_eq(parent) {
            return renamed;
        }
        renamed
    } else {
        set_property(parent, old_name, schema)
    };
    set_required(&next, &draft.name, draft.required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> SchemaNode {
        SchemaNode::from_value(json!({
            "type": "object",
            "properties": {
                "a": { "type": "string" },
                "b": { "type": "number" },
                "c": { "type": "boolean" },
                "d": { "type": "null" }
            },
            "required": ["b", "c"]
        }))
        .unwrap()
    }

    fn names(node: &SchemaNode) -> Vec<String> {
        properties_of(node).into_iter().map(|p| p.name).collect()
    }

    fn required(node: &SchemaNode) -> Vec<String> {
        node.with_typed(|s| s.required.iter().cloned().collect(), Vec::new())
    }

    #[test]
    fn test_properties_of_projection() {
        let entries = properties_of(&sample());
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[1].name, "b");
        assert!(entries[1].required);
        assert_eq!(entries[1].position, 1);
        assert!(!entries[0].required);
        assert!(properties_of(&SchemaNode::Permissive).is_empty());
        assert!(properties_of(&SchemaNode::typed(SchemaKind::Array)).is_empty());
    }

    #[test]
    fn test_set_property_appends_new() {
        let next = set_property(&sample(), "e", SchemaNode::typed(SchemaKind::String));
        assert_eq!(names(&next), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_set_property_replaces_in_place() {
        let next = set_property(&sample(), "b", SchemaNode::typed(SchemaKind::String));
        assert_eq!(names(&next), vec!["a", "b", "c", "d"]);
        assert_eq!(properties_of(&next)[1].schema.kind(), Some(SchemaKind::String));
    }

    #[test]
    fn test_set_property_idempotent() {
        let schema = SchemaNode::typed(SchemaKind::Integer);
        let once = set_property(&sample(), "x", schema.clone());
        let twice = set_property(&once, "x", schema);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_set_property_shares_untouched_children() {
        let original = sample();
        let next = set_property(&original, "e", SchemaNode::Permissive);
        let before = &properties_of(&original)[0].schema;
        let after = &properties_of(&next)[0].schema;
        assert!(before.ptr_eq(after));
        assert!(!original.ptr_eq(&next));
    }

    #[test]
    fn test_set_property_on_permissive_root() {
        let next = set_property(&SchemaNode::Permissive, "a", SchemaNode::Permissive);
        assert_eq!(names(&next), vec!["a"]);
    }

    #[test]
    fn test_rename_keeps_position_and_required() {
        let next = rename_property(&sample(), "b", "beta", SchemaNode::typed(SchemaKind::Number));
        assert_eq!(names(&next), vec!["a", "beta", "c", "d"]);
        assert_eq!(required(&next), vec!["beta", "c"]);
    }

    #[test]
    fn test_rename_missing_or_colliding_is_noop() {
        let original = sample();
        let missing = rename_property(&original, "zzz", "y", SchemaNode::Permissive);
        assert!(missing.ptr_eq(&original));
        let colliding = rename_property(&original, "a", "b", SchemaNode::Permissive);
        assert!(colliding.ptr_eq(&original));
    }

    #[test]
    fn test_remove_property() {
        let next = remove_property(&sample(), "b");
        assert_eq!(names(&next), vec!["a", "c", "d"]);
        assert_eq!(required(&next), vec!["c"]);

        let original = sample();
        assert!(remove_property(&original, "nope").ptr_eq(&original));
    }

    #[test]
    fn test_set_required_toggle() {
        let on = set_required(&sample(), "a", true);
        assert_eq!(required(&on), vec!["b", "c", "a"]);
        let off = set_required(&on, "a", false);
        assert_eq!(required(&off), vec!["b", "c"]);
        assert_eq!(names(&off), names(&sample()));
    }

    #[test]
    fn test_set_required_undeclared_is_noop() {
        let original = sample();
        assert!(set_required(&original, "ghost", true).ptr_eq(&original));
    }

    #[test]
    fn test_reorder_shifts_between() {
        let forward = reorder_property(&sample(), 0, 2);
        assert_eq!(names(&forward), vec!["b", "c", "a", "d"]);
        let backward = reorder_property(&sample(), 3, 1);
        assert_eq!(names(&backward), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_reorder_inverse() {
        let original = sample();
        for (i, j) in [(0, 3), (1, 2), (3, 0)] {
            let there = reorder_property(&original, i, j);
            let back = reorder_property(&there, j, i);
            assert_eq!(back, original);
        }
    }

    #[test]
    fn test_reorder_out_of_range_is_noop() {
        let original = sample();
        assert!(reorder_property(&original, 0, 4).ptr_eq(&original));
        assert!(reorder_property(&original, 2, 2).ptr_eq(&original));
    }

    #[test]
    fn test_items_default_and_set() {
        let array = SchemaNode::typed(SchemaKind::Array);
        assert_eq!(items_of(&array), SchemaNode::typed(SchemaKind::String));
        let next = set_items(&array, SchemaNode::typed(SchemaKind::Number));
        assert_eq!(items_of(&next).kind(), Some(SchemaKind::Number));
    }

    #[test]
    fn test_field_schema_of_filters_constraints() {
        let validation = SchemaNode::from_value(json!({
            "type": "number",
            "description": "ignored",
            "minLength": 2,
            "minimum": 1
        }))
        .unwrap();
        let draft = FieldDraft::new("name", SchemaKind::String)
            .description("  Display name ")
            .validation(validation);
        let schema = field_schema_of(&draft).to_value();
        assert_eq!(
            schema,
            json!({ "type": "string", "description": "Display name", "minLength": 2 })
        );
    }

    #[test]
    fn test_set_kind_drops_foreign_constraints() {
        let node = SchemaNode::from_value(json!({
            "type": "string",
            "description": "keep me",
            "minLength": 3,
            "enum": ["abc"]
        }))
        .unwrap();
        let next = set_kind(&node, SchemaKind::Number);
        assert_eq!(next.to_value(), json!({ "type": "number", "description": "keep me" }));
    }

    #[test]
    fn test_edit_field_flow() {
        let draft = FieldDraft::new("alpha", SchemaKind::Integer).required(true);
        let next = edit_field(&sample(), "a", &draft);
        assert_eq!(names(&next), vec!["alpha", "b", "c", "d"]);
        assert_eq!(required(&next), vec!["b", "c", "alpha"]);
    }

    #[test]
    fn test_edit_field_onto_taken_name_is_noop() {
        let original = sample();
        let draft = FieldDraft::new("b", SchemaKind::String).required(false);
        let next = edit_field(&original, "a", &draft);
        assert!(next.ptr_eq(&original));
        assert_eq!(required(&next), vec!["b", "c"]);

        let missing = edit_field(&original, "ghost", &FieldDraft::new("d", SchemaKind::String));
        assert!(missing.ptr_eq(&original));
    }

    #[test]
    fn test_add_field_flow() {
        let draft = FieldDraft::new("e", SchemaKind::String).required(true);
        let next = add_field(&sample(), &draft);
        assert_eq!(names(&next).last().map(String::as_str), Some("e"));
        assert!(properties_of(&next)[4].required);
    }

    #[test]
    fn test_set_description() {
        let node = set_description(&SchemaNode::typed(SchemaKind::String), "hello");
        assert_eq!(node.description(), Some("hello"));
        let cleared = set_description(&node, "   ");
        assert_eq!(cleared.description(), None);
    }
}
