//! Editing Session Tests
//!
//! Drives the edit operations the way the visual editor does: a sequence of
//! field additions, renames, reorders and deletions against one schema value.

use familiar_schema_builder::{
    add_field, edit_field, items_of, properties_of, remove_property, rename_property,
    reorder_property, set_items, set_kind, set_property, set_required, FieldDraft, SchemaKind,
    SchemaNode,
};
use serde_json::json;

fn user_profile() -> SchemaNode {
    SchemaNode::from_json_str(include_str!("fixtures/user_profile.schema.json")).unwrap()
}

fn names(node: &SchemaNode) -> Vec<String> {
    properties_of(node).into_iter().map(|p| p.name).collect()
}

fn required(node: &SchemaNode) -> Vec<String> {
    node.with_typed(|s| s.required.iter().cloned().collect(), Vec::new())
}

// =============================================================================
// Order Invariants
// =============================================================================

#[test]
fn test_fixture_order_is_document_order() {
    assert_eq!(
        names(&user_profile()),
        vec!["id", "name", "email", "age", "roles", "address"]
    );
}

#[test]
fn test_new_property_lands_last() {
    let schema = set_property(&user_profile(), "createdAt", SchemaNode::typed(SchemaKind::String));
    let entries = properties_of(&schema);
    assert_eq!(entries.last().unwrap().name, "createdAt");
    assert_eq!(entries.last().unwrap().position, 6);
}

#[test]
fn test_rename_preserves_every_index() {
    let before = names(&user_profile());
    let schema = rename_property(
        &user_profile(),
        "email",
        "contactEmail",
        SchemaNode::typed(SchemaKind::String),
    );
    let after = names(&schema);

    assert_eq!(after.len(), before.len());
    for (i, (old, new)) in before.iter().zip(&after).enumerate() {
        if old == "email" {
            assert_eq!(new, "contactEmail", "renamed entry moved from index {}", i);
        } else {
            assert_eq!(old, new, "entry at index {} moved", i);
        }
    }
    assert_eq!(required(&schema), vec!["id", "name", "contactEmail"]);
}

#[test]
fn test_reorder_round_trip_every_pair() {
    let original = user_profile();
    let len = properties_of(&original).len();
    for i in 0..len {
        for j in 0..len {
            if i == j {
                continue;
            }
            let moved = reorder_property(&original, i, j);
            assert_eq!(names(&moved)[j], names(&original)[i]);
            assert_eq!(reorder_property(&moved, j, i), original, "pair ({}, {})", i, j);
        }
    }
}

#[test]
fn test_remove_after_set_clears_required() {
    let with_x = add_field(&user_profile(), &FieldDraft::new("x", SchemaKind::Boolean).required(true));
    assert!(required(&with_x).contains(&"x".to_string()));

    let without = remove_property(&with_x, "x");
    assert!(!names(&without).contains(&"x".to_string()));
    assert!(!required(&without).contains(&"x".to_string()));
}

#[test]
fn test_required_toggle_round_trip() {
    let on = set_required(&user_profile(), "age", true);
    let off = set_required(&on, "age", false);
    assert!(!required(&off).contains(&"age".to_string()));
    assert_eq!(off, user_profile());
}

// =============================================================================
// Identity and Sharing
// =============================================================================

#[test]
fn test_noop_edits_keep_identity() {
    let schema = user_profile();
    assert!(remove_property(&schema, "missing").ptr_eq(&schema));
    assert!(set_required(&schema, "missing", true).ptr_eq(&schema));
    assert!(reorder_property(&schema, 9, 0).ptr_eq(&schema));
}

#[test]
fn test_edit_shares_unchanged_subtrees() {
    let schema = user_profile();
    let edited = set_required(&schema, "age", true);
    let before = properties_of(&schema);
    let after = properties_of(&edited);
    for (a, b) in before.iter().zip(&after) {
        assert!(a.schema.ptr_eq(&b.schema), "{} was copied", a.name);
    }
}

#[test]
fn test_unmodeled_keywords_survive_edits() {
    let edited = set_property(&user_profile(), "nickname", SchemaNode::typed(SchemaKind::String));
    let value = edited.to_value();
    assert_eq!(value["title"], json!("UserProfile"));
    assert_eq!(value["additionalProperties"], json!(false));
}

// =============================================================================
// Nested Editing
// =============================================================================

#[test]
fn test_nested_object_edit() {
    let schema = user_profile();
    let address = properties_of(&schema)[5].schema.clone();
    let address = rename_property(&address, "zip", "postcode", SchemaNode::typed(SchemaKind::String));
    let address = reorder_property(&address, 2, 0);
    let schema = set_property(&schema, "address", address);

    let address = &properties_of(&schema)[5];
    assert_eq!(address.name, "address");
    assert_eq!(names(&address.schema), vec!["postcode", "street", "city"]);
}

#[test]
fn test_array_items_retype() {
    let schema = user_profile();
    let roles = properties_of(&schema)[4].schema.clone();
    let items = set_kind(&items_of(&roles), SchemaKind::Integer);
    let roles = set_items(&roles, items);

    assert_eq!(roles.to_value()["items"], json!({ "type": "integer" }));
    assert_eq!(roles.to_value()["uniqueItems"], json!(true));
}

#[test]
fn test_edit_field_changes_type_in_place() {
    let draft = FieldDraft::new("age", SchemaKind::Number)
        .description("Age in years")
        .required(true);
    let schema = edit_field(&user_profile(), "age", &draft);

    let age = &properties_of(&schema)[3];
    assert_eq!(age.name, "age");
    assert!(age.required);
    assert_eq!(
        age.schema.to_value(),
        json!({ "type": "number", "description": "Age in years" })
    );
}
