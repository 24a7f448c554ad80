//! Inference Tests
//!
//! Infers schemas from the order sample and checks the result is one the
//! editor and validator accept.

use familiar_schema_builder::{
    build_validation_tree, infer_from_samples, infer_schema, properties_of, validate_json,
    InferenceConfig, Inferrer, MessageCatalog, SchemaNode,
};
use serde_json::{json, Value};

fn order_sample() -> Value {
    serde_json::from_str(include_str!("fixtures/order_sample.json")).unwrap()
}

fn names(node: &SchemaNode) -> Vec<String> {
    properties_of(node).into_iter().map(|p| p.name).collect()
}

// =============================================================================
// Single Document
// =============================================================================

#[test]
fn test_top_level_shape() {
    let schema = infer_schema(&order_sample());
    assert_eq!(
        names(&schema),
        vec!["orderId", "placedAt", "customer", "lines", "notes", "tags"]
    );
    let value = schema.to_value();
    assert_eq!(value["type"], json!("object"));
    assert_eq!(
        value["required"],
        json!(["orderId", "placedAt", "customer", "lines", "notes", "tags"])
    );
}

#[test]
fn test_string_formats_detected() {
    let value = infer_schema(&order_sample()).to_value();
    assert_eq!(value["properties"]["orderId"]["format"], json!("uuid"));
    assert_eq!(value["properties"]["placedAt"]["format"], json!("date-time"));
    assert_eq!(
        value["properties"]["customer"]["properties"]["email"]["format"],
        json!("email")
    );
    assert!(value["properties"]["customer"]["properties"]["name"]
        .get("format")
        .is_none());
}

#[test]
fn test_array_elements_merge() {
    let value = infer_schema(&order_sample()).to_value();
    let line = &value["properties"]["lines"]["items"];
    assert_eq!(line["type"], json!("object"));
    assert_eq!(line["required"], json!(["sku", "quantity", "price"]));
    assert_eq!(line["properties"]["gift"], json!({ "type": "boolean" }));
    assert_eq!(line["properties"]["price"], json!({ "type": "number" }));
}

#[test]
fn test_null_and_empty_array() {
    let value = infer_schema(&order_sample()).to_value();
    assert_eq!(value["properties"]["notes"], json!({ "type": "null" }));
    assert_eq!(
        value["properties"]["tags"],
        json!({ "type": "array", "items": true })
    );
}

#[test]
fn test_integer_option_applies_to_whole_numbers_only() {
    let config = InferenceConfig {
        integers: true,
        ..InferenceConfig::default()
    };
    let value = Inferrer::new(config).infer(&order_sample()).to_value();
    let line = &value["properties"]["lines"]["items"]["properties"];
    assert_eq!(line["quantity"]["type"], json!("integer"));
    assert_eq!(line["price"]["type"], json!("number"));
}

#[test]
fn test_format_detection_can_be_disabled() {
    let config = InferenceConfig {
        detect_formats: false,
        ..InferenceConfig::default()
    };
    let value = Inferrer::new(config).infer(&order_sample()).to_value();
    assert_eq!(value["properties"]["orderId"], json!({ "type": "string" }));
}

// =============================================================================
// Round Trip Through the Other Engines
// =============================================================================

#[test]
fn test_sample_validates_against_inferred_schema() {
    let schema = infer_schema(&order_sample());
    let result = validate_json(include_str!("fixtures/order_sample.json"), &schema);
    assert!(result.valid, "unexpected errors: {:?}", result.errors);
}

#[test]
fn test_time_and_date_samples_validate_against_inferred_schema() {
    let text = r#"{"opens": "10:30:00", "closes": "18:00:00Z", "on": "2024-05-01", "bad": "2024-13-45"}"#;
    let sample: Value = serde_json::from_str(text).unwrap();
    let schema = infer_schema(&sample);
    let value = schema.to_value();

    assert!(value["properties"]["opens"].get("format").is_none());
    assert_eq!(value["properties"]["closes"]["format"], json!("time"));
    assert_eq!(value["properties"]["on"]["format"], json!("date"));
    assert!(value["properties"]["bad"].get("format").is_none());

    let result = validate_json(text, &schema);
    assert!(result.valid, "unexpected errors: {:?}", result.errors);
}

#[test]
fn test_inferred_schema_has_no_conflicts() {
    let schema = infer_schema(&order_sample());
    let tree = build_validation_tree(&schema, &MessageCatalog::default());
    assert_eq!(tree.total_errors(), 0);
}

#[test]
fn test_inferred_schema_reloads_unchanged() {
    let schema = infer_schema(&order_sample());
    let reloaded = SchemaNode::from_json_str(&schema.to_json_pretty().unwrap()).unwrap();
    assert_eq!(reloaded, schema);
}

// =============================================================================
// Multiple Samples
// =============================================================================

#[test]
fn test_samples_union_members() {
    let mut second = order_sample();
    let object = second.as_object_mut().unwrap();
    object.remove("notes");
    object.insert("coupon".to_string(), json!("SPRING"));

    let schema = infer_from_samples(&[order_sample(), second]);
    let value = schema.to_value();

    assert_eq!(
        names(&schema),
        vec!["orderId", "placedAt", "customer", "lines", "notes", "tags", "coupon"]
    );
    assert_eq!(
        value["required"],
        json!(["orderId", "placedAt", "customer", "lines", "tags"])
    );
}

#[test]
fn test_disagreeing_samples_are_permissive() {
    let mut second = order_sample();
    second["notes"] = json!("leave at door");

    let schema = infer_from_samples(&[order_sample(), second]);
    assert_eq!(schema.to_value()["properties"]["notes"], json!(true));
}
