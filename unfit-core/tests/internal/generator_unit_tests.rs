use super::*;
use serde_json::json;
use unfit_test_support::{check_conforming, sample, sample_many};

fn strategy(schema: &JsonValue) -> BoxedStrategy<JsonValue> {
    from_schema(schema, &GeneratorConfig::default()).expect("strategy")
}

fn generation_error(schema: JsonValue) -> GenerationError {
    from_schema(&schema, &GeneratorConfig::default()).expect_err("generation error")
}

fn object(value: JsonValue) -> JsonObject {
    value.as_object().cloned().expect("schema object")
}

#[test]
fn scalar_schemas_generate_conforming_values() {
    for schema in [
        json!({ "type": "null" }),
        json!({ "type": "boolean" }),
        json!({ "type": "integer", "minimum": 0, "maximum": 5 }),
        json!({ "type": "integer", "exclusiveMinimum": 0, "exclusiveMaximum": 5 }),
        json!({ "type": "integer", "multipleOf": 3, "minimum": -10 }),
        json!({ "type": "number", "minimum": 0.5, "maximum": 0.75 }),
        json!({ "type": "number", "multipleOf": 2 }),
        json!({ "type": "string", "minLength": 2, "maxLength": 5 }),
        json!({ "type": "string", "minLength": 2, "maxLength": 5, "pattern": "a{5}" }),
        json!({ "type": ["integer", "string"], "minimum": 10 }),
        json!({ "enum": [1, "two", null] }),
        json!({ "const": { "nested": [1, 2] } }),
        json!({ "minimum": 3 }),
    ] {
        check_conforming(&schema, &strategy(&schema));
    }
}

#[test]
fn negated_schemas_generate_conforming_values() {
    for schema in [
        json!({ "not": { "type": "integer", "minimum": 0 } }),
        json!({ "not": { "type": "number" } }),
        json!({ "not": { "enum": [1, 2, 3] } }),
        json!({ "not": { "type": "object" } }),
        json!({ "not": { "type": "array", "items": { "type": "null" } } }),
        json!({ "type": "integer", "not": { "multipleOf": 2 } }),
    ] {
        check_conforming(&schema, &strategy(&schema));
    }
}

#[test]
fn composite_schemas_generate_conforming_values() {
    for schema in [
        json!({
            "type": "object",
            "properties": {
                "key": { "not": { "type": "integer" } },
                "values": { "type": "object", "properties": { "inner": { "type": "string" } } }
            },
            "required": ["key", "values"],
            "additionalProperties": false
        }),
        json!({ "type": "object", "required": ["free"] }),
        json!({ "type": "array", "items": { "type": "integer" }, "minItems": 2, "maxItems": 3 }),
        json!({ "type": "array", "items": [{ "type": "null" }, { "type": "string" }] }),
        json!({
            "type": "array",
            "items": [{ "type": "null" }],
            "additionalItems": false
        }),
        json!({ "type": "array", "items": { "type": "boolean" }, "uniqueItems": true }),
        json!({ "type": "array", "contains": { "const": 7 } }),
        json!({ "anyOf": [{ "type": "string" }, { "type": "null" }] }),
        json!({ "oneOf": [{ "type": "integer" }, { "type": "boolean" }] }),
        json!(true),
    ] {
        check_conforming(&schema, &strategy(&schema));
    }
}

#[test]
fn tuple_items_always_fill_every_slot() {
    let schema = json!({ "type": "array", "items": [{ "type": "null" }, true] });
    for value in sample_many(&strategy(&schema), 16) {
        let values = value.as_array().expect("array");
        assert!(values.len() >= 2, "{value}");
        assert_eq!(values[0], JsonValue::Null);
    }
}

#[test]
fn required_properties_are_always_present() {
    let schema = json!({
        "type": "object",
        "properties": { "a": { "type": "null" }, "b": { "type": "boolean" } },
        "required": ["a"]
    });
    for value in sample_many(&strategy(&schema), 16) {
        assert_eq!(value.get("a"), Some(&JsonValue::Null));
    }
}

#[test]
fn negation_without_other_keywords_prefers_excluded_kinds() {
    let schema = json!({ "not": { "type": "integer" } });
    let values = sample_many(&strategy(&schema), 32);
    assert!(values.iter().all(|value| !value.is_i64() && !value.is_u64()));
}

#[test]
fn const_is_generated_verbatim() {
    let schema = json!({ "const": "fixed" });
    assert_eq!(sample(&strategy(&schema)), json!("fixed"));
}

#[test]
fn unsatisfiable_schemas_report_reason() {
    assert!(matches!(
        generation_error(json!(false)),
        GenerationError::Unsatisfiable { .. }
    ));
    assert!(matches!(
        generation_error(json!({ "not": {} })),
        GenerationError::Unsatisfiable { .. }
    ));
    assert!(matches!(
        generation_error(json!({ "type": "integer", "enum": ["a"] })),
        GenerationError::Unsatisfiable { .. }
    ));
    assert!(matches!(
        generation_error(json!({ "type": "integer", "minimum": 5, "maximum": 4 })),
        GenerationError::Unsatisfiable { .. }
    ));
    assert!(matches!(
        generation_error(json!({ "type": "string", "minLength": 3, "maxLength": 2 })),
        GenerationError::Unsatisfiable { .. }
    ));
    assert!(matches!(
        generation_error(json!({ "type": "array", "items": false, "minItems": 1 })),
        GenerationError::Unsatisfiable { .. }
    ));
    let error = generation_error(json!({
        "type": "object",
        "properties": { "a": false },
        "required": ["a"]
    }));
    assert!(error.to_string().contains("property 'a'"), "{error}");
}

#[test]
fn unsupported_schemas_report_reason() {
    let error = generation_error(json!({ "$ref": "#/definitions/a" }));
    assert!(matches!(error, GenerationError::UnsupportedSchema { .. }));
    assert!(error.to_string().contains("'$ref'"));
    assert!(matches!(
        generation_error(json!({ "type": 5 })),
        GenerationError::UnsupportedSchema { .. }
    ));
    assert!(matches!(
        generation_error(json!({ "type": "string", "pattern": "(" })),
        GenerationError::UnsupportedSchema { .. }
    ));
    let error = generation_error(json!("string"));
    assert!(error.to_string().contains("object or boolean"));
}

#[test]
fn multi_type_drops_only_unsatisfiable_branches() {
    let schema = json!({ "type": ["integer", "string"], "minimum": 5, "maximum": 4 });
    for value in sample_many(&strategy(&schema), 8) {
        assert!(value.is_string(), "{value}");
    }
}

#[test]
fn numeric_bounds_pick_the_tighter_exclusive_form() {
    let bounds = NumericBounds::from_schema(&object(json!({
        "minimum": 0,
        "exclusiveMinimum": 5,
        "maximum": 10,
        "exclusiveMaximum": 20
    })));
    assert_eq!(bounds.integer_range(), Some((6, 10)));
    assert!(!bounds.admits(5.0));
    assert!(bounds.admits(10.0));

    let draft4 = NumericBounds::from_schema(&object(json!({
        "minimum": 1,
        "exclusiveMinimum": true
    })));
    assert_eq!(draft4.integer_range(), Some((2, 2 + NUMBER_SPAN as i64)));
}

#[test]
fn ceil_div_rounds_towards_positive_infinity() {
    assert_eq!(ceil_div(7, 3), 3);
    assert_eq!(ceil_div(-7, 3), -2);
    assert_eq!(ceil_div(6, 3), 2);
}

#[test]
fn dedup_values_keeps_first_occurrence() {
    let mut values = vec![json!(1), json!(true), json!(1), json!(false), json!(true)];
    dedup_values(&mut values);
    assert_eq!(values, vec![json!(1), json!(true), json!(false)]);
}

#[test]
fn union_branches_merge_properties_and_required() {
    let schema = object(json!({
        "type": "object",
        "properties": { "a": { "type": "null" } },
        "required": ["a"],
        "anyOf": [
            { "properties": { "b": { "type": "null" } }, "required": ["b"] },
            false
        ]
    }));
    let branches = union_branches(&schema).expect("branches").expect("anyOf");
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0]["required"], json!(["a", "b"]));
    assert!(branches[0]["properties"].get("b").is_some());
    assert!(branches[0].get("anyOf").is_none());
}

#[test]
fn excluded_kinds_follow_declared_type() {
    assert_eq!(
        JsonKind::excluded_by(&json!({ "type": ["number", "string", "array", "object"] })),
        vec![JsonKind::Null, JsonKind::Boolean]
    );
    assert!(JsonKind::excluded_by(&json!({ "enum": [1] })).is_empty());
    assert!(JsonKind::excluded_by(&json!({ "type": "integer" })).contains(&JsonKind::Fraction));
}
