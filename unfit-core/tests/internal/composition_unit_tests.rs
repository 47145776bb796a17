use super::*;
use serde_json::json;

fn required_integers(count: usize) -> JsonValue {
    let mut properties = crate::JsonObject::new();
    let mut required = Vec::new();
    for idx in 0..count {
        let name = format!("key{idx}");
        properties.insert(name.clone(), json!({ "type": "integer" }));
        required.push(JsonValue::String(name));
    }
    json!({ "type": "object", "properties": properties, "required": required })
}

#[test]
fn apply_combination_runs_left_to_right() {
    let schema = json!({ "type": "integer" });
    let negate = Mutation::Negate;
    let mutated = apply_combination(&schema, &[&negate, &negate]).expect("negations apply");
    assert_eq!(mutated, json!({ "not": { "not": { "type": "integer" } } }));
}

#[test]
fn apply_combination_reports_lost_coordinate() {
    let schema = json!({ "type": "object", "properties": { "a": {} } });
    let replace = Mutation::ReplaceProperty {
        name: "a".to_string(),
        value: json!(true),
    };
    assert!(apply_combination(&schema, &[&replace]).is_some());
    assert!(apply_combination(&schema, &[&Mutation::Negate, &replace]).is_none());
}

#[test]
fn combinations_grow_by_size() {
    let schema = required_integers(3);
    let mutations = derive_mutations(&schema);
    assert_eq!(mutations.len(), 3);
    let schemas: Vec<JsonValue> = MutatedSchemas::new(&schema, &mutations).collect();
    assert_eq!(schemas.len(), 7);
    let negated_keys = |schema: &JsonValue| -> Vec<String> {
        schema["properties"]
            .as_object()
            .expect("properties")
            .iter()
            .filter(|(_, value)| value.get("not").is_some())
            .map(|(name, _)| name.clone())
            .collect()
    };
    let observed: Vec<Vec<String>> = schemas.iter().map(negated_keys).collect();
    assert_eq!(
        observed,
        vec![
            vec!["key0"],
            vec!["key1"],
            vec!["key2"],
            vec!["key0", "key1"],
            vec!["key0", "key2"],
            vec!["key1", "key2"],
            vec!["key0", "key1", "key2"],
        ]
    );
}

#[test]
fn limit_stops_mid_size_class() {
    let schema = required_integers(8);
    assert_eq!(derive_mutations(&schema).len(), 8);
    assert_eq!(mutated_schemas(&schema, 100).len(), 100);
    assert_eq!(mutated_schemas(&schema, 300).len(), 255);
    assert_eq!(mutated_schemas(&schema, 10).len(), 10);
}

#[test]
fn zero_limit_produces_nothing() {
    assert!(mutated_schemas(&json!({ "type": "integer" }), 0).is_empty());
}

#[test]
fn inapplicable_combinations_do_not_count() {
    let schema = json!({
        "type": ["null", "object"],
        "properties": { "a": { "type": "integer" } },
        "required": ["a"]
    });
    let schemas = mutated_schemas(&schema, DEFAULT_LIMIT);
    assert_eq!(schemas.len(), 2);
    assert_eq!(schemas[0], json!({ "not": schema }));
    assert_eq!(schemas[1]["properties"]["a"], json!({ "not": { "type": "integer" } }));
}

#[test]
fn enumeration_is_lazy() {
    let schema = required_integers(40);
    let mutations = derive_mutations(&schema);
    let first: Vec<JsonValue> = MutatedSchemas::new(&schema, &mutations).take(3).collect();
    assert_eq!(first.len(), 3);
}
