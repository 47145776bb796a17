use super::*;
use proptest::test_runner::TestError;
use serde_json::json;
use unfit_test_support::{assert_not_valid, sample_many, seeded_runner};

fn abort_reason(instances: &NegativeInstances) -> String {
    let mut runner = seeded_runner(11);
    match runner.run(instances, |_| Ok(())) {
        Err(TestError::Abort(reason)) => reason.message().to_string(),
        other => panic!("expected abort, got {other:?}"),
    }
}

#[test]
fn new_rejects_empty_schema() {
    let error = NegativeInstances::new(&json!({}), &NegationConfig::default())
        .expect_err("unsatisfiable");
    assert_eq!(error, NegationError::Unsatisfiable);
    assert!(error.to_string().starts_with(UNSATISFIABLE));
}

#[test]
fn new_rejects_unknown_dialect() {
    let schema = json!({ "$schema": "https://example.com/unknown", "type": "integer" });
    let error = NegativeInstances::new(&schema, &NegationConfig::default())
        .expect_err("unknown dialect");
    assert!(matches!(error, NegationError::UnknownDialect(_)));
}

#[test]
fn new_respects_limit() {
    let schema = json!({
        "type": "object",
        "properties": { "a": { "type": "null" }, "b": { "type": "null" } },
        "required": ["a", "b"]
    });
    let config = NegationConfig::default().with_limit(2);
    let instances = NegativeInstances::new(&schema, &config).expect("instances");
    assert_eq!(instances.schemas().len(), 2);
    let config = NegationConfig::default().with_limit(0);
    assert_eq!(
        NegativeInstances::new(&schema, &config).expect_err("limit zero"),
        NegationError::Unsatisfiable
    );
}

#[test]
fn draws_cover_every_candidate_schema() {
    let schema = json!({
        "type": "object",
        "properties": { "a": { "type": "null" }, "b": { "type": "boolean" } },
        "required": ["a", "b"],
        "additionalProperties": false
    });
    let instances = not_from_schema(&schema);
    assert_eq!(instances.schemas().len(), 3);
    let values = sample_many(&instances, 64);
    let bad_a = values.iter().any(|value| !value["a"].is_null());
    let bad_b = values.iter().any(|value| !value["b"].is_boolean());
    assert!(bad_a && bad_b);
    for value in &values {
        assert_not_valid(&schema, value);
    }
}

#[test]
fn schema_strategy_rejects_out_of_range_index() {
    let instances = not_from_schema(&json!({ "type": "null" }));
    assert!(instances.schema_strategy(0).is_ok());
    assert_eq!(
        instances.schema_strategy(1).expect_err("out of range"),
        NegationError::Unsatisfiable
    );
}

#[test]
fn true_schema_flips_to_ungeneratable_false() {
    let instances = not_from_schema(&json!(true));
    assert_eq!(instances.schemas(), &[json!(false)]);
    let error = instances.schema_strategy(0).expect_err("false schema");
    assert!(matches!(
        error,
        NegationError::Generation(GenerationError::Unsatisfiable { .. })
    ));
    assert!(error.to_string().starts_with(UNSATISFIABLE));
}

#[test]
fn runner_aborts_on_unsatisfiable_schema() {
    let mut runner = seeded_runner(7);
    let result = runner.run(&not_from_schema(&json!({})), |_| Ok(()));
    match result {
        Err(TestError::Abort(reason)) => {
            assert!(reason.message().starts_with(UNSATISFIABLE), "{reason}");
        }
        other => panic!("expected abort, got {other:?}"),
    }
}

#[test]
fn debug_reports_candidate_count() {
    let debug = format!("{:?}", not_from_schema(&json!({ "type": "string" })));
    assert!(debug.contains("schemas: 1"), "{debug}");
}

#[test]
fn unknown_dialect_aborts_with_its_own_reason() {
    let schema = json!({ "$schema": "https://example.com/unknown", "type": "integer" });
    let instances = not_from_schema(&schema);
    assert!(matches!(
        instances.failure(),
        Some(NegationError::UnknownDialect(_))
    ));
    let reason = abort_reason(&instances);
    assert!(reason.contains("unknown schema version"), "{reason}");
    assert!(!reason.starts_with(UNSATISFIABLE), "{reason}");
}

#[test]
fn empty_schema_failure_is_recorded() {
    let instances = not_from_schema(&json!({}));
    assert_eq!(instances.failure(), Some(&NegationError::Unsatisfiable));
    assert!(abort_reason(&instances).starts_with(UNSATISFIABLE));
}

#[test]
fn dialect_override_replaces_schema_declaration() {
    let schema = json!({ "type": "integer", "minimum": 0, "exclusiveMinimum": true });
    let config = NegationConfig::default().with_dialect(crate::Dialect::Draft4);
    let instances = NegativeInstances::new(&schema, &config).expect("instances");
    let validator = crate::Dialect::Draft4.compile(&schema).expect("draft 4 schema");
    for value in sample_many(&instances, 32) {
        assert!(!validator.is_valid(&value), "{value}");
    }

    let declared = json!({ "$schema": "https://example.com/unknown", "type": "null" });
    let config = NegationConfig::default().with_dialect(crate::Dialect::Draft7);
    assert!(NegativeInstances::new(&declared, &config).is_ok());
}

#[test]
fn candidate_generators_are_built_once() {
    let instances = not_from_schema(&json!({ "type": "string", "minLength": 3 }));
    assert!(instances.strategies[0].get().is_none());
    instances.schema_strategy(0).expect("strategy");
    assert!(instances.strategies[0].get().is_some());
    let cloned = instances.clone();
    assert!(cloned.strategies[0].get().is_some());
    assert_eq!(sample_many(&cloned, 8).len(), 8);
}
