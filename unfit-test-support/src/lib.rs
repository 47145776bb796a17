use std::fmt;

use ctor::ctor;
use jsonschema::{Draft, Validator};
use proptest::strategy::{Strategy, ValueTree};
use proptest::test_runner::{Config as ProptestConfig, RngAlgorithm, TestRng, TestRunner};
use serde_json::Value as JsonValue;

#[ctor]
fn init_test_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default())
        .is_test(true)
        .try_init();
}

/// Number of trials run by [`check_schema`].
pub const TRIALS: u32 = 64;

/// Validator for the draft named by `$schema`, draft 7 when absent.
pub fn validator(schema: &JsonValue) -> Validator {
    jsonschema::options()
        .with_draft(draft_of(schema))
        .build(schema)
        .expect("schema compiles")
}

/// Draft named by a root `$schema`; unknown or missing URIs mean draft 7.
pub fn draft_of(schema: &JsonValue) -> Draft {
    let schema_id = schema
        .get("$schema")
        .and_then(JsonValue::as_str)
        .unwrap_or_default();
    let schema_id = schema_id.trim().trim_end_matches('#');
    match schema_id.split_once("://").map(|(_, rest)| rest) {
        Some("json-schema.org/draft-04/schema") => Draft::Draft4,
        Some("json-schema.org/draft-06/schema") => Draft::Draft6,
        Some("json-schema.org/draft/2019-09/schema") => Draft::Draft201909,
        Some("json-schema.org/draft/2020-12/schema") => Draft::Draft202012,
        _ => Draft::Draft7,
    }
}

pub fn assert_not_valid(schema: &JsonValue, instance: &JsonValue) {
    assert!(
        !validator(schema).is_valid(instance),
        "instance {instance} unexpectedly matches schema {schema}"
    );
}

pub fn assert_valid(schema: &JsonValue, instance: &JsonValue) {
    if let Err(error) = validator(schema).validate(instance) {
        panic!("instance {instance} does not match schema {schema}: {error}");
    }
}

pub fn seeded_runner(seed: u64) -> TestRunner {
    let config = ProptestConfig {
        cases: TRIALS,
        rng_algorithm: RngAlgorithm::ChaCha,
        failure_persistence: None,
        ..ProptestConfig::default()
    };
    let rng = TestRng::from_seed(config.rng_algorithm, &seed_bytes(seed, 32));
    TestRunner::new_with_rng(config, rng)
}

fn seed_bytes(seed: u64, len: usize) -> Vec<u8> {
    let bytes = seed.to_le_bytes();
    let mut output = Vec::with_capacity(len);
    while output.len() < len {
        output.extend_from_slice(&bytes);
    }
    output.truncate(len);
    output
}

pub fn sample<S>(strategy: &S) -> S::Value
where
    S: Strategy,
    S::Value: fmt::Debug,
{
    let mut runner = TestRunner::deterministic();
    strategy
        .new_tree(&mut runner)
        .expect("value tree")
        .current()
}

pub fn sample_many<S>(strategy: &S, count: usize) -> Vec<S::Value>
where
    S: Strategy,
    S::Value: fmt::Debug,
{
    let mut runner = TestRunner::deterministic();
    (0..count)
        .map(|_| {
            strategy
                .new_tree(&mut runner)
                .expect("value tree")
                .current()
        })
        .collect()
}

/// Runs a trial loop asserting every drawn instance is invalid against `schema`.
pub fn check_schema<S>(schema: &JsonValue, strategy: &S)
where
    S: Strategy<Value = JsonValue>,
{
    let validator = validator(schema);
    let mut runner = seeded_runner(0x5eed);
    let result = runner.run(strategy, |instance| {
        proptest::prop_assert!(
            !validator.is_valid(&instance),
            "instance {} matches schema {}",
            instance,
            schema
        );
        Ok(())
    });
    if let Err(error) = result {
        panic!("negative generation failed for {schema}: {error}");
    }
}

/// Runs a trial loop asserting every drawn instance is valid against `schema`.
pub fn check_conforming<S>(schema: &JsonValue, strategy: &S)
where
    S: Strategy<Value = JsonValue>,
{
    let validator = validator(schema);
    let mut runner = seeded_runner(0xc0de);
    let result = runner.run(strategy, |instance| {
        proptest::prop_assert!(
            validator.is_valid(&instance),
            "instance {} does not match schema {}",
            instance,
            schema
        );
        Ok(())
    });
    if let Err(error) = result {
        panic!("generation failed for {schema}: {error}");
    }
}
