//! The negative-instance strategy.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use proptest::prelude::*;
use proptest::sample::Index;
use proptest::strategy::{NewTree, ValueTree};
use proptest::test_runner::TestRunner;
use serde_json::Value as JsonValue;

use crate::composition::mutated_schemas;
use crate::generator::{from_schema_in, GenerationError};
use crate::validation::Dialect;
use crate::{GeneratorConfig, NegationConfig};

/// Prefix of every proptest rejection reason raised for schemas that cannot
/// be negated.
pub const UNSATISFIABLE: &str = "unsatisfiable";

/// Errors emitted while preparing negative instances.
#[derive(Clone, Debug, PartialEq)]
pub enum NegationError {
    /// No mutation of the schema exists, so no instance can be proven invalid.
    Unsatisfiable,
    /// The schema declares a `$schema` this crate does not know.
    UnknownDialect(String),
    /// A mutated schema could not be turned into a generator.
    Generation(GenerationError),
}

impl fmt::Display for NegationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegationError::Unsatisfiable => {
                write!(f, "{UNSATISFIABLE}: schema cannot be negated")
            }
            NegationError::UnknownDialect(reason) => write!(f, "{reason}"),
            NegationError::Generation(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for NegationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NegationError::Generation(error) => Some(error),
            _ => None,
        }
    }
}

impl From<GenerationError> for NegationError {
    fn from(error: GenerationError) -> Self {
        NegationError::Generation(error)
    }
}

/// Strategy producing JSON values that do not match a schema.
///
/// Each draw picks one mutated schema uniformly at random, then generates a
/// value valid against it. When the schema cannot be negated, drawing fails
/// with a reason starting with [`UNSATISFIABLE`], which a proptest runner
/// reports as an aborted run instead of a panic. Other preparation errors,
/// such as an unknown `$schema`, abort with their own message.
///
/// The generator for each candidate is built on first use and reused by
/// later draws.
#[derive(Clone)]
pub struct NegativeInstances {
    schemas: Rc<[JsonValue]>,
    strategies: Rc<[OnceCell<CandidateStrategy>]>,
    failure: Option<NegationError>,
    dialect: Dialect,
    generator: GeneratorConfig,
}

type CandidateStrategy = Result<BoxedStrategy<JsonValue>, NegationError>;

impl NegativeInstances {
    /// Computes the mutated schemas for `schema` under `config`.
    pub fn new(schema: &JsonValue, config: &NegationConfig) -> Result<Self, NegationError> {
        let dialect = match config.dialect {
            Some(dialect) => dialect,
            None => Dialect::from_schema(schema).map_err(NegationError::UnknownDialect)?,
        };
        let schemas: Rc<[JsonValue]> = mutated_schemas(schema, config.limit).into();
        if schemas.is_empty() {
            return Err(NegationError::Unsatisfiable);
        }
        Ok(Self {
            strategies: schemas.iter().map(|_| OnceCell::new()).collect(),
            schemas,
            failure: None,
            dialect,
            generator: config.generator.clone(),
        })
    }

    fn failed(failure: NegationError, config: &NegationConfig) -> Self {
        Self {
            schemas: Rc::from(Vec::new()),
            strategies: Rc::from(Vec::new()),
            failure: Some(failure),
            dialect: config.dialect.unwrap_or_default(),
            generator: config.generator.clone(),
        }
    }

    /// Candidate mutated schemas, in composition order.
    pub fn schemas(&self) -> &[JsonValue] {
        &self.schemas
    }

    /// Why drawing from this strategy fails, when it cannot produce values.
    pub fn failure(&self) -> Option<&NegationError> {
        self.failure.as_ref()
    }

    /// Generator for one candidate schema, built on first request.
    pub fn schema_strategy(&self, index: usize) -> Result<BoxedStrategy<JsonValue>, NegationError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        let (schema, cell) = self
            .schemas
            .get(index)
            .zip(self.strategies.get(index))
            .ok_or(NegationError::Unsatisfiable)?;
        cell.get_or_init(|| {
            log::trace!("building generator for candidate {index}");
            from_schema_in(schema, self.dialect, &self.generator).map_err(NegationError::from)
        })
        .clone()
    }
}

impl fmt::Debug for NegativeInstances {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NegativeInstances")
            .field("schemas", &self.schemas.len())
            .field("failure", &self.failure)
            .field("dialect", &self.dialect)
            .field("generator", &self.generator)
            .finish()
    }
}

impl Strategy for NegativeInstances {
    type Tree = Box<dyn ValueTree<Value = JsonValue>>;
    type Value = JsonValue;

    fn new_tree(&self, runner: &mut TestRunner) -> NewTree<Self> {
        if let Some(failure) = &self.failure {
            return Err(failure.to_string().into());
        }
        if self.schemas.is_empty() {
            return Err(NegationError::Unsatisfiable.to_string().into());
        }
        let index = any::<Index>().new_tree(runner)?.current();
        let chosen = index.index(self.schemas.len());
        let strategy = self
            .schema_strategy(chosen)
            .map_err(|error| error.to_string())?;
        strategy.new_tree(runner)
    }
}

/// Strategy of values that do not match `schema`, using default settings.
///
/// Never fails up front; a schema that cannot be negated surfaces when the
/// strategy is first drawn from.
pub fn not_from_schema(schema: &JsonValue) -> NegativeInstances {
    not_from_schema_with(schema, &NegationConfig::default())
}

/// Like [`not_from_schema`], with explicit settings.
pub fn not_from_schema_with(schema: &JsonValue, config: &NegationConfig) -> NegativeInstances {
    NegativeInstances::new(schema, config).unwrap_or_else(|error| {
        log::debug!("schema cannot be negated: {error}");
        NegativeInstances::failed(error, config)
    })
}

#[cfg(test)]
#[path = "../tests/internal/negation_unit_tests.rs"]
mod tests;
