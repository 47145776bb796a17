//! Generate JSON values that are guaranteed not to match a JSON Schema.
//!
//! The engine derives single-point mutations of a schema (negating a scalar
//! schema, a required property, a tuple slot or the shared item schema),
//! composes them into at most [`NegationConfig::limit`] mutated schemas, and
//! generates values valid against one of those. Any such value is invalid
//! against the original schema.
//!
//! ```no_run
//! use proptest::test_runner::TestRunner;
//! use serde_json::json;
//! use unfit_core::not_from_schema;
//!
//! let schema = json!({ "type": "integer", "minimum": 0 });
//! let mut runner = TestRunner::default();
//! runner
//!     .run(&not_from_schema(&schema), |instance| {
//!         assert!(!instance.as_i64().is_some_and(|value| value >= 0));
//!         Ok(())
//!     })
//!     .expect("negative instances");
//! ```

use serde::{Deserialize, Serialize};

pub mod composition;
pub mod derivation;
pub mod generator;
pub mod mutation;
pub mod negation;
pub mod schema;
pub mod validation;

pub use composition::{mutated_schemas, MutatedSchemas, DEFAULT_LIMIT};
pub use derivation::derive_mutations;
pub use generator::{from_schema, from_schema_in, GenerationError};
pub use mutation::Mutation;
pub use negation::{
    not_from_schema, not_from_schema_with, NegationError, NegativeInstances, UNSATISFIABLE,
};
pub use validation::{compile_validator, Dialect};

/// JSON object map, ordered by insertion.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Limits applied by the schema-conformant generator.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Extra characters allowed above `minLength` when `maxLength` is absent.
    pub max_length: usize,
    /// Extra elements allowed above `minItems` when `maxItems` is absent.
    pub max_items: usize,
    /// Nesting depth of unconstrained arrays and objects.
    pub max_depth: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_length: 16,
            max_items: 4,
            max_depth: 3,
        }
    }
}

impl GeneratorConfig {
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Configuration for negative-instance generation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegationConfig {
    /// Maximum number of mutated schemas composed per input schema.
    pub limit: usize,
    /// Settings for generating values from mutated schemas.
    pub generator: GeneratorConfig,
    /// Dialect used for generation, overriding the schema's `$schema`.
    pub dialect: Option<Dialect>,
}

impl Default for NegationConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            generator: GeneratorConfig::default(),
            dialect: None,
        }
    }
}

impl NegationConfig {
    /// Sets the cap on composed mutated schemas.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the generator settings.
    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    /// Forces a dialect instead of reading `$schema`.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }
}
