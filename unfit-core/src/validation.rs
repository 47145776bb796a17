use jsonschema::{draft201909, draft202012, draft4, draft6, draft7, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const DRAFT202012: &str = "https://json-schema.org/draft/2020-12/schema";
pub const DRAFT201909: &str = "https://json-schema.org/draft/2019-09/schema";
pub const DRAFT7_HTTP: &str = "http://json-schema.org/draft-07/schema";
pub const DRAFT7_HTTPS: &str = "https://json-schema.org/draft-07/schema";
pub const DRAFT6_HTTP: &str = "http://json-schema.org/draft-06/schema";
pub const DRAFT6_HTTPS: &str = "https://json-schema.org/draft-06/schema";
pub const DRAFT4_HTTP: &str = "http://json-schema.org/draft-04/schema";
pub const DRAFT4_HTTPS: &str = "https://json-schema.org/draft-04/schema";

/// JSON Schema dialects understood by the validator.
///
/// Draft 7 is the default because tuple-form `items` is draft 7 syntax.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    Draft4,
    Draft6,
    #[default]
    Draft7,
    Draft201909,
    Draft202012,
}

impl Dialect {
    /// Reads the dialect from a root `$schema`, defaulting to draft 7.
    pub fn from_schema(schema: &JsonValue) -> Result<Self, String> {
        let Some(schema_id) = schema.get("$schema").and_then(JsonValue::as_str) else {
            return Ok(Dialect::default());
        };
        match normalize_schema_id(schema_id) {
            DRAFT202012 => Ok(Dialect::Draft202012),
            DRAFT201909 => Ok(Dialect::Draft201909),
            DRAFT7_HTTP | DRAFT7_HTTPS => Ok(Dialect::Draft7),
            DRAFT6_HTTP | DRAFT6_HTTPS => Ok(Dialect::Draft6),
            DRAFT4_HTTP | DRAFT4_HTTPS => Ok(Dialect::Draft4),
            other => Err(format!("unknown schema version: {other}")),
        }
    }

    pub fn compile(self, schema: &JsonValue) -> Result<Validator, String> {
        let compiled = match self {
            Dialect::Draft202012 => draft202012::new(schema),
            Dialect::Draft201909 => draft201909::new(schema),
            Dialect::Draft7 => draft7::new(schema),
            Dialect::Draft6 => draft6::new(schema),
            Dialect::Draft4 => draft4::new(schema),
        };
        compiled.map_err(|error| error.to_string())
    }
}

/// Compiles a validator for `schema` using the dialect named by its `$schema`.
pub fn compile_validator(schema: &JsonValue) -> Result<Validator, String> {
    Dialect::from_schema(schema)?.compile(schema)
}

fn normalize_schema_id(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed.strip_suffix('#').unwrap_or(trimmed)
}
