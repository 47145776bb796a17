use proptest::prelude::*;
use serde_json::Value as JsonValue;

use crate::JsonObject;

/// Disjoint classes of JSON values, with numbers split by integrality.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JsonKind {
    Null,
    Boolean,
    Integer,
    Fraction,
    String,
    Array,
    Object,
}

pub(crate) const ALL_KINDS: [JsonKind; 7] = [
    JsonKind::Null,
    JsonKind::Boolean,
    JsonKind::Integer,
    JsonKind::Fraction,
    JsonKind::String,
    JsonKind::Array,
    JsonKind::Object,
];

impl JsonKind {
    /// Kinds a JSON Schema type name accepts; unknown names accept nothing.
    pub(crate) fn covered_by(schema_type: &str) -> &'static [JsonKind] {
        match schema_type {
            "null" => &[JsonKind::Null],
            "boolean" => &[JsonKind::Boolean],
            "integer" => &[JsonKind::Integer],
            "number" => &[JsonKind::Integer, JsonKind::Fraction],
            "string" => &[JsonKind::String],
            "array" => &[JsonKind::Array],
            "object" => &[JsonKind::Object],
            _ => &[],
        }
    }

    /// Kinds that a schema's `type` keyword rules out entirely.
    ///
    /// Empty when the schema declares no usable `type`.
    pub(crate) fn excluded_by(schema: &JsonValue) -> Vec<JsonKind> {
        let declared: Vec<&str> = match schema.get("type") {
            Some(JsonValue::String(name)) => vec![name.as_str()],
            Some(JsonValue::Array(names)) => names.iter().filter_map(JsonValue::as_str).collect(),
            _ => return Vec::new(),
        };
        ALL_KINDS
            .into_iter()
            .filter(|kind| {
                !declared
                    .iter()
                    .any(|name| JsonKind::covered_by(name).contains(kind))
            })
            .collect()
    }

    /// Values of this kind with no further constraints.
    pub(crate) fn strategy(self, depth: u32) -> BoxedStrategy<JsonValue> {
        match self {
            JsonKind::Null => Just(JsonValue::Null).boxed(),
            JsonKind::Boolean => any::<bool>().prop_map(JsonValue::from).boxed(),
            JsonKind::Integer => (-1_000i64..=1_000).prop_map(JsonValue::from).boxed(),
            JsonKind::Fraction => (-1_000i64..=1_000, 1u32..100)
                .prop_map(|(whole, hundredths)| {
                    JsonValue::from(whole as f64 + f64::from(hundredths) / 100.0)
                })
                .boxed(),
            JsonKind::String => "[a-zA-Z0-9 _-]{0,8}".prop_map(JsonValue::String).boxed(),
            JsonKind::Array => {
                proptest::collection::vec(any_value(depth.saturating_sub(1)), 0..=3)
                    .prop_map(JsonValue::Array)
                    .boxed()
            }
            JsonKind::Object => {
                proptest::collection::vec(("[a-z]{1,6}", any_value(depth.saturating_sub(1))), 0..=3)
                    .prop_map(|entries| JsonValue::Object(entries.into_iter().collect()))
                    .boxed()
            }
        }
    }
}

/// Any JSON value, nesting containers at most `depth` levels deep.
pub(crate) fn any_value(depth: u32) -> BoxedStrategy<JsonValue> {
    let leaf = prop_oneof![
        JsonKind::Null.strategy(0),
        JsonKind::Boolean.strategy(0),
        JsonKind::Integer.strategy(0),
        JsonKind::Fraction.strategy(0),
        JsonKind::String.strategy(0),
    ];
    leaf.prop_recursive(depth, 16, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..=4).prop_map(JsonValue::Array),
            proptest::collection::vec(("[a-z]{1,6}", inner), 0..=4).prop_map(|entries| {
                JsonValue::Object(entries.into_iter().collect::<JsonObject>())
            }),
        ]
    })
    .boxed()
}
