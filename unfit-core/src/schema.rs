//! Typed, borrowed view over a JSON Schema fragment.
//!
//! Storage stays a [`serde_json::Value`] so keywords the engine does not
//! interpret pass through every mutation unchanged.

use serde_json::Value as JsonValue;

use crate::JsonObject;

/// JSON types that are handled by whole-fragment negation.
pub(crate) const SIMPLE_TYPES: [&str; 5] = ["null", "boolean", "number", "integer", "string"];

/// A schema fragment: a boolean schema or a keyword mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fragment<'a> {
    /// `true` accepts everything, `false` rejects everything.
    Bool(bool),
    /// A keyword mapping such as `{"type": "integer"}`.
    Node(SchemaNode<'a>),
}

impl<'a> Fragment<'a> {
    /// Views a JSON value as a schema fragment; other JSON kinds are not schemas.
    pub fn new(value: &'a JsonValue) -> Option<Self> {
        match value {
            JsonValue::Bool(flag) => Some(Fragment::Bool(*flag)),
            JsonValue::Object(map) => Some(Fragment::Node(SchemaNode { map })),
            _ => None,
        }
    }
}

/// The declared `type` of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaTypes<'a> {
    /// `type` was absent, so any JSON type is acceptable.
    pub any: bool,
    /// Declared type names, in declaration order.
    pub names: Vec<&'a str>,
}

impl SchemaTypes<'_> {
    pub fn includes(&self, name: &str) -> bool {
        self.names.iter().any(|candidate| *candidate == name)
    }

    /// True when the node can match a scalar type (or any type at all).
    pub fn is_simple(&self) -> bool {
        self.any || SIMPLE_TYPES.iter().any(|name| self.includes(name))
    }
}

/// Shape of the `items` keyword.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Items<'a> {
    /// `items` is missing or falsy (`false`, `{}`, `[]`, `0`, `""`, `null`),
    /// or is the `true` schema.
    Unconstrained,
    /// Tuple form: one schema per position.
    List(&'a [JsonValue]),
    /// One schema for every element.
    Single(&'a JsonObject),
    /// Any other value; nothing is derived from it.
    Other(&'a JsonValue),
}

/// A schema fragment that is a keyword mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchemaNode<'a> {
    map: &'a JsonObject,
}

impl<'a> SchemaNode<'a> {
    pub fn as_map(&self) -> &'a JsonObject {
        self.map
    }

    /// `{}` imposes no constraint at all.
    pub fn is_trivially_permissive(&self) -> bool {
        self.map.is_empty()
    }

    pub fn types(&self) -> SchemaTypes<'a> {
        match self.map.get("type") {
            None | Some(JsonValue::Null) => SchemaTypes {
                any: true,
                names: Vec::new(),
            },
            Some(JsonValue::String(name)) => SchemaTypes {
                any: false,
                names: vec![name.as_str()],
            },
            Some(JsonValue::Array(values)) => SchemaTypes {
                any: values.iter().any(JsonValue::is_null),
                names: values.iter().filter_map(JsonValue::as_str).collect(),
            },
            Some(_) => SchemaTypes {
                any: false,
                names: Vec::new(),
            },
        }
    }

    /// Declared properties in declaration order.
    pub fn properties(&self) -> Vec<(&'a str, &'a JsonValue)> {
        self.map
            .get("properties")
            .and_then(JsonValue::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, schema)| (name.as_str(), schema))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn required(&self) -> Vec<&'a str> {
        self.map
            .get("required")
            .and_then(JsonValue::as_array)
            .map(|names| names.iter().filter_map(JsonValue::as_str).collect())
            .unwrap_or_default()
    }

    /// Every declared property is listed in a non-empty `required`.
    pub fn requires_every_property(&self) -> bool {
        let required = self.required();
        !required.is_empty()
            && self
                .properties()
                .iter()
                .all(|(name, _)| required.contains(name))
    }

    pub fn items(&self) -> Items<'a> {
        match self.map.get("items") {
            None | Some(JsonValue::Null) | Some(JsonValue::Bool(_)) => Items::Unconstrained,
            Some(JsonValue::Array(values)) if values.is_empty() => Items::Unconstrained,
            Some(JsonValue::Array(values)) => Items::List(values),
            Some(JsonValue::Object(map)) if map.is_empty() => Items::Unconstrained,
            Some(JsonValue::Object(map)) => Items::Single(map),
            Some(JsonValue::String(value)) if value.is_empty() => Items::Unconstrained,
            Some(JsonValue::Number(number)) if number.as_f64() == Some(0.0) => {
                Items::Unconstrained
            }
            Some(other) => Items::Other(other),
        }
    }

    /// `minItems` is missing or zero.
    pub fn min_items_is_zero(&self) -> bool {
        match self.map.get("minItems") {
            None => true,
            Some(value) => value.as_f64() == Some(0.0),
        }
    }

    /// `contains` is the `{}` schema, which any non-empty array satisfies.
    pub fn contains_is_permissive(&self) -> bool {
        matches!(self.map.get("contains"), Some(JsonValue::Object(map)) if map.is_empty())
    }
}
