//! Single-point schema edits.
//!
//! Every primitive clones the fragment before editing it; inputs are never
//! modified in place.

use serde_json::{json, Value as JsonValue};

/// One structural edit that narrows a schema fragment at a coordinate.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    /// Wrap the whole fragment in `{"not": ...}`.
    Negate,
    /// Flip a boolean schema.
    Flip,
    /// Replace `properties[name]` with `value`.
    ReplaceProperty { name: String, value: JsonValue },
    /// Replace `items[index]` of a tuple-form `items`.
    ReplaceItem { index: usize, value: JsonValue },
    /// Replace a single-schema `items` wholesale.
    ReplaceItems { value: JsonValue },
}

impl Mutation {
    /// Applies the edit, returning `None` when `schema` lacks the coordinate.
    pub fn apply(&self, schema: &JsonValue) -> Option<JsonValue> {
        match self {
            Mutation::Negate => Some(negate(schema)),
            Mutation::Flip => schema.as_bool().map(flip),
            Mutation::ReplaceProperty { name, value } => {
                replace_property(schema, name, value.clone())
            }
            Mutation::ReplaceItem { index, value } => replace_item(schema, *index, value.clone()),
            Mutation::ReplaceItems { value } => replace_items(schema, value.clone()),
        }
    }
}

/// Logical negation of the whole fragment.
pub fn negate(schema: &JsonValue) -> JsonValue {
    json!({ "not": schema })
}

/// Negation of a boolean schema.
pub fn flip(schema: bool) -> JsonValue {
    JsonValue::Bool(!schema)
}

/// Replaces one declared property schema of an object schema.
pub fn replace_property(schema: &JsonValue, name: &str, value: JsonValue) -> Option<JsonValue> {
    let mut copied = schema.clone();
    let slot = copied
        .as_object_mut()?
        .get_mut("properties")?
        .as_object_mut()?
        .get_mut(name)?;
    *slot = value;
    Some(copied)
}

/// Replaces one positional schema of a tuple-form `items`.
pub fn replace_item(schema: &JsonValue, index: usize, value: JsonValue) -> Option<JsonValue> {
    let mut copied = schema.clone();
    let slot = copied
        .as_object_mut()?
        .get_mut("items")?
        .as_array_mut()?
        .get_mut(index)?;
    *slot = value;
    Some(copied)
}

/// Replaces a single-schema `items`.
pub fn replace_items(schema: &JsonValue, value: JsonValue) -> Option<JsonValue> {
    let mut copied = schema.clone();
    let slot = copied.as_object_mut()?.get_mut("items")?;
    if slot.is_array() {
        return None;
    }
    *slot = value;
    Some(copied)
}
