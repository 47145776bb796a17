//! Derivation of the single-point mutations that invalidate a schema.

use serde_json::Value as JsonValue;

use crate::mutation::Mutation;
use crate::schema::{Fragment, Items, SchemaNode};

/// Derives every mutation applicable at the root of `schema`.
///
/// Mutations are ordered depth-first in declaration order of properties and
/// tuple items. A `type` list spanning several categories contributes the
/// mutations of each, so `Negate` may appear more than once.
pub fn derive_mutations(schema: &JsonValue) -> Vec<Mutation> {
    let mut mutations = Vec::new();
    collect_mutations(schema, &mut mutations);
    mutations
}

fn collect_mutations(schema: &JsonValue, mutations: &mut Vec<Mutation>) {
    let node = match Fragment::new(schema) {
        Some(Fragment::Bool(_)) => {
            mutations.push(Mutation::Flip);
            return;
        }
        Some(Fragment::Node(node)) => node,
        None => {
            log::debug!("skipping non-schema value {schema}");
            return;
        }
    };
    if node.is_trivially_permissive() {
        return;
    }
    let types = node.types();
    if types.is_simple() {
        mutations.push(Mutation::Negate);
    }
    if types.includes("object") {
        collect_object_mutations(node, mutations);
    }
    if types.includes("array") {
        collect_array_mutations(node, mutations);
    }
}

fn collect_object_mutations(node: SchemaNode<'_>, mutations: &mut Vec<Mutation>) {
    // An optional property can be omitted, so negating it alone proves nothing.
    if !node.requires_every_property() {
        mutations.push(Mutation::Negate);
        return;
    }
    let before = mutations.len();
    for (name, property) in node.properties() {
        for value in replacement_values(property) {
            mutations.push(Mutation::ReplaceProperty {
                name: name.to_string(),
                value,
            });
        }
    }
    if mutations.len() == before {
        mutations.push(Mutation::Negate);
    }
}

fn collect_array_mutations(node: SchemaNode<'_>, mutations: &mut Vec<Mutation>) {
    match node.items() {
        Items::Unconstrained => mutations.push(Mutation::Negate),
        Items::List(items) => {
            if items.iter().any(|item| item == &JsonValue::Bool(false)) {
                mutations.push(Mutation::Negate);
                return;
            }
            let before = mutations.len();
            for (index, item) in items.iter().enumerate() {
                for value in replacement_values(item) {
                    mutations.push(Mutation::ReplaceItem { index, value });
                }
            }
            if mutations.len() == before {
                mutations.push(Mutation::Negate);
            }
        }
        Items::Single(items) => {
            // Empty arrays, or any array when `contains` is `{}`, dodge item negation.
            if node.min_items_is_zero() || node.contains_is_permissive() {
                mutations.push(Mutation::Negate);
                return;
            }
            let items = JsonValue::Object(items.clone());
            for mutation in derive_mutations(&items) {
                let value = apply_derived(&mutation, &items);
                mutations.push(Mutation::ReplaceItems { value });
            }
        }
        Items::Other(items) => {
            log::debug!("no array mutations for items value {items}");
        }
    }
}

/// Applies each mutation of `fragment` to it, dropping `false` results.
fn replacement_values(fragment: &JsonValue) -> Vec<JsonValue> {
    derive_mutations(fragment)
        .iter()
        .map(|mutation| apply_derived(mutation, fragment))
        .filter(|value| value != &JsonValue::Bool(false))
        .collect()
}

fn apply_derived(mutation: &Mutation, fragment: &JsonValue) -> JsonValue {
    mutation
        .apply(fragment)
        .expect("mutation derived from a fragment applies to it")
}

#[cfg(test)]
#[path = "../tests/internal/derivation_unit_tests.rs"]
mod tests;
