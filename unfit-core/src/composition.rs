//! Combinatorial composition of single-point mutations.

use itertools::Itertools;
use serde_json::Value as JsonValue;

use crate::derivation::derive_mutations;
use crate::mutation::Mutation;

/// Default cap on the number of mutated schemas produced for one schema.
pub const DEFAULT_LIMIT: usize = 100;

/// Lazily applies every non-empty combination of `mutations` to `schema`.
///
/// Combinations come in ascending size, then in lexicographic index order.
/// Each combination is applied left to right to the original schema.
pub struct MutatedSchemas<'a> {
    schema: &'a JsonValue,
    combinations: Box<dyn Iterator<Item = Vec<&'a Mutation>> + 'a>,
}

impl<'a> MutatedSchemas<'a> {
    pub fn new(schema: &'a JsonValue, mutations: &'a [Mutation]) -> Self {
        let combinations = (1..=mutations.len())
            .flat_map(move |size| mutations.iter().combinations(size));
        Self {
            schema,
            combinations: Box::new(combinations),
        }
    }
}

impl Iterator for MutatedSchemas<'_> {
    type Item = JsonValue;

    fn next(&mut self) -> Option<JsonValue> {
        for combination in self.combinations.by_ref() {
            match apply_combination(self.schema, &combination) {
                Some(mutated) => return Some(mutated),
                None => log::trace!("skipping inapplicable combination {combination:?}"),
            }
        }
        None
    }
}

/// Applies `mutations` in order; `None` if any step lacks its coordinate.
///
/// Only a combination that starts with a whole-fragment negation can lose a
/// coordinate, since `{"not": ...}` has no `properties` or `items`.
pub fn apply_combination(schema: &JsonValue, mutations: &[&Mutation]) -> Option<JsonValue> {
    let mut mutated = schema.clone();
    for mutation in mutations {
        mutated = mutation.apply(&mutated)?;
    }
    Some(mutated)
}

/// Produces at most `limit` mutated schemas for `schema`.
///
/// The mutation list is derived once, and enumeration stops as soon as
/// `limit` schemas exist, without visiting the remaining combinations.
pub fn mutated_schemas(schema: &JsonValue, limit: usize) -> Vec<JsonValue> {
    let mutations = derive_mutations(schema);
    let schemas: Vec<JsonValue> = MutatedSchemas::new(schema, &mutations)
        .take(limit)
        .collect();
    log::debug!(
        "derived {} mutations, produced {} mutated schemas (limit {limit})",
        mutations.len(),
        schemas.len()
    );
    schemas
}

#[cfg(test)]
#[path = "../tests/internal/composition_unit_tests.rs"]
mod tests;
