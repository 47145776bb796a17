//! Proptest strategies producing JSON values that satisfy a JSON Schema.
//!
//! Each schema node is generated constructively from its keywords, then
//! filtered through a validator compiled for that node, so every value a
//! strategy yields is valid against the schema it was built from.

use std::collections::HashSet;
use std::fmt;

use proptest::prelude::*;
use proptest::strategy::Union;
use serde_json::Value as JsonValue;

use crate::schema::Fragment;
use crate::validation::Dialect;
use crate::{GeneratorConfig, JsonObject};

mod kind;
mod pattern;

use kind::{any_value, JsonKind};
use pattern::pattern_strategy;

const UNSUPPORTED_KEYWORDS: [&str; 2] = ["$ref", "allOf"];
const NUMBER_SPAN: f64 = 1_000_000.0;

#[cfg(test)]
#[path = "../../tests/internal/generator_unit_tests.rs"]
mod tests;

/// Errors emitted while building a strategy from schema data.
#[derive(Clone, Debug, PartialEq)]
pub enum GenerationError {
    /// The schema admits no value this generator can construct.
    Unsatisfiable { reason: String },
    /// Schema data could not be interpreted for generation.
    UnsupportedSchema { reason: String },
}

impl GenerationError {
    pub(crate) fn unsatisfiable(reason: impl Into<String>) -> Self {
        GenerationError::Unsatisfiable {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        GenerationError::UnsupportedSchema {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::Unsatisfiable { reason } => {
                write!(f, "unsatisfiable schema: {reason}")
            }
            GenerationError::UnsupportedSchema { reason } => {
                write!(f, "unsupported schema: {reason}")
            }
        }
    }
}

impl std::error::Error for GenerationError {}

/// Builds a strategy of values valid against `schema`.
///
/// The validation dialect comes from the schema's `$schema`, defaulting to
/// draft 7.
pub fn from_schema(
    schema: &JsonValue,
    config: &GeneratorConfig,
) -> Result<BoxedStrategy<JsonValue>, GenerationError> {
    let dialect = Dialect::from_schema(schema).map_err(GenerationError::unsupported)?;
    from_schema_in(schema, dialect, config)
}

/// Builds a strategy of values valid against `schema` under `dialect`.
pub fn from_schema_in(
    schema: &JsonValue,
    dialect: Dialect,
    config: &GeneratorConfig,
) -> Result<BoxedStrategy<JsonValue>, GenerationError> {
    let context = Context { dialect, config };
    context.value_strategy(schema)
}

struct Context<'a> {
    dialect: Dialect,
    config: &'a GeneratorConfig,
}

impl Context<'_> {
    fn value_strategy(&self, schema: &JsonValue) -> Result<BoxedStrategy<JsonValue>, GenerationError> {
        let map = match schema {
            JsonValue::Bool(true) => return Ok(any_value(self.config.max_depth)),
            JsonValue::Bool(false) => {
                return Err(GenerationError::unsatisfiable(
                    "the false schema accepts no value",
                ))
            }
            JsonValue::Object(map) => map,
            other => {
                return Err(GenerationError::unsupported(format!(
                    "schema must be an object or boolean, got {other}"
                )))
            }
        };
        if let Some(keyword) = UNSUPPORTED_KEYWORDS
            .iter()
            .find(|keyword| map.contains_key(**keyword))
        {
            return Err(GenerationError::unsupported(format!(
                "keyword '{keyword}' is not supported for generation"
            )));
        }

        let validator = self
            .dialect
            .compile(schema)
            .map_err(GenerationError::unsupported)?;

        if let Some(value) = map.get("const") {
            if !validator.is_valid(value) {
                return Err(GenerationError::unsatisfiable(
                    "const value violates the rest of the schema",
                ));
            }
            return Ok(Just(value.clone()).boxed());
        }

        if let Some(values) = map.get("enum") {
            let values = values
                .as_array()
                .ok_or_else(|| GenerationError::unsupported("enum must be an array"))?;
            let allowed: Vec<JsonValue> = values
                .iter()
                .filter(|value| validator.is_valid(value))
                .cloned()
                .collect();
            if allowed.is_empty() {
                return Err(GenerationError::unsatisfiable(
                    "no enum value satisfies the rest of the schema",
                ));
            }
            return Ok(proptest::sample::select(allowed).boxed());
        }

        let strategy = if let Some(negated) = map.get("not") {
            self.negation_strategy(map, negated)?
        } else if let Some(branches) = union_branches(map)? {
            self.union_strategy(&branches)?
        } else {
            self.typed_strategy(map)?
        };

        Ok(strategy
            .prop_filter("value must satisfy its schema", move |value| {
                validator.is_valid(value)
            })
            .boxed())
    }

    fn negation_strategy(
        &self,
        map: &JsonObject,
        negated: &JsonValue,
    ) -> Result<BoxedStrategy<JsonValue>, GenerationError> {
        let accepts_everything = match Fragment::new(negated) {
            Some(Fragment::Bool(flag)) => flag,
            Some(Fragment::Node(node)) => node.is_trivially_permissive(),
            None => {
                return Err(GenerationError::unsupported(
                    "not must hold an object or boolean schema",
                ))
            }
        };
        if accepts_everything {
            return Err(GenerationError::unsatisfiable(
                "negated schema accepts every value",
            ));
        }

        let mut rest = map.clone();
        rest.remove("not");
        if !rest.is_empty() {
            return self.value_strategy(&JsonValue::Object(rest));
        }

        let excluded = JsonKind::excluded_by(negated);
        if excluded.is_empty() {
            return Ok(any_value(self.config.max_depth));
        }
        let depth = self.config.max_depth;
        let outside = Union::new(excluded.into_iter().map(|kind| kind.strategy(depth))).boxed();
        Ok(Union::new_weighted(vec![(3, outside), (1, any_value(depth))]).boxed())
    }

    fn union_strategy(
        &self,
        branches: &[JsonValue],
    ) -> Result<BoxedStrategy<JsonValue>, GenerationError> {
        let strategies = collect_viable(branches.iter().map(|branch| self.value_strategy(branch)))?;
        Ok(Union::new(strategies).boxed())
    }

    fn typed_strategy(&self, map: &JsonObject) -> Result<BoxedStrategy<JsonValue>, GenerationError> {
        let types: Vec<&str> = match map.get("type") {
            None => vec![
                "null", "boolean", "integer", "number", "string", "array", "object",
            ],
            Some(JsonValue::String(name)) => vec![name.as_str()],
            Some(JsonValue::Array(names)) => names
                .iter()
                .map(|name| {
                    name.as_str().ok_or_else(|| {
                        GenerationError::unsupported(format!(
                            "schema type array must contain strings; found {name}"
                        ))
                    })
                })
                .collect::<Result<_, _>>()?,
            Some(other) => {
                return Err(GenerationError::unsupported(format!(
                    "schema type must be a string or array of strings, got {other}"
                )))
            }
        };
        if types.is_empty() {
            return Err(GenerationError::unsatisfiable("schema type array is empty"));
        }
        let strategies = collect_viable(types.into_iter().map(|name| self.type_strategy(map, name)))?;
        Ok(Union::new(strategies).boxed())
    }

    fn type_strategy(
        &self,
        map: &JsonObject,
        schema_type: &str,
    ) -> Result<BoxedStrategy<JsonValue>, GenerationError> {
        match schema_type {
            "null" => Ok(Just(JsonValue::Null).boxed()),
            "boolean" => Ok(any::<bool>().prop_map(JsonValue::from).boxed()),
            "integer" => integer_strategy(map),
            "number" => number_strategy(map),
            "string" => self.string_strategy(map),
            "array" => self.array_strategy(map),
            "object" => self.object_strategy(map),
            other => Err(GenerationError::unsupported(format!(
                "unsupported schema type '{other}'"
            ))),
        }
    }

    fn string_strategy(&self, map: &JsonObject) -> Result<BoxedStrategy<JsonValue>, GenerationError> {
        let min_length = usize_keyword(map, "minLength").unwrap_or(0);
        let max_length =
            usize_keyword(map, "maxLength").unwrap_or(min_length + self.config.max_length);
        if max_length < min_length {
            return Err(GenerationError::unsatisfiable(
                "maxLength must be >= minLength",
            ));
        }

        if let Some(pattern) = map.get("pattern").and_then(JsonValue::as_str) {
            Ok(pattern_strategy(pattern)?
                .prop_filter("string length out of bounds", move |value| {
                    let len = value.chars().count();
                    len >= min_length && len <= max_length
                })
                .prop_map(JsonValue::String)
                .boxed())
        } else {
            Ok(
                proptest::collection::vec(proptest::char::any(), min_length..=max_length)
                    .prop_map(|chars| JsonValue::String(chars.into_iter().collect()))
                    .boxed(),
            )
        }
    }

    fn array_strategy(&self, map: &JsonObject) -> Result<BoxedStrategy<JsonValue>, GenerationError> {
        let min_items = usize_keyword(map, "minItems").unwrap_or(0);
        let max_items = usize_keyword(map, "maxItems").unwrap_or(min_items + self.config.max_items);
        if max_items < min_items {
            return Err(GenerationError::unsatisfiable("maxItems must be >= minItems"));
        }

        // Tuple slots are always generated, even when minItems allows fewer.
        let (prefix, extra) = match map.get("items") {
            Some(JsonValue::Array(tuple)) => {
                let prefix = tuple
                    .iter()
                    .take(max_items)
                    .map(|item| self.value_strategy(item))
                    .collect::<Result<Vec<_>, _>>()?;
                (prefix, map.get("additionalItems"))
            }
            items => (Vec::new(), items),
        };
        let extra = match extra {
            Some(JsonValue::Bool(false)) => None,
            None | Some(JsonValue::Bool(true)) => Some(any_value(self.config.max_depth)),
            Some(schema) => Some(self.value_strategy(schema)?),
        };

        let contains = match map.get("contains") {
            None | Some(JsonValue::Bool(true)) => None,
            Some(schema) => Some(self.value_strategy(schema)?),
        };
        let reserved = usize::from(contains.is_some());

        let fixed = prefix.len();
        let lower = min_items.saturating_sub(fixed + reserved);
        let upper = max_items
            .checked_sub(fixed + reserved)
            .ok_or_else(|| GenerationError::unsatisfiable("array bounds leave no room for contains"))?;
        let rest = match extra {
            Some(element) if upper > 0 => {
                proptest::collection::vec(element, lower.min(upper)..=upper).boxed()
            }
            _ if lower > 0 => {
                return Err(GenerationError::unsatisfiable(
                    "minItems exceeds the items the schema allows",
                ))
            }
            _ => Just(Vec::new()).boxed(),
        };
        let contains = contains
            .map(|element| element.prop_map(Some).boxed())
            .unwrap_or_else(|| Just(None).boxed());

        let unique = map.get("uniqueItems") == Some(&JsonValue::Bool(true));
        Ok((prefix, rest, contains)
            .prop_map(move |(mut values, rest, contained)| {
                values.extend(rest);
                values.extend(contained);
                if unique {
                    dedup_values(&mut values);
                }
                JsonValue::Array(values)
            })
            .boxed())
    }

    fn object_strategy(&self, map: &JsonObject) -> Result<BoxedStrategy<JsonValue>, GenerationError> {
        let empty = JsonObject::new();
        let properties = match map.get("properties") {
            None => &empty,
            Some(JsonValue::Object(properties)) => properties,
            Some(_) => {
                return Err(GenerationError::unsupported(
                    "properties must be an object",
                ))
            }
        };
        let required: HashSet<&str> = map
            .get("required")
            .and_then(JsonValue::as_array)
            .map(|names| names.iter().filter_map(JsonValue::as_str).collect())
            .unwrap_or_default();

        let mut property_strategies = Vec::with_capacity(properties.len() + required.len());
        for (name, schema) in properties {
            let strategy = if required.contains(name.as_str()) {
                self.value_strategy(schema)
                    .map_err(|error| property_error(name, error))?
                    .prop_map(Some)
                    .boxed()
            } else {
                match self.value_strategy(schema) {
                    Ok(strategy) => prop_oneof![Just(None), strategy.prop_map(Some)].boxed(),
                    Err(error) => {
                        log::debug!("omitting optional property '{name}': {error}");
                        Just(None).boxed()
                    }
                }
            };
            property_strategies.push((name.clone(), strategy));
        }

        let undeclared = map
            .get("required")
            .and_then(JsonValue::as_array)
            .into_iter()
            .flatten()
            .filter_map(JsonValue::as_str)
            .filter(|name| !properties.contains_key(*name));
        for name in undeclared {
            let schema = map
                .get("additionalProperties")
                .cloned()
                .unwrap_or(JsonValue::Bool(true));
            let strategy = self
                .value_strategy(&schema)
                .map_err(|error| property_error(name, error))?;
            property_strategies.push((name.to_string(), strategy.prop_map(Some).boxed()));
        }

        let mut strategy: BoxedStrategy<Vec<(String, Option<JsonValue>)>> = Just(Vec::new()).boxed();
        for (name, value_strategy) in property_strategies {
            strategy = strategy
                .prop_flat_map(move |entries| {
                    let name = name.clone();
                    value_strategy.clone().prop_map(move |value| {
                        let mut next = entries.clone();
                        next.push((name.clone(), value));
                        next
                    })
                })
                .boxed();
        }

        Ok(strategy
            .prop_map(|entries| {
                let mut object = JsonObject::new();
                for (name, value) in entries {
                    if let Some(value) = value {
                        object.insert(name, value);
                    }
                }
                JsonValue::Object(object)
            })
            .boxed())
    }
}

/// Keeps the strategies that could be built; fails only if none could.
fn collect_viable<I>(results: I) -> Result<Vec<BoxedStrategy<JsonValue>>, GenerationError>
where
    I: IntoIterator<Item = Result<BoxedStrategy<JsonValue>, GenerationError>>,
{
    let mut strategies = Vec::new();
    let mut first_error = None;
    for result in results {
        match result {
            Ok(strategy) => strategies.push(strategy),
            Err(error) => {
                log::debug!("dropping branch: {error}");
                if first_error.is_none() {
                    first_error = Some(error);
                }
            }
        }
    }
    match first_error {
        Some(error) if strategies.is_empty() => Err(error),
        None if strategies.is_empty() => Err(GenerationError::unsatisfiable(
            "schema has no branch to generate from",
        )),
        _ => Ok(strategies),
    }
}

fn property_error(name: &str, error: GenerationError) -> GenerationError {
    match error {
        GenerationError::Unsatisfiable { reason } => {
            GenerationError::unsatisfiable(format!("property '{name}': {reason}"))
        }
        GenerationError::UnsupportedSchema { reason } => {
            GenerationError::unsupported(format!("property '{name}': {reason}"))
        }
    }
}

/// Splits `anyOf`/`oneOf` into branches merged with the surrounding keywords.
fn union_branches(map: &JsonObject) -> Result<Option<Vec<JsonValue>>, GenerationError> {
    let Some((keyword, branches)) = ["oneOf", "anyOf"]
        .into_iter()
        .find_map(|keyword| map.get(keyword).map(|branches| (keyword, branches)))
    else {
        return Ok(None);
    };
    let branches = branches
        .as_array()
        .filter(|branches| !branches.is_empty())
        .ok_or_else(|| {
            GenerationError::unsupported(format!("{keyword} must be a non-empty array"))
        })?;
    let mut base = map.clone();
    base.remove(keyword);
    let merged = branches
        .iter()
        .filter_map(|branch| match branch {
            JsonValue::Bool(true) => Some(JsonValue::Object(base.clone())),
            JsonValue::Bool(false) => None,
            JsonValue::Object(branch) => Some(JsonValue::Object(merge_object_schema(&base, branch))),
            _ => None,
        })
        .collect::<Vec<_>>();
    if merged.is_empty() {
        return Err(GenerationError::unsatisfiable(format!(
            "{keyword} has no satisfiable branch"
        )));
    }
    Ok(Some(merged))
}

fn merge_object_schema(base: &JsonObject, branch: &JsonObject) -> JsonObject {
    let mut merged = base.clone();
    for (key, value) in branch {
        match (key.as_str(), merged.get_mut(key), value) {
            ("properties", Some(JsonValue::Object(existing)), JsonValue::Object(extra)) => {
                for (name, schema) in extra {
                    existing.insert(name.clone(), schema.clone());
                }
            }
            ("required", Some(JsonValue::Array(existing)), JsonValue::Array(extra)) => {
                for name in extra {
                    if !existing.contains(name) {
                        existing.push(name.clone());
                    }
                }
            }
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Bound {
    value: f64,
    exclusive: bool,
}

/// Numeric bounds, accepting both draft 4 boolean and draft 6+ numeric
/// exclusive forms.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct NumericBounds {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl NumericBounds {
    fn from_schema(map: &JsonObject) -> Self {
        Self {
            lower: bound(map, "minimum", "exclusiveMinimum", f64::max),
            upper: bound(map, "maximum", "exclusiveMaximum", f64::min),
        }
    }

    /// Inclusive integer range, defaulting to a span around the other bound.
    fn integer_range(&self) -> Option<(i64, i64)> {
        let lower = self.lower.map(|bound| {
            if bound.exclusive {
                bound.value.floor() + 1.0
            } else {
                bound.value.ceil()
            }
        });
        let upper = self.upper.map(|bound| {
            if bound.exclusive {
                bound.value.ceil() - 1.0
            } else {
                bound.value.floor()
            }
        });
        let (lower, upper) = match (lower, upper) {
            (Some(lower), Some(upper)) => (lower, upper),
            (Some(lower), None) => (lower, lower + NUMBER_SPAN),
            (None, Some(upper)) => (upper - NUMBER_SPAN, upper),
            (None, None) => (-NUMBER_SPAN, NUMBER_SPAN),
        };
        let lower = lower.max(i64::MIN as f64) as i64;
        let upper = upper.min(i64::MAX as f64) as i64;
        (lower <= upper).then_some((lower, upper))
    }

    fn float_range(&self) -> (f64, f64) {
        match (self.lower, self.upper) {
            (Some(lower), Some(upper)) => (lower.value, upper.value),
            (Some(lower), None) => (lower.value, lower.value + NUMBER_SPAN),
            (None, Some(upper)) => (upper.value - NUMBER_SPAN, upper.value),
            (None, None) => (-NUMBER_SPAN, NUMBER_SPAN),
        }
    }

    fn admits(&self, value: f64) -> bool {
        let above = self.lower.map_or(true, |bound| {
            value > bound.value || (!bound.exclusive && value == bound.value)
        });
        let below = self.upper.map_or(true, |bound| {
            value < bound.value || (!bound.exclusive && value == bound.value)
        });
        above && below
    }
}

fn bound(
    map: &JsonObject,
    inclusive_key: &str,
    exclusive_key: &str,
    tighter: fn(f64, f64) -> f64,
) -> Option<Bound> {
    let inclusive = map.get(inclusive_key).and_then(JsonValue::as_f64);
    match map.get(exclusive_key) {
        Some(JsonValue::Bool(true)) => inclusive.map(|value| Bound {
            value,
            exclusive: true,
        }),
        Some(JsonValue::Number(number)) => {
            let exclusive = number.as_f64()?;
            match inclusive {
                Some(value) if tighter(value, exclusive) == value && value != exclusive => {
                    Some(Bound {
                        value,
                        exclusive: false,
                    })
                }
                _ => Some(Bound {
                    value: exclusive,
                    exclusive: true,
                }),
            }
        }
        _ => inclusive.map(|value| Bound {
            value,
            exclusive: false,
        }),
    }
}

fn multiple_of(map: &JsonObject) -> Result<Option<f64>, GenerationError> {
    match map.get("multipleOf").map(|value| value.as_f64()) {
        None => Ok(None),
        Some(Some(divisor)) if divisor > 0.0 => Ok(Some(divisor)),
        Some(_) => Err(GenerationError::unsupported(
            "multipleOf must be a positive number",
        )),
    }
}

fn integer_strategy(map: &JsonObject) -> Result<BoxedStrategy<JsonValue>, GenerationError> {
    let bounds = NumericBounds::from_schema(map);
    let (lower, upper) = bounds
        .integer_range()
        .ok_or_else(|| GenerationError::unsatisfiable("no integer lies within the bounds"))?;
    match multiple_of(map)? {
        Some(divisor) if divisor.fract() == 0.0 && divisor <= i64::MAX as f64 => {
            let divisor = divisor as i128;
            let first = ceil_div(i128::from(lower), divisor);
            let last = i128::from(upper).div_euclid(divisor);
            if first > last {
                return Err(GenerationError::unsatisfiable(
                    "no multiple of multipleOf lies within the bounds",
                ));
            }
            Ok((first..=last)
                .prop_map(move |factor| JsonValue::from((factor * divisor) as i64))
                .boxed())
        }
        _ => Ok((lower..=upper).prop_map(JsonValue::from).boxed()),
    }
}

fn number_strategy(map: &JsonObject) -> Result<BoxedStrategy<JsonValue>, GenerationError> {
    let bounds = NumericBounds::from_schema(map);
    if let Some(divisor) = multiple_of(map)? {
        let (lower, upper) = bounds.float_range();
        let first = (lower / divisor).ceil();
        let last = (upper / divisor).floor();
        if first > last {
            return Err(GenerationError::unsatisfiable(
                "no multiple of multipleOf lies within the bounds",
            ));
        }
        return Ok((first as i64..=last as i64)
            .prop_map(move |factor| JsonValue::from(factor as f64 * divisor))
            .prop_filter("number out of bounds", move |value| {
                value.as_f64().is_some_and(|value| bounds.admits(value))
            })
            .boxed());
    }

    let (lower, upper) = bounds.float_range();
    if lower > upper || (lower == upper && !bounds.admits(lower)) {
        return Err(GenerationError::unsatisfiable("no number lies within the bounds"));
    }
    let floats = (lower..=upper).prop_map(JsonValue::from).boxed();
    let strategy = match integer_strategy(map) {
        Ok(integers) => prop_oneof![integers, floats].boxed(),
        Err(_) => floats,
    };
    Ok(strategy
        .prop_filter("number out of bounds", move |value| {
            value.as_f64().is_some_and(|value| bounds.admits(value))
        })
        .boxed())
}

fn ceil_div(value: i128, divisor: i128) -> i128 {
    -(-value).div_euclid(divisor)
}

fn usize_keyword(map: &JsonObject, keyword: &str) -> Option<usize> {
    map.get(keyword)
        .and_then(JsonValue::as_u64)
        .map(|value| value as usize)
}

fn dedup_values(values: &mut Vec<JsonValue>) {
    let mut seen: Vec<JsonValue> = Vec::with_capacity(values.len());
    values.retain(|value| {
        if seen.contains(value) {
            false
        } else {
            seen.push(value.clone());
            true
        }
    });
}
