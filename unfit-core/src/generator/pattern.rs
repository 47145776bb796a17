use proptest::prelude::*;
use regex::Regex;
use regex_syntax::ParserBuilder;

use super::GenerationError;

/// Strings containing a match of `pattern`.
///
/// JSON Schema patterns are unanchored, so a string generated from the
/// pattern with its anchors stripped always contains a match.
pub(super) fn pattern_strategy(pattern: &str) -> Result<BoxedStrategy<String>, GenerationError> {
    let validation = Regex::new(pattern).map_err(|error| {
        GenerationError::unsupported(format!("pattern must be a valid regex: {error}"))
    })?;
    let normalized =
        normalize_pattern_for_generation(pattern).map_err(GenerationError::unsupported)?;
    let hir = ParserBuilder::new()
        .build()
        .parse(&normalized)
        .map_err(|error| {
            GenerationError::unsupported(format!("pattern must be a valid regex: {error}"))
        })?;
    let strategy = proptest::string::string_regex_parsed(&hir).map_err(|error| {
        GenerationError::unsupported(format!("pattern cannot be generated: {error}"))
    })?;
    Ok(strategy
        .prop_filter("string must match pattern", move |value| {
            validation.is_match(value)
        })
        .boxed())
}

fn normalize_pattern_for_generation(pattern: &str) -> Result<String, String> {
    if pattern.is_empty() {
        return Ok(String::new());
    }
    if contains_boundary_escape(pattern) {
        return Err(
            "pattern uses word boundary escapes which are unsupported for string generation"
                .to_string(),
        );
    }
    let bytes = pattern.as_bytes();
    let mut start = 0;
    let mut end = bytes.len();
    if bytes.first() == Some(&b'^') {
        start = 1;
    }
    if end > start && bytes[end - 1] == b'$' && !is_escaped(bytes, end - 1) {
        end -= 1;
    }
    Ok(pattern[start..end].to_string())
}

fn contains_boundary_escape(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'\\' {
            match bytes.get(idx + 1) {
                Some(b'b' | b'B' | b'A' | b'Z' | b'z' | b'G') => return true,
                Some(_) => {
                    idx += 2;
                    continue;
                }
                None => break,
            }
        }
        idx += 1;
    }
    false
}

fn is_escaped(bytes: &[u8], idx: usize) -> bool {
    bytes[..idx]
        .iter()
        .rev()
        .take_while(|byte| **byte == b'\\')
        .count()
        % 2
        == 1
}
