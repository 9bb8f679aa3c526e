//! Term pattern expansion over the in-memory term dictionaries.

use std::ops::Bound;

use concord_common::{Result, error::Error};
use concord_index_core::{Stream, TermPattern, TermResolver};
use regex::Regex;

use crate::index::{MemoryIndex, TermDictionary};

impl TermResolver for MemoryIndex {
    fn resolve(&self, field: &str, property: &str, pattern: &TermPattern) -> Result<Vec<String>> {
        let data = self
            .field(field)
            .ok_or_else(|| Error::unknown_field(field, Some(property)))?;
        if !data.has_property(property) {
            return Err(Error::unknown_field(field, Some(property)));
        }
        let Some(dictionary) = self.dictionary(field, &Stream::property(property)) else {
            return Ok(Vec::new());
        };

        match pattern {
            TermPattern::Prefix(prefix) => Ok(with_prefix(dictionary, prefix)),
            TermPattern::Wildcard(wildcard) => {
                matching(dictionary, &compile_full_match(&wildcard_to_regex(wildcard))?)
            }
            TermPattern::Regex(expr) => matching(dictionary, &compile_full_match(expr)?),
            TermPattern::Fuzzy { .. } => Err(Error::not_implemented(
                "edit-distance term expansion is not provided by the memory index",
            )),
        }
    }
}

fn with_prefix(dictionary: &TermDictionary, prefix: &str) -> Vec<String> {
    dictionary
        .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
        .map(|(term, _)| term)
        .take_while(|term| term.starts_with(prefix))
        .map(|term| term.to_string())
        .collect()
}

fn matching(dictionary: &TermDictionary, regex: &Regex) -> Result<Vec<String>> {
    Ok(dictionary
        .keys()
        .filter(|term| regex.is_match(term))
        .map(|term| term.to_string())
        .collect())
}

/// Compiles `expr` so that it must match a whole term.
fn compile_full_match(expr: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{expr})$"))
        .map_err(|e| Error::invalid_arg("pattern", format!("{expr}: {e}")))
}

fn wildcard_to_regex(wildcard: &str) -> String {
    let mut expr = String::with_capacity(wildcard.len() * 2);
    let mut literal = [0u8; 4];
    for c in wildcard.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            _ => expr.push_str(&regex::escape(c.encode_utf8(&mut literal))),
        }
    }
    expr
}
