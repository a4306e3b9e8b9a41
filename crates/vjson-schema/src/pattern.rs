//! Compiled-regex cache for `pattern` and `patternProperties`.
//!
//! Patterns are compiled once per distinct source string and shared across
//! validation calls. Matching is an unanchored search: `"a"` matches
//! `"xax"`.

use std::collections::HashMap;

use parking_lot::RwLock;
use regex::Regex;

use crate::error::ValidationError;

#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: RwLock<HashMap<String, Regex>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the compiled form of `pattern`, compiling it on first use.
    ///
    /// A pattern that fails to compile is a schema error at `path`.
    pub fn get(&self, path: &str, pattern: &str) -> Result<Regex, ValidationError> {
        if let Some(re) = self.compiled.read().get(pattern) {
            return Ok(re.clone());
        }
        let re = compile(path, pattern)?;
        self.compiled
            .write()
            .entry(pattern.to_string())
            .or_insert_with(|| re.clone());
        Ok(re)
    }

    /// Unanchored search for `pattern` in `text`.
    pub fn is_match(&self, path: &str, pattern: &str, text: &str) -> Result<bool, ValidationError> {
        Ok(self.get(path, pattern)?.is_match(text))
    }

    pub fn len(&self) -> usize {
        self.compiled.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.read().is_empty()
    }
}

/// Compile `pattern` without caching; used by the meta-schema check.
pub fn compile(path: &str, pattern: &str) -> Result<Regex, ValidationError> {
    Regex::new(pattern).map_err(|e| {
        ValidationError::schema(path, format!("{pattern:?} is not a valid regular expression: {e}"))
    })
}
