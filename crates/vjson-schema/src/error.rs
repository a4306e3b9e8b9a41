//! # Validation Errors
//!
//! One error value per top-level `validate` call. The taxonomy:
//!
//! - [`ValidationError::Schema`]: the schema itself is malformed (a
//!   meta-schema keyword violation, a cross-keyword invariant, or a `$ref`
//!   whose pointer does not navigate).
//! - [`ValidationError::Resolution`]: a referenced document could not be
//!   obtained (unknown URI, network disabled, fetch or parse failure).
//! - [`ValidationError::Instance`], [`ValidationError::NoMatch`] and
//!   [`ValidationError::Ambiguous`]: the instance does not satisfy the
//!   schema. Only `anyOf`/`oneOf` aggregate several causes.
//!
//! Structural errors (the first two) are never swallowed by combinators:
//! an `anyOf` branch that fails structurally fails the whole call.

use std::fmt;

use thiserror::Error;

/// Combinator keywords that aggregate branch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    AnyOf,
    OneOf,
}

impl Combinator {
    /// Keyword as written in a schema.
    pub fn keyword(&self) -> &'static str {
        match self {
            Combinator::AnyOf => "anyOf",
            Combinator::OneOf => "oneOf",
        }
    }

    fn quantifier(&self) -> &'static str {
        match self {
            Combinator::AnyOf => "at least one",
            Combinator::OneOf => "exactly one",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Error produced by meta-schema checking, reference resolution, or
/// instance validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The schema is not a well-formed Draft 04 schema.
    #[error("{path}: {message}")]
    Schema {
        /// Path of the offending keyword within the schema.
        path: String,
        /// What is wrong with it.
        message: String,
    },

    /// A referenced document could not be obtained.
    #[error("cannot resolve {uri:?}: {reason}")]
    Resolution {
        /// The URI being resolved.
        uri: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The instance violates a single keyword.
    #[error("{instance_path}: {message} (schema {schema_path})")]
    Instance {
        /// Path of the offending value within the instance.
        instance_path: String,
        /// Path of the violated keyword within the schema.
        schema_path: String,
        /// Human-readable description.
        message: String,
    },

    /// No branch of an `anyOf`/`oneOf` accepted the instance.
    #[error(
        "{instance_path}: must be valid against {} of the schemas in {schema_path}, but it is not:{}",
        .combinator.quantifier(),
        render_causes(.causes)
    )]
    NoMatch {
        /// Path of the value within the instance.
        instance_path: String,
        /// Path of the combinator keyword.
        schema_path: String,
        /// Which combinator failed.
        combinator: Combinator,
        /// One failure per branch, in branch order.
        causes: Vec<ValidationError>,
    },

    /// More than one `oneOf` branch accepted the instance.
    #[error(
        "{instance_path}: must be valid against exactly one of the schemas in {schema_path}, but it is valid against {}",
        .matched.join(" and ")
    )]
    Ambiguous {
        /// Path of the value within the instance.
        instance_path: String,
        /// Path of the `oneOf` keyword.
        schema_path: String,
        /// Schema path of every branch that matched.
        matched: Vec<String>,
    },
}

impl ValidationError {
    pub(crate) fn schema(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Schema {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn resolution(uri: impl Into<String>, reason: impl fmt::Display) -> Self {
        ValidationError::Resolution {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn instance(
        instance_path: &str,
        schema_path: &str,
        message: impl Into<String>,
    ) -> Self {
        ValidationError::Instance {
            instance_path: instance_path.to_string(),
            schema_path: schema_path.to_string(),
            message: message.into(),
        }
    }

    /// True for schema and resolution errors, which no combinator may
    /// absorb as an ordinary branch failure.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ValidationError::Schema { .. } | ValidationError::Resolution { .. }
        )
    }

    /// Path within the instance, for instance-validation errors.
    pub fn instance_path(&self) -> Option<&str> {
        match self {
            ValidationError::Instance { instance_path, .. }
            | ValidationError::NoMatch { instance_path, .. }
            | ValidationError::Ambiguous { instance_path, .. } => Some(instance_path),
            ValidationError::Schema { .. } | ValidationError::Resolution { .. } => None,
        }
    }

    /// Path within the schema, where one applies.
    pub fn schema_path(&self) -> Option<&str> {
        match self {
            ValidationError::Schema { path, .. } => Some(path),
            ValidationError::Instance { schema_path, .. }
            | ValidationError::NoMatch { schema_path, .. }
            | ValidationError::Ambiguous { schema_path, .. } => Some(schema_path),
            ValidationError::Resolution { .. } => None,
        }
    }

    /// Branch failures aggregated by `anyOf`/`oneOf`; empty otherwise.
    pub fn causes(&self) -> &[ValidationError] {
        match self {
            ValidationError::NoMatch { causes, .. } => causes,
            _ => &[],
        }
    }
}

/// Render causes as an indented bullet list, one per line.
fn render_causes(causes: &[ValidationError]) -> String {
    let mut out = String::new();
    for cause in causes {
        let text = cause.to_string();
        let mut lines = text.lines();
        if let Some(first) = lines.next() {
            out.push_str("\n  - ");
            out.push_str(first);
        }
        for line in lines {
            out.push_str("\n    ");
            out.push_str(line);
        }
    }
    out
}

/// Failure reported by a [`crate::Fetch`] transport.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote host answered with a non-success status.
    #[error("unexpected status {0}")]
    Status(u16),

    /// The body was not a parseable document.
    #[error("parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_error_display_includes_both_paths() {
        let err = ValidationError::instance("#/a", "#/properties/a/type", "must be of type \"number\"");
        let text = err.to_string();
        assert!(text.starts_with("#/a: must be of type"));
        assert!(text.contains("#/properties/a/type"));
    }

    #[test]
    fn no_match_display_lists_every_cause() {
        let err = ValidationError::NoMatch {
            instance_path: "#".into(),
            schema_path: "#/anyOf".into(),
            combinator: Combinator::AnyOf,
            causes: vec![
                ValidationError::instance("#", "#/anyOf/0/type", "must be of type \"string\""),
                ValidationError::instance("#", "#/anyOf/1/minimum", "must be greater than or equal to 3"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("at least one of the schemas in #/anyOf"));
        assert!(text.contains("\n  - #: must be of type \"string\""));
        assert!(text.contains("\n  - #: must be greater than or equal to 3"));
        assert_eq!(err.causes().len(), 2);
    }

    #[test]
    fn nested_causes_are_indented() {
        let inner = ValidationError::NoMatch {
            instance_path: "#".into(),
            schema_path: "#/oneOf/0/anyOf".into(),
            combinator: Combinator::AnyOf,
            causes: vec![ValidationError::instance("#", "#/oneOf/0/anyOf/0", "nope")],
        };
        let outer = ValidationError::NoMatch {
            instance_path: "#".into(),
            schema_path: "#/oneOf".into(),
            combinator: Combinator::OneOf,
            causes: vec![inner],
        };
        assert!(outer.to_string().contains("\n      - #: nope"));
    }

    #[test]
    fn ambiguous_display_names_branches() {
        let err = ValidationError::Ambiguous {
            instance_path: "#".into(),
            schema_path: "#/oneOf".into(),
            matched: vec!["#/oneOf/0".into(), "#/oneOf/1".into()],
        };
        assert!(err.to_string().ends_with("valid against #/oneOf/0 and #/oneOf/1"));
    }

    #[test]
    fn structural_errors_are_flagged() {
        assert!(ValidationError::schema("#/type", "bad").is_structural());
        assert!(ValidationError::resolution("http://x", "offline").is_structural());
        assert!(!ValidationError::instance("#", "#/type", "bad").is_structural());
    }

    #[test]
    fn path_accessors() {
        let err = ValidationError::schema("#/minimum", "must be a number");
        assert_eq!(err.schema_path(), Some("#/minimum"));
        assert_eq!(err.instance_path(), None);
        let err = ValidationError::resolution("http://x", "offline");
        assert_eq!(err.schema_path(), None);
    }
}
