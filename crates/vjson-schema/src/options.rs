//! # Validator Options
//!
//! Engine behavior that a caller may tune. Built with chained setters in the
//! manner of `jsonschema::options()`:
//!
//! ```
//! use vjson_schema::ValidatorOptions;
//!
//! let mut options = ValidatorOptions::default();
//! options.with_strict_integer(true).with_max_reference_depth(32);
//! assert!(options.strict_integer());
//! assert_eq!(options.max_reference_depth(), 32);
//! ```

/// Default limit on nested `$ref` traversals along one validation path.
pub const DEFAULT_MAX_REFERENCE_DEPTH: usize = 1024;

/// Tunables for [`crate::Validator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    strict_integer: bool,
    max_reference_depth: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            strict_integer: false,
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
        }
    }
}

impl ValidatorOptions {
    /// When set, `"type": "integer"` also requires a zero fractional part.
    ///
    /// Off by default: `integer` accepts any number, which is the behavior
    /// existing users of this validator depend on.
    pub fn with_strict_integer(&mut self, strict: bool) -> &mut Self {
        self.strict_integer = strict;
        self
    }

    /// Stack guard: cap on how many `$ref`s may be followed inside one
    /// another. Exceeding it is a schema error.
    ///
    /// Cycles that never consume the instance (`{"allOf": [{"$ref": "#"}]}`)
    /// are detected separately and do not depend on this cap.
    pub fn with_max_reference_depth(&mut self, depth: usize) -> &mut Self {
        self.max_reference_depth = depth;
        self
    }

    pub fn strict_integer(&self) -> bool {
        self.strict_integer
    }

    pub fn max_reference_depth(&self) -> usize {
        self.max_reference_depth
    }
}
