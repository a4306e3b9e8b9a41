//! # Error Types
//!
//! Errors raised by the value model itself. Validation errors live in
//! `vjson-schema`; the types here cover the two things the core can get
//! wrong on its own: walking a JSON Pointer and converting a foreign tree.

use thiserror::Error;

/// Failure to navigate a JSON Pointer inside a document.
///
/// Every variant carries `at`, the pointer prefix (in `#/a/b` form) that
/// was being resolved when navigation stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    /// An object did not contain the requested key.
    #[error("{at}: object has no key {key:?}")]
    MissingKey {
        /// Pointer prefix up to the failing object.
        at: String,
        /// The key that was looked up.
        key: String,
    },

    /// An array index was past the end of the array.
    #[error("{at}: index {index} is out of range for array of length {len}")]
    IndexOutOfRange {
        /// Pointer prefix up to the failing array.
        at: String,
        /// The requested index.
        index: usize,
        /// Length of the array.
        len: usize,
    },

    /// A token used to index an array is not a canonical decimal index.
    #[error("{at}: {token:?} is not a valid array index")]
    InvalidIndex {
        /// Pointer prefix up to the failing array.
        at: String,
        /// The offending token.
        token: String,
    },

    /// Navigation tried to descend into a scalar.
    #[error("{at}: cannot descend into a {kind} with token {token:?}")]
    NotAContainer {
        /// Pointer prefix up to the scalar.
        at: String,
        /// Kind name of the scalar.
        kind: &'static str,
        /// The token that could not be applied.
        token: String,
    },

    /// The fragment is neither empty nor a `/`-separated pointer.
    #[error("{fragment:?} is not a JSON Pointer")]
    NotAPointer {
        /// The fragment as given.
        fragment: String,
    },

    /// A percent-escape in a URI fragment was malformed.
    #[error("{at}: malformed percent-encoding in {token:?}")]
    InvalidEscape {
        /// Pointer prefix up to the failing token.
        at: String,
        /// The raw token.
        token: String,
    },
}

/// Failure to convert a foreign value tree into a [`crate::Value`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// A mapping key could not be represented as a string.
    #[error("unsupported map key: {0}")]
    UnsupportedKey(String),

    /// A number could not be represented as an `f64`.
    #[error("unsupported number: {0}")]
    UnsupportedNumber(String),
}
