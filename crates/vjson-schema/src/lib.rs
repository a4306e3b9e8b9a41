//! # vjson-schema: JSON Schema Draft 04 Validation
//!
//! Validates [`Value`](vjson_core::Value) trees against Draft 04 schemas,
//! and checks that schemas are themselves well-formed.
//!
//! ## Components
//!
//! - [`meta`]: the meta-schema validator. Every schema, and every
//!   sub-schema the instance validator descends into, passes through it.
//! - [`Loader`]: session-scoped, URI-keyed document cache with single-flight
//!   remote fetch through a pluggable [`Fetch`] transport.
//! - [`resolve`]: turns a `$ref` into a target node and its owning document.
//! - [`Validator`]: the recursive instance-against-schema algorithm.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use vjson_core::Value;
//! use vjson_schema::{Loader, Validator};
//!
//! let schema: Value = serde_json::from_str(r#"{"type": "array", "uniqueItems": true}"#).unwrap();
//! let validator = Validator::new(schema, Some(Arc::new(Loader::new()))).unwrap();
//!
//! assert!(validator.is_valid(&serde_json::from_str("[1, 2]").unwrap()));
//! assert!(validator.validate(&serde_json::from_str("[1, 1]").unwrap()).is_err());
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `vjson-core` internally.
//! - One error per `validate` call; only `anyOf`/`oneOf` aggregate causes.
//! - Nothing in this crate aborts the process. Fetch and parse failures are
//!   ordinary [`ValidationError::Resolution`] values.

pub mod error;
pub mod loader;
pub mod meta;
pub mod options;
pub mod pattern;
pub mod resolve;
pub mod validator;

pub use error::{Combinator, FetchError, ValidationError};
pub use loader::{Fetch, Loader};
pub use meta::{check_schema, validate_schema};
pub use options::ValidatorOptions;
pub use resolve::{resolve_ref, Resolved};
pub use validator::Validator;
