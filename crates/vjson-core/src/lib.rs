//! # vjson-core: Foundational Types for validate-json
//!
//! This crate defines the value model every other crate operates on. Schemas
//! and instances are both [`Value`] trees: parsing raw bytes happens at the
//! edges (`serde_json`, `serde_yaml`), and everything past that boundary works
//! on the closed sum type defined here.
//!
//! ## Key Design Principles
//!
//! 1. **Closed value model.** [`Value`] has exactly six variants. Keyword
//!    families in the validator are exhaustive `match` arms over [`Kind`], so
//!    no value kind can be silently skipped.
//!
//! 2. **One equality.** [`equal()`] is the only deep comparison in the
//!    workspace. `enum`, `uniqueItems` and `PartialEq for Value` all route
//!    through it. Numbers compare by raw IEEE value; object key order is
//!    irrelevant.
//!
//! 3. **One pointer primitive.** [`pointer::navigate`] resolves `$ref`
//!    fragments and [`pointer::join`] builds the instance and schema paths
//!    reported in errors.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vjson-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod equal;
pub mod error;
pub mod pointer;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use equal::equal;
pub use error::{ConversionError, PointerError};
pub use value::{Kind, Map, Value};
