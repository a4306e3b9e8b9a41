//! # vjson-cli: validate-json
//!
//! Library half of the `validate-json` binary: document loading, the HTTP
//! transport for remote `$ref` targets, and the validation command itself.
//! `main.rs` only parses arguments, installs logging and maps the result to
//! an exit code.
//!
//! ## Usage
//!
//! ```text
//! validate-json --schema schema.json --input data.yaml
//! validate-json --schema root.json --input data.json --extra "defs.json more.json" -n
//! ```
//!
//! Success is silent with exit status 0. Any failure prints a diagnostic to
//! stderr and exits with status 1.

pub mod document;
pub mod fetch;
pub mod validate;
