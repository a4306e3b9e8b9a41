//! # Reference Resolution
//!
//! Turns a `$ref` URI into the schema node it names and the document that
//! owns it:
//!
//! - `#/a/b`: a pointer into the current document.
//! - `doc.json#/a/b`: a pointer into another document, obtained from the
//!   [`Loader`].
//! - `doc.json`: the root of another document.
//!
//! A relative document URI is joined against the current document's `id`
//! when that `id` is absolute. Otherwise the URI is used as written.

use std::sync::Arc;

use url::Url;
use vjson_core::{pointer, Value};

use crate::error::ValidationError;
use crate::loader::Loader;

/// A resolved `$ref`: the owning document plus the pointer to the target.
#[derive(Debug, Clone)]
pub struct Resolved {
    document: Arc<Value>,
    tokens: Vec<String>,
    location: String,
}

impl Resolved {
    /// The document that owns the target. Nested `#` references inside the
    /// target resolve against it.
    pub fn document(&self) -> &Arc<Value> {
        &self.document
    }

    /// Where the target lives: `#/...` for local references, or the
    /// absolute document URI followed by the fragment.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The schema node the reference points at.
    pub fn target(&self) -> Result<&Value, ValidationError> {
        pointer::navigate_tokens(&self.document, &self.tokens).map_err(|e| {
            ValidationError::schema(&self.location, format!("reference does not resolve: {e}"))
        })
    }
}

/// Resolve `uri` relative to `current`.
///
/// Without a loader only `#` references resolve.
///
/// # Errors
///
/// `ValidationError::Schema` if the fragment is not a pointer or does not
/// navigate. `ValidationError::Resolution` if a remote document cannot be
/// loaded.
pub fn resolve_ref(
    current: &Arc<Value>,
    uri: &str,
    loader: Option<&Loader>,
) -> Result<Resolved, ValidationError> {
    let (document, fragment, location) = if uri.starts_with('#') {
        (Arc::clone(current), uri, uri.to_string())
    } else {
        let loader = loader.ok_or_else(|| {
            ValidationError::resolution(uri, "a loader is required to resolve remote references")
        })?;
        let (document_uri, fragment) = match uri.find('#') {
            Some(i) => (&uri[..i], &uri[i..]),
            None => (uri, ""),
        };
        let document_uri = within_scope(current, document_uri);
        tracing::debug!(reference = %uri, document = %document_uri, "resolving remote reference");
        let document = loader.get(&document_uri)?;
        let location = format!("{document_uri}{}", if fragment.is_empty() { "#" } else { fragment });
        (document, fragment, location)
    };

    let tokens = pointer::parse_fragment(fragment).map_err(|e| {
        ValidationError::schema(&location, format!("reference is not a JSON Pointer: {e}"))
    })?;
    let resolved = Resolved {
        document,
        tokens,
        location,
    };
    resolved.target()?;
    Ok(resolved)
}

/// Join a relative document URI against the current document's absolute
/// `id`, if it has one.
fn within_scope(current: &Value, document_uri: &str) -> String {
    if Url::parse(document_uri).is_ok() {
        return document_uri.to_string();
    }
    current
        .get("id")
        .and_then(Value::as_str)
        .and_then(|id| Url::parse(id).ok())
        .and_then(|base| base.join(document_uri).ok())
        .map(String::from)
        .unwrap_or_else(|| document_uri.to_string())
}
