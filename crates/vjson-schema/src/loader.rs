//! # Document Loader
//!
//! A URI-keyed cache of parsed schema documents, shared by every validator
//! built from it. Entries come from two places:
//!
//! - [`Loader::add`]: pre-loaded documents, keyed by their declared `id`.
//! - [`Loader::get`]: on a cache miss, a fetch through the configured
//!   [`Fetch`] transport, if network access is enabled.
//!
//! Entries are never evicted. The cache lives as long as the loader.
//!
//! ## Concurrency
//!
//! Each URI owns a once-cell slot. The map lock is held only long enough to
//! find or create the slot, never during a fetch. Concurrent first-time
//! requests for the same URI block on the same slot, so one fetch serves
//! them all. A failed fetch is not cached: its empty slot is removed so
//! the map only grows with documents that were actually obtained.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use vjson_core::Value;

use crate::error::{FetchError, ValidationError};

/// Transport used to obtain remote documents.
///
/// Implementations fetch `uri` and return the parsed document. Parsing is
/// the transport's job, so a fetcher decides which formats it accepts.
pub trait Fetch: Send + Sync {
    fn fetch(&self, uri: &str) -> Result<Value, FetchError>;
}

type Slot = Arc<OnceCell<Arc<Value>>>;

/// Session-scoped cache of schema documents.
pub struct Loader {
    documents: Mutex<HashMap<String, Slot>>,
    fetcher: Option<Arc<dyn Fetch>>,
    network: AtomicBool,
}

impl Loader {
    /// A loader without a transport: only pre-loaded documents resolve.
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            fetcher: None,
            network: AtomicBool::new(false),
        }
    }

    /// A loader that can fetch through `fetcher` once network access is
    /// enabled. Network access starts disabled.
    pub fn with_fetcher(fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            fetcher: Some(fetcher),
            ..Self::new()
        }
    }

    pub fn enable_network_access(&self, enabled: bool) {
        self.network.store(enabled, Ordering::Release);
    }

    pub fn network_access_enabled(&self) -> bool {
        self.network.load(Ordering::Acquire)
    }

    /// Register a pre-parsed document under its declared `id`.
    ///
    /// A trailing empty fragment (`http://x/s.json#`) is dropped from the
    /// key. Returns the key used. A document without a string `id` is a
    /// schema error.
    pub fn add(&self, doc: Value) -> Result<String, ValidationError> {
        let id = match doc.get("id") {
            Some(Value::String(id)) => document_key(id).to_string(),
            Some(_) => return Err(ValidationError::schema("#/id", "must be a string")),
            None => {
                return Err(ValidationError::schema(
                    "#",
                    "document needs an \"id\" to be pre-loaded",
                ))
            }
        };
        self.insert(&id, doc);
        Ok(id)
    }

    /// Register `doc` under an explicit `uri`, replacing any previous entry.
    pub fn insert(&self, uri: &str, doc: Value) {
        let key = document_key(uri).to_string();
        tracing::debug!(uri = %key, "pre-loading document");
        let slot = Arc::new(OnceCell::with_value(Arc::new(doc)));
        self.documents.lock().insert(key, slot);
    }

    /// Return the document at `uri`, fetching and caching it on first use.
    ///
    /// # Errors
    ///
    /// `ValidationError::Resolution` if the document is not cached and
    /// network access is disabled, no transport is configured, or the fetch
    /// fails.
    pub fn get(&self, uri: &str) -> Result<Arc<Value>, ValidationError> {
        let key = document_key(uri);

        let (slot, fetcher) = {
            let mut documents = self.documents.lock();
            if let Some(doc) = documents.get(key).and_then(|slot| slot.get()) {
                tracing::trace!(uri = %key, "document cache hit");
                return Ok(Arc::clone(doc));
            }
            if !self.network_access_enabled() {
                return Err(ValidationError::resolution(
                    uri,
                    "document is not pre-loaded and network access is disabled",
                ));
            }
            let Some(fetcher) = self.fetcher.as_ref() else {
                return Err(ValidationError::resolution(uri, "no fetcher is configured"));
            };
            (Arc::clone(documents.entry(key.to_string()).or_default()), fetcher)
        };

        let result = slot.get_or_try_init(|| {
            tracing::debug!(uri = %key, "fetching remote document");
            fetcher.fetch(key).map(Arc::new)
        });
        match result {
            Ok(doc) => Ok(Arc::clone(doc)),
            Err(e) => {
                tracing::warn!(uri = %key, error = %e, "remote document fetch failed");
                self.discard_empty(key, &slot);
                Err(ValidationError::resolution(uri, e))
            }
        }
    }

    /// Drop `slot` from the map if it is still the entry for `key` and was
    /// never filled.
    fn discard_empty(&self, key: &str, slot: &Slot) {
        let mut documents = self.documents.lock();
        let stale = documents
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && current.get().is_none());
        if stale {
            documents.remove(key);
        }
    }

    /// Number of map entries, filled or not.
    #[cfg(test)]
    fn slots(&self) -> usize {
        self.documents.lock().len()
    }

    /// True if `uri` is cached (pre-loaded or already fetched).
    pub fn contains(&self, uri: &str) -> bool {
        self.documents
            .lock()
            .get(document_key(uri))
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.documents
            .lock()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("documents", &self.len())
            .field("has_fetcher", &self.fetcher.is_some())
            .field("network", &self.network_access_enabled())
            .finish()
    }
}

/// Cache key for a document URI: an empty trailing fragment is dropped.
fn document_key(uri: &str) -> &str {
    uri.strip_suffix('#').unwrap_or(uri)
}
