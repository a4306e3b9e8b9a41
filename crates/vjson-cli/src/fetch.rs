//! # HTTP Transport
//!
//! [`HttpFetcher`] implements [`Fetch`] over blocking HTTP(S). Responses
//! are parsed by the extension of the requested URI, like local files.
//!
//! Each request carries a timeout. There is no retry: a failed fetch is an
//! ordinary resolution error and the loader does not cache it.

use std::time::Duration;

use vjson_core::Value;
use vjson_schema::{Fetch, FetchError};

use crate::document::{self, Format};

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Blocking HTTP fetcher for remote schema documents.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("validate-json/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, uri: &str) -> Result<Value, FetchError> {
        let response = self.client.get(uri).send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Transport(format!("request timed out: {e}"))
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| FetchError::Transport(format!("failed to read response body: {e}")))?;
        tracing::debug!(uri, bytes = body.len(), "fetched remote document");

        document::parse(&body, Format::from_path(uri)).map_err(|e| FetchError::Parse(format!("{e:#}")))
    }
}
