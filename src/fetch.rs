//! Downloading manifest links.
//!
//! The [`Fetcher`] trait is the seam between the pipeline and the network:
//! one call, one attempt, the full body or an error. [`HttpFetcher`] is the
//! production implementation on top of `reqwest`'s blocking client. Each
//! worker thread blocks inside its own request, so the pool size is the
//! number of requests in flight.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("Status {0}")]
    Status(u16),
    /// Connection, TLS, timeout or body read failure.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Retrieves the bytes behind a link.
///
/// `Sync` so a single fetcher can be shared by every worker in the pool.
pub trait Fetcher: Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// HTTP settings for [`HttpFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    /// Whole-request timeout. `None` keeps the client default (no timeout).
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: default_user_agent(),
        }
    }
}

/// `emoji-dataset/<version>`
pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Blocking HTTP GET, a single attempt per link.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(options: &HttpOptions) -> Result<Self, FetchError> {
        // The blocking client applies a 30s default unless told otherwise.
        let client = reqwest::blocking::Client::builder()
            .user_agent(options.user_agent.as_str())
            .timeout(options.timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        tracing::debug!(url, bytes = body.len(), "fetched");
        Ok(body.to_vec())
    }
}
