//! The error types this crate can report

use thiserror::Error;

/// Main error type for this crate
///
/// Every variant carries its detail as text, so that errors stay `Clone` and can
/// travel inside [`FetchEvent`](crate::worker::progress::FetchEvent)s across the
/// worker's feedback channel.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// A request kept failing (transport error or non-success HTTP status) after
    /// every retry attempt
    #[error("network error on {url}: {detail}")]
    Network { url: String, detail: String },

    /// The remote answered, but with a body this crate cannot make sense of.
    /// Not retried: the same bytes would fail the same way.
    #[error("malformed response from {url}: {detail}")]
    RemoteFormat { url: String, detail: String },

    /// The cache backing file could not be read or parsed.
    /// Callers treat this the same as "no cache yet".
    #[error("unable to read the cache: {0}")]
    CacheRead(String),

    /// The cache backing file could not be written.
    /// The in-memory data stays usable.
    #[error("unable to write the cache: {0}")]
    CacheWrite(String),

    /// The export destination could not be written
    #[error("unable to export: {0}")]
    Export(String),

    /// A fetch was requested while another one is still running for this dataset
    #[error("a fetch is already in progress for this dataset")]
    FetchInProgress,
}

/// Type alias for Result with this crate's error type
pub type PantryResult<T> = Result<T, Error>;

/// Helper to build a [`Error::Network`]
pub fn network_error<D: std::fmt::Display>(url: &url::Url, detail: D) -> Error {
    Error::Network {
        url: url.to_string(),
        detail: detail.to_string(),
    }
}

/// Helper to build a [`Error::RemoteFormat`]
pub fn remote_format_error<D: std::fmt::Display>(url: &url::Url, detail: D) -> Error {
    Error::RemoteFormat {
        url: url.to_string(),
        detail: detail.to_string(),
    }
}
