//! Support for library configuration options
//!
//! There is no module-level state here: every component that needs a setting
//! receives it from a [`Config`] at construction time.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::model::FilterCriteria;

/// How many events are requested per page
pub const DEFAULT_PER_PAGE: u32 = 100;
/// How many times a failing request is attempted before giving up
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// How long to wait between two attempts of the same request
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
/// How long a single request may take before it counts as failed
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a [`Provider`](crate::Provider) needs to know about one dataset
#[derive(Clone, Debug)]
pub struct Config {
    /// The paginated event listing endpoint
    pub posts_url: Url,
    /// The category lookup endpoint
    pub categories_url: Url,
    /// Page size requested from the remote
    pub per_page: u32,
    /// Attempts per request before a [`Error::Network`](crate::Error::Network) is reported
    pub max_retries: u32,
    /// Delay between two attempts of the same request
    pub retry_delay: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// The User-Agent header sent with every request
    pub user_agent: String,
    /// The folder the cache files live in
    pub cache_folder: PathBuf,
    /// Names this dataset. The cache file name is derived from it, so two
    /// datasets with different identities never overwrite each other's cache.
    pub dataset_id: String,
    /// The filter a fresh [`FilterModel`](crate::FilterModel) starts with
    pub default_filter: FilterCriteria,
}

impl Config {
    /// Create a configuration with the default tuning values.
    ///
    /// The dataset identity defaults to the host of `posts_url`.
    pub fn new<P: Into<PathBuf>>(posts_url: Url, categories_url: Url, cache_folder: P) -> Self {
        let dataset_id = posts_url.host_str().unwrap_or("events").to_string();
        Self {
            posts_url,
            categories_url,
            per_page: DEFAULT_PER_PAGE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: "Mozilla/5.0".to_string(),
            cache_folder: cache_folder.into(),
            dataset_id,
            default_filter: FilterCriteria::default(),
        }
    }
}
