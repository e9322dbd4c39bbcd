//! This module provides a client to connect to a WordPress REST API

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::category::Category;
use crate::config::Config;
use crate::error::{network_error, remote_format_error, PantryResult};
use crate::traits::{EventSource, RemotePage};
use crate::wp;

/// The response header carrying the total page count of a listing
const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// An [`EventSource`] that fetches its data from a WordPress site
pub struct Client {
    http: reqwest::Client,
    posts_url: Url,
    categories_url: Url,
    per_page: u32,
    max_retries: u32,
    retry_delay: Duration,
}

impl Client {
    /// Create a client. This does not send any request yet.
    pub fn new(config: &Config) -> PantryResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| network_error(&config.posts_url, err))?;

        Ok(Self {
            http,
            posts_url: config.posts_url.clone(),
            categories_url: config.categories_url.clone(),
            per_page: config.per_page,
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay,
        })
    }

    /// GET a URL, retrying transient failures.
    ///
    /// Transport errors and non-success HTTP statuses count as transient and are
    /// attempted up to `max_retries` times, with a fixed delay in between.
    async fn get_with_retry(&self, url: &Url, query: &[(&str, String)]) -> PantryResult<reqwest::Response> {
        let mut last_failure = String::new();

        for attempt in 1..=self.max_retries {
            if attempt > 1 {
                tokio::time::sleep(self.retry_delay).await;
            }

            match self.http.get(url.clone()).query(query).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    last_failure = format!("HTTP status {}", status);
                }
                Err(err) => {
                    last_failure = err.to_string();
                }
            }
            log::debug!(
                "Request to {} failed (attempt {}/{}): {}",
                url,
                attempt,
                self.max_retries,
                last_failure
            );
        }

        Err(network_error(
            url,
            format!("{} (after {} attempts)", last_failure, self.max_retries),
        ))
    }

    /// Read the total page count from a listing response.
    /// A missing or unparsable header counts as a single page.
    fn total_pages_of(response: &reqwest::Response, url: &Url) -> u32 {
        match response
            .headers()
            .get(TOTAL_PAGES_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|text| text.parse::<u32>().ok())
        {
            Some(total) => total,
            None => {
                log::warn!(
                    "Response from {} carries no usable {} header, assuming a single page",
                    url,
                    TOTAL_PAGES_HEADER
                );
                1
            }
        }
    }
}

#[async_trait]
impl EventSource for Client {
    async fn fetch_events_page(&self, page: u32) -> PantryResult<RemotePage> {
        let query = [
            ("per_page", self.per_page.to_string()),
            ("page", page.to_string()),
        ];
        let response = self.get_with_retry(&self.posts_url, &query).await?;
        let total_pages = Self::total_pages_of(&response, &self.posts_url);

        let body = response
            .text()
            .await
            .map_err(|err| network_error(&self.posts_url, err))?;
        let posts: Vec<wp::WpPost> = serde_json::from_str(&body)
            .map_err(|err| remote_format_error(&self.posts_url, err))?;

        let events = posts.into_iter().filter_map(wp::parse_post).collect();
        Ok(RemotePage { events, total_pages })
    }

    async fn fetch_categories(&self) -> PantryResult<Vec<Category>> {
        let mut categories = Vec::new();
        let mut page = 1u32;

        // The lookup endpoint is paginated too; walk every page it reports
        loop {
            let query = [
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ];
            let response = self.get_with_retry(&self.categories_url, &query).await?;
            let total_pages = Self::total_pages_of(&response, &self.categories_url);
            let body = response
                .text()
                .await
                .map_err(|err| network_error(&self.categories_url, err))?;
            let entries: Vec<wp::WpCategory> = serde_json::from_str(&body)
                .map_err(|err| remote_format_error(&self.categories_url, err))?;

            if entries.is_empty() {
                break;
            }
            categories.extend(entries.into_iter().map(Category::from));
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        log::debug!("Resolved {} categories", categories.len());
        Ok(categories)
    }
}
