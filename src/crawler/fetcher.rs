//! HTTP fetcher implementation
//!
//! This module owns the transport side of the crawl:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for catalog pages (redirects followed by the client)
//! - Retry logic for transient failures
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Response body
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// Whether another attempt may succeed
        retryable: bool,
    },

    /// Network error (connection refused, timeout, broken body, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// Whether another attempt may succeed
        retryable: bool,
    },
}

impl FetchResult {
    /// Returns true if the failure is transient and worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Success { .. } => false,
            Self::HttpError { retryable, .. } | Self::NetworkError { retryable, .. } => *retryable,
        }
    }
}

/// How often and how patiently failed fetches are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Pause before each retry
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: Duration::from_millis(config.retry_delay),
        }
    }
}

/// Formats the user agent: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use nord_sound_crawler::config::UserAgentConfig;
/// use nord_sound_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | Success |
/// | 408, 429, 5xx | HttpError, retryable |
/// | other status | HttpError, final |
/// | timeout, connection error | NetworkError, retryable |
/// | other transport error | NetworkError, final |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
            retryable: is_retryable_status(status),
        };
    }

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => classify_error(e),
    }
}

/// Fetches a URL, retrying transient failures according to `policy`
pub async fn fetch_with_retry(client: &Client, url: &str, policy: &RetryPolicy) -> FetchResult {
    let mut attempt = 0;
    loop {
        let result = fetch_url(client, url).await;
        if !result.is_retryable() || attempt >= policy.max_retries {
            return result;
        }

        attempt += 1;
        tracing::debug!(
            "Retrying {} ({}/{}) after {:?}: {:?}",
            url,
            attempt,
            policy.max_retries,
            policy.delay,
            result
        );
        tokio::time::sleep(policy.delay).await;
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            retryable: true,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
            retryable: true,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            retryable: false,
        }
    }
}
