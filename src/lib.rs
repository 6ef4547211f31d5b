//! Nord Sound Crawler: a paginated catalog crawler for the Nord sound libraries
//!
//! This crate walks the JSON data routes behind the Nord Keyboards sound
//! library, one pagination chain per catalog category, validates every catalog
//! entry into a [`SoundItem`](crawler::SoundItem) and hands the records to an
//! [`ItemSink`](output::ItemSink).

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl task failed: {0}")]
    Task(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Errors raised while reading a decoded catalog page
///
/// None of these abort a crawl: a pagination error ends the chain for the
/// category, an envelope error only drops the page's items.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("missing `{0}` in page envelope")]
    MissingEnvelope(&'static str),

    #[error("`items` is not an array")]
    ItemsNotArray,

    #[error("missing pagination field `{0}`")]
    MissingPagination(&'static str),

    #[error("pagination field `{field}` is not a positive integer: {value}")]
    InvalidPagination { field: &'static str, value: String },

    #[error("cannot build next page URL: {0}")]
    FollowUrl(#[from] UrlError),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{extract, CrawlRequest, PageResponse, SoundItem, ValidationFailure};
pub use url::{build_url, Category};
