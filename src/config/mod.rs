//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All sections are optional, so an empty file (or no file at all, via
//! [`Config::default`]) crawls the public Nord catalog.
//!
//! # Example
//!
//! ```no_run
//! use nord_sound_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawling product {}", config.crawler.selected_product);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig, DEFAULT_BUILD_ID,
    DEFAULT_LOCALE, DEFAULT_ORIGIN, DEFAULT_SELECTED_PRODUCT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
