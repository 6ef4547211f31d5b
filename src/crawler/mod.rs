//! Crawler module for catalog traversal and item extraction
//!
//! This module contains the core crawling logic, including:
//! - Pagination decisions for each fetched page
//! - Validation and normalization of catalog items
//! - HTTP fetching with retry logic
//! - Overall crawl coordination, one chain per category

mod controller;
mod coordinator;
mod extractor;
mod fetcher;
mod page;
mod parser;

pub use controller::{next_request, Pagination, TraversalState};
pub use coordinator::{run_crawl, seed_requests, ChainOutcome, Coordinator};
pub use extractor::{
    extract, extract_one, FieldViolation, Image, RawLink, SoundItem, ValidationFailure, Violation,
};
pub use fetcher::{
    build_http_client, fetch_url, fetch_with_retry, user_agent_string, FetchResult, RetryPolicy,
};
pub use page::{CrawlRequest, PageResponse};
pub use parser::{parse_page, ParsedPage};

use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the JSON Lines output file
/// 2. Build the HTTP client
/// 3. Walk every configured category until it is exhausted or fails
/// 4. Return the crawl statistics
pub async fn crawl(config: Config) -> Result<CrawlStatistics, CrawlError> {
    run_crawl(config).await
}
