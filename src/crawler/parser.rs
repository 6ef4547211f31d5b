//! Page parser: the engine's reaction to one received catalog page
//!
//! Parsing a page produces two independent outputs:
//! - the follow request for the next page (or the reason there is none)
//! - one extraction result per raw item
//!
//! A broken pagination block does not prevent item extraction, and a broken
//! item list does not prevent the pagination decision.

use crate::crawler::controller::next_request;
use crate::crawler::extractor::{extract, SoundItem, ValidationFailure};
use crate::crawler::page::{CrawlRequest, PageResponse};
use crate::PageError;

/// Everything extracted from one page
#[derive(Debug)]
pub struct ParsedPage {
    /// Next page of the same category, `None` once exhausted
    pub follow: Result<Option<CrawlRequest>, PageError>,

    /// Extraction results in page order, or why the item list was unreadable
    pub records: Result<Vec<Result<SoundItem, ValidationFailure>>, PageError>,
}

/// Parses a decoded catalog page
///
/// # Example
///
/// ```
/// use nord_sound_crawler::crawler::{parse_page, PageResponse};
/// use nord_sound_crawler::url::Category;
/// use serde_json::json;
///
/// let page = PageResponse::new(
///     Category::PianoLibrary,
///     "https://www.nordkeyboards.com/x.json?page=2&path=sounds",
///     json!({ "pageProps": { "componentProps": {
///         "pagination": { "currentPage": 2, "totalPages": 5 },
///         "items": []
///     } } }),
/// );
///
/// let parsed = parse_page(&page, "https://www.nordkeyboards.com");
/// let next = parsed.follow.unwrap().unwrap();
/// assert_eq!(next.url, "https://www.nordkeyboards.com/x.json?page=3&path=sounds");
/// assert!(parsed.records.unwrap().is_empty());
/// ```
pub fn parse_page(page: &PageResponse, origin: &str) -> ParsedPage {
    let follow = next_request(page);
    let records = page
        .items()
        .map(|items| extract(items, origin).collect());

    ParsedPage { follow, records }
}
