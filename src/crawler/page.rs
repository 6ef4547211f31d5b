//! Crawl requests and decoded catalog pages
//!
//! Every page of the catalog is a Next.js data route whose body nests the
//! useful part two levels deep:
//!
//! ```json
//! { "pageProps": { "componentProps": {
//!     "pagination": { "currentPage": 1, "totalPages": 5 },
//!     "items": [ ... ]
//! } } }
//! ```

use crate::config::SiteConfig;
use crate::crawler::controller::Pagination;
use crate::url::{build_url, Category};
use crate::PageError;
use serde_json::{Map, Value};

pub const PAGE_PROPS_KEY: &str = "pageProps";
pub const COMPONENT_PROPS_KEY: &str = "componentProps";
pub const PAGINATION_KEY: &str = "pagination";
pub const ITEMS_KEY: &str = "items";

/// A request for one page of one category
///
/// Built once and never edited: the next page gets a new request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    /// Category whose chain this request belongs to
    pub category: Category,

    /// Page index carried in the `page` query parameter
    pub page: u64,

    /// Absolute request URL
    pub url: String,
}

impl CrawlRequest {
    /// Builds the first-page request for a category
    pub fn seed(site: &SiteConfig, category: Category, product_filter: &str) -> Self {
        Self {
            category,
            page: 1,
            url: build_url(site, category.as_str(), product_filter, 1),
        }
    }
}

/// A fetched and JSON-decoded catalog page
#[derive(Debug, Clone)]
pub struct PageResponse {
    /// Category of the request that produced this page
    pub category: Category,

    /// Effective URL of the response, after redirects
    pub url: String,

    /// Decoded body
    pub body: Value,
}

impl PageResponse {
    pub fn new(category: Category, url: impl Into<String>, body: Value) -> Self {
        Self {
            category,
            url: url.into(),
            body,
        }
    }

    /// Decodes a response body
    pub fn from_json(
        category: Category,
        url: impl Into<String>,
        text: &str,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(category, url, serde_json::from_str(text)?))
    }

    /// Reads the pagination block
    pub fn pagination(&self) -> Result<Pagination, PageError> {
        let block = self
            .component_props()?
            .get(PAGINATION_KEY)
            .filter(|block| !block.is_null())
            .ok_or(PageError::MissingPagination(PAGINATION_KEY))?;
        Pagination::from_value(block)
    }

    /// Returns the raw items of the page, in page order
    pub fn items(&self) -> Result<&[Value], PageError> {
        match self.component_props()?.get(ITEMS_KEY) {
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(Value::Null) | None => Err(PageError::MissingEnvelope(ITEMS_KEY)),
            Some(_) => Err(PageError::ItemsNotArray),
        }
    }

    fn component_props(&self) -> Result<&Map<String, Value>, PageError> {
        self.body
            .get(PAGE_PROPS_KEY)
            .ok_or(PageError::MissingEnvelope(PAGE_PROPS_KEY))?
            .get(COMPONENT_PROPS_KEY)
            .and_then(Value::as_object)
            .ok_or(PageError::MissingEnvelope(COMPONENT_PROPS_KEY))
    }
}
