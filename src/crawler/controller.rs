//! Page traversal: decides whether a category has another page
//!
//! The decision only reads the pagination block of a page that was already
//! received. The follow URL is derived from the response's own URL, not
//! rebuilt from configuration, so any parameter the server echoed back is
//! carried forward unchanged.

use crate::crawler::page::{CrawlRequest, PageResponse};
use crate::url::with_page_param;
use crate::PageError;
use serde_json::Value;

pub const CURRENT_PAGE_KEY: &str = "currentPage";
pub const TOTAL_PAGES_KEY: &str = "totalPages";

/// The `(currentPage, totalPages)` pair reported by a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
}

/// Traversal state of a category after reading one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalState {
    /// Another page exists and must be requested next
    HasMore { next_page: u64 },

    /// No further page; terminal for the category
    Exhausted,
}

impl Pagination {
    /// Reads a pagination block
    ///
    /// Both values must be positive integers, given either as JSON numbers
    /// or as decimal strings. Nothing is guessed: anything else is an error.
    pub fn from_value(block: &Value) -> Result<Self, PageError> {
        Ok(Self {
            current_page: page_number(block, CURRENT_PAGE_KEY)?,
            total_pages: page_number(block, TOTAL_PAGES_KEY)?,
        })
    }

    pub fn state(&self) -> TraversalState {
        if self.current_page < self.total_pages {
            TraversalState::HasMore {
                next_page: self.current_page + 1,
            }
        } else {
            TraversalState::Exhausted
        }
    }
}

/// Returns the follow request for the page after `page`, if there is one
///
/// # Returns
///
/// * `Ok(Some(request))` - `currentPage < totalPages`; the request targets `currentPage + 1`
/// * `Ok(None)` - the category is exhausted
/// * `Err(PageError)` - the pagination block is missing or malformed
pub fn next_request(page: &PageResponse) -> Result<Option<CrawlRequest>, PageError> {
    match page.pagination()?.state() {
        TraversalState::Exhausted => Ok(None),
        TraversalState::HasMore { next_page } => Ok(Some(CrawlRequest {
            category: page.category,
            page: next_page,
            url: with_page_param(&page.url, next_page)?,
        })),
    }
}

fn page_number(block: &Value, field: &'static str) -> Result<u64, PageError> {
    let value = match block.get(field) {
        None | Some(Value::Null) => return Err(PageError::MissingPagination(field)),
        Some(value) => value,
    };

    let number = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n > 0 => Ok(n),
        _ => Err(PageError::InvalidPagination {
            field,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::{page_param, Category};
    use serde_json::json;

    const PAGE_TWO: &str = "https://www.nordkeyboards.com/_next/data/qVf153K5N41sKV1bsZjOg/en/sounds/piano-library.json?selected_product=54&page=2&sort=alphabetic&path=sounds&path=piano-library";

    fn page_with(url: &str, pagination: Value) -> PageResponse {
        PageResponse::new(
            Category::PianoLibrary,
            url,
            json!({ "pageProps": { "componentProps": { "pagination": pagination, "items": [] } } }),
        )
    }

    fn query_pairs(source: &str) -> Vec<(String, String)> {
        url::Url::parse(source)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_middle_page_follows_next() {
        let page = page_with(PAGE_TWO, json!({ "currentPage": 2, "totalPages": 5 }));

        let request = next_request(&page).unwrap().expect("follow request");
        assert_eq!(request.category, Category::PianoLibrary);
        assert_eq!(request.page, 3);
        assert_eq!(page_param(&request.url), Some(3));
        assert_eq!(request.url, PAGE_TWO.replace("page=2", "page=3"));
    }

    #[test]
    fn test_follow_keeps_every_other_parameter() {
        let source = "https://example.com/_next/data/b/en/sounds/sample-library.json?selected_product=54&page=1&sort=alphabetic&path=sounds&path=sample-library&echo=server";
        let page = page_with(source, json!({ "currentPage": 1, "totalPages": 2 }));

        let request = next_request(&page).unwrap().unwrap();
        let before: Vec<_> = query_pairs(source)
            .into_iter()
            .filter(|(k, _)| k != "page")
            .collect();
        let after: Vec<_> = query_pairs(&request.url)
            .into_iter()
            .filter(|(k, _)| k != "page")
            .collect();
        assert_eq!(before, after);
        assert_eq!(
            url::Url::parse(&request.url).unwrap().path(),
            "/_next/data/b/en/sounds/sample-library.json"
        );
    }

    #[test]
    fn test_last_page_is_exhausted() {
        let page = page_with(PAGE_TWO, json!({ "currentPage": 5, "totalPages": 5 }));
        assert_eq!(next_request(&page).unwrap(), None);
    }

    #[test]
    fn test_current_beyond_total_is_exhausted() {
        let page = page_with(PAGE_TWO, json!({ "currentPage": 7, "totalPages": 5 }));
        assert_eq!(next_request(&page).unwrap(), None);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let page = page_with(PAGE_TWO, json!({ "currentPage": "2", "totalPages": " 5 " }));
        assert_eq!(next_request(&page).unwrap().unwrap().page, 3);
    }

    #[test]
    fn test_state_transitions() {
        let more = Pagination {
            current_page: 1,
            total_pages: 2,
        };
        assert_eq!(more.state(), TraversalState::HasMore { next_page: 2 });

        let done = Pagination {
            current_page: 1,
            total_pages: 1,
        };
        assert_eq!(done.state(), TraversalState::Exhausted);
    }

    #[test]
    fn test_missing_pagination_field() {
        let page = page_with(PAGE_TWO, json!({ "currentPage": 2 }));
        assert!(matches!(
            next_request(&page),
            Err(PageError::MissingPagination(TOTAL_PAGES_KEY))
        ));
    }

    #[test]
    fn test_non_numeric_pagination() {
        for bad in [json!("many"), json!(2.5), json!(-1), json!(0), json!(true), json!([2])] {
            let page = page_with(PAGE_TWO, json!({ "currentPage": 1, "totalPages": bad.clone() }));
            assert!(
                matches!(
                    next_request(&page),
                    Err(PageError::InvalidPagination {
                        field: TOTAL_PAGES_KEY,
                        ..
                    })
                ),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_missing_pagination_block() {
        let page = PageResponse::new(
            Category::PianoLibrary,
            PAGE_TWO,
            json!({ "pageProps": { "componentProps": { "items": [] } } }),
        );
        assert!(next_request(&page).is_err());
    }
}
