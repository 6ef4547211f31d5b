use crate::UrlError;
use url::Url;

/// Query parameter carrying the page index
pub const PAGE_PARAM: &str = "page";

/// Returns `url_str` with its `page` query parameter set to `page`
///
/// Only the `page` pair is touched: every other pair keeps its exact bytes
/// and position, including repeated keys. A missing `page` pair is appended,
/// and repeated `page` pairs collapse into the first one.
///
/// # Examples
///
/// ```
/// use nord_sound_crawler::url::with_page_param;
///
/// let next = with_page_param("https://example.com/a.json?x=1&page=2&path=a&path=b", 3).unwrap();
/// assert_eq!(next, "https://example.com/a.json?x=1&page=3&path=a&path=b");
/// ```
pub fn with_page_param(url_str: &str, page: u64) -> Result<String, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    let query = url.query().unwrap_or_default().to_string();
    let page_pair = format!("{}={}", PAGE_PARAM, page);

    let mut replaced = false;
    let mut pairs: Vec<&str> = Vec::new();
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        if pair_name(pair) != PAGE_PARAM {
            pairs.push(pair);
        } else if !replaced {
            pairs.push(&page_pair);
            replaced = true;
        }
    }
    if !replaced {
        pairs.push(&page_pair);
    }

    url.set_query(Some(&pairs.join("&")));
    Ok(url.into())
}

/// Reads the first `page` query parameter of a URL, if it is numeric
pub fn page_param(url_str: &str) -> Option<u64> {
    let url = Url::parse(url_str).ok()?;
    let value = url
        .query_pairs()
        .find(|(name, _)| name == PAGE_PARAM)
        .map(|(_, value)| value.into_owned())?;
    value.parse().ok()
}

fn pair_name(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(name, _)| name)
}
