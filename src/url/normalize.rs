use url::Url;

/// Turns a site-relative path into an absolute URL by prefixing the origin
///
/// This is plain concatenation: catalog paths already start with `/` and the
/// origin is validated to carry no trailing slash.
///
/// # Examples
///
/// ```
/// use nord_sound_crawler::url::absolutize;
///
/// assert_eq!(
///     absolutize("https://www.nordkeyboards.com", "/x"),
///     "https://www.nordkeyboards.com/x"
/// );
/// ```
pub fn absolutize(origin: &str, path: &str) -> String {
    format!("{}{}", origin, path)
}

/// Resolves a link that arrived as a bare string
///
/// Absolute `http`/`https` URLs are kept as they are; everything else is
/// treated as a site-relative path and prefixed with the origin.
pub fn resolve_bare_link(origin: &str, link: &str) -> String {
    if is_absolute_http(link) {
        link.to_string()
    } else {
        absolutize(origin, link)
    }
}

fn is_absolute_http(link: &str) -> bool {
    Url::parse(link)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://www.nordkeyboards.com";

    #[test]
    fn test_absolutize_prefixes_origin() {
        assert_eq!(absolutize(ORIGIN, "/x"), "https://www.nordkeyboards.com/x");
        assert_eq!(
            absolutize(ORIGIN, "/sounds/piano-library/grand"),
            "https://www.nordkeyboards.com/sounds/piano-library/grand"
        );
    }

    #[test]
    fn test_absolutize_is_plain_concatenation() {
        assert_eq!(
            absolutize(ORIGIN, "/files/a b.npno?x=1"),
            "https://www.nordkeyboards.com/files/a b.npno?x=1"
        );
    }

    #[test]
    fn test_bare_absolute_link_passes_through() {
        assert_eq!(
            resolve_bare_link(ORIGIN, "https://cdn.example.com/a"),
            "https://cdn.example.com/a"
        );
        assert_eq!(
            resolve_bare_link(ORIGIN, "http://www.nordkeyboards.com/b"),
            "http://www.nordkeyboards.com/b"
        );
    }

    #[test]
    fn test_bare_relative_link_is_prefixed() {
        assert_eq!(
            resolve_bare_link(ORIGIN, "/sounds/x"),
            "https://www.nordkeyboards.com/sounds/x"
        );
    }
}
