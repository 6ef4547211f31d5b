use crate::config::SiteConfig;
use crate::UrlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed `path` value and route segment shared by every catalog section
pub const SOUNDS_SEGMENT: &str = "sounds";

/// Sort order requested from the catalog
pub const SORT_ORDER: &str = "alphabetic";

/// A catalog section with its own pagination chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Nord Piano Library
    PianoLibrary,
    /// Nord Sample Library
    SampleLibrary,
    /// Sound Collections
    SoundCollections,
    /// Signature Sound Banks
    SignatureSoundBanks,
}

impl Category {
    /// Every catalog section, in crawl order
    pub const ALL: [Category; 4] = [
        Category::PianoLibrary,
        Category::SampleLibrary,
        Category::SoundCollections,
        Category::SignatureSoundBanks,
    ];

    /// Returns the identifier the site uses in paths and query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PianoLibrary => "piano-library",
            Self::SampleLibrary => "sample-library",
            Self::SoundCollections => "sound-collections",
            Self::SignatureSoundBanks => "signature-sound-banks",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UrlError::UnknownCategory(s.to_string()))
    }
}

/// Builds the data route URL for one page of a catalog section
///
/// The category is not checked against [`Category::ALL`] and the product
/// filter is inserted verbatim, so any input yields a well-formed URL.
///
/// # Examples
///
/// ```
/// use nord_sound_crawler::config::SiteConfig;
/// use nord_sound_crawler::url::build_url;
///
/// let url = build_url(&SiteConfig::default(), "piano-library", "54", 1);
/// assert_eq!(
///     url,
///     "https://www.nordkeyboards.com/_next/data/qVf153K5N41sKV1bsZjOg/en/sounds/piano-library.json\
///      ?selected_product=54&page=1&sort=alphabetic&path=sounds&path=piano-library"
/// );
/// ```
pub fn build_url(site: &SiteConfig, category: &str, product_filter: &str, page_index: u32) -> String {
    format!(
        "{origin}/_next/data/{build_id}/{locale}/{sounds}/{category}.json\
         ?selected_product={product}&page={page}&sort={sort}&path={sounds}&path={category}",
        origin = site.origin,
        build_id = site.build_id,
        locale = site.locale,
        sounds = SOUNDS_SEGMENT,
        category = category,
        product = product_filter,
        page = page_index,
        sort = SORT_ORDER,
    )
}
