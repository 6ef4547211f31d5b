use crate::url::Category;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_ORIGIN: &str = "https://www.nordkeyboards.com";
pub const DEFAULT_BUILD_ID: &str = "qVf153K5N41sKV1bsZjOg";
pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_SELECTED_PRODUCT: &str = "54";

/// Main configuration structure
///
/// Every section is optional; a missing section falls back to the values the
/// public Nord catalog currently needs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Source site addressing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host every relative catalog path is resolved against
    pub origin: String,

    /// Next.js build identifier embedded in the data route path
    #[serde(rename = "build-id")]
    pub build_id: String,

    /// Locale segment of the data route path
    pub locale: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            build_id: DEFAULT_BUILD_ID.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Product filter sent as `selected_product`, inserted verbatim
    #[serde(rename = "selected-product", deserialize_with = "identifier")]
    pub selected_product: String,

    /// Catalog sections to crawl, one pagination chain each
    pub categories: Vec<Category>,

    /// Maximum number of requests in flight across all categories
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Retries after a transient fetch failure
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Delay between retries (milliseconds)
    #[serde(rename = "retry-delay")]
    pub retry_delay: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            selected_product: DEFAULT_SELECTED_PRODUCT.to_string(),
            categories: Category::ALL.to_vec(),
            max_concurrent_requests: 16,
            request_timeout: 30_000,
            max_retries: 2,
            retry_delay: 1_000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/nord-sound-crawler".to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON Lines file receiving one record per line
    #[serde(rename = "items-path")]
    pub items_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            items_path: "sound_items.jsonl".to_string(),
        }
    }
}

/// Accepts `selected-product = 54` as well as `selected-product = "54"`
fn identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Identifier {
        Integer(i64),
        Text(String),
    }

    Ok(match Identifier::deserialize(deserializer)? {
        Identifier::Integer(n) => n.to_string(),
        Identifier::Text(s) => s,
    })
}
