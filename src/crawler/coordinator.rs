//! Crawler coordinator - main crawl orchestration logic
//!
//! Every category gets its own chain task that walks the catalog one page at
//! a time. Chains share the HTTP client and a request semaphore, and report
//! back over a channel. The coordinator owns the sink and the statistics, so
//! every record reaches the sink from a single place.

use crate::config::Config;
use crate::crawler::extractor::{SoundItem, ValidationFailure};
use crate::crawler::fetcher::{build_http_client, fetch_with_retry, FetchResult, RetryPolicy};
use crate::crawler::page::{CrawlRequest, PageResponse};
use crate::crawler::parser::parse_page;
use crate::output::{CrawlStatistics, ItemSink, JsonLinesSink};
use crate::url::Category;
use crate::CrawlError;
use reqwest::Client;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// Capacity of the channel between chain tasks and the coordinator
const EVENT_BUFFER: usize = 256;

/// How a category's chain ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// The last page was reached
    Exhausted,

    /// A page had an unreadable pagination block
    PaginationError { url: String, error: String },

    /// A page could not be fetched or decoded after all retries
    FetchFailed { url: String, reason: String },

    /// The next page pointed at a URL this chain already requested
    DuplicatePage { url: String },
}

impl fmt::Display for ChainOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => f.write_str("exhausted"),
            Self::PaginationError { url, error } => {
                write!(f, "pagination error at {}: {}", url, error)
            }
            Self::FetchFailed { url, reason } => write!(f, "fetch failed at {}: {}", url, reason),
            Self::DuplicatePage { url } => write!(f, "duplicate page {}", url),
        }
    }
}

/// Messages from chain tasks to the coordinator
#[derive(Debug)]
enum ChainEvent {
    PageFetched {
        category: Category,
        url: String,
    },
    Item {
        category: Category,
        item: SoundItem,
    },
    Invalid {
        category: Category,
        url: String,
        failure: ValidationFailure,
    },
    EnvelopeError {
        category: Category,
    },
}

/// Builds the first-page request of every configured category
pub fn seed_requests(config: &Config) -> Vec<CrawlRequest> {
    config
        .crawler
        .categories
        .iter()
        .map(|category| {
            CrawlRequest::seed(&config.site, *category, &config.crawler.selected_product)
        })
        .collect()
}

/// Main crawler coordinator structure
pub struct Coordinator<S: ItemSink> {
    config: Arc<Config>,
    client: Client,
    sink: S,
}

impl<S: ItemSink> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `sink` - Destination of every valid sound item
    pub fn new(config: Config, sink: S) -> Result<Self, CrawlError> {
        let timeout = Duration::from_millis(config.crawler.request_timeout);
        let client = build_http_client(&config.user_agent, timeout)?;

        Ok(Self {
            config: Arc::new(config),
            client,
            sink,
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs every category chain to completion
    ///
    /// Page and item failures are logged and counted but never fail the run.
    /// Only a sink error or a crashed chain task does.
    pub async fn run(&mut self) -> Result<CrawlStatistics, CrawlError> {
        let seeds = seed_requests(&self.config);
        let categories: Vec<Category> = seeds.iter().map(|seed| seed.category).collect();
        let mut stats = CrawlStatistics::new(&categories);

        tracing::info!(
            "Starting crawl of {} categories for product {}",
            seeds.len(),
            self.config.crawler.selected_product
        );

        let permits = Arc::new(Semaphore::new(
            self.config.crawler.max_concurrent_requests as usize,
        ));
        let (events, mut receiver) = mpsc::channel(EVENT_BUFFER);

        let mut chains = JoinSet::new();
        for seed in seeds {
            let chain = Chain {
                config: Arc::clone(&self.config),
                client: self.client.clone(),
                policy: RetryPolicy::from_config(&self.config.crawler),
                permits: Arc::clone(&permits),
                events: events.clone(),
            };
            chains.spawn(chain.run(seed));
        }
        // Receiving ends once every chain has dropped its sender
        drop(events);

        while let Some(event) = receiver.recv().await {
            self.handle_event(event, &mut stats)?;
        }

        while let Some(joined) = chains.join_next().await {
            let (category, outcome) = joined.map_err(|e| CrawlError::Task(e.to_string()))?;
            match &outcome {
                ChainOutcome::Exhausted => {
                    tracing::info!("Finished {}", category);
                }
                other => tracing::warn!("Stopped {}: {}", category, other),
            }
            stats.finish_category(category, outcome);
        }

        self.sink.finish()?;
        stats.finish();

        tracing::info!(
            "Crawl completed: {} items from {} pages ({} invalid)",
            stats.items_emitted(),
            stats.pages_fetched(),
            stats.validation_failures()
        );

        Ok(stats)
    }

    fn handle_event(
        &mut self,
        event: ChainEvent,
        stats: &mut CrawlStatistics,
    ) -> Result<(), CrawlError> {
        match event {
            ChainEvent::PageFetched { category, url } => {
                tracing::debug!("Fetched {} page {}", category, url);
                stats.record_page(category);

                let pages = stats.pages_fetched();
                if pages % 10 == 0 {
                    tracing::info!(
                        "Progress: {} pages fetched, {} items emitted",
                        pages,
                        stats.items_emitted()
                    );
                }
            }
            ChainEvent::Item { category, item } => {
                self.sink.emit(&item)?;
                stats.record_item(category);
            }
            ChainEvent::Invalid {
                category,
                url,
                failure,
            } => {
                tracing::warn!("Skipping {} item on {}: {}", category, url, failure);
                stats.record_validation_failure(category);
            }
            ChainEvent::EnvelopeError { category } => {
                stats.record_envelope_error(category);
            }
        }
        Ok(())
    }
}

/// One category's traversal: strictly one page at a time
struct Chain {
    config: Arc<Config>,
    client: Client,
    policy: RetryPolicy,
    permits: Arc<Semaphore>,
    events: mpsc::Sender<ChainEvent>,
}

impl Chain {
    async fn run(self, seed: CrawlRequest) -> (Category, ChainOutcome) {
        let category = seed.category;
        (category, self.walk(seed).await)
    }

    async fn walk(&self, seed: CrawlRequest) -> ChainOutcome {
        let category = seed.category;
        let mut requested = HashSet::new();
        let mut request = seed;

        loop {
            if !requested.insert(request.url.clone()) {
                tracing::warn!("{} points back to {}, stopping", category, request.url);
                return ChainOutcome::DuplicatePage { url: request.url };
            }

            let page = match self.fetch(&request).await {
                Ok(page) => page,
                Err(reason) => {
                    tracing::error!("Failed to fetch {}: {}", request.url, reason);
                    return ChainOutcome::FetchFailed {
                        url: request.url,
                        reason,
                    };
                }
            };

            self.send(ChainEvent::PageFetched {
                category,
                url: page.url.clone(),
            })
            .await;

            let parsed = parse_page(&page, &self.config.site.origin);

            match parsed.records {
                Ok(records) => {
                    for record in records {
                        let event = match record {
                            Ok(item) => ChainEvent::Item { category, item },
                            Err(failure) => ChainEvent::Invalid {
                                category,
                                url: page.url.clone(),
                                failure,
                            },
                        };
                        self.send(event).await;
                    }
                }
                Err(e) => {
                    tracing::warn!("No items read from {}: {}", page.url, e);
                    self.send(ChainEvent::EnvelopeError { category }).await;
                }
            }

            match parsed.follow {
                Ok(Some(next)) => request = next,
                Ok(None) => return ChainOutcome::Exhausted,
                Err(e) => {
                    tracing::warn!("Cannot continue {} past {}: {}", category, page.url, e);
                    return ChainOutcome::PaginationError {
                        url: page.url,
                        error: e.to_string(),
                    };
                }
            }
        }
    }

    /// Fetches and decodes one page while holding a request permit
    async fn fetch(&self, request: &CrawlRequest) -> Result<PageResponse, String> {
        let result = {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| "request limiter closed".to_string())?;
            fetch_with_retry(&self.client, &request.url, &self.policy).await
        };

        match result {
            FetchResult::Success {
                final_url, body, ..
            } => PageResponse::from_json(request.category, final_url, &body)
                .map_err(|e| format!("invalid JSON: {}", e)),
            FetchResult::HttpError { status_code, .. } => Err(format!("HTTP {}", status_code)),
            FetchResult::NetworkError { error, .. } => Err(error),
        }
    }

    async fn send(&self, event: ChainEvent) {
        // The receiver only goes away when the coordinator gave up on the run
        if self.events.send(event).await.is_err() {
            tracing::debug!("Coordinator stopped listening");
        }
    }
}

/// Crawls every configured category into the configured JSON Lines file
pub async fn run_crawl(config: Config) -> Result<CrawlStatistics, CrawlError> {
    let sink = JsonLinesSink::create(Path::new(&config.output.items_path))?;
    let mut coordinator = Coordinator::new(config, sink)?;
    coordinator.run().await
}
