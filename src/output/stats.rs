//! Crawl statistics
//!
//! Counters are kept per category and summed on demand. Only the coordinator
//! writes to them, so no locking is involved.

use crate::crawler::ChainOutcome;
use crate::url::Category;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Counters for one category's chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryStatistics {
    /// Pages fetched and decoded
    pub pages_fetched: u64,

    /// Items handed to the sink
    pub items_emitted: u64,

    /// Items rejected by validation
    pub validation_failures: u64,

    /// Pages whose item list was missing or unreadable
    pub envelope_errors: u64,

    /// How the chain ended, `None` while it is still running
    pub outcome: Option<ChainOutcome>,
}

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub categories: BTreeMap<Category, CategoryStatistics>,
}

impl CrawlStatistics {
    /// Starts the clock with an empty entry for every crawled category
    pub fn new(categories: &[Category]) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            categories: categories
                .iter()
                .map(|category| (*category, CategoryStatistics::default()))
                .collect(),
        }
    }

    fn entry(&mut self, category: Category) -> &mut CategoryStatistics {
        self.categories.entry(category).or_default()
    }

    pub fn record_page(&mut self, category: Category) {
        self.entry(category).pages_fetched += 1;
    }

    pub fn record_item(&mut self, category: Category) {
        self.entry(category).items_emitted += 1;
    }

    pub fn record_validation_failure(&mut self, category: Category) {
        self.entry(category).validation_failures += 1;
    }

    pub fn record_envelope_error(&mut self, category: Category) {
        self.entry(category).envelope_errors += 1;
    }

    pub fn finish_category(&mut self, category: Category, outcome: ChainOutcome) {
        self.entry(category).outcome = Some(outcome);
    }

    /// Stops the clock
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration(&self) -> Option<Duration> {
        self.finished_at.map(|finished| finished - self.started_at)
    }

    pub fn pages_fetched(&self) -> u64 {
        self.sum(|c| c.pages_fetched)
    }

    pub fn items_emitted(&self) -> u64 {
        self.sum(|c| c.items_emitted)
    }

    pub fn validation_failures(&self) -> u64 {
        self.sum(|c| c.validation_failures)
    }

    pub fn envelope_errors(&self) -> u64 {
        self.sum(|c| c.envelope_errors)
    }

    /// Chains that ended on an unreadable pagination block
    pub fn pagination_errors(&self) -> u64 {
        self.count_outcomes(|o| matches!(o, ChainOutcome::PaginationError { .. }))
    }

    /// Chains that ended because a page could not be fetched or decoded
    pub fn fetch_failures(&self) -> u64 {
        self.count_outcomes(|o| matches!(o, ChainOutcome::FetchFailed { .. }))
    }

    fn sum(&self, field: impl Fn(&CategoryStatistics) -> u64) -> u64 {
        self.categories.values().map(field).sum()
    }

    fn count_outcomes(&self, predicate: impl Fn(&ChainOutcome) -> bool) -> u64 {
        self.categories
            .values()
            .filter_map(|c| c.outcome.as_ref())
            .filter(|o| predicate(o))
            .count() as u64
    }
}

/// Renders the plain-text statistics report
pub fn format_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Crawl Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        let _ = writeln!(out, "  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = stats.duration() {
        let _ = writeln!(
            out,
            "  Duration: {:.1}s",
            duration.num_milliseconds() as f64 / 1000.0
        );
    }
    let _ = writeln!(out, "  Pages fetched: {}", stats.pages_fetched());
    let _ = writeln!(out, "  Items emitted: {}", stats.items_emitted());
    let _ = writeln!(out, "  Validation failures: {}", stats.validation_failures());
    let _ = writeln!(out, "  Envelope errors: {}", stats.envelope_errors());
    let _ = writeln!(out, "  Pagination errors: {}", stats.pagination_errors());
    let _ = writeln!(out, "  Fetch failures: {}", stats.fetch_failures());
    let _ = writeln!(out);

    let _ = writeln!(out, "Categories:");
    for (category, counts) in &stats.categories {
        let _ = writeln!(out, "  {}:", category);
        let _ = writeln!(
            out,
            "    pages: {}, items: {}, invalid: {}, envelope errors: {}",
            counts.pages_fetched,
            counts.items_emitted,
            counts.validation_failures,
            counts.envelope_errors
        );
        match &counts.outcome {
            Some(outcome) => {
                let _ = writeln!(out, "    outcome: {}", outcome);
            }
            None => {
                let _ = writeln!(out, "    outcome: unfinished");
            }
        }
    }

    let total = stats.items_emitted() + stats.validation_failures();
    let success_rate = if total > 0 {
        (stats.items_emitted() as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    let _ = writeln!(out);
    let _ = write!(
        out,
        "Success Rate: {:.1}% ({} / {} items valid)",
        success_rate,
        stats.items_emitted(),
        total
    );

    out
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("{}", format_statistics(stats));
}
