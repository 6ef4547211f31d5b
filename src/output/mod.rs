//! Output module for crawl results
//!
//! This module handles:
//! - Delivering validated sound items to a sink
//! - Writing items as JSON Lines
//! - Recording and printing crawl statistics

mod jsonl;
pub mod stats;
mod traits;

pub use jsonl::JsonLinesSink;
pub use stats::{format_statistics, print_statistics, CategoryStatistics, CrawlStatistics};
pub use traits::{ItemSink, MemorySink, OutputError, OutputResult};
