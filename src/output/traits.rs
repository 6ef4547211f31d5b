//! Sink trait and error types
//!
//! A sink receives every validated sound item as it is produced. Where and
//! how items are stored is up to the implementation.

use crate::crawler::SoundItem;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize item: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for validated sound items
pub trait ItemSink: Send {
    /// Receives one item, in the order the crawl produced it
    fn emit(&mut self, item: &SoundItem) -> OutputResult<()>;

    /// Called once after the last item
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

/// Sink that keeps every item in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    items: Vec<SoundItem>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[SoundItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<SoundItem> {
        self.items
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl ItemSink for MemorySink {
    fn emit(&mut self, item: &SoundItem) -> OutputResult<()> {
        self.items.push(item.clone());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.finished = true;
        Ok(())
    }
}
