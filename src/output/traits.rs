//! Output writer trait and errors
//!
//! Writers turn the crawl's result stream into a file format. The crawl core
//! never depends on them.

use crate::crawler::PageResult;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write CSV record: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for result writers
pub trait ResultWriter {
    /// Writes one page result
    fn write_result(&mut self, result: &PageResult) -> OutputResult<()>;

    /// Flushes anything buffered
    fn finish(&mut self) -> OutputResult<()>;
}
