//! Output module for writing crawl results
//!
//! This module handles:
//! - CSV output (`url,title,description` with escaping)
//! - JSON-lines output
//! - Choosing a writer from a format name

mod csv;
mod jsonl;
mod traits;

pub use self::csv::{CsvWriter, DEFAULT_COLUMNS};
pub use jsonl::JsonLinesWriter;
pub use traits::{OutputError, OutputResult, ResultWriter};

use std::io::Write;
use std::str::FromStr;

/// Supported result file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    JsonLines,
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" | "jsonl" | "ndjson" => Ok(Self::JsonLines),
            other => Err(OutputError::UnknownFormat(other.to_string())),
        }
    }
}

/// Builds a writer for `format` over `out`
///
/// # Example
///
/// ```
/// use sitesweep::output::{writer_for, OutputFormat, ResultWriter};
/// use sitesweep::PageResult;
///
/// let mut buffer = Vec::new();
/// {
///     let mut writer = writer_for(OutputFormat::JsonLines, &mut buffer);
///     writer.write_result(&PageResult::failed("https://example.com/")).unwrap();
///     writer.finish().unwrap();
/// }
/// assert_eq!(buffer, b"{\"url\":\"https://example.com/\"}\n");
/// ```
pub fn writer_for<'a, W: Write + 'a>(format: OutputFormat, out: W) -> Box<dyn ResultWriter + 'a> {
    match format {
        OutputFormat::Csv => Box::new(CsvWriter::new(out)),
        OutputFormat::JsonLines => Box::new(JsonLinesWriter::new(out)),
    }
}
