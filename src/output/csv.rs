//! Delimiter-separated output
//!
//! The header is written with the first record: the configured columns,
//! followed by any column of that record not already listed. Values are
//! trimmed, line breaks are removed and the delimiter is escaped with a
//! backslash. Fields are never quoted. Absent values are written as empty
//! cells.

use crate::crawler::PageResult;
use crate::output::traits::{OutputError, OutputResult, ResultWriter};
use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;

/// Default column order
pub const DEFAULT_COLUMNS: [&str; 3] = ["url", "title", "description"];

pub struct CsvWriter<W: Write> {
    out: csv::Writer<W>,
    columns: Vec<String>,
    delimiter: u8,
    wrote_header: bool,
}

impl<W: Write> CsvWriter<W> {
    /// Creates a comma-separated writer with the default columns
    pub fn new(out: W) -> Self {
        Self::with_columns(out, DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(), b',')
    }

    pub fn with_columns(out: W, columns: Vec<String>, delimiter: u8) -> Self {
        let out = WriterBuilder::new()
            .delimiter(delimiter)
            .quote_style(QuoteStyle::Never)
            .has_headers(false)
            .from_writer(out);

        Self {
            out,
            columns,
            delimiter,
            wrote_header: false,
        }
    }

    /// Flushes buffered rows and returns the underlying writer
    pub fn into_inner(self) -> OutputResult<W> {
        self.out
            .into_inner()
            .map_err(|e| OutputError::Io(e.into_error()))
    }

    fn escape(&self, value: &str) -> String {
        let delimiter = char::from(self.delimiter);
        value
            .trim()
            .replace(delimiter, &format!("\\{}", delimiter))
            .replace(['\r', '\n'], "")
    }

    fn write_header(&mut self, result: &PageResult) -> OutputResult<()> {
        for (name, value) in result.fields() {
            if value.is_some() && !self.columns.iter().any(|c| c == name) {
                self.columns.push(name.to_string());
            }
        }

        self.out.write_record(&self.columns)?;
        self.wrote_header = true;
        Ok(())
    }
}

impl<W: Write> ResultWriter for CsvWriter<W> {
    fn write_result(&mut self, result: &PageResult) -> OutputResult<()> {
        if !self.wrote_header {
            self.write_header(result)?;
        }

        let fields = result.fields();
        let cells: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                fields
                    .iter()
                    .find(|(name, _)| name == column)
                    .and_then(|(_, value)| *value)
                    .map(|value| self.escape(value))
                    .unwrap_or_default()
            })
            .collect();

        self.out.write_record(&cells)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(url: &str, title: &str, description: &str) -> PageResult {
        PageResult {
            url: url.to_string(),
            title: Some(title.to_string()),
            description: Some(description.to_string()),
        }
    }

    fn written(writer: CsvWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_and_rows() {
        let mut writer = CsvWriter::new(Vec::new());
        writer
            .write_result(&loaded("http://x/a", "A", "First page"))
            .unwrap();
        writer.write_result(&PageResult::failed("http://x/b")).unwrap();
        writer.finish().unwrap();

        assert_eq!(
            written(writer),
            "url,title,description\nhttp://x/a,A,First page\nhttp://x/b,,\n"
        );
    }

    #[test]
    fn test_escaping() {
        let mut writer = CsvWriter::new(Vec::new());
        writer
            .write_result(&loaded("http://x/a", "  Hello, world  ", "line one\r\nline two\n"))
            .unwrap();

        let output = written(writer);
        let row = output.lines().nth(1).unwrap();
        assert_eq!(row, "http://x/a,Hello\\, world,line oneline two");
    }

    #[test]
    fn test_custom_columns_and_delimiter() {
        let mut writer = CsvWriter::with_columns(Vec::new(), vec!["title".to_string()], b'\t');
        writer
            .write_result(&loaded("http://x/a", "A", "about a"))
            .unwrap();

        assert_eq!(
            written(writer),
            "title\turl\tdescription\nA\thttp://x/a\tabout a\n"
        );
    }

    #[test]
    fn test_header_from_first_record_only() {
        let mut writer = CsvWriter::with_columns(Vec::new(), Vec::new(), b',');
        writer.write_result(&PageResult::failed("http://x/a")).unwrap();
        writer
            .write_result(&loaded("http://x/b", "B", "about b"))
            .unwrap();

        assert_eq!(written(writer), "url\nhttp://x/a\nhttp://x/b\n");
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut writer = CsvWriter::new(BrokenSink);
        // rows are buffered until flushed
        writer
            .write_result(&loaded("http://x/a", "A", "about a"))
            .unwrap();

        assert!(matches!(writer.finish(), Err(OutputError::Io(_))));
    }

    #[test]
    fn test_fields_are_never_quoted() {
        let mut writer = CsvWriter::new(Vec::new());
        writer
            .write_result(&loaded("http://x/a", "Say \"hi\"", "it's here"))
            .unwrap();

        let output = written(writer);
        assert_eq!(output.lines().nth(1), Some("http://x/a,Say \"hi\",it's here"));
    }
}
