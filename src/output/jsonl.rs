//! JSON-lines output: one object per result, absent fields omitted

use crate::crawler::PageResult;
use crate::output::traits::{OutputResult, ResultWriter};
use std::io::Write;

pub struct JsonLinesWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultWriter for JsonLinesWriter<W> {
    fn write_result(&mut self, result: &PageResult) -> OutputResult<()> {
        serde_json::to_writer(&mut self.out, result)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.out.flush()?;
        Ok(())
    }
}
