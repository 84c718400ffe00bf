//! Result egress - one JSON object per line
//!
//! Records go to stdout by default, or are appended to a file when the
//! CLI is given `--output`.

use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// Open the output sink: append to `path`, else stdout
pub fn open_output(path: Option<&str>) -> anyhow::Result<Box<dyn Write>> {
    let Some(file_path) = path else {
        return Ok(Box::new(io::stdout().lock()));
    };
    let path = Path::new(file_path);

    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    info!(file_path = %file_path, "egress_initialized");
    Ok(Box::new(file))
}

/// JSON-lines writer over any sink
pub struct JsonLinesWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Serialize one record as a single line
    pub fn write_record<T: Serialize>(&mut self, record: &T) -> anyhow::Result<()> {
        let json = serde_json::to_string(record)?;
        writeln!(self.out, "{}", json)?;
        self.written += 1;
        debug!(bytes = %json.len(), "record_written");
        Ok(())
    }

    /// Write plain text as-is (TSV sheets, status lines)
    pub fn write_text(&mut self, text: &str) -> anyhow::Result<()> {
        self.out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
