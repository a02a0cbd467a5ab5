//! Append-only CI sinks: the `GITHUB_OUTPUT` key/value file and the
//! `GITHUB_STEP_SUMMARY` Markdown file.
//!
//! A sink without a path is a valid, disabled sink: writes to it report
//! [`SinkStatus::Skipped`] and touch nothing. This is how the tool runs
//! outside of CI.
//!
//! Known limitation: multi-line values use the fixed heredoc delimiter `EOF`.
//! A value containing a line that is exactly `EOF` produces an ambiguous block.

#![allow(missing_docs)]

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::errors::{PkgError, Result};

/// Delimiter used for multi-line output values.
pub const HEREDOC_DELIMITER: &str = "EOF";

/// Outcome of a single sink write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkStatus {
    Written,
    Skipped,
}

impl SinkStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Skipped => "skipped",
        }
    }
}

/// A file that is only ever appended to, or nothing at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendSink {
    path: Option<PathBuf>,
}

impl AppendSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Append `text` verbatim, creating the file if needed.
    pub fn append(&self, text: &str) -> Result<SinkStatus> {
        let Some(path) = self.path.as_deref() else {
            return Ok(SinkStatus::Skipped);
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| PkgError::io(path, source))?;
        file.write_all(text.as_bytes())
            .map_err(|source| PkgError::io(path, source))?;
        Ok(SinkStatus::Written)
    }
}

/// `GITHUB_OUTPUT`-style step output file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSink {
    inner: AppendSink,
}

impl OutputSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            inner: AppendSink::new(path),
        }
    }

    /// Append one named output value.
    pub fn set_output(&self, name: &str, value: &str) -> Result<SinkStatus> {
        if !self.inner.is_enabled() {
            return Ok(SinkStatus::Skipped);
        }
        self.inner.append(&format_output(name, value))
    }
}

/// `GITHUB_STEP_SUMMARY`-style Markdown file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummarySink {
    inner: AppendSink,
}

impl SummarySink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            inner: AppendSink::new(path),
        }
    }

    pub fn append_markdown(&self, markdown: &str) -> Result<SinkStatus> {
        self.inner.append(markdown)
    }
}

/// Render one output entry: `name=value\n`, or a heredoc block for multi-line values.
#[must_use]
pub fn format_output(name: &str, value: &str) -> String {
    if value.contains('\n') {
        format!("{name}<<{HEREDOC_DELIMITER}\n{value}\n{HEREDOC_DELIMITER}\n")
    } else {
        format!("{name}={value}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn single_line_values_use_equals_form() {
        assert_eq!(format_output("assets", "[]"), "assets=[]\n");
        assert_eq!(format_output("checksums", ""), "checksums=\n");
    }

    #[test]
    fn multi_line_values_use_heredoc() {
        assert_eq!(
            format_output("checksums", "aaa  a.bin\nbbb  b.bin"),
            "checksums<<EOF\naaa  a.bin\nbbb  b.bin\nEOF\n"
        );
    }

    #[test]
    fn disabled_sinks_skip_without_touching_disk() {
        let output = OutputSink::new(None);
        assert_eq!(output.set_output("assets", "[]").unwrap(), SinkStatus::Skipped);
        let summary = SummarySink::new(None);
        assert_eq!(
            summary.append_markdown("## heading\n").unwrap(),
            SinkStatus::Skipped
        );
        assert!(!AppendSink::default().is_enabled());
    }

    #[test]
    fn appends_preserve_existing_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("github_output");
        fs::write(&path, "previous=1\n").unwrap();

        let output = OutputSink::new(Some(path.clone()));
        assert_eq!(output.set_output("assets", "[]").unwrap(), SinkStatus::Written);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "previous=1\nassets=[]\n"
        );
    }

    #[test]
    fn missing_parent_directory_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        let output = OutputSink::new(Some(tmp.path().join("missing").join("out")));
        let err = output.set_output("assets", "[]").expect_err("parent is missing");
        assert_eq!(err.code(), "PKG-3002");
    }
}
