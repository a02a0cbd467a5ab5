//! Reporter: writes the manifest to the CI output sinks and step summary.

pub mod sink;
pub mod summary;

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::config::OutputsConfig;
use crate::core::errors::{PkgError, Result};
use crate::package::manifest::Manifest;
use crate::report::sink::{OutputSink, SinkStatus, SummarySink};
use crate::report::summary::render_summary;

/// What happened to each output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportOutcome {
    pub assets: SinkStatus,
    pub checksums: SinkStatus,
    pub summary: SinkStatus,
    pub checksums_file: SinkStatus,
}

impl ReportOutcome {
    /// (sink label, status) pairs in write order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, SinkStatus); 4] {
        [
            ("github_output.assets", self.assets),
            ("github_output.checksums", self.checksums),
            ("step_summary", self.summary),
            ("checksums_file", self.checksums_file),
        ]
    }
}

/// Bundles the configured sinks and output variable names.
#[derive(Debug, Clone)]
pub struct Reporter {
    outputs: OutputSink,
    summary: SummarySink,
    checksums_file: Option<PathBuf>,
    assets_key: String,
    checksums_key: String,
}

impl Reporter {
    pub fn from_config(config: &OutputsConfig) -> Self {
        Self {
            outputs: OutputSink::new(config.github_output.clone()),
            summary: SummarySink::new(config.step_summary.clone()),
            checksums_file: config.checksums_file.clone(),
            assets_key: config.assets_key.clone(),
            checksums_key: config.checksums_key.clone(),
        }
    }

    /// Write the manifest, checksums listing, summary, and optional checksums file.
    pub fn report(&self, manifest: &Manifest) -> Result<ReportOutcome> {
        let checksums = manifest.checksums().render();

        let assets = self
            .outputs
            .set_output(&self.assets_key, &manifest.to_json()?)?;
        let checksums_status = self.outputs.set_output(&self.checksums_key, &checksums)?;
        let summary = self.summary.append_markdown(&render_summary(manifest))?;
        let checksums_file = self.write_checksums_file(&checksums)?;

        Ok(ReportOutcome {
            assets,
            checksums: checksums_status,
            summary,
            checksums_file,
        })
    }

    /// Outputs for a run whose artifacts directory does not exist: an empty
    /// manifest and empty checksums. No summary and no checksums file.
    pub fn report_missing(&self) -> Result<ReportOutcome> {
        let assets = self
            .outputs
            .set_output(&self.assets_key, &Manifest::default().to_json()?)?;
        let checksums = self.outputs.set_output(&self.checksums_key, "")?;
        Ok(ReportOutcome {
            assets,
            checksums,
            summary: SinkStatus::Skipped,
            checksums_file: SinkStatus::Skipped,
        })
    }

    fn write_checksums_file(&self, checksums: &str) -> Result<SinkStatus> {
        let Some(path) = self.checksums_file.as_deref() else {
            return Ok(SinkStatus::Skipped);
        };
        let mut content = checksums.to_string();
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(path, content).map_err(|source| PkgError::io(path, source))?;
        Ok(SinkStatus::Written)
    }
}
