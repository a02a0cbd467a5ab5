//! Packaging pipeline: locate → scan → digest → report.

pub mod manifest;
pub mod verify;

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::core::config::{ArtifactsConfig, Config};
use crate::core::errors::Result;
use crate::core::paths::resolve_absolute_path;
use crate::logger::jsonl::{EventType, JsonlWriter, LogEntry, Severity};
use crate::package::manifest::{AssetRecord, Manifest};
use crate::report::sink::SinkStatus;
use crate::report::{ReportOutcome, Reporter};
use crate::scanner::digest::digest_file;
use crate::scanner::walker::ArtifactWalker;

/// Result of resolving the artifacts directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactsLocation {
    Found(PathBuf),
    Missing(PathBuf),
}

impl ArtifactsLocation {
    pub fn path(&self) -> &Path {
        match self {
            Self::Found(path) | Self::Missing(path) => path,
        }
    }

    pub fn exists(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Everything a caller needs to print a run report.
#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
    pub artifacts_dir: PathBuf,
    pub found: bool,
    pub artifact_count: usize,
    pub total_size_bytes: u64,
    pub assets: Vec<AssetRecord>,
    pub outputs: ReportOutcome,
    pub duration_ms: u64,
}

/// Resolve the configured artifacts directory. Existence is the only check.
pub fn locate_artifacts(config: &ArtifactsConfig) -> ArtifactsLocation {
    let dir = config.dir.clone();
    if dir.exists() {
        ArtifactsLocation::Found(dir)
    } else {
        ArtifactsLocation::Missing(dir)
    }
}

/// Walk `root` and digest every regular file into a manifest.
///
/// Any I/O failure aborts the scan; no partial manifest is returned.
pub fn scan_and_digest(root: &Path, chunk_size: usize, log: &mut JsonlWriter) -> Result<Manifest> {
    let walker = ArtifactWalker::new(root);
    let mut records = Vec::new();

    for entry in walker.entries()? {
        let digest = digest_file(&entry.path, chunk_size)?;

        let mut logged = LogEntry::new(EventType::AssetDigested, Severity::Info)
            .with_path(&entry.relative);
        logged.size = Some(digest.size_bytes);
        logged.sha256 = Some(digest.sha256.clone());
        log.write_entry(&logged);

        records.push(AssetRecord {
            filename: entry.relative,
            size: digest.size_bytes,
            sha256: digest.sha256,
        });
    }

    Ok(Manifest::from_records(records))
}

/// Run the full packaging pipeline against a resolved configuration.
pub fn run_package(config: &Config, log: &mut JsonlWriter) -> Result<PackageReport> {
    let started = Instant::now();
    let result = package_inner(config, log, started);
    if let Err(err) = &result {
        log.write_entry(&LogEntry::from_error(err));
    }
    log.flush();
    result
}

fn package_inner(config: &Config, log: &mut JsonlWriter, started: Instant) -> Result<PackageReport> {
    let location = locate_artifacts(&config.artifacts);
    let reporter = Reporter::from_config(&config.outputs);
    let logged_dir = resolve_absolute_path(location.path());

    let mut start = LogEntry::new(EventType::PackageStart, Severity::Info)
        .with_path(&logged_dir);
    start.details = config.stable_hash().ok().map(|hash| format!("config_hash={hash}"));
    log.write_entry(&start);

    let (manifest, outputs) = match &location {
        ArtifactsLocation::Missing(_) => {
            log.write_entry(
                &LogEntry::new(EventType::ArtifactsMissing, Severity::Warning)
                    .with_path(&logged_dir),
            );
            (Manifest::default(), reporter.report_missing()?)
        }
        ArtifactsLocation::Found(dir) => {
            let manifest = scan_and_digest(dir, config.artifacts.chunk_size_bytes, log)?;
            let outputs = reporter.report(&manifest)?;
            (manifest, outputs)
        }
    };

    for (sink, status) in outputs.entries() {
        let event = match status {
            SinkStatus::Written => EventType::SinkWritten,
            SinkStatus::Skipped => EventType::SinkSkipped,
        };
        let mut entry = LogEntry::new(event, Severity::Info);
        entry.sink = Some(sink.to_string());
        log.write_entry(&entry);
    }

    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut complete = LogEntry::new(EventType::PackageComplete, Severity::Info)
        .with_path(&logged_dir);
    complete.count = Some(manifest.len());
    complete.size = Some(manifest.total_size_bytes());
    complete.duration_ms = Some(duration_ms);
    complete.ok = Some(true);
    log.write_entry(&complete);

    Ok(PackageReport {
        artifacts_dir: location.path().to_path_buf(),
        found: location.exists(),
        artifact_count: manifest.len(),
        total_size_bytes: manifest.total_size_bytes(),
        assets: manifest.assets().to_vec(),
        outputs,
        duration_ms,
    })
}
