//! Check a checksums listing against the files in the artifacts directory.

#![allow(missing_docs)]

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path};

use serde::Serialize;

use crate::core::errors::{PkgError, Result};
use crate::core::paths::resolve_absolute_path;
use crate::logger::jsonl::{EventType, JsonlWriter, LogEntry, Severity};
use crate::package::manifest::{ChecksumLine, ChecksumMap};
use crate::scanner::digest::digest_file;

/// Verification outcome for one listed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerifyStatus {
    Ok,
    Mismatch { expected: String, actual: String },
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyEntry {
    pub filename: String,
    #[serde(flatten)]
    pub status: VerifyStatus,
}

/// All outcomes, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub entries: Vec<VerifyEntry>,
}

impl VerifyReport {
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.entries.iter().all(|e| e.status == VerifyStatus::Ok)
    }

    #[must_use]
    pub fn ok_count(&self) -> usize {
        self.count(|s| matches!(s, VerifyStatus::Ok))
    }

    #[must_use]
    pub fn mismatch_count(&self) -> usize {
        self.count(|s| matches!(s, VerifyStatus::Mismatch { .. }))
    }

    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.count(|s| matches!(s, VerifyStatus::Missing))
    }

    fn count(&self, pred: impl Fn(&VerifyStatus) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.status)).count()
    }
}

/// Digest every file named in `listing` under `root` and compare.
///
/// # Errors
/// Malformed or duplicate lines and names that escape `root` are
/// [`PkgError::ChecksumParse`]; a listed file that exists but cannot be read
/// is [`PkgError::Io`].
pub fn verify_checksums(
    root: &Path,
    listing: &str,
    chunk_size: usize,
    log: &mut JsonlWriter,
) -> Result<VerifyReport> {
    let listing = ChecksumMap::parse(listing)?;
    let mut report = VerifyReport::default();

    for line in listing.lines() {
        ensure_contained(line)?;
        let path = root.join(&line.filename);

        let status = match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {
                let actual = digest_file(&path, chunk_size)?.sha256;
                if actual == line.sha256 {
                    VerifyStatus::Ok
                } else {
                    VerifyStatus::Mismatch {
                        expected: line.sha256.clone(),
                        actual,
                    }
                }
            }
            Ok(_) => VerifyStatus::Missing,
            Err(err) if err.kind() == ErrorKind::NotFound => VerifyStatus::Missing,
            Err(err) => return Err(PkgError::io(&path, err)),
        };

        report.entries.push(VerifyEntry {
            filename: line.filename.clone(),
            status,
        });
    }

    let severity = if report.all_ok() {
        Severity::Info
    } else {
        Severity::Warning
    };
    let mut entry = LogEntry::new(EventType::VerifyComplete, severity)
        .with_path(&resolve_absolute_path(root))
        .with_details(format!(
            "ok={} mismatch={} missing={}",
            report.ok_count(),
            report.mismatch_count(),
            report.missing_count()
        ));
    entry.count = Some(report.entries.len());
    entry.ok = Some(report.all_ok());
    log.write_entry(&entry);
    log.flush();

    Ok(report)
}

/// Listed names must stay inside the artifacts directory.
fn ensure_contained(line: &ChecksumLine) -> Result<()> {
    let escapes = Path::new(&line.filename)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(PkgError::ChecksumParse {
            line: line.line_number,
            details: format!("{} escapes the artifacts directory", line.filename),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::manifest::Manifest;
    use crate::package::scan_and_digest;
    use tempfile::TempDir;

    fn packaged_listing(root: &Path) -> String {
        let manifest: Manifest = scan_and_digest(root, 4096, &mut JsonlWriter::disabled()).unwrap();
        manifest.checksums().render()
    }

    #[test]
    fn freshly_packaged_tree_verifies() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("linux")).unwrap();
        fs::write(tmp.path().join("linux").join("app.tar.gz"), b"tarball").unwrap();
        fs::write(tmp.path().join("README.md"), b"").unwrap();

        let listing = packaged_listing(tmp.path());
        let report =
            verify_checksums(tmp.path(), &listing, 4096, &mut JsonlWriter::disabled()).unwrap();
        assert!(report.all_ok());
        assert_eq!(report.ok_count(), 2);
    }

    #[test]
    fn detects_modified_and_missing_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.bin"), b"original").unwrap();
        fs::write(tmp.path().join("b.bin"), b"stays").unwrap();
        let listing = packaged_listing(tmp.path());

        fs::write(tmp.path().join("a.bin"), b"tampered").unwrap();
        fs::remove_file(tmp.path().join("b.bin")).unwrap();

        let report =
            verify_checksums(tmp.path(), &listing, 4096, &mut JsonlWriter::disabled()).unwrap();
        assert!(!report.all_ok());
        assert_eq!(report.mismatch_count(), 1);
        assert_eq!(report.missing_count(), 1);
        assert!(matches!(
            report.entries[0].status,
            VerifyStatus::Mismatch { .. }
        ));
        assert_eq!(report.entries[1].status, VerifyStatus::Missing);
    }

    #[test]
    fn rejects_names_outside_root() {
        let tmp = TempDir::new().unwrap();
        let listing = format!("{}  ../etc/passwd\n", "0".repeat(64));
        let err = verify_checksums(tmp.path(), &listing, 4096, &mut JsonlWriter::disabled())
            .expect_err("parent traversal must be rejected");
        assert_eq!(err.code(), "PKG-2001");
    }

    #[test]
    fn duplicate_listing_entries_are_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.bin"), b"a").unwrap();
        let listing = format!("{0}  a.bin\n{0}  b.bin\n{0}  a.bin\n", "0".repeat(64));
        let err = verify_checksums(tmp.path(), &listing, 4096, &mut JsonlWriter::disabled())
            .expect_err("duplicate entry must be rejected");
        match err {
            PkgError::ChecksumParse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn directory_in_place_of_file_is_missing() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("app.bin")).unwrap();
        let listing = format!("{}  app.bin\n", "0".repeat(64));
        let report =
            verify_checksums(tmp.path(), &listing, 4096, &mut JsonlWriter::disabled()).unwrap();
        assert_eq!(report.entries[0].status, VerifyStatus::Missing);
    }

    #[test]
    fn report_serializes_with_flat_status() {
        let report = VerifyReport {
            entries: vec![VerifyEntry {
                filename: "a.bin".to_string(),
                status: VerifyStatus::Missing,
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"][0]["filename"], "a.bin");
        assert_eq!(json["entries"][0]["status"], "missing");
    }
}
