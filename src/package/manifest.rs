//! Asset records, the ordered manifest, and the checksums listing.
//!
//! The manifest serializes as a compact JSON array of
//! `{"filename","size","sha256"}` objects. The checksums listing uses the
//! conventional `sha256sum` layout: `<digest>  <filename>`, one per line.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{PkgError, Result};
use crate::core::paths::compare_artifact_names;

/// One discovered artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetRecord {
    /// `/`-separated path relative to the artifacts directory.
    pub filename: String,
    /// Byte count at scan time.
    pub size: u64,
    /// Lowercase hex SHA-256 of the file content.
    pub sha256: String,
}

impl AssetRecord {
    /// Size in mebibytes (1 MiB = 1,048,576 bytes).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_mib(&self) -> f64 {
        self.size as f64 / 1_048_576.0
    }
}

/// Assets discovered in a single run, ordered by filename component by component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    assets: Vec<AssetRecord>,
}

impl Manifest {
    /// Build a manifest, sorting records by filename.
    #[must_use]
    pub fn from_records(mut assets: Vec<AssetRecord>) -> Self {
        assets.sort_by(|a, b| compare_artifact_names(&a.filename, &b.filename));
        Self { assets }
    }

    #[must_use]
    pub fn assets(&self) -> &[AssetRecord] {
        &self.assets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Sum of all asset sizes.
    #[must_use]
    pub fn total_size_bytes(&self) -> u64 {
        self.assets.iter().map(|a| a.size).sum()
    }

    /// Compact JSON array, no whitespace between tokens.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.assets)?)
    }

    /// Filename → digest mapping with the same content and order as the asset list.
    #[must_use]
    pub fn checksums(&self) -> ChecksumMap {
        ChecksumMap(
            self.assets
                .iter()
                .enumerate()
                .map(|(index, a)| ChecksumLine {
                    line_number: index + 1,
                    sha256: a.sha256.clone(),
                    filename: a.filename.clone(),
                })
                .collect(),
        )
    }
}

/// Filename → SHA-256 mapping that keeps the order it was built in.
///
/// Built from a [`Manifest`], that is the manifest's asset order; parsed from a
/// listing, the listing's line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumMap(Vec<ChecksumLine>);

impl ChecksumMap {
    #[must_use]
    pub fn get(&self, filename: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|line| line.filename == filename)
            .map(|line| line.sha256.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in order, each with its 1-based line number in [`ChecksumMap::render`].
    #[must_use]
    pub fn lines(&self) -> &[ChecksumLine] {
        &self.0
    }

    /// Newline-joined `<sha256>  <filename>` lines, no trailing newline.
    #[must_use]
    pub fn render(&self) -> String {
        self.0
            .iter()
            .map(|line| format!("{}  {}", line.sha256, line.filename))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse a checksums listing, keeping its line order.
    ///
    /// # Errors
    /// Returns [`PkgError::ChecksumParse`] for malformed or duplicate lines.
    pub fn parse(text: &str) -> Result<Self> {
        let mut seen = HashSet::new();
        let lines = parse_checksum_lines(text)?;
        for line in &lines {
            if !seen.insert(line.filename.clone()) {
                return Err(PkgError::ChecksumParse {
                    line: line.line_number,
                    details: format!("duplicate entry for {}", line.filename),
                });
            }
        }
        Ok(Self(lines))
    }
}

/// One parsed entry of a checksums listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumLine {
    /// 1-based line number in the source text.
    pub line_number: usize,
    pub sha256: String,
    pub filename: String,
}

fn checksum_line_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Digest, one space, then a mode marker: ' ' for text, '*' for binary.
        Regex::new(r"^([0-9a-fA-F]{64}) [ *](.+)$").expect("checksum line pattern is valid")
    })
}

/// Parse `sha256sum`-style lines. Blank lines are skipped; digests are lowercased.
///
/// # Errors
/// Returns [`PkgError::ChecksumParse`] naming the first malformed line.
pub fn parse_checksum_lines(text: &str) -> Result<Vec<ChecksumLine>> {
    let pattern = checksum_line_regex();
    let mut lines = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        if raw.trim().is_empty() {
            continue;
        }
        let captures = pattern
            .captures(raw)
            .ok_or_else(|| PkgError::ChecksumParse {
                line: line_number,
                details: format!("expected `<sha256>  <filename>`, got {raw:?}"),
            })?;
        lines.push(ChecksumLine {
            line_number,
            sha256: captures[1].to_ascii_lowercase(),
            filename: captures[2].to_string(),
        });
    }

    Ok(lines)
}
