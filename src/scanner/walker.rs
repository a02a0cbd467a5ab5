//! Recursive artifact walker.
//!
//! Lists every regular file under a root directory and returns them ordered by
//! their relative path, compared one component at a time, so two runs over the
//! same tree always produce the same sequence.
//!
//! Safety invariants:
//! - Symlinks resolving to regular files are listed; symlinked directories are
//!   never descended, so link cycles cannot cause runaway traversal
//! - Directories, sockets, FIFOs, devices and dangling links are skipped
//! - A directory that cannot be listed is an error, never a silent gap in the
//!   manifest

#![allow(missing_docs)]

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::core::errors::{PkgError, Result};
use crate::core::paths::{compare_artifact_names, relative_artifact_name};

/// A regular file discovered under the walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    /// Path as reachable from the process (root joined with the relative part).
    pub path: PathBuf,
    /// `/`-separated path relative to the walk root.
    pub relative: String,
}

/// Sequential directory walker rooted at the artifacts directory.
#[derive(Debug, Clone)]
pub struct ArtifactWalker {
    root: PathBuf,
}

impl ArtifactWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk the tree and return every regular file, sorted by relative path.
    ///
    /// Each call re-reads the filesystem. A missing root, or a root that is
    /// not a directory, yields an empty list.
    pub fn walk(&self) -> Result<Vec<ArtifactEntry>> {
        let root_meta = match fs::metadata(&self.root) {
            Ok(meta) => meta,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(PkgError::io(&self.root, err)),
        };
        if !root_meta.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            self.process_directory(&dir, &mut pending, &mut entries)?;
        }

        entries.sort_by(|a, b| compare_artifact_names(&a.relative, &b.relative));
        Ok(entries)
    }

    /// Iterate over the sorted entries of a fresh walk.
    pub fn entries(&self) -> Result<impl Iterator<Item = ArtifactEntry>> {
        Ok(self.walk()?.into_iter())
    }

    fn process_directory(
        &self,
        dir: &Path,
        pending: &mut Vec<PathBuf>,
        entries: &mut Vec<ArtifactEntry>,
    ) -> Result<()> {
        let listing = fs::read_dir(dir).map_err(|source| PkgError::io(dir, source))?;

        for entry_result in listing {
            let entry = entry_result.map_err(|source| PkgError::io(dir, source))?;
            let child = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|source| PkgError::io(&child, source))?;

            let is_regular_file = if file_type.is_dir() {
                pending.push(child);
                continue;
            } else if file_type.is_symlink() {
                match fs::metadata(&child) {
                    Ok(target) => target.is_file(),
                    Err(err) if err.kind() == ErrorKind::NotFound => false,
                    Err(err) => return Err(PkgError::io(&child, err)),
                }
            } else {
                file_type.is_file()
            };

            if !is_regular_file {
                continue;
            }

            if let Some(relative) = relative_artifact_name(&self.root, &child) {
                entries.push(ArtifactEntry {
                    path: child,
                    relative,
                });
            }
        }

        Ok(())
    }
}
