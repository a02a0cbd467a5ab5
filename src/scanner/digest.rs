//! Streaming SHA-256 digests for artifact files.
//!
//! Files are read in fixed-size chunks through a reused buffer, so a multi-GiB
//! release archive never has to fit in memory. The file handle lives only for
//! the duration of one call.

#![allow(missing_docs)]

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::core::errors::{PkgError, Result};

/// SHA-256 of zero bytes.
pub const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Digest plus the size reported by the handle that was hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    pub sha256: String,
    pub size_bytes: u64,
}

/// Compute the SHA-256 hex digest of a file, reading `chunk_size` bytes at a time.
///
/// # Errors
/// Returns [`PkgError::Io`] if the file cannot be opened, stat'd, or read.
pub fn digest_file(path: &Path, chunk_size: usize) -> Result<FileDigest> {
    let mut file = File::open(path).map_err(|source| PkgError::io(path, source))?;
    let size_bytes = file
        .metadata()
        .map_err(|source| PkgError::io(path, source))?
        .len();

    let sha256 = digest_reader(&mut file, chunk_size).map_err(|source| PkgError::io(path, source))?;
    Ok(FileDigest { sha256, size_bytes })
}

/// Hash everything `reader` yields, in chunks of `chunk_size` bytes.
pub fn digest_reader<R: Read>(reader: &mut R, chunk_size: usize) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        hasher.update(&buffer[..n]);
    }

    Ok(hex_encode(&hasher.finalize()))
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
            let _ = write!(s, "{b:02x}");
            s
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Reader that hands out at most one byte per call and fails once midway.
    struct Stuttering {
        data: Vec<u8>,
        pos: usize,
        interrupted: bool,
    }

    impl Read for Stuttering {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted && self.pos == 2 {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.data.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn empty_file_has_well_known_digest() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("README.md");
        fs::write(&path, b"").unwrap();

        let digest = digest_file(&path, 4096).unwrap();
        assert_eq!(digest.sha256, EMPTY_SHA256);
        assert_eq!(digest.size_bytes, 0);
    }

    #[test]
    fn known_vector_abc() {
        let sha = digest_reader(&mut Cursor::new(b"abc"), 4096).unwrap();
        assert_eq!(
            sha,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn chunk_size_does_not_change_digest() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let whole = digest_reader(&mut Cursor::new(&data), data.len()).unwrap();
        for chunk in [1, 7, 4096, 65_536] {
            let chunked = digest_reader(&mut Cursor::new(&data), chunk).unwrap();
            assert_eq!(whole, chunked, "chunk size {chunk} changed the digest");
        }
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let data = b"release-artifact".to_vec();
        let expected = digest_reader(&mut Cursor::new(&data), 64).unwrap();
        let mut reader = Stuttering {
            data,
            pos: 0,
            interrupted: false,
        };
        assert_eq!(digest_reader(&mut reader, 64).unwrap(), expected);
    }

    #[test]
    fn missing_file_is_io_error_with_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("gone.bin");
        let err = digest_file(&path, 4096).expect_err("missing file must fail");
        assert_eq!(err.code(), "PKG-3002");
        assert!(err.to_string().contains("gone.bin"));
    }

    #[test]
    fn size_matches_content_length() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("app.bin");
        fs::write(&path, vec![7u8; 123_457]).unwrap();
        let digest = digest_file(&path, 8192).unwrap();
        assert_eq!(digest.size_bytes, 123_457);
        assert_eq!(digest.sha256.len(), 64);
        assert_eq!(digest.sha256, digest.sha256.to_ascii_lowercase());
    }
}
