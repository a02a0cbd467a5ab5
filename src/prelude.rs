//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use release_asset_packager::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{PkgError, Result};

// Logging
pub use crate::logger::jsonl::JsonlWriter;

// Pipeline
pub use crate::package::manifest::{AssetRecord, ChecksumMap, Manifest};
pub use crate::package::verify::{VerifyReport, VerifyStatus, verify_checksums};
pub use crate::package::{ArtifactsLocation, PackageReport, locate_artifacts, run_package};

// Reporting
pub use crate::report::sink::{OutputSink, SinkStatus, SummarySink};
pub use crate::report::{ReportOutcome, Reporter};

// Scanner
pub use crate::scanner::digest::{FileDigest, digest_file};
pub use crate::scanner::walker::{ArtifactEntry, ArtifactWalker};
