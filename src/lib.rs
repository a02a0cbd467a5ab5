#![forbid(unsafe_code)]

//! Release asset packager: the artifact manifest step of a CI release job.
//!
//! Single-pass pipeline:
//! 1. **Locator**: resolve the artifacts directory from configuration
//! 2. **Scanner**: list every regular file, ordered by relative path
//! 3. **Digester**: stream each file through SHA-256
//! 4. **Reporter**: write the JSON manifest and checksums listing to
//!    `GITHUB_OUTPUT`, and a Markdown summary to `GITHUB_STEP_SUMMARY`
//!
//! # Library usage
//!
//! ```rust,no_run
//! use release_asset_packager::prelude::*;
//!
//! let config = Config::load(None)?;
//! let report = run_package(&config, &mut JsonlWriter::from_config(&config.logging))?;
//! println!("{} artifacts", report.artifact_count);
//! # Ok::<(), PkgError>(())
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod package;
pub mod report;
pub mod scanner;
