//! Configuration system: TOML file + env var overrides + smart defaults.
//!
//! The environment is read exactly once, in [`Config::load`]. Everything past
//! that point receives the resolved struct, so the pipeline can be driven in
//! tests by constructing a `Config` directly or through [`Config::from_lookup`].

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{PkgError, Result};

/// Directory scanned when `ARTIFACTS_DIR` is unset.
pub const DEFAULT_ARTIFACTS_DIR: &str = "dist";

/// Config file picked up from the working directory when `--config` is omitted.
pub const DEFAULT_CONFIG_FILE: &str = "package-assets.toml";

/// Output variable carrying the JSON asset manifest.
pub const DEFAULT_ASSETS_KEY: &str = "assets";

/// Output variable carrying the checksums listing.
pub const DEFAULT_CHECKSUMS_KEY: &str = "checksums";

const DEFAULT_CHUNK_SIZE_BYTES: usize = 64 * 1024;

pub const ENV_ARTIFACTS_DIR: &str = "ARTIFACTS_DIR";
pub const ENV_GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";
pub const ENV_STEP_SUMMARY: &str = "GITHUB_STEP_SUMMARY";
pub const ENV_CHECKSUMS_FILE: &str = "PACKAGE_ASSETS_CHECKSUMS_FILE";
pub const ENV_CHUNK_SIZE: &str = "PACKAGE_ASSETS_CHUNK_SIZE";
pub const ENV_JSONL_LOG: &str = "PACKAGE_ASSETS_LOG";

/// Full packager configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub artifacts: ArtifactsConfig,
    pub outputs: OutputsConfig,
    pub logging: LoggingConfig,
}

/// Where artifacts live and how they are read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ArtifactsConfig {
    pub dir: PathBuf,
    /// Read buffer size used while digesting.
    pub chunk_size_bytes: usize,
}

/// CI output sinks. An absent path means the corresponding write is skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputsConfig {
    /// Append-only key/value file (`GITHUB_OUTPUT`).
    pub github_output: Option<PathBuf>,
    /// Append-only Markdown file (`GITHUB_STEP_SUMMARY`).
    pub step_summary: Option<PathBuf>,
    /// Optional on-disk SHA256SUMS file.
    pub checksums_file: Option<PathBuf>,
    pub assets_key: String,
    pub checksums_key: String,
}

/// Activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub jsonl_log: Option<PathBuf>,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
        }
    }
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            github_output: None,
            step_summary: None,
            checksums_file: None,
            assets_key: DEFAULT_ASSETS_KEY.to_string(),
            checksums_key: DEFAULT_CHECKSUMS_KEY.to_string(),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, env_var)
    }

    /// Same as [`Config::load`] with an injectable environment lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| PkgError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(PkgError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides_from(lookup)?;
        cfg.normalize_paths();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build a config from defaults plus environment values, without touching any file.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        cfg.apply_env_overrides_from(lookup)?;
        cfg.normalize_paths();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for the activity log.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut raw_lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // A set-but-empty ARTIFACTS_DIR names the working directory, not the default.
        if let Some(raw) = raw_lookup(ENV_ARTIFACTS_DIR) {
            self.artifacts.dir = if raw.is_empty() {
                PathBuf::from(".")
            } else {
                PathBuf::from(raw)
            };
        }

        // Everywhere else a blank value counts as unset.
        let mut lookup = |name: &str| raw_lookup(name).filter(|raw| !raw.trim().is_empty());
        if let Some(raw) = lookup(ENV_CHUNK_SIZE) {
            self.artifacts.chunk_size_bytes = parse_env_usize(ENV_CHUNK_SIZE, &raw)?;
        }

        if let Some(raw) = lookup(ENV_GITHUB_OUTPUT) {
            self.outputs.github_output = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup(ENV_STEP_SUMMARY) {
            self.outputs.step_summary = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup(ENV_CHECKSUMS_FILE) {
            self.outputs.checksums_file = Some(PathBuf::from(raw));
        }

        if let Some(raw) = lookup(ENV_JSONL_LOG) {
            self.logging.jsonl_log = Some(PathBuf::from(raw));
        }

        Ok(())
    }

    /// Strip trailing slashes so `dist/` and `dist` report identically.
    fn normalize_paths(&mut self) {
        let s = self.artifacts.dir.to_string_lossy().into_owned();
        if s.len() > 1 && s.ends_with('/') {
            let trimmed = s.trim_end_matches('/');
            let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
            self.artifacts.dir = PathBuf::from(trimmed);
        }
    }

    /// Reject settings that would produce unusable output.
    pub fn validate(&self) -> Result<()> {
        if self.artifacts.dir.as_os_str().is_empty() {
            return Err(PkgError::InvalidConfig {
                details: "artifacts.dir must not be empty".to_string(),
            });
        }
        if self.artifacts.chunk_size_bytes == 0 {
            return Err(PkgError::InvalidConfig {
                details: "artifacts.chunk_size_bytes must be > 0".to_string(),
            });
        }
        validate_output_key("outputs.assets_key", &self.outputs.assets_key)?;
        validate_output_key("outputs.checksums_key", &self.outputs.checksums_key)?;
        if self.outputs.assets_key == self.outputs.checksums_key {
            return Err(PkgError::InvalidConfig {
                details: format!(
                    "outputs.assets_key and outputs.checksums_key must differ, both are {:?}",
                    self.outputs.assets_key
                ),
            });
        }
        Ok(())
    }
}

fn validate_output_key(name: &str, key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(PkgError::InvalidConfig {
            details: format!("{name} must not be empty"),
        });
    }
    if key.contains(['=', '<', '\n', '\r']) {
        return Err(PkgError::InvalidConfig {
            details: format!("{name} contains a reserved character: {key:?}"),
        });
    }
    Ok(())
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn parse_env_usize(name: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|error| PkgError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
