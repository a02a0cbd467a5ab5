//! Top-level CLI definition and dispatch.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use release_asset_packager::core::config::Config;
use release_asset_packager::core::errors::PkgError;
use release_asset_packager::logger::jsonl::JsonlWriter;
use release_asset_packager::package::verify::{VerifyReport, VerifyStatus, verify_checksums};
use release_asset_packager::package::{PackageReport, run_package};

/// package-assets: build a release manifest and checksums for CI.
#[derive(Debug, Parser)]
#[command(
    name = "package-assets",
    author,
    version,
    about = "Enumerate release artifacts, digest them with SHA-256, and publish a manifest",
    long_about = None
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute (defaults to `package`).
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Scan, digest, and publish the artifact manifest.
    Package(PackageArgs),
    /// Check artifacts against a checksums listing.
    Verify(VerifyArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct PackageArgs {
    /// Artifacts directory (overrides ARTIFACTS_DIR).
    #[arg(long, value_name = "DIR")]
    artifacts_dir: Option<PathBuf>,
    /// Step output file (overrides GITHUB_OUTPUT).
    #[arg(long, value_name = "PATH")]
    github_output: Option<PathBuf>,
    /// Step summary file (overrides GITHUB_STEP_SUMMARY).
    #[arg(long, value_name = "PATH")]
    step_summary: Option<PathBuf>,
    /// Also write the checksums listing to this file.
    #[arg(long, value_name = "PATH")]
    checksums_file: Option<PathBuf>,
    /// Append JSONL activity events to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct VerifyArgs {
    /// Checksums listing (`<sha256>  <filename>` per line).
    #[arg(value_name = "SUMS")]
    checksums: PathBuf,
    /// Artifacts directory (overrides ARTIFACTS_DIR).
    #[arg(long, value_name = "DIR")]
    artifacts_dir: Option<PathBuf>,
    /// Append JSONL activity events to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// Operation completed but found problems (verification failures).
    #[error("{0}")]
    Partial(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
            Self::Partial(_) => 4,
        }
    }
}

impl From<PkgError> for CliError {
    fn from(value: PkgError) -> Self {
        match value {
            PkgError::Serialization { .. } => Self::Internal(value.to_string()),
            ref err if err.is_user_error() => Self::User(value.to_string()),
            _ => Self::Runtime(value.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        None => run_package_command(cli, &PackageArgs::default()),
        Some(Command::Package(args)) => run_package_command(cli, args),
        Some(Command::Verify(args)) => run_verify(cli, args),
        Some(Command::Completions(args)) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    Ok(Config::load(cli.config.as_deref())?)
}

fn apply_package_overrides(config: &mut Config, args: &PackageArgs) -> Result<(), CliError> {
    if let Some(dir) = &args.artifacts_dir {
        config.artifacts.dir.clone_from(dir);
    }
    if let Some(path) = &args.github_output {
        config.outputs.github_output = Some(path.clone());
    }
    if let Some(path) = &args.step_summary {
        config.outputs.step_summary = Some(path.clone());
    }
    if let Some(path) = &args.checksums_file {
        config.outputs.checksums_file = Some(path.clone());
    }
    if let Some(path) = &args.log_file {
        config.logging.jsonl_log = Some(path.clone());
    }
    config.validate()?;
    Ok(())
}

fn run_package_command(cli: &Cli, args: &PackageArgs) -> Result<(), CliError> {
    let mut config = load_config(cli)?;
    apply_package_overrides(&mut config, args)?;

    let mut log = JsonlWriter::from_config(&config.logging);
    let report = run_package(&config, &mut log)?;

    match output_mode(cli) {
        OutputMode::Human => print_package_human(cli, &report, &log),
        OutputMode::Json => {
            let payload = json!({
                "command": "package",
                "status": if report.found { "ok" } else { "artifacts_missing" },
                "report": serde_json::to_value(&report)?,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn print_package_human(cli: &Cli, report: &PackageReport, log: &JsonlWriter) {
    if cli.quiet {
        return;
    }
    if !report.found {
        println!(
            "{}",
            format!(
                "⚠️ Artifacts directory not found: {}",
                report.artifacts_dir.display()
            )
            .yellow()
        );
        return;
    }

    if cli.verbose {
        for asset in &report.assets {
            println!(
                "  {}  {:>10}  {}",
                asset.sha256.dimmed(),
                format_bytes(asset.size),
                asset.filename
            );
        }
        for (sink, status) in report.outputs.entries() {
            println!("  {sink}: {}", status.label());
        }
        println!(
            "  activity_log: {} lines ({})",
            log.lines_written(),
            log.state()
        );
    }

    println!(
        "{}",
        format!("✅ Packaged {} artifacts", report.artifact_count).green()
    );
}

fn run_verify(cli: &Cli, args: &VerifyArgs) -> Result<(), CliError> {
    let mut config = load_config(cli)?;
    if let Some(dir) = &args.artifacts_dir {
        config.artifacts.dir.clone_from(dir);
    }
    if let Some(path) = &args.log_file {
        config.logging.jsonl_log = Some(path.clone());
    }
    config.validate()?;

    let listing = fs::read_to_string(&args.checksums).map_err(|source| {
        CliError::User(format!(
            "cannot read checksums listing {}: {source}",
            args.checksums.display()
        ))
    })?;

    let mut log = JsonlWriter::from_config(&config.logging);
    let report = verify_checksums(
        &config.artifacts.dir,
        &listing,
        config.artifacts.chunk_size_bytes,
        &mut log,
    )?;

    match output_mode(cli) {
        OutputMode::Human => print_verify_human(cli, &report),
        OutputMode::Json => {
            let payload = json!({
                "command": "verify",
                "status": if report.all_ok() { "ok" } else { "failed" },
                "artifacts_dir": config.artifacts.dir,
                "report": serde_json::to_value(&report)?,
            });
            write_json_line(&payload)?;
        }
    }

    if report.all_ok() {
        Ok(())
    } else {
        Err(CliError::Partial(format!(
            "{} of {} artifacts failed verification ({} mismatched, {} missing)",
            report.mismatch_count() + report.missing_count(),
            report.entries.len(),
            report.mismatch_count(),
            report.missing_count()
        )))
    }
}

fn print_verify_human(cli: &Cli, report: &VerifyReport) {
    if cli.quiet {
        return;
    }
    for entry in &report.entries {
        match &entry.status {
            VerifyStatus::Ok => {
                if cli.verbose {
                    println!("  {} {}", "OK".green(), entry.filename);
                }
            }
            VerifyStatus::Mismatch { expected, actual } => {
                println!(
                    "  {} {} (expected {expected}, got {actual})",
                    "MISMATCH".red().bold(),
                    entry.filename
                );
            }
            VerifyStatus::Missing => {
                println!("  {} {}", "MISSING".yellow().bold(), entry.filename);
            }
        }
    }
    if report.all_ok() {
        println!(
            "{}",
            format!("✅ Verified {} artifacts", report.ok_count()).green()
        );
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    const GIB: u64 = 1024 * MIB;

    if bytes >= GIB {
        format!("{:.1} GB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("PACKAGE_ASSETS_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref())
}

/// CI logs should show the status line, so human output is the default even
/// when stdout is not a terminal.
fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        _ => OutputMode::Human,
    }
}
