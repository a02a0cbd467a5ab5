#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{SystemTime, UNIX_EPOCH};

/// Variables the binary reads; cleared so a CI runner's own values never leak in.
const PACKAGER_ENV: &[&str] = &[
    "ARTIFACTS_DIR",
    "GITHUB_OUTPUT",
    "GITHUB_STEP_SUMMARY",
    "PACKAGE_ASSETS_CHECKSUMS_FILE",
    "PACKAGE_ASSETS_CHUNK_SIZE",
    "PACKAGE_ASSETS_LOG",
    "PACKAGE_ASSETS_OUTPUT_FORMAT",
];

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Some(path) = option_env!("CARGO_BIN_EXE_package-assets") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) {
        "package-assets.exe"
    } else {
        "package-assets"
    };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve package-assets binary path for integration test"),
    }
}

/// Run the binary in `cwd` with a clean packager environment plus `env`.
pub fn run_cli_case(case_name: &str, cwd: &Path, args: &[&str], env: &[(&str, &Path)]) -> CmdResult {
    let root = std::env::temp_dir().join("package-assets-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command.current_dir(cwd).args(args).env("RUST_BACKTRACE", "1");
    for name in PACKAGER_ENV {
        command.env_remove(name);
    }
    for (name, value) in env {
        command.env(name, value);
    }
    let output = command.output().expect("execute package-assets command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("cwd={}\n", cwd.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

/// Split a `GITHUB_OUTPUT` file into `(name, value)` pairs, honoring heredoc blocks.
pub fn parse_github_output(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut lines = content.lines();
    while let Some(line) = lines.next() {
        if let Some((name, delimiter)) = line.split_once("<<") {
            let mut value = Vec::new();
            for body in lines.by_ref() {
                if body == delimiter {
                    break;
                }
                value.push(body);
            }
            pairs.push((name.to_string(), value.join("\n")));
        } else if let Some((name, value)) = line.split_once('=') {
            pairs.push((name.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Value of the last `name` entry in a `GITHUB_OUTPUT` file.
pub fn output_value(content: &str, name: &str) -> Option<String> {
    parse_github_output(content)
        .into_iter()
        .rev()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}
