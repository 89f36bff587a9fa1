use std::path::Path;
use std::process::{Command, Output};

use url::Url;

/// Build a file:// store URL for a directory.
pub fn file_store_url(path: &Path) -> String {
    Url::from_directory_path(path)
        .expect("Failed to convert path to file URL")
        .to_string()
}

/// Run the CLI binary with arguments.
pub fn run_cli(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_plaudit"));
    cmd.args(args);
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str]) -> String {
    let output = run_cli(args);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI with the store passed via environment instead of a flag.
pub fn run_cli_with_store_env(args: &[&str], store_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_plaudit"));
    cmd.args(args);
    cmd.env("PLAUDIT_STORE", store_url);
    cmd.output().expect("Failed to execute CLI")
}

/// Extract the JSON record lines from a `list --json` output.
pub fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|l| l.starts_with('{'))
        .map(|l| serde_json::from_str(l).expect("invalid JSON line"))
        .collect()
}
