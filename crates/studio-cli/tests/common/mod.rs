#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use wiremock::MockServer;

/// API base URL of a mock server.
pub fn api_url(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}/api", server.address().port())
}

/// Location of the session file under an isolated HOME.
pub fn session_file(home: &Path) -> PathBuf {
    home.join("data").join("studio").join("session.json")
}

/// Run the CLI with a custom HOME directory for isolated session storage.
///
/// Runs on a blocking thread so the mock server keeps serving.
pub async fn run_cli_with_env(args: &[&str], home: &Path, api: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_studio"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env("STUDIO_API_URL", api);
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");

    tokio::task::spawn_blocking(move || cmd.output().expect("Failed to execute CLI"))
        .await
        .expect("CLI task panicked")
}

/// Run the CLI with a custom HOME and expect success.
pub async fn run_cli_success(args: &[&str], home: &Path, api: &str) -> String {
    let output = run_cli_with_env(args, home, api).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI with a custom HOME and expect failure. Returns stderr.
pub async fn run_cli_failure(args: &[&str], home: &Path, api: &str) -> String {
    let output = run_cli_with_env(args, home, api).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}
