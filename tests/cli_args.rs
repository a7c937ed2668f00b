//! Integration tests for CLI argument handling
//!
//! Runs the binary in `--print` mode, which loads the card once and writes it
//! to stdout without starting the terminal UI.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_ghpeek"))
        .args(args)
        .env_remove("GHPEEK_TTL")
        .env_remove("GHPEEK_CACHE_DIR")
        .env_remove("GHPEEK_API_URL")
        .output()
        .expect("Failed to execute ghpeek")
}

fn profile_json(login: &str, name: &str) -> String {
    format!(
        r#"{{"login":"{login}","name":"{name}","bio":null,"avatar_url":"https://avatars.example/{login}","followers":1200,"following":3,"public_repos":8,"html_url":"https://github.com/{login}"}}"#
    )
}

fn seed_cache(dir: &Path, login: &str, name: &str, timestamp: i64) {
    let record = format!(
        r#"{{"data":{},"timestamp":{}}}"#,
        profile_json(login, name),
        timestamp
    );
    std::fs::write(dir.join(format!("github_profile_{}.json", login)), record).unwrap();
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ghpeek"), "Help should mention ghpeek");
    assert!(stdout.contains("--ttl"), "Help should mention --ttl flag");
}

#[test]
fn test_invalid_username_prints_error_and_exits() {
    let output = run_cli(&["bad/name", "--print"]);
    assert!(!output.status.success(), "Expected invalid username to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Error: Invalid username"),
        "Should print error message about the username: {}",
        stderr
    );
}

#[test]
fn test_zero_ttl_is_rejected() {
    let output = run_cli(&["octocat", "--ttl", "0", "--print"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid TTL"), "Unexpected stderr: {}", stderr);
}

#[test]
fn test_print_fetches_and_caches_profile() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/users/octocat")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(profile_json("octocat", "The Octocat"))
        .expect(1)
        .create();
    let temp_dir = TempDir::new().unwrap();
    let cache_dir = temp_dir.path().to_str().unwrap();
    let api_url = server.url();

    let output = run_cli(&["octocat", "--print", "--cache-dir", cache_dir, "--api-url", &api_url]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("The Octocat"));
    assert!(stdout.contains("1.2k followers"));
    assert!(temp_dir.path().join("github_profile_octocat.json").exists());

    // Second run is served from the cache
    let output = run_cli(&["octocat", "--print", "--cache-dir", cache_dir, "--api-url", &api_url]);
    assert!(output.status.success());
    mock.assert();
}

#[test]
fn test_print_uses_fresh_cache_without_network() {
    let temp_dir = TempDir::new().unwrap();
    seed_cache(
        temp_dir.path(),
        "octocat",
        "Cached Cat",
        chrono::Utc::now().timestamp_millis(),
    );

    let output = run_cli(&[
        "octocat",
        "--print",
        "--cache-dir",
        temp_dir.path().to_str().unwrap(),
        "--api-url",
        "http://127.0.0.1:1",
    ]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Cached Cat"));
}

#[test]
fn test_print_with_stale_cache_and_no_network_fails() {
    let temp_dir = TempDir::new().unwrap();
    let ten_minutes_ago = chrono::Utc::now().timestamp_millis() - 10 * 60 * 1000;
    seed_cache(temp_dir.path(), "octocat", "Cached Cat", ten_minutes_ago);

    let output = run_cli(&[
        "octocat",
        "--print",
        "--cache-dir",
        temp_dir.path().to_str().unwrap(),
        "--api-url",
        "http://127.0.0.1:1",
    ]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Failed to load profile. Please try again later."));
    assert!(!stdout.contains("Cached Cat"));
    // The stale record is left in place
    assert!(temp_dir.path().join("github_profile_octocat.json").exists());
}

#[test]
fn test_print_rate_limited() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/users/octocat")
        .with_status(429)
        .with_header("retry-after", "60")
        .create();
    let temp_dir = TempDir::new().unwrap();

    let output = run_cli(&[
        "octocat",
        "--print",
        "--cache-dir",
        temp_dir.path().to_str().unwrap(),
        "--api-url",
        &server.url(),
    ]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("GitHub rate limit reached."));
    assert!(stdout.contains("Try again after"));
}

#[test]
fn test_clear_cache_forces_fetch() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/users/octocat")
        .with_status(200)
        .with_body(profile_json("octocat", "Fresh Cat"))
        .expect(1)
        .create();
    let temp_dir = TempDir::new().unwrap();
    seed_cache(
        temp_dir.path(),
        "octocat",
        "Cached Cat",
        chrono::Utc::now().timestamp_millis(),
    );

    let output = run_cli(&[
        "octocat",
        "--print",
        "--clear-cache",
        "--cache-dir",
        temp_dir.path().to_str().unwrap(),
        "--api-url",
        &server.url(),
    ]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Fresh Cat"));
    mock.assert();
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use ghpeek::cli::{Cli, StartupConfig};
    use std::time::Duration;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["ghpeek", "octocat"]).unwrap();
        assert_eq!(cli.username, "octocat");
        assert!(!cli.print);
        assert!(!cli.clear_cache);
    }

    #[test]
    fn test_cli_requires_username() {
        assert!(Cli::try_parse_from(["ghpeek"]).is_err());
    }

    #[test]
    fn test_startup_config_from_flags() {
        let cli = Cli::try_parse_from([
            "ghpeek",
            "Octocat",
            "--ttl",
            "60",
            "--cache-dir",
            "/tmp/ghpeek-test",
            "--print",
            "--debug",
        ])
        .unwrap();
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.username, "Octocat");
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(
            config.cache_dir.as_deref(),
            Some(std::path::Path::new("/tmp/ghpeek-test"))
        );
        assert!(config.print);
        assert!(config.debug);
    }
}
