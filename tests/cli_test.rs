use anyhow::Result;
use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Runs the `how` binary with `home` as its home directory and no ambient
/// credentials or overrides.
fn run_how(home: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_how"));
    cmd.args(args)
        .env("HOME", home)
        .env_remove("GROQ_API_KEY")
        .env_remove("HOW_MODEL")
        .env_remove("HOW_API_BASE")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null());
    for (key, value) in env {
        cmd.env(key, value);
    }
    Ok(cmd.output()?)
}

#[test]
fn test_no_arguments_prints_usage() -> Result<()> {
    let home = TempDir::new()?;
    let output = run_how(home.path(), &[], &[])?;

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage: how <question>"), "stdout: {}", stdout);
    assert!(stdout.contains("--api-key"));
    Ok(())
}

#[test]
fn test_help_flag_prints_usage() -> Result<()> {
    let home = TempDir::new()?;
    let output = run_how(home.path(), &["--help"], &[])?;

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Suppress spinner and typewriter effect"));
    Ok(())
}

#[test]
fn test_api_key_is_persisted() -> Result<()> {
    let home = TempDir::new()?;
    let output = run_how(home.path(), &["--api-key", "ABC123"], &[])?;

    assert_eq!(output.status.code(), Some(0));
    let stored = fs::read_to_string(home.path().join(".how-cli").join(".groq_api_key"))?;
    assert_eq!(stored, "ABC123");
    Ok(())
}

#[test]
fn test_api_key_replaces_previous_value() -> Result<()> {
    let home = TempDir::new()?;
    run_how(home.path(), &["--api-key", "first"], &[])?;
    let output = run_how(home.path(), &["--api-key", "second"], &[])?;

    assert!(output.status.success());
    let stored = fs::read_to_string(home.path().join(".how-cli").join(".groq_api_key"))?;
    assert_eq!(stored, "second");
    Ok(())
}

#[test]
fn test_bare_api_key_flag_without_question_is_usage_error() -> Result<()> {
    let home = TempDir::new()?;
    let output = run_how(home.path(), &["--api-key"], &[])?;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: No question provided."));
    assert!(!home.path().join(".how-cli").join(".groq_api_key").exists());
    Ok(())
}

#[test]
fn test_flags_without_question_is_usage_error() -> Result<()> {
    let home = TempDir::new()?;
    let output = run_how(home.path(), &["--silent", "--type"], &[])?;

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: No question provided."));
    Ok(())
}

#[test]
fn test_history_without_log() -> Result<()> {
    let home = TempDir::new()?;
    let output = run_how(home.path(), &["--history"], &[])?;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "No history found.");
    Ok(())
}

#[test]
fn test_history_prints_log_verbatim() -> Result<()> {
    let home = TempDir::new()?;
    let config_dir = home.path().join(".how-cli");
    fs::create_dir_all(&config_dir)?;
    let log = "[2024-01-01 10:00:00] Q: list files\nCommands:\nls -la\n\n";
    fs::write(config_dir.join("history.log"), log)?;

    let output = run_how(home.path(), &["--history"], &[])?;

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with(log));
    Ok(())
}

#[test]
fn test_missing_key_in_non_interactive_session() -> Result<()> {
    let home = TempDir::new()?;
    let output = run_how(home.path(), &["list", "files"], &[])?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("❌ Authentication Error:"), "stderr: {}", stderr);
    assert!(stderr.contains("non-interactive"));
    Ok(())
}

#[test]
fn test_question_with_dash_words_reaches_the_pipeline() -> Result<()> {
    let home = TempDir::new()?;
    let output = run_how(home.path(), &["what", "does", "ls", "-la", "do"], &[])?;

    // Parsing succeeds; the run stops at the missing key.
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("❌ Authentication Error:"), "stderr: {}", stderr);
    Ok(())
}

#[test]
fn test_leading_unknown_option_never_exits_with_two() -> Result<()> {
    let home = TempDir::new()?;
    let output = run_how(home.path(), &["--force", "delete", "branch"], &[])?;

    assert_eq!(output.status.code(), Some(1));
    Ok(())
}

#[test]
fn test_transport_failure_exits_with_error_and_no_history() -> Result<()> {
    let home = TempDir::new()?;
    let output = run_how(
        home.path(),
        &["list", "--silent", "files"],
        &[("GROQ_API_KEY", "test-key"), ("HOW_API_BASE", "http://127.0.0.1:1/v1")],
    )?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("💥 Error:"), "stderr: {}", stderr);
    assert!(output.stdout.is_empty());
    assert!(!home.path().join(".how-cli").join("history.log").exists());
    Ok(())
}
