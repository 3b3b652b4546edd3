//! Integration tests for the CLI interface
//!
//! The model service is disabled (or pointed at a dead port) throughout so
//! every test here is hermetic and exercises the rule-based path.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_cli_help_default() {
    // Running without arguments shows help
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn test_cli_help_flag() {
    // Explicit help flag lists the subcommands
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("explain"))
        .stdout(predicate::str::contains("models"));
}

#[test]
fn test_run_help() {
    // run subcommand help
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.arg("run")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Run a shell command"));
}

#[test]
fn test_explain_help() {
    // explain subcommand help
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.arg("explain")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-llm"));
}

#[test]
fn test_invalid_command() {
    // Unknown subcommand fails with a parse error
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.arg("not-a-subcommand")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_run_requires_a_command() {
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.args(["run", "--no-llm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_run_mirrors_child_exit_code() {
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.args(["run", "--no-llm", "exit 7"]).assert().code(7);
}

#[test]
fn test_run_passes_stdout_through() {
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.args(["run", "--no-llm", "echo hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello"));
}

#[test]
fn test_successful_run_skips_analysis() {
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.args(["run", "--no-llm", "echo ok"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Analyzing").not());
}

#[test]
fn test_failed_run_gets_rule_based_analysis() {
    // Shells report a missing command on stderr with exit code 127; the
    // analysis lands on stdout while the exit code is mirrored.
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.args(["run", "--no-llm", "definitely_not_a_real_command_404"])
        .assert()
        .code(127)
        .stdout(predicate::str::contains("Analyzing failure"))
        .stdout(predicate::str::contains("Rule-Based"))
        .stdout(predicate::str::contains("Command Not Found"));
}

#[test]
fn test_explain_with_inline_text() {
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.args(["explain", "--no-llm", "bash: htop: command not found"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Command Not Found"))
        .stdout(predicate::str::contains("Suggested Fixes"));
}

#[test]
fn test_explain_interactive_paste() {
    // Two consecutive empty lines submit the pasted text
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.args(["explain", "--no-llm"])
        .write_stdin("cat: notes.txt: No such file or directory\n\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("File or Directory Not Found"));
}

#[test]
fn test_explain_empty_input() {
    // EOF with nothing pasted is not an error
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.args(["explain", "--no-llm"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("No error message provided"));
}

#[test]
fn test_unrecognized_error_gets_generic_advice() {
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.args(["explain", "--no-llm", "everything is totally fine here"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generic"))
        .stdout(predicate::str::contains("Suggested Fixes"));
}

#[test]
fn test_models_reports_unreachable_service() {
    // A freshly freed port refuses connections
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.arg("models")
        .env("TRIAGE_OLLAMA_URL", format!("http://127.0.0.1:{port}"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Ollama is not running"));
}

#[test]
fn test_service_notice_names_configured_model() {
    // The pull tip reflects the configured model, not a hardcoded one
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.arg("models")
        .env("TRIAGE_OLLAMA_URL", format!("http://127.0.0.1:{port}"))
        .env("TRIAGE_MODEL", "llama3")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ollama pull llama3"));
}

#[test]
fn test_explicit_config_must_exist() {
    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.args(["--config", "/nonexistent/triage.toml", "models"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_explicit_config_file_is_honored() {
    // Disabling the LLM via config file works without the flag
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("triage.toml");
    std::fs::write(&config_path, "[features]\nuse_llm = false\n").unwrap();

    let mut cmd = Command::cargo_bin("triage").unwrap();
    cmd.arg("--config")
        .arg(&config_path)
        .args(["explain", "bash: htop: command not found"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Command Not Found"));
}
