//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CUSTOMIZE: &str = r#"
rule = "customize"

[customize]
message_template = "{{change_type}}:{% if show_message %} {{message}}{% endif %}"
example = "feature: this feature enable customize through config file"
schema = "<type>: <body>"
schema_pattern = "(feature|bug fix):(\\s.*)"
bump_pattern = "^(break|new|fix|hotfix)"
bump_map = {"break" = "MAJOR", "new" = "MINOR", "fix" = "PATCH", "hotfix" = "PATCH"}
info = "This is a customized rule."

[[customize.questions]]
type = "list"
name = "change_type"
choices = [{value = "feature", name = "feature: A new feature."}, {value = "bug fix", name = "bug fix: A bug fix."}]
message = "Select the type of change you are committing"

[[customize.questions]]
type = "input"
name = "message"
message = "Body."

[[customize.questions]]
type = "confirm"
name = "show_message"
message = "Do you want to add body message in commit?"
"#;

/// Returns a Command configured to run our binary.
///
/// Note: `cargo_bin` is marked deprecated for edge cases involving custom
/// cargo build directories, but works correctly for standard project layouts.
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

/// A command running in `dir` with logs kept inside it.
fn cmd_in(dir: &Path) -> Command {
    let mut cmd = cmd();
    cmd.arg("-C")
        .arg(dir)
        .env("XDG_CONFIG_HOME", dir.join(".xdg"))
        .env("SCRIBE_LOG_DIR", dir.join(".logs"));
    cmd
}

fn customize_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".scribe.toml"), CUSTOMIZE).unwrap();
    tmp
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success();
    serde_json::from_slice(&output.get_output().stdout).expect("stdout should be JSON")
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("Options:"));
}

#[test]
fn long_help_lists_environment() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SCRIBE_LOG_DIR"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// =============================================================================
// Rule Accessors
// =============================================================================

#[test]
fn ls_lists_builtin_rules() {
    let tmp = TempDir::new().unwrap();
    let json = json_stdout(cmd_in(tmp.path()).args(["ls", "--json"]));
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["conventional", "customize"]);
}

#[test]
fn example_prints_customize_example() {
    let tmp = customize_project();
    cmd_in(tmp.path())
        .arg("example")
        .assert()
        .success()
        .stdout("feature: this feature enable customize through config file\n");
}

#[test]
fn schema_json_includes_pattern() {
    let tmp = customize_project();
    let json = json_stdout(cmd_in(tmp.path()).args(["schema", "--json"]));
    assert_eq!(json["rule"], "customize");
    assert_eq!(json["schema"], "<type>: <body>");
    assert_eq!(json["schema_pattern"], r"(feature|bug fix):(\s.*)");
}

#[test]
fn info_prints_inline_info() {
    let tmp = customize_project();
    cmd_in(tmp.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("This is a customized rule."));
}

#[test]
fn conventional_info_is_default() {
    let tmp = TempDir::new().unwrap();
    cmd_in(tmp.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("BREAKING CHANGE"));
}

// =============================================================================
// Check
// =============================================================================

#[test]
fn check_accepts_valid_message() {
    let tmp = customize_project();
    cmd_in(tmp.path())
        .args(["check", "--message", "bug fix: handle empty input"])
        .assert()
        .success();
}

#[test]
fn check_rejects_invalid_message() {
    let tmp = customize_project();
    cmd_in(tmp.path())
        .args(["check", "--message", "chore: tidy up"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("commit validation failed"));
}

#[test]
fn check_json_reports_validity() {
    let tmp = TempDir::new().unwrap();
    let json = json_stdout(cmd_in(tmp.path()).args(["check", "-m", "feat(api)!: drop v1", "--json"]));
    assert_eq!(json["rule"], "conventional");
    assert_eq!(json["valid"], true);
}

#[test]
fn check_commit_msg_file_ignores_comments() {
    let tmp = customize_project();
    fs::write(
        tmp.path().join("COMMIT_EDITMSG"),
        "feature: add exports\n# Please enter the commit message for your changes.\n#\n",
    )
    .unwrap();
    cmd_in(tmp.path())
        .args(["check", "--commit-msg-file", "COMMIT_EDITMSG"])
        .assert()
        .success();
}

#[test]
fn check_requires_message_source() {
    cmd()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// =============================================================================
// Bump
// =============================================================================

#[test]
fn bump_takes_highest_severity() {
    let tmp = customize_project();
    let json = json_stdout(cmd_in(tmp.path()).args([
        "bump", "--json", "--current", "1.2.3", "-m", "fix: a", "-m", "break: b", "-m", "new: c",
    ]));
    assert_eq!(json["severity"], "MAJOR");
    assert_eq!(json["trigger"]["index"], 1);
    assert_eq!(json["trigger"]["message"], "break: b");
    assert_eq!(json["current"], "1.2.3");
    assert_eq!(json["next"], "2.0.0");
    assert_eq!(json["commits"], 3);
}

#[test]
fn bump_with_no_matching_commits_is_none() {
    let tmp = TempDir::new().unwrap();
    let json = json_stdout(cmd_in(tmp.path()).args([
        "bump", "--json", "--current", "v0.4.0", "-m", "docs: readme",
    ]));
    assert_eq!(json["severity"], "NONE");
    assert!(json["trigger"].is_null());
    assert!(json.get("next").is_none());
}

#[test]
fn bump_unmapped_alternative_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".scribe.toml"),
        r#"
rule = "customize"

[customize]
message_template = "{{x}}"
bump_pattern = "^(break|new)"
bump_map = {"break" = "MAJOR"}
"#,
    )
    .unwrap();
    cmd_in(tmp.path())
        .args(["bump", "-m", "new: thing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("new"));
}

// =============================================================================
// Commit
// =============================================================================

#[test]
fn commit_dry_run_renders_from_answers_file() {
    let tmp = customize_project();
    fs::write(
        tmp.path().join("answers.json"),
        r#"{"change_type": "feature", "message": "this feature enable customize through config file", "show_message": true}"#,
    )
    .unwrap();
    cmd_in(tmp.path())
        .args(["commit", "--dry-run", "--answers", "answers.json"])
        .assert()
        .success()
        .stdout("feature: this feature enable customize through config file\n");
}

#[test]
fn commit_dry_run_hides_body_when_declined() {
    let tmp = customize_project();
    fs::write(
        tmp.path().join("answers.json"),
        r#"{"change_type": "bug fix", "message": "ignored", "show_message": false}"#,
    )
    .unwrap();
    // "bug fix:" alone does not satisfy the schema pattern.
    cmd_in(tmp.path())
        .args(["commit", "--dry-run", "--answers", "answers.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("schema_pattern"));
}

#[test]
fn commit_writes_message_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("answers.json"),
        r#"{"prefix": "feat", "scope": "api", "subject": "add pagination", "body": "", "is_breaking_change": true, "footer": ""}"#,
    )
    .unwrap();
    let json = json_stdout(cmd_in(tmp.path()).args([
        "commit",
        "--dry-run",
        "--json",
        "--answers",
        "answers.json",
        "--write-message-to-file",
        "msg.txt",
    ]));
    assert_eq!(json["message"], "feat(api)!: add pagination");
    assert_eq!(
        fs::read_to_string(tmp.path().join("msg.txt")).unwrap(),
        "feat(api)!: add pagination"
    );
}

// =============================================================================
// Init
// =============================================================================

#[test]
fn init_writes_usable_toml() {
    let tmp = TempDir::new().unwrap();
    cmd_in(tmp.path()).args(["init", "--yes"]).assert().success();
    assert!(tmp.path().join(".scribe.toml").is_file());

    cmd_in(tmp.path())
        .arg("example")
        .assert()
        .success()
        .stdout(predicate::str::contains("feature:"));
}

#[test]
fn init_writes_usable_yaml() {
    let tmp = TempDir::new().unwrap();
    cmd_in(tmp.path())
        .args(["init", "--yes", "--format", "yaml"])
        .assert()
        .success();
    assert!(tmp.path().join(".scribe.yaml").is_file());

    cmd_in(tmp.path())
        .args(["check", "-m", "bug fix: from yaml"])
        .assert()
        .success();
}

#[test]
fn init_refuses_to_overwrite() {
    let tmp = customize_project();
    cmd_in(tmp.path())
        .args(["init", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// =============================================================================
// Global Flags
// =============================================================================

#[test]
fn quiet_and_verbose_flags_accepted() {
    let tmp = TempDir::new().unwrap();
    cmd_in(tmp.path()).args(["-q", "ls"]).assert().success();
    cmd_in(tmp.path()).args(["-vv", "ls"]).assert().success();
}

#[test]
fn color_choices_accepted() {
    let tmp = TempDir::new().unwrap();
    for choice in ["auto", "always", "never"] {
        cmd_in(tmp.path())
            .args(["--color", choice, "ls"])
            .assert()
            .success();
    }
}

#[test]
fn log_file_is_written_to_log_dir() {
    let tmp = TempDir::new().unwrap();
    cmd_in(tmp.path()).args(["-v", "ls"]).assert().success();
    let log = fs::read_to_string(tmp.path().join(".logs").join("scribe.jsonl")).unwrap();
    let first: serde_json::Value = serde_json::from_str(log.lines().next().unwrap()).unwrap();
    assert!(first["level"].is_string());
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn invalid_subcommand_shows_error() {
    cmd()
        .arg("not-a-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn chdir_nonexistent_fails() {
    cmd()
        .args(["-C", "/nonexistent/path/that/does/not/exist", "ls"])
        .assert()
        .failure();
}
