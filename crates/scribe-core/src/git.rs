//! Git operations for authoring commits and reading history.
//!
//! Shells out to `git` for all operations. This ensures we inherit the user's
//! SSH keys, GPG signing, hooks, and other configuration.

use std::io::Write;
use std::process::{Child, Command, Output};

use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "commit").
        command: String,
        /// Captured stderr.
        stderr: String,
    },

    /// Not inside a git repository.
    #[error("not a git repository (or any parent up to mount point)")]
    NotARepo,
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Get the latest semver tag, if any.
///
/// Looks for tags matching `v*` and sorts by version.
#[instrument]
pub fn latest_version_tag() -> GitResult<Option<String>> {
    let output = git(&["tag", "--list", "v*", "--sort=-version:refname"]);
    let Ok(output) = output else {
        return Ok(None);
    };

    let tag = output.lines().next().map(|s| s.trim().to_string());
    debug!(?tag, "latest version tag");
    Ok(tag)
}

/// Full commit messages since a ref (or all of history if `None`).
///
/// Returned oldest first, so index order matches the order commits landed.
#[instrument]
pub fn commit_messages(since: Option<&str>) -> GitResult<Vec<String>> {
    let range = since.map_or_else(|| "HEAD".to_string(), |tag| format!("{tag}..HEAD"));
    let output = git(&["log", "--reverse", "--format=%B%x00", &range])?;
    let messages = split_messages(&output);
    debug!(count = messages.len(), "commit messages");
    Ok(messages)
}

/// Split NUL-terminated `git log` output into trimmed messages.
fn split_messages(output: &str) -> Vec<String> {
    output
        .split('\0')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// Create a commit with `message`, passing any extra arguments to `git commit`.
///
/// The message goes through `--file=-` on stdin so it is never re-wrapped
/// or interpreted by the shell.
#[instrument(skip(message))]
pub fn commit(message: &str, extra_args: &[String]) -> GitResult<String> {
    use std::process::Stdio;

    let child = Command::new("git")
        .args(["commit", "--file=-"])
        .args(extra_args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let output = feed_and_wait(child, message.as_bytes())?;
    check_output("commit", &output)
}

/// Write `input` to the child's stdin, then always reap it.
///
/// A failed write only surfaces when the child itself succeeded; otherwise
/// the child's own exit status and stderr explain the failure.
fn feed_and_wait(mut child: Child, input: &[u8]) -> GitResult<Output> {
    let written = child
        .stdin
        .take()
        .map_or(Ok(()), |mut stdin| stdin.write_all(input));
    let output = child.wait_with_output()?;
    match written {
        Err(err) if output.status.success() => Err(err.into()),
        _ => Ok(output),
    }
}

/// Check if we're inside a git repository.
#[instrument]
pub fn is_inside_repo() -> GitResult<bool> {
    let result = git(&["rev-parse", "--is-inside-work-tree"]);
    match result {
        Ok(output) => Ok(output.trim() == "true"),
        Err(GitError::Command { .. } | GitError::NotARepo) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Run a git command and return its stdout.
fn git(args: &[&str]) -> GitResult<String> {
    let output = Command::new("git").args(args).output()?;
    check_output(args.first().unwrap_or(&""), &output)
}

fn check_output(command: &str, output: &Output) -> GitResult<String> {
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if stderr.contains("not a git repository") {
            return Err(GitError::NotARepo);
        }

        Err(GitError::Command {
            command: command.to_string(),
            stderr,
        })
    }
}
