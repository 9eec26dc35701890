use std::path::Path;
use std::process::Command;

use crate::error::Error;

/// Run `git <args>` in `dir` and return its trimmed stdout.
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Personal access tokens
/// - Any authentication configured in ~/.gitconfig
///
/// A non-zero exit becomes [`Error::GitCommand`] carrying stderr (or stdout
/// when stderr is empty). Failing to spawn git maps to the same variant.
pub fn run_git(dir: &Path, args: &[&str]) -> Result<String, Error> {
    let command = args.join(" ");
    log::debug!("git {} (in {})", command, dir.display());

    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            dir: dir.display().to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stderr = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        return Err(Error::GitCommand {
            command,
            dir: dir.display().to_string(),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Clone `url` into `parent_dir/name`.
///
/// The default branch is checked out; callers switch to a specific ref with
/// [`checkout`] afterwards. `url` and `name` follow `--`, so values starting
/// with `-` are never read as options.
pub fn clone(parent_dir: &Path, url: &str, name: &str) -> Result<(), Error> {
    run_git(parent_dir, &["clone", "--", url, name])
        .map(|_| ())
        .map_err(|e| match e {
            Error::GitCommand { stderr, .. } => clone_error(url, &stderr),
            other => other,
        })
}

fn clone_error(url: &str, stderr: &str) -> Error {
    // Provide helpful error message for common auth failures
    let hint = if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        Some(
            "Make sure you have access to the repository: SSH key added to ssh-agent, \
             git credentials configured, or a personal access token set up"
                .to_string(),
        )
    } else {
        None
    };
    Error::GitClone {
        url: url.to_string(),
        r#ref: "HEAD".to_string(),
        message: stderr.to_string(),
        hint,
    }
}

/// `git fetch --all --tags`
pub fn fetch_all(dir: &Path) -> Result<String, Error> {
    run_git(dir, &["fetch", "--all", "--tags"])
}

/// `git checkout <ref>`
pub fn checkout(dir: &Path, reference: &str) -> Result<String, Error> {
    reject_option_like(dir, "checkout", reference)?;
    run_git(dir, &["checkout", reference])
}

/// `git checkout -b <name>`
pub fn create_branch(dir: &Path, name: &str) -> Result<String, Error> {
    reject_option_like(dir, "checkout -b", name)?;
    run_git(dir, &["checkout", "-b", name])
}

/// Ref names cannot start with `-`; refuse them before git parses one as a flag.
fn reject_option_like(dir: &Path, command: &str, reference: &str) -> Result<(), Error> {
    if reference.starts_with('-') {
        return Err(Error::GitCommand {
            command: format!("{} {}", command, reference),
            dir: dir.display().to_string(),
            stderr: format!("'{}' is not a valid ref name", reference),
        });
    }
    Ok(())
}

/// `git pull`
pub fn pull(dir: &Path) -> Result<String, Error> {
    run_git(dir, &["pull"])
}

/// The checked-out branch name, `HEAD` when detached.
pub fn current_branch(dir: &Path) -> Result<String, Error> {
    run_git(dir, &["rev-parse", "--abbrev-ref", "HEAD"])
}

/// The abbreviated hash of `HEAD`.
pub fn short_hash(dir: &Path) -> Result<String, Error> {
    run_git(dir, &["rev-parse", "--short", "HEAD"])
}

/// The tag pointing exactly at `HEAD`; errors when there is none.
pub fn exact_tag(dir: &Path) -> Result<String, Error> {
    run_git(dir, &["describe", "--tags", "--exact-match", "HEAD"])
}

/// `git status --short`
pub fn status_short(dir: &Path) -> Result<String, Error> {
    run_git(dir, &["status", "--short"])
}

/// Returns true when `dir/.git` is a directory.
pub fn is_repository(dir: &Path) -> bool {
    dir.join(".git").is_dir()
}
