//! Feedstock repository operations via system git and gh
//!
//! Uses the system binaries for all repository work:
//! - fork/clone and pull requests through `gh`
//! - branch, commit, and push plumbing through `git`
//! - safe subprocess execution (isolated environment)
//!
//! The internals of these tools are opaque to the engine; only exit status
//! and captured output are observed.

use crate::core::error::{BumpError, BumpResult, GitError, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// One feedstock checkout and the upstream slug it was forked from
pub struct FeedstockRepo {
  /// Upstream repository slug ("conda-forge/go-feedstock")
  slug: String,

  /// Local checkout path
  path: PathBuf,
}

impl FeedstockRepo {
  /// Materialize the feedstock under `work_dir`.
  ///
  /// An existing checkout is reused (with a fresh `fetch upstream`);
  /// otherwise the repository is forked and cloned via `gh`. Forking an
  /// already-forked repository is a no-op upstream, so this is idempotent.
  pub fn materialize(work_dir: &Path, slug: &str) -> BumpResult<Self> {
    let name = slug.rsplit('/').next().unwrap_or(slug);
    let path = work_dir.join(name);

    if path.is_dir() {
      println!("Repository {} already exists, updating...", path.display());
      let repo = Self {
        slug: slug.to_string(),
        path,
      };
      repo.run_git(&["fetch", "upstream"])?;
      Ok(repo)
    } else {
      println!("Forking and cloning {}...", slug);
      run_checked(
        Command::new("gh").current_dir(work_dir).args(["repo", "fork", slug, "--clone"]),
        &format!("gh repo fork {}", slug),
      )?;
      if !path.is_dir() {
        return Err(BumpError::Git(GitError::RepoNotFound { path }));
      }
      Ok(Self {
        slug: slug.to_string(),
        path,
      })
    }
  }

  /// Open an already-materialized checkout without touching the network
  #[allow(dead_code)] // Kept as convenience API for offline repair workflows
  pub fn open(path: &Path, slug: &str) -> BumpResult<Self> {
    if !path.is_dir() {
      return Err(BumpError::Git(GitError::RepoNotFound {
        path: path.to_path_buf(),
      }));
    }
    Ok(Self {
      slug: slug.to_string(),
      path: path.to_path_buf(),
    })
  }

  /// Local checkout path
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Check out a maintenance branch and pull it from upstream.
  ///
  /// Returns false when the branch does not exist (a series the feedstock
  /// does not maintain), which skips the unit rather than failing it.
  pub fn checkout_series_branch(&self, branch: &str) -> BumpResult<bool> {
    println!("Checking out upstream/{}...", branch);
    if self.try_git(&["checkout", branch]).is_err() {
      return Ok(false);
    }
    if self.try_git(&["pull", "upstream", branch]).is_err() {
      return Ok(false);
    }
    Ok(true)
  }

  /// Create and switch to a fresh update branch
  pub fn create_update_branch(&self, branch: &str) -> BumpResult<()> {
    println!("Creating update branch {}...", branch);
    self.run_git(&["checkout", "-b", branch])
  }

  /// Stage the given paths and commit
  pub fn commit_paths(&self, paths: &[&str], message: &str) -> BumpResult<()> {
    for path in paths {
      self.run_git(&["add", path])?;
    }
    self.run_git(&["commit", "-m", message])
  }

  /// Stage everything and commit
  pub fn commit_all(&self, message: &str) -> BumpResult<()> {
    self.run_git(&["add", "-A"])?;
    self.run_git(&["commit", "-m", message])
  }

  /// Whether the working tree has uncommitted changes
  pub fn has_changes(&self) -> BumpResult<bool> {
    let output = run_checked(self.git_cmd().args(["status", "--porcelain"]), "git status --porcelain")?;
    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
  }

  /// Push a branch to the fork
  pub fn push(&self, branch: &str) -> BumpResult<()> {
    println!("Pushing {} to origin...", branch);
    let output = self
      .git_cmd()
      .args(["push", "-u", "origin", branch])
      .output()
      .context("Failed to execute git push")?;

    if !output.status.success() {
      return Err(BumpError::Git(GitError::PushFailed {
        branch: branch.to_string(),
        reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }
    Ok(())
  }

  /// Open a pull request against `base` on the upstream repository.
  /// Returns the PR URL.
  pub fn open_pull_request(&self, base: &str, title: &str, body: &str, automerge: bool) -> BumpResult<String> {
    println!("Creating pull request...");
    let mut cmd = Command::new("gh");
    cmd
      .current_dir(&self.path)
      .args(["pr", "create", "-R", &self.slug, "--base", base, "--title", title, "--body", body]);
    if automerge {
      cmd.args(["--label", "automerge"]);
    }

    let output = run_checked(&mut cmd, "gh pr create")?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Run a git subcommand, failing on non-zero exit
  fn run_git(&self, args: &[&str]) -> BumpResult<()> {
    run_checked(self.git_cmd().args(args), &format!("git {}", args.join(" ")))?;
    Ok(())
  }

  /// Run a git subcommand, treating non-zero exit as a soft failure
  fn try_git(&self, args: &[&str]) -> Result<(), ()> {
    match self.git_cmd().args(args).output() {
      Ok(output) if output.status.success() => Ok(()),
      _ => Err(()),
    }
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the checkout
  /// - Clears environment variables, whitelisting PATH and HOME
  /// - Adds safe configuration overrides
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(&self.path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("advice.detachedHead=false");

    cmd
  }
}

/// Run a command, mapping non-zero exit to a GitError with captured stderr
fn run_checked(cmd: &mut Command, label: &str) -> BumpResult<std::process::Output> {
  let output = cmd.output().with_context(|| format!("Failed to execute {}", label))?;

  if !output.status.success() {
    return Err(BumpError::Git(GitError::CommandFailed {
      command: label.to_string(),
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }));
  }

  Ok(output)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn git(cwd: &Path, args: &[&str]) {
    let status = Command::new("git").current_dir(cwd).args(args).status().unwrap();
    assert!(status.success(), "git {:?} failed", args);
  }

  fn init_repo(path: &Path) {
    git(path, &["init", "--initial-branch=main"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "user.email", "test@example.com"]);
  }

  #[test]
  fn test_open_requires_existing_checkout() {
    let dir = tempfile::tempdir().unwrap();
    assert!(FeedstockRepo::open(&dir.path().join("missing"), "conda-forge/go-feedstock").is_err());
    assert!(FeedstockRepo::open(dir.path(), "conda-forge/go-feedstock").is_ok());
  }

  #[test]
  fn test_has_changes_and_commit() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    let repo = FeedstockRepo::open(dir.path(), "conda-forge/go-feedstock").unwrap();

    std::fs::create_dir_all(dir.path().join("recipe")).unwrap();
    std::fs::write(dir.path().join("recipe/meta.yaml"), "number: 1\n").unwrap();
    assert!(repo.has_changes().unwrap());

    repo.commit_paths(&["recipe/meta.yaml"], "Add recipe").unwrap();
    assert!(!repo.has_changes().unwrap());
  }

  #[test]
  fn test_create_update_branch() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    std::fs::write(dir.path().join("README.md"), "feedstock\n").unwrap();
    let repo = FeedstockRepo::open(dir.path(), "conda-forge/go-feedstock").unwrap();
    repo.commit_all("Initial commit").unwrap();

    repo.create_update_branch("update-1.20.14").unwrap();
    let output = Command::new("git")
      .current_dir(dir.path())
      .args(["rev-parse", "--abbrev-ref", "HEAD"])
      .output()
      .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "update-1.20.14");
  }

  #[test]
  fn test_missing_series_branch_is_skip_not_error() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    std::fs::write(dir.path().join("README.md"), "feedstock\n").unwrap();
    let repo = FeedstockRepo::open(dir.path(), "conda-forge/go-feedstock").unwrap();
    repo.commit_all("Initial commit").unwrap();

    assert!(!repo.checkout_series_branch("1.19.x").unwrap());
  }
}
