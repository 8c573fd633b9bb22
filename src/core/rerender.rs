//! One-shot invocation of the conda-smithy rerender tool
//!
//! The tool regenerates feedstock CI scaffolding after a recipe change. It
//! is opaque to the engine: a non-zero exit is informative (the PR is still
//! worth pushing) so it degrades to a warning instead of failing the unit.

use crate::core::error::BumpResult;
use crate::core::vcs::FeedstockRepo;
use std::process::Command;

/// Commit message used when the rerender produced tree changes
const RERENDER_COMMIT_MESSAGE: &str = "MNT: Re-rendered with conda-smithy";

/// Observed result of the rerender step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RerenderOutcome {
  /// Tool succeeded, no tree changes
  Clean,
  /// Tool succeeded and its changes were committed
  Committed,
  /// Tool exited non-zero; stderr captured for the report
  Failed { stderr: String },
}

/// Run `conda-smithy rerender` inside the checkout and commit whatever it
/// changed.
pub fn run_rerender(repo: &FeedstockRepo) -> BumpResult<RerenderOutcome> {
  println!("Running conda-smithy rerender...");
  let output = Command::new("conda-smithy")
    .current_dir(repo.path())
    .args(["rerender", "--no-check-uptodate"])
    .output();

  let output = match output {
    Ok(output) => output,
    Err(e) => {
      // Tool not installed counts as a failed (but non-fatal) step
      return Ok(RerenderOutcome::Failed { stderr: e.to_string() });
    }
  };

  if !output.status.success() {
    return Ok(RerenderOutcome::Failed {
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    });
  }

  println!("Rerender completed successfully");
  if repo.has_changes()? {
    println!("Committing rerender changes...");
    repo.commit_all(RERENDER_COMMIT_MESSAGE)?;
    Ok(RerenderOutcome::Committed)
  } else {
    println!("No changes from rerender to commit");
    Ok(RerenderOutcome::Clean)
  }
}
