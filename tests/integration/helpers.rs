//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A feedstock checkout fixture in a temp directory
pub struct TestFeedstock {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestFeedstock {
  /// Create an empty feedstock directory (no recipe at all)
  pub fn bare() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("go-feedstock");
    std::fs::create_dir_all(path.join("recipe"))?;
    Ok(Self { _root: root, path })
  }

  /// Create a feedstock carrying a legacy meta.yaml
  pub fn legacy(name: &str, recipe: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join(name);
    std::fs::create_dir_all(path.join("recipe"))?;
    std::fs::write(path.join("recipe/meta.yaml"), recipe)?;
    Ok(Self { _root: root, path })
  }

  /// Create a feedstock carrying a structured recipe.yaml
  pub fn structured(name: &str, recipe: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join(name);
    std::fs::create_dir_all(path.join("recipe"))?;
    std::fs::write(path.join("recipe/recipe.yaml"), recipe)?;
    Ok(Self { _root: root, path })
  }

  /// Read the recipe file back
  pub fn read_recipe(&self, file: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join("recipe").join(file))?)
  }
}

/// Run the forge-bump binary, failing the test on non-zero exit
pub fn run_forge_bump(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_forge_bump_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "forge-bump command failed: forge-bump {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Run the forge-bump binary and hand back whatever happened
pub fn run_forge_bump_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_forge-bump");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run forge-bump")
}
