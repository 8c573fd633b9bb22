//! CLI surface tests

use crate::helpers::{run_forge_bump, run_forge_bump_raw};
use anyhow::Result;
use tempfile::TempDir;

#[test]
fn test_help_lists_commands() -> Result<()> {
  let dir = TempDir::new()?;
  let output = run_forge_bump(dir.path(), &["--help"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("update"));
  assert!(stdout.contains("resolve"));
  assert!(stdout.contains("patch"));

  Ok(())
}

#[test]
fn test_update_without_config_is_user_error() -> Result<()> {
  let dir = TempDir::new()?;
  let output = run_forge_bump_raw(dir.path(), &["update", "--dry-run"])?;

  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("No forge-bump configuration found"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_update_rejects_invalid_target_config() -> Result<()> {
  let dir = TempDir::new()?;
  // tag pattern without a capture group is a config error before any unit
  std::fs::write(
    dir.path().join("bump.toml"),
    r#"
[[targets]]
name = "go"
upstream = "golang/go"
tag_pattern = '^go\d+\.\d+\.\d+$'
series = ["1.23"]
feedstocks = ["conda-forge/go-feedstock"]

[targets.checksums]
strategy = "download"

[[targets.checksums.artifacts]]
url = "https://dl.google.com/go/go{version}.src.tar.gz"
"#,
  )?;

  let output = run_forge_bump_raw(dir.path(), &["update", "--dry-run"])?;
  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("capture group"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_unknown_target_filter_is_user_error() -> Result<()> {
  let dir = TempDir::new()?;
  std::fs::write(
    dir.path().join("bump.toml"),
    r#"
[[targets]]
name = "go"
upstream = "golang/go"
tag_pattern = '^go(\d+\.\d+\.\d+)$'
series = ["1.23"]
feedstocks = ["conda-forge/go-feedstock"]

[targets.checksums]
strategy = "download"

[[targets.checksums.artifacts]]
url = "https://dl.google.com/go/go{version}.src.tar.gz"
"#,
  )?;

  let output = run_forge_bump_raw(dir.path(), &["update", "--dry-run", "--target", "rustc"])?;
  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(1));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("not found in configuration"), "stderr: {}", stderr);

  Ok(())
}
