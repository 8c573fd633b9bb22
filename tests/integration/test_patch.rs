//! Integration tests for `forge-bump patch`

use crate::helpers::{TestFeedstock, run_forge_bump, run_forge_bump_raw};
use anyhow::Result;

const LEGACY_GO_RECIPE: &str = r#"{% set version = "1.20.13" %}
{% set name = "go" %}

package:
  name: {{ name }}
  version: {{ version }}

source:
  - url: https://dl.google.com/go/go{{ version }}.src.tar.gz
    sha256: 1111111111111111111111111111111111111111111111111111111111111111
    folder: go

build:
  number: 2

outputs:
  - name: go
    build:
      number: 2
"#;

const STRUCTURED_NODE_RECIPE: &str = r#"context:
  version: 20.11.0

package:
  name: nodejs
  version: ${{ version }}

source:
  - if: unix
    then:
      url: https://nodejs.org/dist/v${{ version }}/node-v${{ version }}.tar.gz
      sha256: 1111111111111111111111111111111111111111111111111111111111111111
  - if: target_platform == "win-64"
    then:
      url: https://nodejs.org/dist/v${{ version }}/node-v${{ version }}-win-x64.zip
      sha256: 2222222222222222222222222222222222222222222222222222222222222222

build:
  number: 4
"#;

#[test]
fn test_patch_legacy_recipe() -> Result<()> {
  let feedstock = TestFeedstock::legacy("go-feedstock", LEGACY_GO_RECIPE)?;
  let digest = "a".repeat(64);

  let output = run_forge_bump(
    &feedstock.path,
    &[
      "patch",
      ".",
      "--to",
      "1.20.14",
      "--sha256",
      &format!("https://dl.google.com/go/go1.20.14.src.tar.gz={}", digest),
    ],
  )?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Current version: 1.20.13"), "stdout: {}", stdout);

  let patched = feedstock.read_recipe("meta.yaml")?;
  assert!(patched.contains(r#"{% set version = "1.20.14" %}"#));
  assert!(patched.contains(&format!("sha256: {}", digest)));
  assert_eq!(patched.matches("number: 0").count(), 2);
  // untouched content survives byte-for-byte
  assert!(patched.contains("    folder: go"));
  assert!(patched.contains("  version: {{ version }}"));

  Ok(())
}

#[test]
fn test_patch_structured_recipe_by_platform() -> Result<()> {
  let feedstock = TestFeedstock::structured("nodejs-feedstock", STRUCTURED_NODE_RECIPE)?;
  let unix_digest = "a".repeat(64);
  let win_digest = "b".repeat(64);

  run_forge_bump(
    &feedstock.path,
    &[
      "patch",
      ".",
      "--to",
      "20.11.1",
      "--sha256",
      &format!("unix={}", unix_digest),
      "--sha256",
      &format!("win-64={}", win_digest),
    ],
  )?;

  let patched = feedstock.read_recipe("recipe.yaml")?;
  assert!(patched.contains("  version: 20.11.1"));
  assert!(patched.contains(&unix_digest));
  assert!(patched.contains(&win_digest));
  assert!(patched.contains("number: 0"));
  assert!(patched.contains("version: ${{ version }}"));

  Ok(())
}

#[test]
fn test_patch_without_digests_leaves_checksums_and_warns() -> Result<()> {
  let feedstock = TestFeedstock::legacy("go-feedstock", LEGACY_GO_RECIPE)?;

  let output = run_forge_bump(&feedstock.path, &["patch", ".", "--to", "1.20.14"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Warning:"), "stdout: {}", stdout);

  let patched = feedstock.read_recipe("meta.yaml")?;
  // version and build numbers updated, stale checksum untouched
  assert!(patched.contains("1.20.14"));
  assert!(patched.contains(&"1".repeat(64)));
  assert_eq!(patched.matches("number: 0").count(), 2);

  Ok(())
}

#[test]
fn test_patch_missing_recipe_exits_with_recipe_code() -> Result<()> {
  let feedstock = TestFeedstock::bare()?;

  let output = run_forge_bump_raw(&feedstock.path, &["patch", ".", "--to", "1.20.14"])?;
  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("No recognizable recipe"), "stderr: {}", stderr);

  Ok(())
}

#[test]
fn test_patch_rejects_malformed_digest() -> Result<()> {
  let feedstock = TestFeedstock::legacy("go-feedstock", LEGACY_GO_RECIPE)?;

  let output = run_forge_bump_raw(&feedstock.path, &["patch", ".", "--to", "1.20.14", "--sha256", "unix=short"])?;
  assert!(!output.status.success());
  assert_eq!(output.status.code(), Some(1));

  // the recipe was not touched
  let recipe = feedstock.read_recipe("meta.yaml")?;
  assert_eq!(recipe, LEGACY_GO_RECIPE);

  Ok(())
}
