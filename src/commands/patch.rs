//! Offline recipe patching for a local feedstock checkout
//!
//! Applies exactly the rewrite the update pipeline would perform, with
//! digests supplied on the command line instead of fetched. Useful for
//! repairing a unit whose checksum fetch failed, and exercised by the
//! integration tests.

use crate::checksum::HashMapping;
use crate::core::error::{BumpError, BumpResult};
use crate::recipe::{PlatformSelector, RecipeDocument, patch_document, patcher};
use semver::Version;
use std::path::PathBuf;

/// Arguments for the patch command
pub struct PatchArgs {
  /// Feedstock checkout containing recipe/recipe.yaml or recipe/meta.yaml
  pub feedstock_dir: PathBuf,
  /// Version to write into the recipe
  pub to: String,
  /// `KEY=HEX` digest pairs; KEY is a platform key or a resolved URL
  pub sha256: Vec<String>,
  /// Package name substituted for `{{ name }}` in recipe URLs
  pub package: Option<String>,
}

/// Run the patch command
pub fn run_patch(args: PatchArgs) -> BumpResult<()> {
  let version = Version::parse(&args.to)?;
  let hashes = parse_hash_args(&args.sha256)?;

  let package = match args.package {
    Some(name) => name,
    None => infer_package_name(&args.feedstock_dir),
  };

  let mut doc = RecipeDocument::discover(&args.feedstock_dir)?;
  println!("Patching {}...", doc.dialect().file_name());

  if let Some(current) = patcher::current_version(&doc) {
    println!("Current version: {}", current);
  }

  let outcome = patch_document(&mut doc, &version, &package, &hashes);
  doc.save()?;

  if outcome.is_noop() {
    println!("Nothing to update.");
  } else {
    println!(
      "Updated recipe ({} version line(s), {} build number(s), {} checksum(s))",
      outcome.version_lines, outcome.build_numbers_reset, outcome.checksums_updated
    );
  }
  for warning in &outcome.warnings {
    println!("Warning: {}", warning);
  }

  Ok(())
}

/// Parse `KEY=HEX` pairs into a mapping, keyed by platform or URL
fn parse_hash_args(pairs: &[String]) -> BumpResult<HashMapping> {
  let mut mapping = HashMapping::new();

  for pair in pairs {
    let Some((key, digest)) = pair.rsplit_once('=') else {
      return Err(BumpError::with_help(
        format!("Invalid --sha256 value '{}'", pair),
        "Expected KEY=HEX, e.g. unix=<64-hex-digest> or a full download URL as KEY.",
      ));
    };
    if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
      return Err(BumpError::message(format!(
        "Digest for '{}' is not a 64-character hex string",
        key
      )));
    }

    if let Some(platform) = PlatformSelector::from_key(key) {
      mapping.insert_platform(platform, digest);
    } else if key.starts_with("http://") || key.starts_with("https://") {
      mapping.insert_url(key, digest);
    } else {
      return Err(BumpError::with_help(
        format!("Unknown --sha256 key '{}'", key),
        "Use unix, win-64, win-arm64, or a full download URL.",
      ));
    }
  }

  Ok(mapping)
}

fn infer_package_name(feedstock_dir: &std::path::Path) -> String {
  feedstock_dir
    .file_name()
    .map(|n| n.to_string_lossy().trim_end_matches("-feedstock").to_string())
    .unwrap_or_default()
}
