//! Applies a new release to a recipe document
//!
//! One forward scan, one piece of scoped state (the platform currently in
//! effect), dialect differences delegated to `DialectRules`. Checksum lines
//! that cannot be associated with a fetched digest are left byte-identical
//! and reported: a stale checksum is recoverable, a wrong one is not.

use crate::checksum::HashMapping;
use crate::recipe::dialect::{DialectRules, LineClass, ScanState};
use crate::recipe::document::{RecipeDialect, RecipeDocument};
use semver::Version;

/// Bounded lookback when associating a legacy checksum with its `url:` line
const URL_LOOKBACK_LINES: usize = 10;

/// Counters and warnings from one patch pass
#[derive(Debug, Clone, Default)]
pub struct PatchOutcome {
  pub version_lines: usize,
  pub build_numbers_reset: usize,
  pub checksums_updated: usize,
  pub warnings: Vec<String>,
}

impl PatchOutcome {
  /// True when the pass changed nothing at all
  pub fn is_noop(&self) -> bool {
    self.version_lines == 0 && self.build_numbers_reset == 0 && self.checksums_updated == 0
  }
}

/// Read the version currently declared by a recipe, if any
pub fn current_version(doc: &RecipeDocument) -> Option<Version> {
  let rules = DialectRules::new(doc.dialect());
  for i in 0..doc.len() {
    let line = doc.line(i);
    if rules.classify(line) == LineClass::Version {
      return rules.extract_version(line).and_then(|raw| Version::parse(&raw).ok());
    }
  }
  None
}

/// Rewrite `doc` in place for `version`: version declaration updated, every
/// build number reset to 0, checksums re-associated from `hashes`. All
/// other lines stay byte-identical.
pub fn patch_document(doc: &mut RecipeDocument, version: &Version, package: &str, hashes: &HashMapping) -> PatchOutcome {
  let rules = DialectRules::new(doc.dialect());
  let mut scan = ScanState::default();
  let mut outcome = PatchOutcome::default();

  for i in 0..doc.len() {
    let line = doc.line(i).to_string();

    match rules.classify(&line) {
      LineClass::Version => {
        doc.replace_line(i, rules.rewrite_version(&line, version));
        outcome.version_lines += 1;
      }
      LineClass::BuildNumber => {
        doc.replace_line(i, rules.rewrite_build_number(&line));
        outcome.build_numbers_reset += 1;
      }
      LineClass::Selector(platform) => {
        scan.platform = platform;
      }
      LineClass::Checksum => {
        let digest = match doc.dialect() {
          RecipeDialect::StructuredContext => resolve_structured(&scan, i, hashes, &mut outcome.warnings),
          RecipeDialect::LegacyMacro => resolve_legacy(doc, i, &rules, version, package, hashes, &mut outcome.warnings),
        };
        if let Some(digest) = digest {
          doc.replace_line(i, rules.rewrite_checksum(&line, &digest));
          outcome.checksums_updated += 1;
        }
      }
      LineClass::Other => {}
    }
  }

  if outcome.version_lines == 0 {
    outcome
      .warnings
      .push("no version declaration found; version left unchanged".to_string());
  }

  outcome
}

/// Structured dialect: the applicable artifact is the platform scope the
/// scan is currently inside.
fn resolve_structured(scan: &ScanState, i: usize, hashes: &HashMapping, warnings: &mut Vec<String>) -> Option<String> {
  match hashes.for_platform(scan.platform) {
    Some(digest) => Some(digest.to_string()),
    None => {
      warnings.push(format!(
        "line {}: no digest fetched for platform '{}'; checksum left unchanged",
        i + 1,
        scan.platform
      ));
      None
    }
  }
}

/// Legacy dialect: an explicit key (trailing selector comment) wins; the
/// bounded upward scan for the owning `url:` line is the fallback and can
/// misassociate across unrelated adjacent sections.
fn resolve_legacy(
  doc: &RecipeDocument,
  i: usize,
  rules: &DialectRules,
  version: &Version,
  package: &str,
  hashes: &HashMapping,
  warnings: &mut Vec<String>,
) -> Option<String> {
  if let Some(platform) = rules.inline_selector(doc.line(i)) {
    match hashes.for_platform(platform) {
      Some(digest) => return Some(digest.to_string()),
      None => {
        warnings.push(format!(
          "line {}: no digest fetched for selector '{}'; checksum left unchanged",
          i + 1,
          platform
        ));
        return None;
      }
    }
  }

  let window_start = i.saturating_sub(URL_LOOKBACK_LINES);
  for j in (window_start..i).rev() {
    let candidate = doc.line(j);
    let Some(url) = rules.url_of(candidate) else {
      continue;
    };

    // The nearest url: line owns this checksum. Its selector comment is a
    // better key than the URL itself.
    if let Some(platform) = rules.inline_selector(candidate) {
      if let Some(digest) = hashes.for_platform(platform) {
        return Some(digest.to_string());
      }
    }

    let resolved = rules.expand_url(&url, version, package);
    match hashes.for_url(&resolved) {
      Some(digest) => return Some(digest.to_string()),
      None => {
        warnings.push(format!(
          "line {}: no digest fetched for {}; checksum left unchanged",
          i + 1,
          resolved
        ));
        return None;
      }
    }
  }

  warnings.push(format!(
    "line {}: no url within {} preceding lines; checksum left unchanged",
    i + 1,
    URL_LOOKBACK_LINES
  ));
  None
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::recipe::PlatformSelector;

  fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
  }

  fn digest(fill: char) -> String {
    fill.to_string().repeat(64)
  }

  const LEGACY_RECIPE: &str = r#"{% set version = "1.20.13" %}
{% set name = "go" %}

package:
  name: {{ name }}
  version: {{ version }}

source:
  - url: https://dl.google.com/go/go{{ version }}.src.tar.gz
    sha256: 0000000000000000000000000000000000000000000000000000000000000000
    folder: go

build:
  number: 2

outputs:
  - name: go
    build:
      number: 2

about:
  home: https://go.dev
"#;

  #[test]
  fn test_legacy_end_to_end() {
    let mut doc = RecipeDocument::from_str(LEGACY_RECIPE, RecipeDialect::LegacyMacro);
    let mut hashes = HashMapping::new();
    hashes.insert_url("https://dl.google.com/go/go1.20.14.src.tar.gz", digest('a'));

    let outcome = patch_document(&mut doc, &v("1.20.14"), "go", &hashes);

    assert_eq!(outcome.version_lines, 1);
    assert_eq!(outcome.build_numbers_reset, 2);
    assert_eq!(outcome.checksums_updated, 1);
    assert!(outcome.warnings.is_empty());

    let patched = doc.serialize();
    assert!(patched.contains(r#"{% set version = "1.20.14" %}"#));
    assert!(patched.contains(&format!("sha256: {}", digest('a'))));
    assert!(!patched.contains("number: 2"));
    assert_eq!(patched.matches("number: 0").count(), 2);
  }

  #[test]
  fn test_patch_locality() {
    let mut doc = RecipeDocument::from_str(LEGACY_RECIPE, RecipeDialect::LegacyMacro);
    let before: Vec<String> = (0..doc.len()).map(|i| doc.line(i).to_string()).collect();

    let mut hashes = HashMapping::new();
    hashes.insert_url("https://dl.google.com/go/go1.20.14.src.tar.gz", digest('a'));
    patch_document(&mut doc, &v("1.20.14"), "go", &hashes);

    let rules = DialectRules::new(RecipeDialect::LegacyMacro);
    for (i, original) in before.iter().enumerate() {
      match rules.classify(original) {
        LineClass::Version | LineClass::BuildNumber | LineClass::Checksum => {}
        _ => assert_eq!(doc.line(i), original, "line {} must be byte-identical", i + 1),
      }
    }
  }

  #[test]
  fn test_legacy_without_digest_leaves_checksum_and_warns() {
    let mut doc = RecipeDocument::from_str(LEGACY_RECIPE, RecipeDialect::LegacyMacro);
    let hashes = HashMapping::new();

    let outcome = patch_document(&mut doc, &v("1.20.14"), "go", &hashes);

    assert_eq!(outcome.checksums_updated, 0);
    assert_eq!(outcome.warnings.len(), 1);
    assert!(doc.serialize().contains(&digest('0')));
    // the rest of the patch still applied
    assert!(doc.serialize().contains("1.20.14"));
    assert_eq!(outcome.build_numbers_reset, 2);
  }

  #[test]
  fn test_legacy_inline_selector_preferred_over_url() {
    let recipe = format!(
      r#"source:
  url: https://example.com/tool-{{{{ version }}}}-win.zip
  sha256: {}  # [win64]
"#,
      digest('0')
    );
    let mut doc = RecipeDocument::from_str(&recipe, RecipeDialect::LegacyMacro);

    let mut hashes = HashMapping::new();
    // Both keys present: the explicit selector must win
    hashes.insert_url("https://example.com/tool-2.0.0-win.zip", digest('a'));
    hashes.insert_platform(PlatformSelector::WinX64, digest('b'));

    patch_document(&mut doc, &v("2.0.0"), "tool", &hashes);
    assert!(doc.serialize().contains(&format!("sha256: {}  # [win64]", digest('b'))));
  }

  #[test]
  fn test_legacy_url_selector_comment_is_the_key() {
    let recipe = format!(
      r#"source:
  - url: https://example.com/tool.zip  # [unix]
    sha256: {}
"#,
      digest('0')
    );
    let mut doc = RecipeDocument::from_str(&recipe, RecipeDialect::LegacyMacro);

    let mut hashes = HashMapping::new();
    hashes.insert_platform(PlatformSelector::Unix, digest('c'));

    let outcome = patch_document(&mut doc, &v("2.0.0"), "tool", &hashes);
    assert_eq!(outcome.checksums_updated, 1);
    assert!(doc.serialize().contains(&format!("sha256: {}", digest('c'))));
  }

  #[test]
  fn test_legacy_url_outside_window_warns() {
    let padding = "  # spacer\n".repeat(URL_LOOKBACK_LINES + 1);
    let recipe = format!(
      "  url: https://example.com/tool-{{{{ version }}}}.tar.gz\n{}  sha256: {}\n",
      padding,
      digest('0')
    );
    let mut doc = RecipeDocument::from_str(&recipe, RecipeDialect::LegacyMacro);

    let mut hashes = HashMapping::new();
    hashes.insert_url("https://example.com/tool-2.0.0.tar.gz", digest('a'));

    let outcome = patch_document(&mut doc, &v("2.0.0"), "tool", &hashes);
    assert_eq!(outcome.checksums_updated, 0);
    assert!(outcome.warnings.iter().any(|w| w.contains("no url within")));
    assert!(doc.serialize().contains(&digest('0')));
  }

  const STRUCTURED_RECIPE: &str = r#"context:
  version: 20.11.0

package:
  name: nodejs
  version: ${{ version }}

source:
  - if: unix
    then:
      url: https://nodejs.org/dist/v${{ version }}/node-v${{ version }}.tar.gz
      sha256: 0000000000000000000000000000000000000000000000000000000000000000
  - if: target_platform == "win-64"
    then:
      url: https://nodejs.org/dist/v${{ version }}/node-v${{ version }}-win-x64.zip
      sha256: 1111111111111111111111111111111111111111111111111111111111111111
  - if: target_platform == "win-arm64"
    then:
      url: https://nodejs.org/dist/v${{ version }}/node-v${{ version }}-win-arm64.zip
      sha256: 2222222222222222222222222222222222222222222222222222222222222222

build:
  number: 4
"#;

  #[test]
  fn test_structured_end_to_end() {
    let mut doc = RecipeDocument::from_str(STRUCTURED_RECIPE, RecipeDialect::StructuredContext);
    let mut hashes = HashMapping::new();
    hashes.insert_platform(PlatformSelector::Unix, digest('a'));
    hashes.insert_platform(PlatformSelector::WinX64, digest('b'));
    hashes.insert_platform(PlatformSelector::WinArm64, digest('c'));

    let outcome = patch_document(&mut doc, &v("20.11.1"), "nodejs", &hashes);

    assert_eq!(outcome.version_lines, 1);
    assert_eq!(outcome.build_numbers_reset, 1);
    assert_eq!(outcome.checksums_updated, 3);
    assert!(outcome.warnings.is_empty());

    let patched = doc.serialize();
    assert!(patched.contains("  version: 20.11.1"));
    assert!(patched.contains(&digest('a')));
    assert!(patched.contains(&digest('b')));
    assert!(patched.contains(&digest('c')));
    assert!(patched.contains("number: 0"));
    // the templated package version is not a version declaration
    assert!(patched.contains("version: ${{ version }}"));
  }

  #[test]
  fn test_structured_partial_mapping_degrades_per_platform() {
    let mut doc = RecipeDocument::from_str(STRUCTURED_RECIPE, RecipeDialect::StructuredContext);
    let mut hashes = HashMapping::new();
    hashes.insert_platform(PlatformSelector::Unix, digest('a'));

    let outcome = patch_document(&mut doc, &v("20.11.1"), "nodejs", &hashes);

    assert_eq!(outcome.checksums_updated, 1);
    assert_eq!(outcome.warnings.len(), 2);
    let patched = doc.serialize();
    assert!(patched.contains(&digest('a')));
    assert!(patched.contains(&digest('1')));
    assert!(patched.contains(&digest('2')));
  }

  #[test]
  fn test_structured_scope_ends_at_top_level() {
    let recipe = format!(
      r#"source:
  - if: unix
    then:
      sha256: {}

tests:
  - script: node --version
    sha256: {}
"#,
      digest('0'),
      digest('1')
    );
    let mut doc = RecipeDocument::from_str(&recipe, RecipeDialect::StructuredContext);
    let mut hashes = HashMapping::new();
    hashes.insert_platform(PlatformSelector::Unix, digest('a'));

    let outcome = patch_document(&mut doc, &v("20.11.1"), "nodejs", &hashes);

    // only the checksum inside the unix block is attributed to unix
    assert_eq!(outcome.checksums_updated, 1);
    let patched = doc.serialize();
    assert!(patched.contains(&digest('a')));
    assert!(patched.contains(&digest('1')));
  }

  #[test]
  fn test_build_numbers_reset_everywhere() {
    let recipe = "build:\n  number: 7\noutputs:\n  - build:\n      number: 12\n";
    let mut doc = RecipeDocument::from_str(recipe, RecipeDialect::StructuredContext);

    let outcome = patch_document(&mut doc, &v("1.0.0"), "tool", &HashMapping::new());
    assert_eq!(outcome.build_numbers_reset, 2);
    assert_eq!(doc.serialize().matches("number: 0").count(), 2);
  }

  #[test]
  fn test_missing_version_line_is_reported_not_fatal() {
    let recipe = "build:\n  number: 1\n";
    let mut doc = RecipeDocument::from_str(recipe, RecipeDialect::StructuredContext);

    let outcome = patch_document(&mut doc, &v("1.0.0"), "tool", &HashMapping::new());
    assert_eq!(outcome.version_lines, 0);
    assert_eq!(outcome.build_numbers_reset, 1);
    assert!(outcome.warnings.iter().any(|w| w.contains("no version declaration")));
  }

  #[test]
  fn test_current_version_both_dialects() {
    let legacy = RecipeDocument::from_str(LEGACY_RECIPE, RecipeDialect::LegacyMacro);
    assert_eq!(current_version(&legacy), Some(v("1.20.13")));

    let structured = RecipeDocument::from_str(STRUCTURED_RECIPE, RecipeDialect::StructuredContext);
    assert_eq!(current_version(&structured), Some(v("20.11.0")));

    let none = RecipeDocument::from_str("build:\n  number: 1\n", RecipeDialect::StructuredContext);
    assert_eq!(current_version(&none), None);
  }
}
