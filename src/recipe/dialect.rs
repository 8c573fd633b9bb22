//! Per-dialect line patterns and selector vocabulary
//!
//! Both dialects share one driver loop (see `patcher`); this module owns
//! everything dialect-specific: which lines declare the version, the build
//! number, a platform scope, or a checksum, and how to rewrite each one
//! without touching the rest of the line.

use crate::recipe::document::RecipeDialect;
use crate::recipe::platform::PlatformSelector;
use regex::Regex;
use semver::Version;

/// Scoped state carried through a recipe scan.
///
/// Lives in the scan's accumulator, never in module storage: the patcher
/// stays unit-testable against synthetic line lists.
#[derive(Debug, Clone)]
pub struct ScanState {
  pub platform: PlatformSelector,
}

impl Default for ScanState {
  fn default() -> Self {
    Self {
      platform: PlatformSelector::Unconditional,
    }
  }
}

/// What a single recipe line means to the patcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
  /// Version-declaration line (macro assignment or context field)
  Version,
  /// `number:` line under a build section
  BuildNumber,
  /// Line that changes the platform scope for subsequent lines
  Selector(PlatformSelector),
  /// 64-hex `sha256:` line
  Checksum,
  /// Anything else: copied through unchanged
  Other,
}

/// Compiled pattern set for one recipe dialect
pub struct DialectRules {
  dialect: RecipeDialect,
  version_line: Regex,
  version_value: Regex,
  build_number: Regex,
  checksum: Regex,
  /// Structured only: `if:` block headers
  conditional: Option<Regex>,
  /// Legacy only: `url:` lines searched during checksum association
  url_line: Regex,
  /// Legacy only: trailing `# [selector]` comments
  selector_comment: Regex,
  /// Legacy only: `{{ var }}` placeholders in URLs
  placeholder: Regex,
}

impl DialectRules {
  pub fn new(dialect: RecipeDialect) -> Self {
    match dialect {
      RecipeDialect::LegacyMacro => Self {
        dialect,
        version_line: Regex::new(r"^\s*\{%\s*set\s+version\s*=").unwrap(),
        version_value: Regex::new(r#"(\{%\s*set\s+version\s*=\s*["'])([^"']+)(["'])"#).unwrap(),
        build_number: Regex::new(r"^(\s+number:\s*)(\d+)").unwrap(),
        checksum: Regex::new(r"^(\s+sha256:\s*)([a-fA-F0-9]{64})").unwrap(),
        conditional: None,
        url_line: Regex::new(r"^\s*-?\s*url:\s*(.+)$").unwrap(),
        selector_comment: Regex::new(r"#\s*\[([^\]]+)\]\s*$").unwrap(),
        placeholder: Regex::new(r"\{\{\s*(\w+)\s*\}\}").unwrap(),
      },
      RecipeDialect::StructuredContext => Self {
        dialect,
        version_line: Regex::new(r#"^\s*version:\s*["']?\d[\d.]*["']?\s*$"#).unwrap(),
        version_value: Regex::new(r#"^(\s*version:\s*["']?)(\d[\d.]*)"#).unwrap(),
        build_number: Regex::new(r"^(\s+number:\s*)(\d+)").unwrap(),
        checksum: Regex::new(r"^(\s+sha256:\s*)([a-fA-F0-9]{64})").unwrap(),
        conditional: Some(Regex::new(r"\bif:\s*(.+?)\s*$").unwrap()),
        url_line: Regex::new(r"^\s*-?\s*url:\s*(.+)$").unwrap(),
        selector_comment: Regex::new(r"#\s*\[([^\]]+)\]\s*$").unwrap(),
        placeholder: Regex::new(r"\{\{\s*(\w+)\s*\}\}").unwrap(),
      },
    }
  }

  /// Classify a line into exactly one patching category
  pub fn classify(&self, line: &str) -> LineClass {
    if self.version_line.is_match(line) {
      return LineClass::Version;
    }
    if self.build_number.is_match(line) {
      return LineClass::BuildNumber;
    }
    if let Some(conditional) = &self.conditional {
      if let Some(caps) = conditional.captures(line) {
        return LineClass::Selector(platform_of_conditional(&caps[1]));
      }
    }
    if self.checksum.is_match(line) {
      return LineClass::Checksum;
    }
    // A structured top-level key closes any open conditional block.
    if self.dialect == RecipeDialect::StructuredContext {
      let trimmed = line.trim_end();
      if !trimmed.is_empty() && !line.starts_with([' ', '\t']) && !trimmed.starts_with('#') {
        return LineClass::Selector(PlatformSelector::Unconditional);
      }
    }
    LineClass::Other
  }

  /// Replace the embedded version token, leaving the rest of the line alone
  pub fn rewrite_version(&self, line: &str, version: &Version) -> String {
    match self.dialect {
      RecipeDialect::LegacyMacro => self
        .version_value
        .replace(line, |caps: &regex::Captures| {
          format!("{}{}{}", &caps[1], version, &caps[3])
        })
        .into_owned(),
      RecipeDialect::StructuredContext => self
        .version_value
        .replace(line, |caps: &regex::Captures| format!("{}{}", &caps[1], version))
        .into_owned(),
    }
  }

  /// Reset the embedded build number to 0
  pub fn rewrite_build_number(&self, line: &str) -> String {
    self
      .build_number
      .replace(line, |caps: &regex::Captures| format!("{}0", &caps[1]))
      .into_owned()
  }

  /// Replace the embedded digest, keeping indentation and trailing comments
  pub fn rewrite_checksum(&self, line: &str, digest: &str) -> String {
    self
      .checksum
      .replace(line, |caps: &regex::Captures| format!("{}{}", &caps[1], digest))
      .into_owned()
  }

  /// Extract the version string a version-declaration line carries
  pub fn extract_version(&self, line: &str) -> Option<String> {
    self.version_value.captures(line).map(|caps| caps[2].to_string())
  }

  /// Trailing `# [selector]` comment, if the token is a recognized platform
  pub fn inline_selector(&self, line: &str) -> Option<PlatformSelector> {
    let caps = self.selector_comment.captures(line)?;
    platform_of_selector_token(&caps[1])
  }

  /// URL carried by a `url:` line, trailing selector comment stripped
  pub fn url_of(&self, line: &str) -> Option<String> {
    let caps = self.url_line.captures(line)?;
    let mut rest = caps.get(1)?.as_str();
    if let Some(idx) = rest.find('#') {
      rest = &rest[..idx];
    }
    let url = rest.trim();
    if url.is_empty() { None } else { Some(url.to_string()) }
  }

  /// Substitute `{{ version }}` / `{{ name }}` placeholders in a URL.
  /// Unknown placeholders are left in place (they will simply not match
  /// any fetched artifact).
  pub fn expand_url(&self, url: &str, version: &Version, package: &str) -> String {
    self
      .placeholder
      .replace_all(url, |caps: &regex::Captures| match &caps[1] {
        "version" => version.to_string(),
        "name" => package.to_string(),
        _ => caps[0].to_string(),
      })
      .into_owned()
  }
}

fn platform_of_conditional(expr: &str) -> PlatformSelector {
  if expr.contains("win-arm64") {
    PlatformSelector::WinArm64
  } else if expr.contains("win-64") {
    PlatformSelector::WinX64
  } else if expr.contains("unix") {
    PlatformSelector::Unix
  } else {
    // Unknown conditional (osx, build_platform, ...): scope cannot be
    // attributed to a fetched artifact.
    PlatformSelector::Unconditional
  }
}

fn platform_of_selector_token(token: &str) -> Option<PlatformSelector> {
  let normalized = token.split_whitespace().collect::<Vec<_>>().join(" ");
  match normalized.as_str() {
    "unix" => Some(PlatformSelector::Unix),
    "win64" => Some(PlatformSelector::WinX64),
    "win and arm64" => Some(PlatformSelector::WinArm64),
    _ => None,
  }
}
