//! Maintenance-line keys ("1.23", "20") derived from versions by truncation

use semver::Version;
use std::fmt;

/// A tracked maintenance line, identified by the leading numeric components
/// of a version. Ordered numerically, so "1.9" sorts before "1.20".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
  parts: Vec<u64>,
}

impl SeriesKey {
  /// Parse a series string like "1.23" or "20". Returns None unless every
  /// dot-separated component is numeric.
  pub fn parse(s: &str) -> Option<Self> {
    if s.is_empty() {
      return None;
    }
    let parts: Option<Vec<u64>> = s.split('.').map(|p| p.parse().ok()).collect();
    parts.map(|parts| Self { parts })
  }

  /// Derive the key a version belongs to by truncating to `depth` components.
  pub fn of(version: &Version, depth: usize) -> Self {
    let all = [version.major, version.minor, version.patch];
    Self {
      parts: all[..depth.min(all.len())].to_vec(),
    }
  }

  /// Number of components in the key
  pub fn depth(&self) -> usize {
    self.parts.len()
  }
}

impl fmt::Display for SeriesKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let rendered: Vec<String> = self.parts.iter().map(|p| p.to_string()).collect();
    write!(f, "{}", rendered.join("."))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_and_render() {
    let key = SeriesKey::parse("1.23").unwrap();
    assert_eq!(key.depth(), 2);
    assert_eq!(key.to_string(), "1.23");

    let key = SeriesKey::parse("20").unwrap();
    assert_eq!(key.depth(), 1);
    assert_eq!(key.to_string(), "20");
  }

  #[test]
  fn test_parse_rejects_non_numeric() {
    assert!(SeriesKey::parse("1.x").is_none());
    assert!(SeriesKey::parse("").is_none());
    assert!(SeriesKey::parse("v20").is_none());
  }

  #[test]
  fn test_truncation() {
    let version = Version::parse("1.20.14").unwrap();
    assert_eq!(SeriesKey::of(&version, 2), SeriesKey::parse("1.20").unwrap());
    assert_eq!(SeriesKey::of(&version, 1), SeriesKey::parse("1").unwrap());
  }

  #[test]
  fn test_numeric_ordering() {
    let nine = SeriesKey::parse("1.9").unwrap();
    let twenty = SeriesKey::parse("1.20").unwrap();
    assert!(nine < twenty);
  }
}
