//! Platform selectors shared by recipes, config, and checksum mappings

use serde::{Deserialize, Serialize};
use std::fmt;

/// The platform a recipe line (or distribution artifact) applies to.
///
/// This is scoped state during a recipe scan, not a per-line attribute:
/// a selector-declaring line applies to everything after it until it is
/// superseded or its block ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformSelector {
  /// No platform conditional in effect
  #[serde(rename = "unconditional")]
  Unconditional,
  /// Unix (linux/osx) builds
  #[serde(rename = "unix")]
  Unix,
  /// Windows x86-64
  #[serde(rename = "win-64")]
  WinX64,
  /// Windows ARM64
  #[serde(rename = "win-arm64")]
  WinArm64,
}

impl PlatformSelector {
  /// Parse a config/CLI key ("unix", "win-64", "win-arm64")
  pub fn from_key(key: &str) -> Option<Self> {
    match key {
      "unconditional" => Some(PlatformSelector::Unconditional),
      "unix" => Some(PlatformSelector::Unix),
      "win-64" => Some(PlatformSelector::WinX64),
      "win-arm64" => Some(PlatformSelector::WinArm64),
      _ => None,
    }
  }

  /// Canonical key used in config files and CLI arguments
  pub fn key(&self) -> &'static str {
    match self {
      PlatformSelector::Unconditional => "unconditional",
      PlatformSelector::Unix => "unix",
      PlatformSelector::WinX64 => "win-64",
      PlatformSelector::WinArm64 => "win-arm64",
    }
  }
}

impl fmt::Display for PlatformSelector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.key())
  }
}
