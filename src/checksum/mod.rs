//! Release artifact checksums
//!
//! Two interchangeable strategies produce the same result shape:
//!
//! - **download**: stream each artifact and hash it locally (used when the
//!   upstream publishes no digest manifest, e.g. Go)
//! - **manifest**: fetch the upstream-published digest manifest once and
//!   project it onto the artifacts we care about (e.g. Node.js
//!   SHASUMS256.txt)
//!
//! Results are partial by design: one unreachable artifact is reported and
//! does not invalidate the digests of the others.

pub mod download;
pub mod manifest;

use crate::recipe::PlatformSelector;
use semver::Version;
use std::collections::HashMap;

pub use download::DownloadHasher;
pub use manifest::ManifestHasher;

/// Supplies digests for the distribution artifacts of one release
pub trait HashProvider {
  /// Fetch digests for `version`. Individual artifact failures land in
  /// `HashMapping::failures`; the mapping is never an all-or-nothing result.
  fn fetch(&self, version: &Version) -> HashMapping;
}

/// Digests for one release, keyed by resolved URL and by platform
#[derive(Debug, Clone, Default)]
pub struct HashMapping {
  urls: HashMap<String, String>,
  platforms: HashMap<PlatformSelector, String>,
  /// Per-artifact fetch failures, reported but not fatal
  pub failures: Vec<String>,
}

impl HashMapping {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_url(&mut self, url: impl Into<String>, digest: impl Into<String>) {
    self.urls.insert(url.into(), digest.into());
  }

  pub fn insert_platform(&mut self, platform: PlatformSelector, digest: impl Into<String>) {
    self.platforms.insert(platform, digest.into());
  }

  /// Digest for a resolved download URL
  pub fn for_url(&self, url: &str) -> Option<&str> {
    self.urls.get(url).map(String::as_str)
  }

  /// Digest for a platform-keyed artifact
  pub fn for_platform(&self, platform: PlatformSelector) -> Option<&str> {
    self.platforms.get(&platform).map(String::as_str)
  }

  /// True when no digest was obtained at all
  pub fn is_empty(&self) -> bool {
    self.urls.is_empty() && self.platforms.is_empty()
  }
}

/// Substitute `{version}` in a config URL or filename template
pub fn fill_template(template: &str, version: &Version) -> String {
  template.replace("{version}", &version.to_string())
}
