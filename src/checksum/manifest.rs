//! Published-manifest strategy
//!
//! Fetches the upstream digest manifest once per release and projects it
//! onto the configured artifact filenames. Manifest format is one
//! `<64-hex-digest> <whitespace> <filename>` pair per line.

use crate::checksum::{HashMapping, HashProvider, fill_template};
use crate::core::config::ArtifactConfig;
use crate::core::error::{BumpError, BumpResult, FetchError, ResultExt};
use regex::Regex;
use semver::Version;
use std::collections::HashMap;

/// Computes artifact digests from an upstream-published checksum manifest
pub struct ManifestHasher {
  client: reqwest::blocking::Client,
  manifest_url: String,
  artifacts: Vec<ArtifactConfig>,
}

impl ManifestHasher {
  pub fn new(manifest_url: impl Into<String>, artifacts: &[ArtifactConfig]) -> BumpResult<Self> {
    let client = reqwest::blocking::Client::builder()
      .user_agent("forge-bump")
      .build()
      .context("Failed to build HTTP client")?;
    Ok(Self {
      client,
      manifest_url: manifest_url.into(),
      artifacts: artifacts.to_vec(),
    })
  }

  fn fetch_manifest(&self, url: &str) -> BumpResult<String> {
    let response = self
      .client
      .get(url)
      .send()
      .with_context(|| format!("Failed to fetch manifest {}", url))?;

    let status = response.status();
    if !status.is_success() {
      return Err(BumpError::Fetch(FetchError::Status {
        url: url.to_string(),
        status: status.as_u16(),
      }));
    }

    response.text().with_context(|| format!("Failed to read manifest {}", url))
  }
}

impl HashProvider for ManifestHasher {
  fn fetch(&self, version: &Version) -> HashMapping {
    let mut mapping = HashMapping::new();
    let url = fill_template(&self.manifest_url, version);
    println!("  Fetching {}...", url);

    let manifest = match self.fetch_manifest(&url) {
      Ok(text) => parse_manifest(&text),
      Err(e) => {
        // The manifest is the single source here: every artifact failed.
        mapping.failures.push(format!("{}: {}", url, e));
        return mapping;
      }
    };

    for artifact in &self.artifacts {
      // Validated at config load: manifest strategy requires a filename
      let Some(template) = &artifact.filename else {
        continue;
      };
      let filename = fill_template(template, version);

      match manifest.get(&filename) {
        Some(digest) => {
          if let Some(platform) = artifact.platform {
            println!("  SHA256 ({}): {}", platform, digest);
            mapping.insert_platform(platform, digest.clone());
          }
          if let Some(url_template) = &artifact.url {
            mapping.insert_url(fill_template(url_template, version), digest.clone());
          }
        }
        None => {
          mapping.failures.push(format!("{}: not listed in {}", filename, url));
        }
      }
    }

    mapping
  }
}

/// Parse `<digest> <filename>` pairs, skipping malformed lines
pub fn parse_manifest(text: &str) -> HashMap<String, String> {
  let digest_re = Regex::new(r"^[a-fA-F0-9]{64}$").unwrap();
  let mut entries = HashMap::new();

  for line in text.lines() {
    let mut parts = line.split_whitespace();
    let (Some(digest), Some(filename)) = (parts.next(), parts.next()) else {
      continue;
    };
    if !digest_re.is_match(digest) {
      continue;
    }
    entries.insert(filename.to_string(), digest.to_string());
  }

  entries
}
