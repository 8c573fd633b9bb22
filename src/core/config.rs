use crate::core::error::{BumpError, BumpResult, ConfigError, ResultExt};
use crate::recipe::PlatformSelector;
use crate::version::SeriesKey;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for forge-bump
/// Searched in order: bump.toml, .bump.toml, .config/bump.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BumpConfig {
  #[serde(default)]
  pub run: RunConfig,
  #[serde(default)]
  pub targets: Vec<TargetConfig>,
}

/// Process-wide run settings, read-only after start-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
  /// Directory feedstock clones are materialized under (default: current directory)
  #[serde(default = "default_work_dir")]
  pub work_dir: PathBuf,
}

fn default_work_dir() -> PathBuf {
  PathBuf::from(".")
}

impl Default for RunConfig {
  fn default() -> Self {
    Self {
      work_dir: default_work_dir(),
    }
  }
}

/// One tracked upstream (a toolchain or runtime) and the feedstocks it feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
  /// Short toolchain name, also substituted for `{{ name }}` in recipe URLs
  pub name: String,

  /// Upstream repository slug the tags come from (e.g. "golang/go")
  pub upstream: String,

  /// Tag pattern with exactly one capture group around the dotted version
  pub tag_pattern: String,

  /// Tracked minor series, all at the same truncation depth (e.g. ["1.23"] or ["20", "22"])
  pub series: Vec<String>,

  /// Feedstock repository slugs updated for this upstream, in processing order
  pub feedstocks: Vec<String>,

  /// Label created pull requests for automatic merging
  #[serde(default)]
  pub automerge: bool,

  pub checksums: ChecksumConfig,
}

/// How release checksums are obtained for a target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksumConfig {
  pub strategy: HashStrategy,

  /// Manifest URL template, `{version}` substituted (manifest strategy only)
  #[serde(default)]
  pub manifest_url: Option<String>,

  #[serde(default)]
  pub artifacts: Vec<ArtifactConfig>,
}

/// Checksum acquisition strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashStrategy {
  /// Stream each artifact and hash it locally
  Download,
  /// Fetch the upstream-published digest manifest and project it
  Manifest,
}

/// One downloadable distribution artifact for a release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
  /// Platform the artifact belongs to, when the recipe keys checksums by selector
  #[serde(default)]
  pub platform: Option<PlatformSelector>,

  /// Download URL template, `{version}` substituted (required for download strategy)
  #[serde(default)]
  pub url: Option<String>,

  /// Filename as it appears in the published manifest (required for manifest strategy)
  #[serde(default)]
  pub filename: Option<String>,
}

impl BumpConfig {
  /// Find the config file, checking standard locations
  fn find_config_path(root: &Path) -> Option<PathBuf> {
    let candidates = [
      root.join("bump.toml"),
      root.join(".bump.toml"),
      root.join(".config").join("bump.toml"),
    ];
    candidates.into_iter().find(|p| p.is_file())
  }

  /// Load config from the standard locations under `root`
  pub fn load(root: &Path) -> BumpResult<Self> {
    let config_path = Self::find_config_path(root).ok_or_else(|| {
      BumpError::Config(ConfigError::NotFound {
        search_root: root.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: BumpConfig = toml_edit::de::from_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    for target in &config.targets {
      target.validate()?;
    }

    Ok(config)
  }

  /// Parse config from a string
  #[allow(dead_code)] // Kept as convenience API; exercised by unit tests
  pub fn from_toml(content: &str) -> BumpResult<Self> {
    let config: BumpConfig = toml_edit::de::from_str(content)?;
    for target in &config.targets {
      target.validate()?;
    }
    Ok(config)
  }

  /// Find a target by name
  pub fn find_target(&self, name: &str) -> BumpResult<&TargetConfig> {
    self
      .targets
      .iter()
      .find(|t| t.name == name)
      .ok_or_else(|| BumpError::Config(ConfigError::TargetNotFound { name: name.to_string() }))
  }
}

impl TargetConfig {
  /// Validate the target configuration
  pub fn validate(&self) -> BumpResult<()> {
    if self.name.is_empty() {
      return Err(self.invalid("target name must not be empty"));
    }
    if !self.upstream.contains('/') {
      return Err(self.invalid("upstream must be an owner/repo slug"));
    }

    let pattern = regex::Regex::new(&self.tag_pattern)
      .map_err(|e| self.invalid(format!("tag_pattern does not compile: {}", e)))?;
    if pattern.captures_len() != 2 {
      return Err(self.invalid("tag_pattern must have exactly one capture group around the version"));
    }

    if self.series.is_empty() {
      return Err(self.invalid("at least one tracked series is required"));
    }
    let keys = self.tracked_series()?;
    let depth = keys[0].depth();
    if !(1..=2).contains(&depth) {
      return Err(self.invalid("series must have one or two components (e.g. \"20\" or \"1.23\")"));
    }
    if keys.iter().any(|k| k.depth() != depth) {
      return Err(self.invalid("all series of a target must share the same truncation depth"));
    }

    if self.feedstocks.is_empty() {
      return Err(self.invalid("at least one feedstock is required"));
    }
    if let Some(bad) = self.feedstocks.iter().find(|f| !f.contains('/')) {
      return Err(self.invalid(format!("feedstock '{}' must be an owner/repo slug", bad)));
    }

    self.checksums.validate().map_err(|reason| self.invalid(reason))?;

    Ok(())
  }

  /// Tracked series parsed into keys
  pub fn tracked_series(&self) -> BumpResult<Vec<SeriesKey>> {
    self
      .series
      .iter()
      .map(|s| {
        SeriesKey::parse(s).ok_or_else(|| self.invalid(format!("series '{}' is not a dotted numeric prefix", s)))
      })
      .collect()
  }

  /// Truncation depth shared by every tracked series of this target
  pub fn series_depth(&self) -> BumpResult<usize> {
    Ok(self.tracked_series()?[0].depth())
  }

  /// Compiled tag pattern
  pub fn compiled_tag_pattern(&self) -> BumpResult<regex::Regex> {
    Ok(regex::Regex::new(&self.tag_pattern)?)
  }

  fn invalid(&self, reason: impl Into<String>) -> BumpError {
    BumpError::Config(ConfigError::InvalidTarget {
      target: self.name.clone(),
      reason: reason.into(),
    })
  }
}

impl ChecksumConfig {
  fn validate(&self) -> Result<(), String> {
    if self.artifacts.is_empty() {
      return Err("at least one checksum artifact is required".to_string());
    }
    match self.strategy {
      HashStrategy::Download => {
        if self.artifacts.iter().any(|a| a.url.is_none()) {
          return Err("download strategy requires a url on every artifact".to_string());
        }
      }
      HashStrategy::Manifest => {
        if self.manifest_url.is_none() {
          return Err("manifest strategy requires manifest_url".to_string());
        }
        if self.artifacts.iter().any(|a| a.filename.is_none()) {
          return Err("manifest strategy requires a filename on every artifact".to_string());
        }
      }
    }
    Ok(())
  }
}
