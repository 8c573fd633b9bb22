//! Report the latest release per tracked series without touching feedstocks

use crate::core::config::BumpConfig;
use crate::core::error::BumpResult;
use crate::version::{TagClient, resolve_candidates};
use serde::Serialize;
use std::path::Path;

/// One resolved (target, series) candidate
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSeries {
  pub target: String,
  pub series: String,
  pub version: String,
}

/// Run the resolve command
pub fn run_resolve(root: &Path, target_filter: Option<String>, json: bool) -> BumpResult<()> {
  let config = BumpConfig::load(root)?;
  let client = TagClient::github()?;

  let targets: Vec<_> = match &target_filter {
    Some(name) => vec![config.find_target(name)?],
    None => config.targets.iter().collect(),
  };

  let mut resolved = Vec::new();

  for target in targets {
    println!("Fetching tags from {}...", target.upstream);
    let tags = client.list_tags(&target.upstream)?;

    let tracked = target.tracked_series()?;
    let pattern = target.compiled_tag_pattern()?;
    let candidates = resolve_candidates(&tags, &tracked, &pattern, target.series_depth()?);

    for (series, version) in &candidates {
      println!("  {}.x: latest is {}", series, version);
      resolved.push(ResolvedSeries {
        target: target.name.clone(),
        series: series.to_string(),
        version: version.to_string(),
      });
    }

    let missing: Vec<String> = tracked
      .iter()
      .filter(|key| !candidates.contains_key(key))
      .map(|key| key.to_string())
      .collect();
    if !missing.is_empty() {
      println!("  No matching tags for: {}", missing.join(", "));
    }
  }

  if json {
    println!("{}", serde_json::to_string_pretty(&resolved)?);
  } else if resolved.is_empty() {
    println!("\nNo versions found for any tracked series.");
  } else {
    println!("\nFound {} series with releases.", resolved.len());
  }

  Ok(())
}
