//! Latest patch version per tracked minor series

use crate::version::series::SeriesKey;
use crate::version::tags::Tag;
use regex::Regex;
use semver::Version;
use std::collections::BTreeMap;

/// Latest version per tracked series, in sorted series order
pub type CandidateMap = BTreeMap<SeriesKey, Version>;

/// Reduce a raw tag list to the maximum version per tracked series.
///
/// Tags that do not match `pattern` are unrelated and dropped silently.
/// Captures that fail version parsing are dropped with a diagnostic.
/// Versions outside the tracked set are dropped. The result is independent
/// of the order of `tags`.
pub fn resolve_candidates(tags: &[Tag], tracked: &[SeriesKey], pattern: &Regex, depth: usize) -> CandidateMap {
  let mut latest: CandidateMap = BTreeMap::new();

  for tag in tags {
    let Some(captures) = pattern.captures(&tag.name) else {
      continue;
    };
    let Some(raw) = captures.get(1) else {
      continue;
    };

    let version = match Version::parse(raw.as_str()) {
      Ok(v) => v,
      Err(e) => {
        println!("Warning: could not parse version '{}' from tag '{}': {}", raw.as_str(), tag.name, e);
        continue;
      }
    };

    let key = SeriesKey::of(&version, depth);
    if !tracked.contains(&key) {
      continue;
    }

    match latest.get(&key) {
      Some(existing) if *existing >= version => {}
      _ => {
        latest.insert(key, version);
      }
    }
  }

  latest
}
