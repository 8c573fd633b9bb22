//! The update pipeline
//!
//! Series are resolved once per target, then every (series, feedstock)
//! combination is processed strictly one after another. Failures are caught
//! at the unit boundary, recorded, and never abort the run; only
//! configuration-level problems found before the first unit do.

use crate::checksum::{DownloadHasher, HashProvider, ManifestHasher};
use crate::core::config::{BumpConfig, HashStrategy, TargetConfig};
use crate::core::error::{BumpError, BumpResult, ConfigError};
use crate::core::rerender::{RerenderOutcome, run_rerender};
use crate::core::vcs::FeedstockRepo;
use crate::recipe::{RecipeDocument, patch_document, patcher};
use crate::ui::UnitProgress;
use crate::version::{CandidateMap, GateDecision, SeriesKey, TagClient, resolve_candidates};
use chrono::Utc;
use semver::Version;
use serde::Serialize;
use std::path::Path;

/// Options for the update command
pub struct UpdateOptions {
  /// Report gate decisions without mutating anything
  pub dry_run: bool,
  /// Restrict the run to one configured target
  pub target: Option<String>,
  /// Emit the run summary as JSON
  pub json: bool,
}

/// Terminal state of one (series, feedstock) unit
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
  /// Recipe patched, pushed, pull request open
  Updated { pr_url: String },
  /// Dry-run: the gate said proceed
  WouldUpdate { current: Option<String> },
  /// The gate said the branch is already current
  UpToDate { current: String },
  /// The feedstock does not maintain this series
  BranchMissing { branch: String },
  /// Unit failed; the run continued with the next one
  Errored { error: String },
}

/// Structured outcome of one unit, aggregated into the run summary
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
  pub feedstock: String,
  pub series: String,
  pub candidate: String,
  #[serde(flatten)]
  pub status: UnitStatus,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub warnings: Vec<String>,
}

/// End-of-run summary
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
  pub dry_run: bool,
  pub completed_at: String,
  pub units: Vec<UnitReport>,
}

/// Run the update command
pub fn run_update(root: &Path, options: UpdateOptions) -> BumpResult<()> {
  let config = BumpConfig::load(root)?;
  let targets = select_targets(&config, options.target.as_deref())?;

  if options.dry_run {
    println!("{}", "=".repeat(60));
    println!("DRY RUN MODE - No changes will be made");
    println!("{}", "=".repeat(60));
    println!();
  }

  let client = TagClient::github()?;

  // Resolve every target before touching any feedstock, so configuration
  // problems surface before the first mutating step.
  let mut plans: Vec<(&TargetConfig, CandidateMap)> = Vec::new();
  let mut units: Vec<UnitReport> = Vec::new();

  for &target in &targets {
    println!("Fetching tags from {}...", target.upstream);
    let tags = match client.list_tags(&target.upstream) {
      Ok(tags) => tags,
      Err(e) => {
        // Every unit of this target fails; the run continues.
        println!("Error fetching tags for {}: {}", target.upstream, e);
        units.extend(errored_target_units(target, &e));
        continue;
      }
    };

    let tracked = target.tracked_series()?;
    let pattern = target.compiled_tag_pattern()?;
    let candidates = resolve_candidates(&tags, &tracked, &pattern, target.series_depth()?);

    for (series, version) in &candidates {
      println!("  {}.x: latest is {}", series, version);
    }
    if candidates.is_empty() {
      println!("  No versions found for tracked series of {}", target.name);
    }

    plans.push((target, candidates));
  }

  if units.is_empty() && plans.iter().all(|(_, candidates)| candidates.is_empty()) {
    return Err(BumpError::Config(ConfigError::NothingResolved));
  }

  let total_units: usize = plans
    .iter()
    .map(|(target, candidates)| candidates.len() * target.feedstocks.len())
    .sum();
  let mut progress = UnitProgress::new(total_units, "Updating feedstocks");

  for (target, candidates) in &plans {
    for (series, version) in candidates {
      println!("\n{}", "#".repeat(60));
      println!("Processing {} {} ({}.x series)", target.name, version, series);
      println!("{}", "#".repeat(60));

      for feedstock in &target.feedstocks {
        let report = match process_unit(&config, target, feedstock, series, version, options.dry_run) {
          Ok(report) => report,
          Err(e) => {
            println!("\nError updating {}: {}", feedstock, e);
            println!("Continuing with next feedstock...");
            UnitReport {
              feedstock: feedstock.clone(),
              series: series.to_string(),
              candidate: version.to_string(),
              status: UnitStatus::Errored { error: e.to_string() },
              warnings: Vec::new(),
            }
          }
        };
        units.push(report);
        progress.inc();
      }
    }
  }

  let summary = RunSummary {
    dry_run: options.dry_run,
    completed_at: Utc::now().to_rfc3339(),
    units,
  };

  if options.json {
    println!("{}", serde_json::to_string_pretty(&summary)?);
  } else {
    print_summary(&summary);
  }

  Ok(())
}

fn select_targets<'a>(config: &'a BumpConfig, filter: Option<&str>) -> BumpResult<Vec<&'a TargetConfig>> {
  match filter {
    Some(name) => Ok(vec![config.find_target(name)?]),
    None => {
      if config.targets.is_empty() {
        return Err(BumpError::with_help(
          "No targets configured",
          "Add at least one [[targets]] section to bump.toml.",
        ));
      }
      Ok(config.targets.iter().collect())
    }
  }
}

/// One errored report per would-be unit of a target whose tag listing failed
fn errored_target_units(target: &TargetConfig, error: &BumpError) -> Vec<UnitReport> {
  let series = target.tracked_series().unwrap_or_default();
  let mut reports = Vec::new();
  for key in series {
    for feedstock in &target.feedstocks {
      reports.push(UnitReport {
        feedstock: feedstock.clone(),
        series: key.to_string(),
        candidate: "unresolved".to_string(),
        status: UnitStatus::Errored {
          error: error.to_string(),
        },
        warnings: Vec::new(),
      });
    }
  }
  reports
}

/// Process one (series, feedstock) unit end to end
fn process_unit(
  config: &BumpConfig,
  target: &TargetConfig,
  feedstock: &str,
  series: &SeriesKey,
  version: &Version,
  dry_run: bool,
) -> BumpResult<UnitReport> {
  let branch = format!("{}.x", series);
  let mut warnings = Vec::new();

  println!("\n{}", "=".repeat(60));
  println!("Checking {} for {}", feedstock, version);
  println!("{}", "=".repeat(60));

  let report = |status: UnitStatus, warnings: Vec<String>| UnitReport {
    feedstock: feedstock.to_string(),
    series: series.to_string(),
    candidate: version.to_string(),
    status,
    warnings,
  };

  let repo = FeedstockRepo::materialize(&config.run.work_dir, feedstock)?;

  if !repo.checkout_series_branch(&branch)? {
    println!("Warning: Branch {} does not exist in {}. Skipping.", branch, feedstock);
    return Ok(report(UnitStatus::BranchMissing { branch }, warnings));
  }

  let mut doc = RecipeDocument::discover(repo.path())?;
  let current = patcher::current_version(&doc);
  match &current {
    Some(current) => println!("Current version in {}: {}", branch, current),
    None => println!("Warning: Could not determine current version, proceeding with update..."),
  }

  let decision = GateDecision::evaluate(current.as_ref(), version);
  println!("{}", decision.reason());
  if !decision.proceeds() {
    return Ok(report(
      UnitStatus::UpToDate {
        current: current.map(|v| v.to_string()).unwrap_or_default(),
      },
      warnings,
    ));
  }

  if dry_run {
    println!(
      "\n[DRY RUN] Would update {} from {} to {}",
      feedstock,
      current.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "unknown".to_string()),
      version
    );
    return Ok(report(
      UnitStatus::WouldUpdate {
        current: current.map(|v| v.to_string()),
      },
      warnings,
    ));
  }

  let update_branch = format!("update-{}", version);
  repo.create_update_branch(&update_branch)?;

  println!("Fetching SHA256 hashes for {} {}...", target.name, version);
  let provider = build_provider(target)?;
  let hashes = provider.fetch(version);
  for failure in &hashes.failures {
    println!("  Warning: Failed to fetch {}", failure);
    warnings.push(format!("checksum fetch: {}", failure));
  }
  if hashes.is_empty() {
    println!("Warning: No SHA256 hashes computed. Continuing without checksum update...");
  }

  println!("Updating {}...", doc.dialect().file_name());
  let outcome = patch_document(&mut doc, version, &target.name, &hashes);
  warnings.extend(outcome.warnings.iter().cloned());
  doc.save()?;
  println!(
    "Updated recipe ({} version line(s), {} build number(s), {} checksum(s))",
    outcome.version_lines, outcome.build_numbers_reset, outcome.checksums_updated
  );

  repo.commit_paths(&[doc.dialect().file_name()], &format!("Update to {}", version))?;

  match run_rerender(&repo)? {
    RerenderOutcome::Failed { stderr } => {
      println!("Warning: conda-smithy rerender failed: {}", stderr);
      println!("Continuing anyway...");
      warnings.push(format!("rerender failed: {}", stderr));
    }
    RerenderOutcome::Clean | RerenderOutcome::Committed => {}
  }

  repo.push(&update_branch)?;

  let title = format!("Update to {} {}", target.name, version);
  let body = pr_body(&target.name, version);
  let pr_url = repo.open_pull_request(&branch, &title, &body, target.automerge)?;
  println!("Pull request created: {}", pr_url);

  Ok(report(UnitStatus::Updated { pr_url }, warnings))
}

fn build_provider(target: &TargetConfig) -> BumpResult<Box<dyn HashProvider>> {
  match target.checksums.strategy {
    HashStrategy::Download => Ok(Box::new(DownloadHasher::new(&target.checksums.artifacts)?)),
    HashStrategy::Manifest => {
      let manifest_url = target
        .checksums
        .manifest_url
        .as_ref()
        .ok_or_else(|| BumpError::message("manifest strategy without manifest_url"))?;
      Ok(Box::new(ManifestHasher::new(manifest_url.clone(), &target.checksums.artifacts)?))
    }
  }
}

fn pr_body(name: &str, version: &Version) -> String {
  format!(
    "This PR updates the {} version to {}.\n\n\
     Changes:\n\
     - Updated version to {}\n\
     - Updated source tarball sha256\n\
     - Reset build number to 0\n\
     - Re-rendered with conda-smithy\n",
    name, version, version
  )
}

fn print_summary(summary: &RunSummary) {
  let updated: Vec<&UnitReport> = summary
    .units
    .iter()
    .filter(|u| matches!(u.status, UnitStatus::Updated { .. } | UnitStatus::WouldUpdate { .. }))
    .collect();
  let up_to_date: Vec<&UnitReport> = summary
    .units
    .iter()
    .filter(|u| matches!(u.status, UnitStatus::UpToDate { .. }))
    .collect();
  let skipped: Vec<&UnitReport> = summary
    .units
    .iter()
    .filter(|u| matches!(u.status, UnitStatus::BranchMissing { .. }))
    .collect();
  let errors: Vec<&UnitReport> = summary
    .units
    .iter()
    .filter(|u| matches!(u.status, UnitStatus::Errored { .. }))
    .collect();

  println!("\n{}", "=".repeat(60));
  println!("SUMMARY{}", if summary.dry_run { " (DRY RUN)" } else { "" });
  println!("{}", "=".repeat(60));

  if !updated.is_empty() {
    let action = if summary.dry_run { "Would create" } else { "Updates created" };
    println!("\n✓ {} ({}):", action, updated.len());
    for unit in updated {
      println!("  - {} {}.x → {}", unit.feedstock, unit.series, unit.candidate);
    }
  }

  if !up_to_date.is_empty() {
    println!("\n○ Already up-to-date ({}):", up_to_date.len());
    for unit in &up_to_date {
      if let UnitStatus::UpToDate { current } = &unit.status {
        println!("  - {} {}.x (current: {})", unit.feedstock, unit.series, current);
      }
    }
  }

  if !skipped.is_empty() {
    println!("\n◌ Skipped ({}):", skipped.len());
    for unit in skipped {
      println!("  - {} {}.x (no series branch)", unit.feedstock, unit.series);
    }
  }

  if !errors.is_empty() {
    println!("\n✗ Errors ({}):", errors.len());
    for unit in &errors {
      if let UnitStatus::Errored { error } = &unit.status {
        println!("  - {} {}.x: {}", unit.feedstock, unit.series, error);
      }
    }
  }

  let with_warnings: Vec<&UnitReport> = summary.units.iter().filter(|u| !u.warnings.is_empty()).collect();
  if !with_warnings.is_empty() {
    println!("\n⚠ Warnings:");
    for unit in with_warnings {
      for warning in &unit.warnings {
        println!("  - {} {}.x: {}", unit.feedstock, unit.series, warning);
      }
    }
  }

  println!();
}
