//! Go/no-go decision for a single (series, feedstock) update

use semver::Version;

/// Outcome of comparing the on-branch version with the update candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
  /// An update is warranted
  Proceed { reason: String },
  /// The branch is already current (or ahead); skip it
  Skip { reason: String },
}

impl GateDecision {
  /// Decide whether `candidate` warrants an update over `current`.
  ///
  /// An unknown current version always proceeds: there is nothing
  /// authoritative to compare against, and a redundant update is cheaper
  /// than a missed release.
  pub fn evaluate(current: Option<&Version>, candidate: &Version) -> Self {
    match current {
      None => GateDecision::Proceed {
        reason: format!("current version unknown, updating to {}", candidate),
      },
      Some(current) if candidate <= current => GateDecision::Skip {
        reason: format!("{} is up-to-date (candidate {})", current, candidate),
      },
      Some(current) => GateDecision::Proceed {
        reason: format!("update available: {} -> {}", current, candidate),
      },
    }
  }

  /// Whether the decision is to proceed
  pub fn proceeds(&self) -> bool {
    matches!(self, GateDecision::Proceed { .. })
  }

  /// Human-readable reason for reporting
  pub fn reason(&self) -> &str {
    match self {
      GateDecision::Proceed { reason } | GateDecision::Skip { reason } => reason,
    }
  }
}
