//! Upstream release resolution
//!
//! This module turns the unordered tag list of an upstream repository into
//! per-series update candidates and decides whether a branch needs one:
//!
//! - **tags**: paginated GitHub tag listing
//! - **series**: maintenance-line keys derived from versions by truncation
//! - **resolver**: latest patch version per tracked series
//! - **gate**: the go/no-go decision against the on-branch version

pub mod gate;
pub mod resolver;
pub mod series;
pub mod tags;

pub use gate::GateDecision;
pub use resolver::{CandidateMap, resolve_candidates};
pub use series::SeriesKey;
pub use tags::{Tag, TagClient};
