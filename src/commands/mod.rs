//! CLI commands for forge-bump
//!
//! - **update**: the full pipeline: resolve upstream releases, gate each
//!   (series, feedstock) pair, patch recipes, rerender, push, open PRs
//! - **resolve**: report the latest release per tracked series
//! - **patch**: apply a version and checksum set to a local checkout
//!   (manual repair of a failed unit, offline testing)

pub mod patch;
pub mod resolve;
pub mod update;

pub use patch::{PatchArgs, run_patch};
pub use resolve::run_resolve;
pub use update::{UpdateOptions, run_update};
