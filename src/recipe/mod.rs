//! Recipe loading and format-preserving patching
//!
//! A feedstock recipe comes in one of two mutually exclusive dialects:
//! the legacy Jinja2-macro `meta.yaml` and the newer structured
//! `recipe.yaml` with platform conditionals. This module understands just
//! enough of each to rewrite the release-bearing lines (version, build
//! number, checksums) while leaving every other byte untouched:
//!
//! - **document**: line-addressable recipe text with byte-exact round-trip
//! - **dialect**: per-dialect line patterns and selector vocabulary
//! - **patcher**: the scan that applies a new release to a document
//! - **platform**: platform selectors shared with config and checksums

pub mod dialect;
pub mod document;
pub mod patcher;
pub mod platform;

pub use dialect::{DialectRules, LineClass, ScanState};
pub use document::{RecipeDialect, RecipeDocument};
pub use patcher::{PatchOutcome, patch_document};
pub use platform::PlatformSelector;
