//! Core engine for forge-bump operations
//!
//! This module contains the building blocks shared by every command:
//!
//! - **config**: bump.toml parsing and validation
//! - **error**: comprehensive error types with contextual help messages
//! - **rerender**: the external recipe-regeneration step (observed, opaque)
//! - **vcs**: feedstock repository operations (system git + gh)

pub mod config;
pub mod error;
pub mod rerender;
pub mod vcs;
