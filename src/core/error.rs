//! Error types for forge-bump with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and provides
//! contextual help messages to users. Every error includes a helpful suggestion
//! to guide users toward resolution.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for forge-bump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (git, network, I/O)
  System = 2,
  /// Recipe failure (no recognizable recipe dialect, unpatchable document)
  Recipe = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for forge-bump
#[derive(Debug)]
pub enum BumpError {
  /// Configuration errors
  Config(ConfigError),

  /// Upstream fetch errors (tags, manifests, artifact downloads)
  Fetch(FetchError),

  /// Git / gh operation errors
  Git(GitError),

  /// Recipe file errors
  Recipe(RecipeError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl BumpError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    BumpError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    BumpError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      BumpError::Message { message, context, help } => BumpError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      other => BumpError::Message {
        message: other.to_string(),
        context: Some(ctx_str),
        help: other.help_message(),
      },
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      BumpError::Config(_) => ExitCode::User,
      BumpError::Fetch(_) => ExitCode::System,
      BumpError::Git(_) => ExitCode::System,
      BumpError::Recipe(_) => ExitCode::Recipe,
      BumpError::Io(_) => ExitCode::System,
      BumpError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      BumpError::Config(e) => e.help_message(),
      BumpError::Fetch(e) => e.help_message(),
      BumpError::Git(e) => e.help_message(),
      BumpError::Recipe(e) => e.help_message(),
      BumpError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for BumpError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BumpError::Config(e) => write!(f, "{}", e),
      BumpError::Fetch(e) => write!(f, "{}", e),
      BumpError::Git(e) => write!(f, "{}", e),
      BumpError::Recipe(e) => write!(f, "{}", e),
      BumpError::Io(e) => write!(f, "I/O error: {}", e),
      BumpError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for BumpError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      BumpError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for BumpError {
  fn from(err: io::Error) -> Self {
    BumpError::Io(err)
  }
}

impl From<String> for BumpError {
  fn from(msg: String) -> Self {
    BumpError::message(msg)
  }
}

impl From<&str> for BumpError {
  fn from(msg: &str) -> Self {
    BumpError::message(msg)
  }
}

impl From<toml_edit::TomlError> for BumpError {
  fn from(err: toml_edit::TomlError) -> Self {
    BumpError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for BumpError {
  fn from(err: toml_edit::de::Error) -> Self {
    BumpError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for BumpError {
  fn from(err: toml_edit::ser::Error) -> Self {
    BumpError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for BumpError {
  fn from(err: serde_json::Error) -> Self {
    BumpError::message(format!("JSON error: {}", err))
  }
}

impl From<reqwest::Error> for BumpError {
  fn from(err: reqwest::Error) -> Self {
    BumpError::Fetch(FetchError::Http {
      url: err.url().map(|u| u.to_string()).unwrap_or_default(),
      message: err.to_string(),
    })
  }
}

impl From<semver::Error> for BumpError {
  fn from(err: semver::Error) -> Self {
    BumpError::message(format!("Version parse error: {}", err))
  }
}

impl From<regex::Error> for BumpError {
  fn from(err: regex::Error) -> Self {
    BumpError::message(format!("Invalid pattern: {}", err))
  }
}

impl From<std::str::Utf8Error> for BumpError {
  fn from(err: std::str::Utf8Error) -> Self {
    BumpError::message(format!("UTF-8 error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for BumpError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    BumpError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// bump.toml not found
  NotFound { search_root: PathBuf },

  /// A target section failed validation
  InvalidTarget { target: String, reason: String },

  /// Target not found in configuration
  TargetNotFound { name: String },

  /// No tracked series produced a candidate anywhere in the run
  NothingResolved,
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Create a bump.toml describing the upstreams and feedstocks to track.".to_string())
      }
      ConfigError::TargetNotFound { name } => Some(format!(
        "Available targets are listed in bump.toml [[targets]] sections. No target named '{}'.",
        name
      )),
      ConfigError::NothingResolved => {
        Some("Check the tag_pattern and series lists in bump.toml against the upstream tag names.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { search_root } => {
        write!(
          f,
          "No forge-bump configuration found.\nSearched from: {}",
          search_root.display()
        )
      }
      ConfigError::InvalidTarget { target, reason } => {
        write!(f, "Invalid target '{}': {}", target, reason)
      }
      ConfigError::TargetNotFound { name } => {
        write!(f, "Target '{}' not found in configuration", name)
      }
      ConfigError::NothingResolved => {
        write!(f, "No tracked series resolved to any upstream release")
      }
    }
  }
}

/// Upstream fetch errors
#[derive(Debug)]
pub enum FetchError {
  /// HTTP request failed or returned garbage
  Http { url: String, message: String },

  /// Non-success HTTP status
  Status { url: String, status: u16 },
}

impl FetchError {
  fn help_message(&self) -> Option<String> {
    match self {
      FetchError::Status { status: 403, .. } => {
        Some("GitHub rate limit may be exhausted. Retry later or authenticate the request.".to_string())
      }
      FetchError::Status { status: 404, .. } => {
        Some("Check the upstream repository slug and URL templates in bump.toml.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for FetchError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FetchError::Http { url, message } => {
        if url.is_empty() {
          write!(f, "HTTP request failed: {}", message)
        } else {
          write!(f, "HTTP request to {} failed: {}", url, message)
        }
      }
      FetchError::Status { url, status } => {
        write!(f, "HTTP {} from {}", status, url)
      }
    }
  }
}

/// Git / gh operation errors
#[derive(Debug)]
pub enum GitError {
  /// git or gh command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not materialized where expected
  RepoNotFound { path: PathBuf },

  /// Push failed
  PushFailed { branch: String, reason: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The fork already has this branch. Delete it or pick a fresh update branch name.".to_string())
        } else if reason.contains("permission denied") || reason.contains("403") {
          Some("Check your gh authentication and fork permissions (`gh auth status`).".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Clone the feedstock first or check the work directory: {}",
        path.display()
      )),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::PushFailed { branch, reason } => {
        write!(f, "Push of {} failed: {}", branch, reason)
      }
    }
  }
}

/// Recipe file errors
#[derive(Debug)]
pub enum RecipeError {
  /// Neither recipe.yaml nor meta.yaml present
  NoDialect { feedstock: PathBuf },

  /// Recipe file exists but could not be read
  Unreadable { path: PathBuf, reason: String },
}

impl RecipeError {
  fn help_message(&self) -> Option<String> {
    match self {
      RecipeError::NoDialect { .. } => {
        Some("Expected recipe/recipe.yaml or recipe/meta.yaml inside the feedstock checkout.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for RecipeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecipeError::NoDialect { feedstock } => {
        write!(f, "No recognizable recipe found under {}", feedstock.display())
      }
      RecipeError::Unreadable { path, reason } => {
        write!(f, "Failed to read recipe {}: {}", path.display(), reason)
      }
    }
  }
}

/// Result type alias for forge-bump
pub type BumpResult<T> = Result<T, BumpError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> BumpResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> BumpResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<BumpError>,
{
  fn context(self, ctx: impl Into<String>) -> BumpResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> BumpResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with colors and help text
pub fn print_error(error: &BumpError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

/// Convert anyhow::Error to BumpError (test helpers and one-off scripts)
impl From<anyhow::Error> for BumpError {
  fn from(err: anyhow::Error) -> Self {
    BumpError::message(err.to_string())
  }
}
