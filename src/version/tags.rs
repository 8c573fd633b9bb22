//! Paginated tag listing from the GitHub API

use crate::core::error::{BumpError, BumpResult, FetchError, ResultExt};
use serde::Deserialize;

/// Default base URL for the GitHub API
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Tags per page; pagination ends on the first empty page
const PER_PAGE: usize = 100;

/// One upstream tag. Only `name` is consumed downstream; the ref is kept as
/// an opaque fact about the upstream project.
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
  pub name: String,
  #[serde(default)]
  #[allow(dead_code)]
  pub commit: TagRef,
}

impl Tag {
  /// Construct a bare tag from a name alone
  #[allow(dead_code)] // Convenience for synthetic tag lists
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      commit: TagRef::default(),
    }
  }
}

/// Opaque pointer to the tagged commit
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagRef {
  #[serde(default)]
  #[allow(dead_code)]
  pub sha: String,
}

/// Blocking GitHub tag listing client
pub struct TagClient {
  client: reqwest::blocking::Client,
  base_url: String,
}

impl TagClient {
  /// Create a client against a custom base URL (tests use a mock server)
  pub fn new(base_url: impl Into<String>) -> BumpResult<Self> {
    let client = reqwest::blocking::Client::builder()
      .user_agent("forge-bump")
      .build()
      .context("Failed to build HTTP client")?;
    Ok(Self {
      client,
      base_url: base_url.into(),
    })
  }

  /// Create a client against api.github.com
  pub fn github() -> BumpResult<Self> {
    Self::new(DEFAULT_BASE_URL)
  }

  /// Fetch all tags of `repo` ("owner/name"), following pagination until an
  /// empty page.
  pub fn list_tags(&self, repo: &str) -> BumpResult<Vec<Tag>> {
    let mut tags = Vec::new();
    let mut page = 1usize;

    loop {
      let url = format!("{}/repos/{}/tags", self.base_url, repo);
      let response = self
        .client
        .get(&url)
        .header("Accept", "application/vnd.github+json")
        .query(&[("page", page.to_string()), ("per_page", PER_PAGE.to_string())])
        .send()
        .with_context(|| format!("Failed to list tags for {}", repo))?;

      let status = response.status();
      if !status.is_success() {
        return Err(BumpError::Fetch(FetchError::Status {
          url,
          status: status.as_u16(),
        }));
      }

      let page_tags: Vec<Tag> = response
        .json()
        .with_context(|| format!("Malformed tag listing for {}", repo))?;
      if page_tags.is_empty() {
        break;
      }

      tags.extend(page_tags);
      page += 1;
    }

    Ok(tags)
  }
}
