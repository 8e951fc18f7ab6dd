use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PulseError;

/// A repository in `owner/name` form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        match parts.as_slice() {
            [owner, repo] if !owner.is_empty() && !repo.is_empty() => Ok(RepoId {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(PulseError::InvalidInput(format!(
                "repository must be in 'owner/repo' format, got '{}'",
                s
            ))),
        }
    }
}

/// Lightweight search hit, missing body and comments.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestStub {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub url: String,
}

/// Result of a merged-PR search. `total_count` is what the provider reported
/// on the first page.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub total_count: u64,
    pub items: Vec<PullRequestStub>,
}

impl SearchResults {
    pub fn numbers(&self) -> Vec<u64> {
        self.items.iter().map(|pr| pr.number).collect()
    }
}

/// Provider-side state. GitHub reports merged PRs as `closed`; the merge is
/// carried separately in [`PullRequestDetail::merged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Open,
    Closed,
}

#[derive(Debug, Clone)]
pub struct PullRequestDetail {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub state: ProviderState,
    pub merged: bool,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub url: String,
    pub body: Option<String>,
    /// Number of issue comments on the PR, as reported with the detail.
    pub comment_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub body: String,
}
