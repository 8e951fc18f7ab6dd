use async_trait::async_trait;
use chrono::NaiveDate;
use octocrab::Octocrab;

use crate::error::{PulseError, Result};
use crate::github::types::{PullRequestDetail, RepoId, SearchResults, Comment};

/// Read access to a repository's pull requests.
///
/// [`GitHubClient`] is the production implementation; tests substitute an
/// in-memory source.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Pull requests in `repo` merged on or after `today - days`.
    async fn search_merged(&self, repo: &RepoId, today: NaiveDate, days: u32)
        -> Result<SearchResults>;

    async fn get_detail(&self, repo: &RepoId, number: u64) -> Result<PullRequestDetail>;

    /// The first `limit` issue comments, oldest first.
    async fn get_comments(&self, repo: &RepoId, number: u64, limit: usize)
        -> Result<Vec<Comment>>;
}

pub struct GitHubClient {
    pub(crate) octocrab: Octocrab,
}

impl GitHubClient {
    /// Create an authenticated GitHub client using a personal access token
    pub fn new(token: &str) -> Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| {
                PulseError::Authentication(format!("failed to create GitHub client: {}", e))
            })?;

        Ok(Self { octocrab })
    }
}

/// HTTP status of a GitHub API error, if the error came from the API at all.
pub(crate) fn api_status(err: &octocrab::Error) -> Option<http::StatusCode> {
    match err {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code),
        _ => None,
    }
}

pub(crate) fn is_unauthorized(err: &octocrab::Error) -> bool {
    api_status(err) == Some(http::StatusCode::UNAUTHORIZED)
}

/// Short human-readable message for an octocrab error.
pub(crate) fn describe(err: &octocrab::Error) -> String {
    match err {
        octocrab::Error::GitHub { source, .. } => source.message.clone(),
        other => other.to_string(),
    }
}
