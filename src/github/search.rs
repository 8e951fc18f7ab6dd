use async_trait::async_trait;
use chrono::NaiveDate;
use octocrab::models::IssueState;

use crate::error::{PulseError, Result};
use crate::github::client::{describe, is_unauthorized, GitHubClient, PullRequestSource};
use crate::github::types::{
    Comment, ProviderState, PullRequestDetail, PullRequestStub, RepoId, SearchResults,
};
use crate::report::window_start;

const SEARCH_PAGE_SIZE: u8 = 100;

/// Search query for PRs in `repo` merged on or after `since`.
pub fn merged_search_query(repo: &RepoId, since: NaiveDate) -> String {
    format!(
        "repo:{} is:pr is:merged merged:>={}",
        repo,
        since.format("%Y-%m-%d")
    )
}

fn auth_or(err: octocrab::Error, otherwise: impl FnOnce(String) -> PulseError) -> PulseError {
    if is_unauthorized(&err) {
        PulseError::Authentication(
            "GitHub rejected the token. It may be invalid or expired.".to_string(),
        )
    } else {
        otherwise(describe(&err))
    }
}

fn stub_from_issue(issue: octocrab::models::issues::Issue) -> PullRequestStub {
    PullRequestStub {
        number: issue.number,
        title: issue.title,
        author: issue.user.login,
        url: issue.html_url.to_string(),
    }
}

fn detail_from_pull(pr: octocrab::models::pulls::PullRequest) -> PullRequestDetail {
    let state = match pr.state {
        Some(IssueState::Open) => ProviderState::Open,
        _ => ProviderState::Closed,
    };

    PullRequestDetail {
        number: pr.number,
        title: pr.title.unwrap_or_default(),
        author: pr.user.map(|user| user.login).unwrap_or_default(),
        state,
        merged: pr.merged.unwrap_or(false) || pr.merged_at.is_some(),
        created_at: pr.created_at.unwrap_or_default(),
        merged_at: pr.merged_at,
        url: pr.html_url.map(|url| url.to_string()).unwrap_or_default(),
        body: pr.body,
        comment_count: pr.comments.unwrap_or(0),
    }
}

fn comment_from_issue_comment(comment: octocrab::models::issues::Comment) -> Comment {
    Comment {
        author: comment.user.login,
        created_at: comment.created_at,
        body: comment.body.unwrap_or_default(),
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn search_merged(
        &self,
        repo: &RepoId,
        today: NaiveDate,
        days: u32,
    ) -> Result<SearchResults> {
        let query = merged_search_query(repo, window_start(today, days));

        tracing::debug!(repo = %repo, days, until = %today, "searching merged pull requests");

        let query_error = |message: String| PulseError::Query {
            repo: repo.to_string(),
            query: query.clone(),
            message,
        };

        let first_page = self
            .octocrab
            .search()
            .issues_and_pull_requests(&query)
            .per_page(SEARCH_PAGE_SIZE)
            .send()
            .await
            .map_err(|e| auth_or(e, query_error))?;

        let total_count = first_page.total_count.unwrap_or(0);
        tracing::debug!(total_count, "search returned");

        let issues = self
            .octocrab
            .all_pages(first_page)
            .await
            .map_err(|e| auth_or(e, query_error))?;

        let items = issues
            .into_iter()
            .filter(|issue| issue.pull_request.is_some())
            .map(stub_from_issue)
            .collect();

        Ok(SearchResults { total_count, items })
    }

    async fn get_detail(&self, repo: &RepoId, number: u64) -> Result<PullRequestDetail> {
        tracing::debug!(repo = %repo, number, "fetching pull request");

        let pr = self
            .octocrab
            .pulls(&repo.owner, &repo.repo)
            .get(number)
            .await
            .map_err(|e| {
                auth_or(e, |message| {
                    PulseError::not_found(format!("pr #{} in repository {}", number, repo), message)
                })
            })?;

        Ok(detail_from_pull(pr))
    }

    async fn get_comments(
        &self,
        repo: &RepoId,
        number: u64,
        limit: usize,
    ) -> Result<Vec<Comment>> {
        tracing::debug!(repo = %repo, number, limit, "fetching comments");

        let per_page = u8::try_from(limit.clamp(1, 100)).unwrap_or(100);
        let page = self
            .octocrab
            .issues(&repo.owner, &repo.repo)
            .list_comments(number)
            .per_page(per_page)
            .send()
            .await
            .map_err(|e| {
                auth_or(e, |message| {
                    PulseError::not_found(format!("comments of pr #{} in {}", number, repo), message)
                })
            })?;

        Ok(page
            .items
            .into_iter()
            .take(limit)
            .map(comment_from_issue_comment)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_search_query() {
        let repo: RepoId = "acme/widgets".parse().unwrap();
        let since = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        assert_eq!(
            merged_search_query(&repo, since),
            "repo:acme/widgets is:pr is:merged merged:>=2024-03-08"
        );
    }

    #[test]
    fn test_merged_search_query_uses_window_start() {
        let repo: RepoId = "acme/widgets".parse().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let query = merged_search_query(&repo, window_start(today, 7));
        assert!(query.ends_with("merged:>=2024-02-23"));
    }
}
