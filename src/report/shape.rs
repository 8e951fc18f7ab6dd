use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::error::Result;
use crate::github::{Comment, PullRequestDetail, PullRequestSource, RepoId, SearchResults};
use crate::report::types::{
    AnalysisStats, CommentRecord, CommentSummary, DateRange, DetailsReport, ListReport,
    PrStatus, PullRequestRecord, PullRequestSummary,
};

/// Comments kept per pull request in reports.
pub const MAX_COMMENTS: usize = 5;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
const DAY_FORMAT: &str = "%Y-%m-%d";

/// First calendar day of a `days`-long window ending `today`.
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Minute precision, no offset. The provider's timezone is kept as-is.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Build a comment summary from the provider total and the comments fetched.
///
/// Only the first [`MAX_COMMENTS`] are kept. If the provider returned fewer
/// than it announced, `displayed_count` follows what was actually returned.
pub fn comment_summary(total_count: u64, comments: Vec<Comment>) -> CommentSummary {
    let cap = usize::try_from(total_count)
        .unwrap_or(usize::MAX)
        .min(MAX_COMMENTS);

    let items: Vec<CommentRecord> = comments
        .into_iter()
        .take(cap)
        .map(|comment| CommentRecord {
            author: comment.author,
            created_at: format_timestamp(&comment.created_at),
            body: comment.body,
        })
        .collect();

    CommentSummary {
        total_count,
        displayed_count: items.len(),
        items,
    }
}

/// Shape a detail into a record. `comments` is attached as given.
pub fn build_record(
    detail: PullRequestDetail,
    comments: Option<CommentSummary>,
) -> PullRequestRecord {
    let status = PrStatus::from_provider(detail.merged, detail.state);
    let merged_at = match status {
        PrStatus::Merged => Some(
            detail
                .merged_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_default(),
        ),
        _ => None,
    };

    PullRequestRecord {
        number: detail.number,
        title: detail.title,
        author: detail.author,
        status,
        created_at: format_timestamp(&detail.created_at),
        url: detail.url,
        description: detail.body.unwrap_or_default(),
        merged_at,
        comments,
    }
}

/// Fetch the first comments of a PR. Nothing is requested when the detail
/// reports no comments.
pub async fn fetch_comment_summary(
    source: &dyn PullRequestSource,
    repo: &RepoId,
    detail: &PullRequestDetail,
) -> Result<CommentSummary> {
    if detail.comment_count == 0 {
        return Ok(CommentSummary::empty());
    }

    let comments = source
        .get_comments(repo, detail.number, MAX_COMMENTS)
        .await?;

    Ok(comment_summary(detail.comment_count, comments))
}

pub async fn normalize(
    source: &dyn PullRequestSource,
    repo: &RepoId,
    detail: PullRequestDetail,
    include_comments: bool,
) -> Result<PullRequestRecord> {
    let comments = if include_comments {
        Some(fetch_comment_summary(source, repo, &detail).await?)
    } else {
        None
    };

    Ok(build_record(detail, comments))
}

/// Stats for a report. The date range reflects the requested window, not the
/// merge dates actually observed.
pub fn compute_stats(repo: &RepoId, days: u32, total_prs: usize, today: NaiveDate) -> AnalysisStats {
    AnalysisStats {
        repository: repo.to_string(),
        days_analyzed: days,
        total_prs,
        date_range: DateRange {
            start: window_start(today, days).format(DAY_FORMAT).to_string(),
            end: today.format(DAY_FORMAT).to_string(),
        },
    }
}

pub fn list_report(repo: &RepoId, days: u32, results: &SearchResults) -> ListReport {
    let pull_requests: Vec<PullRequestSummary> = results
        .items
        .iter()
        .map(|stub| PullRequestSummary {
            number: stub.number,
            title: stub.title.clone(),
            author: stub.author.clone(),
        })
        .collect();

    ListReport {
        repository: repo.to_string(),
        days_searched: days,
        total_prs: pull_requests.len(),
        pull_requests,
    }
}

pub fn details_report(
    repo: &RepoId,
    days: u32,
    records: Vec<PullRequestRecord>,
    today: NaiveDate,
) -> DetailsReport {
    DetailsReport {
        stats: compute_stats(repo, days, records.len(), today),
        pull_requests: records,
    }
}
