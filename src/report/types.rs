use serde::{Deserialize, Serialize};

use crate::github::ProviderState;

/// Lifecycle status as shown in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrStatus {
    Open,
    Closed,
    Merged,
}

impl PrStatus {
    /// `merged` wins over the provider state; otherwise open stays open and
    /// anything else is closed.
    pub fn from_provider(merged: bool, state: ProviderState) -> Self {
        if merged {
            PrStatus::Merged
        } else if state == ProviderState::Open {
            PrStatus::Open
        } else {
            PrStatus::Closed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "open",
            PrStatus::Closed => "closed",
            PrStatus::Merged => "merged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub author: String,
    pub created_at: String,
    pub body: String,
}

/// The first few comments of a PR plus how many exist in total.
///
/// Invariant: `items.len() == displayed_count <= total_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentSummary {
    pub total_count: u64,
    pub displayed_count: usize,
    pub items: Vec<CommentRecord>,
}

impl CommentSummary {
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            displayed_count: 0,
            items: Vec::new(),
        }
    }
}

/// Normalized pull request, the single shape handed to the renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub status: PrStatus,
    pub created_at: String,
    pub url: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<CommentSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub repository: String,
    pub days_analyzed: u32,
    pub total_prs: usize,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub author: String,
}

/// Output of `get list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListReport {
    pub repository: String,
    pub days_searched: u32,
    pub total_prs: usize,
    pub pull_requests: Vec<PullRequestSummary>,
}

/// Output of `get details`, and the input of `analyze summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailsReport {
    pub stats: AnalysisStats,
    pub pull_requests: Vec<PullRequestRecord>,
}
