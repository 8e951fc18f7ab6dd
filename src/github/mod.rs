pub mod client;
pub mod search;
pub mod types;

pub use client::{GitHubClient, PullRequestSource};
pub use search::merged_search_query;
pub use types::{
    Comment, ProviderState, PullRequestDetail, PullRequestStub, RepoId, SearchResults,
};
