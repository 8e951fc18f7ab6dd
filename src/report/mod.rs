pub mod shape;
pub mod types;

pub use shape::{
    build_record, comment_summary, compute_stats, details_report, fetch_comment_summary,
    format_timestamp, list_report, normalize, window_start, MAX_COMMENTS,
};
pub use types::{
    AnalysisStats, CommentRecord, CommentSummary, DateRange, DetailsReport, ListReport,
    PrStatus, PullRequestRecord, PullRequestSummary,
};
