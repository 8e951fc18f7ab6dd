use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{Width, terminal_size};

use crate::output::table::{escape_text, Column, Style, Table};
use crate::report::{CommentSummary, ListReport, PrStatus, PullRequestRecord};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
pub fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Render options shared by all table views.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub use_colors: bool,
    pub max_width: Option<usize>,
}

impl RenderOptions {
    /// Colors and width taken from the attached terminal.
    pub fn detect() -> Self {
        Self {
            use_colors: should_use_colors(),
            max_width: get_terminal_width(),
        }
    }

    pub fn plain() -> Self {
        Self {
            use_colors: false,
            max_width: None,
        }
    }
}

fn emphasis(text: &str, opts: RenderOptions) -> String {
    if opts.use_colors {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn note(text: &str, opts: RenderOptions) -> String {
    if opts.use_colors {
        text.italic().to_string()
    } else {
        text.to_string()
    }
}

/// `get list` view: one row per merged PR.
pub fn format_list_table(report: &ListReport, opts: RenderOptions) -> String {
    let mut table = Table::new(
        format!(
            "merged PRs in {} (last {} days)",
            report.repository, report.days_searched
        ),
        vec![
            Column::new("#", Style::Cyan).right(),
            Column::new("title", Style::Green).flexible(),
            Column::new("author", Style::Yellow),
        ],
    );

    for pr in &report.pull_requests {
        table.add_row(&[pr.number.to_string(), pr.title.clone(), pr.author.clone()]);
    }

    if table.is_empty() {
        return format!(
            "{}\n{}",
            table.render(opts.use_colors, opts.max_width).lines().next().unwrap_or_default(),
            note("no merged pull requests found", opts)
        );
    }

    table.render(opts.use_colors, opts.max_width)
}

fn format_description(body: &str, opts: RenderOptions) -> String {
    if body.trim().is_empty() {
        return note("no description provided", opts);
    }
    format!("{}\n{}", emphasis("description", opts), escape_text(body.trim_end()))
}

fn format_comments(summary: &CommentSummary, opts: RenderOptions) -> String {
    if summary.total_count == 0 || summary.items.is_empty() {
        return note("no comments found", opts);
    }

    let mut table = Table::new(
        format!(
            "comments (showing {} of {})",
            summary.displayed_count, summary.total_count
        ),
        vec![
            Column::new("author", Style::Cyan),
            Column::new("date", Style::Yellow),
            Column::new("comment", Style::Green).flexible(),
        ],
    );
    for comment in &summary.items {
        table.add_row(&[&comment.author, &comment.created_at, &comment.body]);
    }
    table.render(opts.use_colors, opts.max_width)
}

/// `get detail` view: fields, description, and the first comments.
pub fn format_detail(record: &PullRequestRecord, opts: RenderOptions) -> String {
    let mut fields = Table::new(
        format!("pr #{} details", record.number),
        vec![
            Column::new("field", Style::Cyan).right(),
            Column::new("value", Style::Green).flexible(),
        ],
    );
    fields.add_row(&["title", record.title.as_str()]);
    fields.add_row(&["author", record.author.as_str()]);
    fields.add_row(&["status", record.status.as_str()]);
    fields.add_row(&["created at", record.created_at.as_str()]);
    if let Some(merged_at) = &record.merged_at {
        fields.add_row(&["merged at", merged_at.as_str()]);
    }
    fields.add_row(&["url", record.url.as_str()]);

    let mut sections = vec![
        fields.render(opts.use_colors, opts.max_width),
        format_description(&record.description, opts),
    ];
    if let Some(comments) = &record.comments {
        sections.push(format_comments(comments, opts));
    }

    sections.join("\n\n")
}

/// `get details` view: a summary table followed by each PR's description.
pub fn format_details_summary(
    repository: &str,
    days: u32,
    records: &[PullRequestRecord],
    opts: RenderOptions,
) -> String {
    let mut table = Table::new(
        format!("PR summary for {} (last {} days)", repository, days),
        vec![
            Column::new("#", Style::Cyan).right(),
            Column::new("title", Style::Green).flexible(),
            Column::new("author", Style::Yellow),
            Column::new("merged at", Style::Magenta),
        ],
    );

    for record in records {
        let merged_at = match (&record.status, &record.merged_at) {
            (PrStatus::Merged, Some(merged_at)) => merged_at.clone(),
            _ => "Not merged".to_string(),
        };
        table.add_row(&[
            record.number.to_string(),
            record.title.clone(),
            record.author.clone(),
            merged_at,
        ]);
    }

    let mut sections = vec![
        table.render(opts.use_colors, opts.max_width),
        format!("{} {}", emphasis("total PRs:", opts), records.len()),
    ];

    for record in records {
        let heading = format!(
            "===== PR #{}: {} =====",
            record.number,
            escape_text(&record.title)
        );
        sections.push(format!(
            "{}\n{}",
            emphasis(&heading, opts),
            format_description(&record.description, opts)
        ));
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CommentRecord, PullRequestSummary};

    fn merged_record() -> PullRequestRecord {
        PullRequestRecord {
            number: 10,
            title: "Fix bug".to_string(),
            author: "octocat".to_string(),
            status: PrStatus::Merged,
            created_at: "2024-03-10 09:05".to_string(),
            url: "https://github.com/acme/widgets/pull/10".to_string(),
            description: "Fixes [the] crash\n\u{1b}[2Jsecond line".to_string(),
            merged_at: Some("2024-03-12 17:30".to_string()),
            comments: Some(CommentSummary {
                total_count: 7,
                displayed_count: 1,
                items: vec![CommentRecord {
                    author: "hubot".to_string(),
                    created_at: "2024-03-11 08:00".to_string(),
                    body: "LGTM".to_string(),
                }],
            }),
        }
    }

    fn open_record() -> PullRequestRecord {
        PullRequestRecord {
            number: 11,
            title: "Add feature".to_string(),
            author: "hubot".to_string(),
            status: PrStatus::Open,
            created_at: "2024-03-13 10:00".to_string(),
            url: "https://github.com/acme/widgets/pull/11".to_string(),
            description: String::new(),
            merged_at: None,
            comments: Some(CommentSummary::empty()),
        }
    }

    #[test]
    fn test_format_list_table() {
        let report = ListReport {
            repository: "acme/widgets".to_string(),
            days_searched: 7,
            total_prs: 1,
            pull_requests: vec![PullRequestSummary {
                number: 10,
                title: "Fix bug".to_string(),
                author: "octocat".to_string(),
            }],
        };

        let result = format_list_table(&report, RenderOptions::plain());
        let lines: Vec<&str> = result.lines().collect();

        assert_eq!(lines[0], "merged PRs in acme/widgets (last 7 days)");
        assert!(lines[1].contains("title"));
        assert!(lines[2].contains("10"));
        assert!(lines[2].contains("Fix bug"));
        assert!(lines[2].contains("octocat"));
    }

    #[test]
    fn test_format_list_table_empty() {
        let report = ListReport {
            repository: "acme/widgets".to_string(),
            days_searched: 7,
            total_prs: 0,
            pull_requests: vec![],
        };

        let result = format_list_table(&report, RenderOptions::plain());
        assert_eq!(
            result,
            "merged PRs in acme/widgets (last 7 days)\nno merged pull requests found"
        );
    }

    #[test]
    fn test_format_detail_merged() {
        let result = format_detail(&merged_record(), RenderOptions::plain());

        assert!(result.starts_with("pr #10 details"));
        assert!(result.contains("merged at  2024-03-12 17:30"));
        assert!(result.contains("status  merged"));
        assert!(result.contains("description\nFixes [the] crash\n[2Jsecond line"));
        assert!(!result.contains('\u{1b}'));
        assert!(result.contains("comments (showing 1 of 7)"));
        assert!(result.contains("LGTM"));
    }

    #[test]
    fn test_format_detail_open_without_description_or_comments() {
        let result = format_detail(&open_record(), RenderOptions::plain());

        assert!(!result.contains("merged at"));
        assert!(result.contains("no description provided"));
        assert!(result.contains("no comments found"));
    }

    #[test]
    fn test_format_details_summary() {
        let records = vec![merged_record(), open_record()];
        let result = format_details_summary("acme/widgets", 7, &records, RenderOptions::plain());

        assert!(result.starts_with("PR summary for acme/widgets (last 7 days)"));
        assert!(result.contains("2024-03-12 17:30"));
        assert!(result.contains("Not merged"));
        assert!(result.contains("total PRs: 2"));
        assert!(result.contains("===== PR #10: Fix bug ====="));
        assert!(result.contains("===== PR #11: Add feature =====\nno description provided"));
    }
}
