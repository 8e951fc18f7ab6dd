use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

use crate::config::Config;
use crate::fetch::{fetch_details, normalize_all};
use crate::github::{PullRequestSource, RepoId};
use crate::output::{
    format_detail, format_details_summary, format_list_table, to_json, write_output,
    OutputFormat, RenderOptions,
};
use crate::report::{details_report, list_report, normalize};

/// How a `get` command renders and where it saves JSON.
#[derive(Debug, Clone)]
pub struct GetOptions {
    pub format: OutputFormat,
    /// Directory to save JSON output to. Ignored for table output.
    pub write_dir: Option<PathBuf>,
    pub render: RenderOptions,
    pub today: NaiveDate,
}

impl GetOptions {
    fn save(&self, config: &Config, kind: &str, json: &str) -> Result<()> {
        if self.format != OutputFormat::Json {
            return Ok(());
        }
        let Some(dir) = &self.write_dir else {
            return Ok(());
        };

        let prefix = format!("{}-{}", config.file_prefix, kind);
        let path = write_output(dir, &prefix, "json", json, self.today)?;
        eprintln!("wrote {}", path.display());
        Ok(())
    }
}

/// `get list`: merged PRs in the window, without fetching details.
pub async fn list(
    source: &dyn PullRequestSource,
    config: &Config,
    repo: &RepoId,
    days: u32,
    opts: &GetOptions,
) -> Result<String> {
    let results = source
        .search_merged(repo, opts.today, days)
        .await
        .with_context(|| format!("Failed to search merged PRs in {}", repo))?;

    let report = list_report(repo, days, &results);
    tracing::info!(repo = %repo, total = report.total_prs, "listed merged PRs");

    match opts.format {
        OutputFormat::Json => {
            let json = to_json(&report)?;
            opts.save(config, "list", &json)?;
            Ok(json)
        }
        OutputFormat::Table => Ok(format_list_table(&report, opts.render)),
    }
}

/// `get detail`: one PR with its first comments.
pub async fn detail(
    source: &dyn PullRequestSource,
    config: &Config,
    repo: &RepoId,
    number: u64,
    opts: &GetOptions,
) -> Result<String> {
    let detail = source
        .get_detail(repo, number)
        .await
        .with_context(|| format!("Failed to fetch PR #{} in {}", number, repo))?;

    let record = normalize(source, repo, detail, true)
        .await
        .with_context(|| format!("Failed to fetch comments for PR #{}", number))?;

    match opts.format {
        OutputFormat::Json => {
            let json = to_json(&record)?;
            opts.save(config, "detail", &json)?;
            Ok(json)
        }
        OutputFormat::Table => Ok(format_detail(&record, opts.render)),
    }
}

/// `get details`: every merged PR in the window with details, comments and stats.
pub async fn details(
    source: &dyn PullRequestSource,
    config: &Config,
    repo: &RepoId,
    days: u32,
    opts: &GetOptions,
) -> Result<String> {
    let results = source
        .search_merged(repo, opts.today, days)
        .await
        .with_context(|| format!("Failed to search merged PRs in {}", repo))?;

    let numbers = results.numbers();
    tracing::info!(repo = %repo, count = numbers.len(), "fetching PR details");

    let fetched = fetch_details(source, repo, &numbers, config.batch_size)
        .await
        .context("Failed to fetch PR details")?;
    let include_comments = opts.format == OutputFormat::Json;
    let records = normalize_all(source, repo, fetched, include_comments, config.batch_size)
        .await
        .context("Failed to fetch PR comments")?;

    let report = details_report(repo, days, records, opts.today);

    match opts.format {
        OutputFormat::Json => {
            let json = to_json(&report)?;
            opts.save(config, "summary", &json)?;
            Ok(json)
        }
        OutputFormat::Table => Ok(format_details_summary(
            &report.stats.repository,
            days,
            &report.pull_requests,
            opts.render,
        )),
    }
}
