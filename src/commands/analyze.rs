use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::genai::{build_report_prompt, TextGenerator};
use crate::output::write_output;

#[derive(Debug, Clone)]
pub struct SummaryOptions {
    /// Print fragments to stdout as they arrive.
    pub stream: bool,
    /// Directory to save the report to.
    pub write_dir: Option<PathBuf>,
    pub today: NaiveDate,
}

/// `analyze summary`: turn a `get details` JSON file into a written report.
///
/// Returns the full report text. In streaming mode it has already been
/// printed by the time this returns.
pub async fn summary(
    generator: &dyn TextGenerator,
    config: &Config,
    input: &Path,
    opts: &SummaryOptions,
) -> Result<String> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file {}", input.display()))?;
    let document: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {} as JSON", input.display()))?;

    let prompt = build_report_prompt(&document)?;
    tracing::info!(input = %input.display(), model = %config.genai_model, "generating summary");

    let report = if opts.stream {
        let mut stdout = std::io::stdout();
        let mut print_chunk = |text: &str| {
            let _ = write!(stdout, "{}", text);
            let _ = stdout.flush();
        };
        let report = generator
            .generate_stream(&prompt, &mut print_chunk)
            .await
            .context("Failed to generate summary")?;
        println!();
        report
    } else {
        generator
            .generate(&prompt)
            .await
            .context("Failed to generate summary")?
    };

    if let Some(dir) = &opts.write_dir {
        let prefix = format!("{}-report", config.file_prefix);
        let path = write_output(dir, &prefix, "txt", &report, opts.today)?;
        eprintln!("wrote {}", path.display());
    }

    Ok(report)
}
