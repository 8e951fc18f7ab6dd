use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;

use crate::error::{PulseError, Result};

pub const REPORT_TITLE: &str = "*PR Pulse Report*";

/// Slack rejects section text longer than this.
pub const SECTION_LIMIT: usize = 3000;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"##\s+(.+)").expect("Invalid regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("Invalid regex"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\n])\n([\*\-\d+]\.?\s)").expect("Invalid regex"));
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```([^`]+)```").expect("Invalid regex"));
static CODE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<code>(.*?)</code>").expect("Invalid regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]\((.*?)\)").expect("Invalid regex"));

/// Rewrite markdown into Slack's mrkdwn dialect.
pub fn to_mrkdwn(report: &str) -> String {
    let text = HEADING.replace_all(report, "*$1*");
    let text = BOLD.replace_all(&text, "*$1*");
    let text = LIST_ITEM.replace_all(&text, "$1\n\n$2");
    let text = CODE_FENCE.replace_all(&text, "```\n$1\n```");
    let text = CODE_TAG.replace_all(&text, "`$1`");
    LINK.replace_all(&text, "<$2|$1>").into_owned()
}

/// Plain-text message: the title followed by the converted report.
pub fn format_report_text(report: &str) -> String {
    format!("{}\n\n{}", REPORT_TITLE, to_mrkdwn(report))
}

/// Split `text` on line boundaries into pieces of at most `limit` chars.
/// A single line longer than `limit` is cut mid-line.
fn split_sections(text: &str, limit: usize) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.split('\n') {
        let mut line: Vec<char> = line.chars().collect();

        let needed = if current.is_empty() { line.len() } else { line.len() + 1 };
        if current_len + needed > limit && !current.is_empty() {
            sections.push(std::mem::take(&mut current));
            current_len = 0;
        }

        while line.len() > limit {
            let rest = line.split_off(limit);
            sections.push(line.into_iter().collect());
            line = rest;
        }

        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current_len += line.len();
        current.extend(line);
    }

    if !current.trim().is_empty() {
        sections.push(current);
    }
    sections
}

fn mrkdwn_section(text: &str) -> Value {
    json!({"type": "section", "text": {"type": "mrkdwn", "text": text}})
}

/// Block Kit rendering: a title section followed by the converted report.
pub fn report_blocks(report: &str) -> Vec<Value> {
    std::iter::once(mrkdwn_section(REPORT_TITLE))
        .chain(
            split_sections(&to_mrkdwn(report), SECTION_LIMIT)
                .iter()
                .map(|s| mrkdwn_section(s)),
        )
        .collect()
}

/// Incoming-webhook client.
pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    /// POST `payload`. Only a 200 reply counts as delivered.
    pub async fn send(&self, payload: &Value) -> Result<()> {
        tracing::debug!("posting message to webhook");

        let response = self
            .http
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| PulseError::Webhook {
                status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                body: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(PulseError::Webhook { status, body });
        }

        tracing::debug!(status, "webhook accepted message");
        Ok(())
    }

    pub async fn send_text(&self, text: &str) -> Result<()> {
        self.send(&json!({ "text": text })).await
    }

    pub async fn send_blocks(&self, blocks: Vec<Value>) -> Result<()> {
        self.send(&json!({ "blocks": blocks })).await
    }
}
