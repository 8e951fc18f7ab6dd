use anyhow::{Context, Result};
use std::path::Path;

use crate::slack::{format_report_text, report_blocks, WebhookClient};

/// `share slack`: post a report file to a Slack webhook.
pub async fn slack(client: &WebhookClient, input: &Path, blocks: bool) -> Result<()> {
    let report = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file {}", input.display()))?;

    tracing::info!(input = %input.display(), blocks, "sharing report to Slack");

    let sent = if blocks {
        client.send_blocks(report_blocks(&report)).await
    } else {
        client.send_text(&format_report_text(&report)).await
    };
    sent.context("Failed to send message to Slack")?;

    eprintln!("message sent to Slack");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_share_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"text": "*PR Pulse Report*\n\n*Overview*"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.txt");
        std::fs::write(&input, "## Overview").unwrap();

        slack(&WebhookClient::new(&server.uri()), &input, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_share_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_blocks"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report.txt");
        std::fs::write(&input, "hello").unwrap();

        let err = slack(&WebhookClient::new(&server.uri()), &input, true)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to send message to Slack");
        assert!(format!("{:#}", err).contains("invalid_blocks"));
    }
}
