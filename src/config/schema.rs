use serde::Deserialize;

use crate::error::{PulseError, Result};

pub const DEFAULT_FILE_PREFIX: &str = "pr-pulse";
pub const DEFAULT_BATCH_SIZE: usize = 8;
pub const DEFAULT_GENAI_MODEL: &str = "gemini-2.0-flash";

/// Runtime settings, read from the environment once at startup and passed
/// to every command that needs them.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// GitHub personal access token (`GITHUB_TOKEN`).
    pub github_token: Option<String>,

    /// Gemini API key (`GENAI_API_KEY`).
    pub genai_api_key: Option<String>,

    /// Slack incoming webhook URL (`SLACK_WEBHOOK_URL`).
    pub slack_webhook_url: Option<String>,

    #[serde(default)]
    pub verbose: bool,

    /// Prefix for files written with `--write`.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Maximum number of detail requests in flight at once.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_genai_model")]
    pub genai_model: String,
}

fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_genai_model() -> String {
    DEFAULT_GENAI_MODEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            genai_api_key: None,
            slack_webhook_url: None,
            verbose: false,
            file_prefix: default_file_prefix(),
            batch_size: default_batch_size(),
            genai_model: default_genai_model(),
        }
    }
}

impl Config {
    pub fn github_token(&self) -> Result<&str> {
        non_empty(self.github_token.as_deref()).ok_or_else(|| {
            PulseError::Authentication(
                "GitHub token not provided (use --token or set GITHUB_TOKEN)".to_string(),
            )
        })
    }

    pub fn genai_api_key(&self) -> Result<&str> {
        non_empty(self.genai_api_key.as_deref()).ok_or_else(|| {
            PulseError::Authentication(
                "Gemini API key not provided (use --api-key or set GENAI_API_KEY)".to_string(),
            )
        })
    }

    pub fn slack_webhook_url(&self) -> Result<&str> {
        non_empty(self.slack_webhook_url.as_deref()).ok_or_else(|| {
            PulseError::Authentication(
                "Slack webhook URL not provided (use --webhook-url or set SLACK_WEBHOOK_URL)"
                    .to_string(),
            )
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
