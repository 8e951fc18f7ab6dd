mod schema;

pub use schema::{Config, DEFAULT_BATCH_SIZE, DEFAULT_FILE_PREFIX, DEFAULT_GENAI_MODEL};

use crate::error::{PulseError, Result};

/// Values given on the command line that take precedence over the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub github_token: Option<String>,
    pub genai_api_key: Option<String>,
    pub slack_webhook_url: Option<String>,
    pub verbose: bool,
}

/// Load configuration from the process environment.
///
/// A `.env` file in the working directory is read first if present; variables
/// already set in the environment win over it.
///
/// # Errors
///
/// Returns an error if a variable is present but cannot be parsed
/// (e.g. `BATCH_SIZE=eight`).
pub fn load_config() -> Result<Config> {
    let _ = dotenvy::dotenv();
    from_env()
}

/// Like [`load_config`] without touching `.env`.
pub fn from_env() -> Result<Config> {
    envy::from_env::<Config>().map_err(|e| PulseError::Config(e.to_string()))
}

impl Config {
    /// Apply command-line overrides on top of the loaded values.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if overrides.github_token.is_some() {
            self.github_token = overrides.github_token;
        }
        if overrides.genai_api_key.is_some() {
            self.genai_api_key = overrides.genai_api_key;
        }
        if overrides.slack_webhook_url.is_some() {
            self.slack_webhook_url = overrides.slack_webhook_url;
        }
        self.verbose |= overrides.verbose;
        self
    }
}
