pub mod gemini;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{PulseError, Result};

pub use gemini::{GeminiClient, GenerationConfig, DEFAULT_BASE_URL};

/// Callback fed each streamed text fragment.
pub type OnChunk<'a> = dyn FnMut(&str) + Send + 'a;

/// A model that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate the full response in one request.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Stream the response. `on_chunk` sees each fragment as it arrives; the
    /// concatenation is returned.
    async fn generate_stream(
        &self,
        prompt: &str,
        on_chunk: &mut OnChunk<'_>,
    ) -> Result<String>;
}

fn stats_field<'a>(input: &'a Value, key: &str) -> Result<&'a Value> {
    input
        .get("stats")
        .and_then(|stats| stats.get(key))
        .ok_or_else(|| PulseError::InvalidInput(format!("missing '{}' key in input file", key)))
}

/// Build the report prompt for a `get details` JSON document.
pub fn build_report_prompt(input: &Value) -> Result<String> {
    let repository = match stats_field(input, "repository")? {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let days = stats_field(input, "days_analyzed")?;

    Ok(format!(
        "You are an engineering lead writing a short activity report for the \
         {repository} repository covering the last {days} days of merged pull requests.\n\
         \n\
         Using the JSON data below, write a markdown report with these sections:\n\
         ## Overview\n\
         A few sentences on the overall volume and direction of the work.\n\
         ## Highlights\n\
         The most significant changes, each as a bullet linking to its pull request.\n\
         ## Themes\n\
         Recurring areas of work such as fixes, features, refactoring, docs or tooling.\n\
         ## Contributors\n\
         Who contributed and what they focused on.\n\
         \n\
         Keep it concise and factual. Only mention pull requests present in the data.\n\
         \n\
         Data:\n\
         {input}\n",
        repository = repository,
        days = days,
        input = input,
    ))
}
