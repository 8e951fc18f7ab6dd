use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the library layer. The command layer renders them and
/// picks the exit code.
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("{what} not found: {message}")]
    NotFound { what: String, message: String },

    #[error("query failed for {repo}: {message} (query: {query})")]
    Query {
        repo: String,
        query: String,
        message: String,
    },

    #[error("failed to fetch PR #{number}: {source}")]
    BatchFetch {
        number: u64,
        #[source]
        source: Box<PulseError>,
    },

    #[error("failed to write {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("generative model request failed ({status}): {message}")]
    GenAi { status: u16, message: String },

    #[error("webhook rejected message ({status}): {body}")]
    Webhook { status: u16, body: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl PulseError {
    pub fn not_found(what: impl Into<String>, message: impl ToString) -> Self {
        PulseError::NotFound {
            what: what.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PulseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_fetch_message_includes_item() {
        let err = PulseError::BatchFetch {
            number: 42,
            source: Box::new(PulseError::not_found("pr #42 in acme/widgets", "Not Found")),
        };
        assert_eq!(
            err.to_string(),
            "failed to fetch PR #42: pr #42 in acme/widgets not found: Not Found"
        );
    }

    #[test]
    fn test_query_message_carries_diagnostics() {
        let err = PulseError::Query {
            repo: "acme/widgets".to_string(),
            query: "repo:acme/widgets is:pr".to_string(),
            message: "Validation Failed".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("acme/widgets"));
        assert!(msg.contains("query: repo:acme/widgets is:pr"));
    }
}
