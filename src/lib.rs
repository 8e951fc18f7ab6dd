pub mod commands;
pub mod config;
pub mod error;
pub mod fetch;
pub mod genai;
pub mod github;
pub mod logging;
pub mod output;
pub mod report;
pub mod slack;
