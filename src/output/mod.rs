pub mod file;
pub mod formatter;
pub mod table;

use serde::Serialize;

use crate::error::{PulseError, Result};

pub use file::{output_filename, write_output};
pub use formatter::{
    format_detail, format_details_summary, format_list_table, get_terminal_width,
    should_use_colors, RenderOptions,
};

/// How a `get` command prints its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Compact JSON for any report envelope.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| PulseError::InvalidInput(format!("failed to serialize report: {}", e)))
}
