use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning a data source into a `RiskTable`.
///
/// Every variant is fatal at startup: the dashboard is never served over a
/// partially loaded or schema-invalid table.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("CSV is missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Line {line}: column {column} is not numeric: {value:?}")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Malformed CSV: {0}")]
    Csv(String),
}

impl LoadError {
    /// Column names reported by a schema failure, empty for other variants.
    pub fn missing_columns(&self) -> &[String] {
        match self {
            LoadError::Schema { missing } => missing,
            _ => &[],
        }
    }
}
