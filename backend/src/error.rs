//! Error types for data loading and configuration.
//!
//! Query, geo and weather lookups never fail for foreseeable inputs; absence of
//! data is expressed with empty collections or `Option`. The variants here cover
//! the boundaries where something concrete went wrong (a file that could not be
//! read, a payload that is not JSON) so callers can decide whether to degrade
//! to an empty state or to surface the problem.

use std::path::PathBuf;

/// Result type for data loading operations.
pub type DataResult<T> = Result<T, DataError>;

/// Error type for dataset, payload and configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// None of the candidate locations held a file.
    #[error("Source not found: tried {tried:?}")]
    SourceNotFound { tried: Vec<PathBuf> },

    /// The file exists but could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tabular source could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A column required to build any record is missing.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// The weather payload is not valid JSON or lacks the expected structure.
    #[error("Payload error: {0}")]
    Payload(String),

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DataError {
    /// Create an I/O error bound to the path being read.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the error only means "there is no data here".
    pub fn is_absence(&self) -> bool {
        matches!(self, Self::SourceNotFound { .. } | Self::MissingColumn(_))
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_not_found_lists_candidates() {
        let err = DataError::SourceNotFound {
            tried: vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")],
        };
        let msg = err.to_string();
        assert!(msg.contains("a.csv"));
        assert!(msg.contains("b.csv"));
        assert!(err.is_absence());
    }

    #[test]
    fn test_io_error_is_not_absence() {
        let err = DataError::io(
            "venues.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_absence());
        assert!(err.to_string().contains("venues.csv"));
    }

    #[test]
    fn test_json_error_converts_to_payload() {
        let err: DataError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, DataError::Payload(_)));
    }
}
