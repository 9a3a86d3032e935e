//! Error types for lumi

use thiserror::Error;

/// lumi error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input record has no per-bunch detail. Aborts the whole pass.
    #[error(
        "not enough fields in input line ({found} < {required}); \
         was the export produced with per-bunch crossing data (--xing)?\n{line}"
    )]
    MissingCrossingData {
        /// Number of tokens found on the line.
        found: usize,
        /// Minimum number of tokens a record needs.
        required: usize,
        /// The offending line, verbatim.
        line: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_crossing_data_surfaces_line() {
        let err = Error::MissingCrossingData {
            found: 10,
            required: 15,
            line: "273158:4915,1:1,05/13/16".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("10 < 15"));
        assert!(msg.contains("--xing"));
        assert!(msg.ends_with("273158:4915,1:1,05/13/16"));
    }
}
