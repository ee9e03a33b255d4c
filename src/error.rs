//! Error types for the housing data preparation pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PrepError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PrepError {
    /// An expected column is absent from the table
    #[error("Schema mismatch: expected column '{0}' is absent")]
    SchemaMismatch(String),

    /// A field could not be coerced to the numeric type a stage needs
    #[error("Type conversion failed for column '{column}': {reason}")]
    TypeConversion { column: String, reason: String },

    /// A target bin is too small to be split at the requested ratio
    #[error("Insufficient stratum size: bin {bin} has {members} rows, at least {required} required")]
    InsufficientStratumSize {
        bin: usize,
        members: usize,
        required: usize,
    },

    #[error("Missing values in column '{0}'")]
    MissingValues(String),

    #[error("Unmapped code {code} in column '{column}'")]
    UnmappedCode { column: String, code: i64 },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for PrepError {
    fn from(err: polars::error::PolarsError) -> Self {
        PrepError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PrepError {
    fn from(err: serde_json::Error) -> Self {
        PrepError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for PrepError {
    fn from(err: toml::de::Error) -> Self {
        PrepError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PrepError::SchemaMismatch("latitude".to_string());
        assert_eq!(
            err.to_string(),
            "Schema mismatch: expected column 'latitude' is absent"
        );
    }

    #[test]
    fn test_stratum_error_display() {
        let err = PrepError::InsufficientStratumSize {
            bin: 3,
            members: 1,
            required: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stratum size: bin 3 has 1 rows, at least 5 required"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PrepError = io_err.into();
        assert!(matches!(err, PrepError::IoError(_)));
    }
}
