//! Error types for the mapping library.

use thiserror::Error;

use crate::core::SqlType;
use crate::typemap::TargetType;

/// Main error type for mapping operations.
#[derive(Error, Debug)]
pub enum MapError {
    /// No registered map for the requested destination type.
    #[error("Missing type map configuration for destination type {destination}")]
    UnconfiguredMapping { destination: &'static str },

    /// A bound column value cannot be converted to its destination property.
    #[error(
        "Cannot convert column '{column}' ({source_type}) to {destination}.{path} ({target_type})"
    )]
    Coercion {
        destination: &'static str,
        path: String,
        column: String,
        source_type: SqlType,
        target_type: TargetType,
    },

    /// A member override produced a value of the wrong type.
    #[error("Override for {destination}.{path} produced {produced}, expected {expected}")]
    Override {
        destination: &'static str,
        path: String,
        produced: SqlType,
        expected: TargetType,
    },

    /// Configuration error (bad override path, invalid options, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The row source failed or was read in the wrong state.
    #[error("Row source error: {0}")]
    Source(String),

    /// A column ordinal past the end of the row.
    #[error("Column ordinal {ordinal} out of range (field count {field_count})")]
    OrdinalOutOfRange { ordinal: usize, field_count: usize },

    /// IO error (options file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Broken internal invariant.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MapError {
    /// Create a Source error.
    pub fn row_source(message: impl Into<String>) -> Self {
        MapError::Source(message.into())
    }

    /// Create a Config error.
    pub fn config(message: impl Into<String>) -> Self {
        MapError::Config(message.into())
    }

    /// Whether this error came from value conversion rather than configuration
    /// or the row source.
    pub fn is_coercion(&self) -> bool {
        matches!(self, MapError::Coercion { .. } | MapError::Override { .. })
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for mapping operations.
pub type Result<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercion_message_names_column_and_path() {
        let err = MapError::Coercion {
            destination: "Dto",
            path: "Inner.Count".to_string(),
            column: "Inner.Count".to_string(),
            source_type: SqlType::String,
            target_type: TargetType::scalar(SqlType::I32),
        };
        let msg = err.to_string();
        assert!(msg.contains("'Inner.Count'"));
        assert!(msg.contains("Dto.Inner.Count"));
        assert!(msg.contains("string"));
        assert!(err.is_coercion());
    }

    #[test]
    fn test_format_detailed_includes_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.yaml");
        let err = MapError::from(io);
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: IO error"));
        assert!(!err.is_coercion());
    }
}
