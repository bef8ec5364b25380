//! Error types for catalog metadata operations.

use thiserror::Error;

/// Main error type for metadata reads and DDL reconstruction.
#[derive(Error, Debug)]
pub enum MetaError {
    /// A catalog query failed at the driver level.
    #[error("Catalog query failed: {0}")]
    Catalog(String),

    /// The connected product could not be mapped to a known dialect.
    #[error("Unsupported database product: {product} {version}")]
    UnknownProduct { product: String, version: String },

    /// A synonym points at a table that does not exist (or is not visible).
    ///
    /// This is the one metadata failure that is rethrown to the caller:
    /// a dangling synonym target is a correctness error, not cosmetic.
    #[error("Synonym {schema}.{name} references missing table {target}")]
    SynonymTarget {
        schema: String,
        name: String,
        target: String,
    },

    /// The connection is already executing a catalog call.
    #[error("Connection is busy with another catalog operation")]
    ConnectionBusy,

    /// IO error (format file output).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (settings).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ODBC driver error.
    #[cfg(feature = "odbc")]
    #[error("ODBC error: {0}")]
    Odbc(#[from] odbc_api::Error),
}

impl MetaError {
    /// Create a catalog failure with context about the query that failed.
    pub fn catalog(message: impl Into<String>) -> Self {
        MetaError::Catalog(message.into())
    }

    /// Format error with the full source chain.
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

/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, MetaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = MetaError::catalog("SYSCAT.SEQUENCES not found");
        assert_eq!(
            err.to_string(),
            "Catalog query failed: SYSCAT.SEQUENCES not found"
        );
    }

    #[test]
    fn test_synonym_target_error_display() {
        let err = MetaError::SynonymTarget {
            schema: "APP".to_string(),
            name: "ORDERS_ALIAS".to_string(),
            target: "APP.ORDERS".to_string(),
        };
        assert!(err.to_string().contains("ORDERS_ALIAS"));
        assert!(err.to_string().contains("APP.ORDERS"));
    }

    #[test]
    fn test_format_detailed_includes_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = MetaError::Io(io);
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: IO error"));
        assert!(detailed.contains("Caused by"));
    }
}
