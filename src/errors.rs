//! Error types for the OCCI backend layer
//!
//! Callers tell "bad input" from "not found" from "operation failed" by the
//! variant, never by inspecting a return value. Mapping variants to a
//! transport status is left to the HTTP layer.

use thiserror::Error;

/// Main error type for backend operations
#[derive(Error, Debug)]
pub enum BackendError {
    /// A required argument was absent or blank
    #[error("Argument error: {0}")]
    Argument(String),

    /// An argument was present but of the wrong entity kind or shape
    #[error("Argument type mismatch: {0}")]
    TypeMismatch(String),

    /// Fixtures or their configuration could not be resolved
    #[error("Resource retrieval error: {0}")]
    Retrieval(String),

    /// Provider credential handshake did not yield a usable client
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Referenced identifier does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation is part of the contract but unsupported by this adapter
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Entity failed adapter-level validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External cache failure
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Upstream provider call failed
    #[error("Provider error: {0}")]
    Provider(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BackendError {
    /// Shorthand for the stub error raised by unfinished provider operations
    pub fn not_implemented(provider: &str, operation: &str) -> Self {
        Self::NotImplemented(format!("{provider}: {operation} is just a stub!"))
    }

    /// Stable label used in metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Argument(_) => "argument",
            Self::TypeMismatch(_) => "type_mismatch",
            Self::Retrieval(_) => "retrieval",
            Self::Authentication(_) => "authentication",
            Self::NotFound(_) => "not_found",
            Self::NotImplemented(_) => "not_implemented",
            Self::Validation(_) => "validation",
            Self::Config(_) => "config",
            Self::Cache(_) => "cache",
            Self::Provider(_) => "provider",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_error_names_operation() {
        let err = BackendError::not_implemented("opennebula", "compute_list");
        assert_eq!(err.kind(), "not_implemented");
        assert!(err.to_string().contains("compute_list is just a stub!"));
    }
}
