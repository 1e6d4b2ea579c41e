//! Error types for the federation core

use thiserror::Error;

/// Result type alias using FederationError
pub type Result<T> = std::result::Result<T, FederationError>;

/// Errors that can occur in the federation core
#[derive(Error, Debug)]
pub enum FederationError {
    /// RSA key generation or encoding failed at startup
    #[error("key initialization failed: {0}")]
    KeyInit(String),

    /// Crypto library error while producing a signed statement
    #[error("statement signing failed: {0}")]
    Sign(String),

    /// A JWT could not be parsed into header and claims
    #[error("malformed JWT: {0}")]
    InvalidJwt(String),

    /// No subordinate record exists for the requested entity
    #[error("unknown subordinate: {0}")]
    UnknownSubordinate(String),

    /// An inbound trust mark names a different subject than this entity
    #[error("trust mark subject mismatch: expected '{expected}', got '{actual}'")]
    SubjectMismatch { expected: String, actual: String },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FederationError {
    fn from(err: serde_json::Error) -> Self {
        FederationError::Serialization(err.to_string())
    }
}
