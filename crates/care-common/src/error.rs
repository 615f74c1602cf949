//! Error types shared across the OpenCare crates

use thiserror::Error;

/// Errors surfaced by outbound repository ports.
///
/// Domain crates wrap these in their own error enums; the portal maps a
/// repository failure to a retriable gateway error rather than crashing
/// the session.
#[derive(Error, Debug, Clone)]
pub enum RepositoryError {
    #[error("entity not found")]
    NotFound,

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("query error: {0}")]
    QueryError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}
