//! Server-level errors

use crate::db::repository::RepoError;
use crate::gateway::GatewayError;
use thiserror::Error;

/// Errors during server bootstrap and run
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] RepoError),

    /// Operator error: misconfigured payment provider is fatal at startup
    #[error("Gateway configuration error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;
