//! Error types for transaction assembly.

use thiserror::Error;
use txforge_core::{CodecError, TxError};

use crate::collaborators::CollaboratorError;

/// Errors that can occur while building or sponsoring a transaction.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// A value could not be constructed or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Authorization or signing failed.
    #[error("transaction error: {0}")]
    Tx(#[from] TxError),

    /// Fee estimation or nonce lookup failed.
    #[error("collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// The requested combination of options is not allowed.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for builder operations.
pub type Result<T> = std::result::Result<T, BuilderError>;
