//! Top-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::TreeError;

/// Crate errors wrap tree errors and add configuration concerns.
#[derive(Error, Debug)]
pub enum MeldError {
    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for crate-level operations.
pub type MeldResult<T> = Result<T, MeldError>;
