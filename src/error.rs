//! Error types for hyperlsh.

use thiserror::Error;

/// Errors that can occur during index construction or search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LshError {
    /// Invalid probabilities, shingle size, or an empty buffer.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A vector or code does not have the configured length.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// `search` called before a successful `preprocess`.
    #[error("index is empty (preprocess has not completed)")]
    EmptyIndex,

    /// The search guard's cancellation flag was raised.
    #[error("search cancelled")]
    Cancelled,

    /// The search guard's deadline passed.
    #[error("search deadline exceeded")]
    DeadlineExceeded,
}

impl LshError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn check_dim(expected: usize, got: usize) -> Result<()> {
        if expected == got {
            Ok(())
        } else {
            Err(Self::DimensionMismatch { expected, got })
        }
    }
}

pub type Result<T> = std::result::Result<T, LshError>;
