//! # Error Types

use crate::types::TokenId;

/// Errors from wordforge operations.
#[derive(Debug, thiserror::Error)]
pub enum WordforgeError {
    /// A configuration value was rejected.
    ///
    /// Unknown normalization form names, invalid pre-tokenizer patterns,
    /// vocab sizes too small to hold the reserved ids, and similar.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Training was requested, but the corpus produced no spans.
    #[error("training corpus produced no spans")]
    EmptyCorpus,

    /// A post-processing template referenced an unknown special token,
    /// or could not be parsed.
    #[error("template error: {0}")]
    Template(String),

    /// An id outside the vocabulary was passed to a decode operation.
    #[error("unknown token id: {id}")]
    UnknownId {
        /// The offending id.
        id: TokenId,
    },

    /// Training was cancelled through a [`crate::training::CancelToken`].
    #[error("training was cancelled")]
    Cancelled,

    /// A persisted tokenizer document is inconsistent.
    #[error("invalid tokenizer document: {0}")]
    Document(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for wordforge operations.
pub type WFResult<T> = core::result::Result<T, WordforgeError>;

impl WordforgeError {
    /// Build a [`WordforgeError::Config`] from anything printable.
    pub fn config<S: core::fmt::Display>(msg: S) -> Self {
        Self::Config(msg.to_string())
    }

    /// Build a [`WordforgeError::Template`] from anything printable.
    pub fn template<S: core::fmt::Display>(msg: S) -> Self {
        Self::Template(msg.to_string())
    }

    /// Build a [`WordforgeError::Document`] from anything printable.
    pub fn document<S: core::fmt::Display>(msg: S) -> Self {
        Self::Document(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            WordforgeError::config("bad form").to_string(),
            "invalid configuration: bad form"
        );
        assert_eq!(
            WordforgeError::UnknownId { id: 42 }.to_string(),
            "unknown token id: 42"
        );
        assert_eq!(
            WordforgeError::EmptyCorpus.to_string(),
            "training corpus produced no spans"
        );
    }

    #[test]
    fn test_io_conversion() {
        let err: WordforgeError = std::io::Error::other("boom").into();
        assert!(matches!(err, WordforgeError::Io(_)));
    }
}
