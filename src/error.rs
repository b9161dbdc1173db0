// File: src/error.rs
use thiserror::Error;

/// Errors surfaced by the predictor engine and its collaborators.
#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or truncated trie bytes.
    #[error("could not decode trie: {0}")]
    Decode(#[source] bincode::Error),

    #[error("could not encode trie: {0}")]
    Encode(#[source] bincode::Error),

    #[error("invalid configuration file: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("corpus line {line}: {reason}")]
    Corpus { line: usize, reason: String },

    /// An evaluation metric whose denominator is zero.
    #[error("metric is undefined: {0}")]
    UndefinedMetric(&'static str),
}

pub type Result<T> = std::result::Result<T, PredictorError>;
