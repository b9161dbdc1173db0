// src/lib.rs
//! Aksara prediction engine for a soft keyboard: a suffix-indexed frequency
//! trie with multi-length ranked retrieval, a backoff probability model, a
//! prediction cache and a binary trie format.

pub mod config;
pub mod core;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod persistence;

pub use crate::config::PredictorConfig;
pub use crate::core::engine::PredictiveIndex;
pub use crate::core::types::{AksaraSequence, WeightedWord, OOV_MARKER, START_MARKER};
pub use crate::error::{PredictorError, Result};

/// Builds an index from persisted trie bytes.
pub fn construct(bytes: &[u8]) -> Result<PredictiveIndex> {
    persistence::decode(bytes, PredictorConfig::default())
}
