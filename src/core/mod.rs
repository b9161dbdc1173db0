pub mod cache;
pub mod engine;
pub mod smoothing;
pub mod trie;
pub mod types;
