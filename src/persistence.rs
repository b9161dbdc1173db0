// File: src/persistence.rs
use crate::config::PredictorConfig;
use crate::core::engine::PredictiveIndex;
use crate::core::trie::TrieNode;
use crate::error::{PredictorError, Result};
use bincode::Options;
use log::info;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Deepest node chain accepted in a trie file. Words are far shorter; the cap
/// keeps decoding and teardown of hostile input shallow.
pub const MAX_DEPTH: usize = 1024;
/// Upper bound on a whole trie file.
const MAX_TRIE_BYTES: u64 = 1 << 30;
/// Upper bound on one node record, which bounds a single symbol.
const MAX_RECORD_BYTES: u64 = 1 << 16;

/// The trie file is a single recursive record
/// `{symbol, frequency: i64, is_leaf, children}` in fixed-width little-endian
/// bincode, with no header. Children are written in their in-memory
/// (frequency-sorted) order and read back without re-sorting.
fn options() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding().reject_trailing_bytes()
}

fn codec() -> impl Options {
    options().with_limit(MAX_TRIE_BYTES)
}

pub fn encode(index: &PredictiveIndex) -> Result<Vec<u8>> {
    encode_node(index.root())
}

pub fn encode_node(root: &TrieNode) -> Result<Vec<u8>> {
    check_depth(root)?;
    codec().serialize(root).map_err(PredictorError::Encode)
}

fn check_depth(root: &TrieNode) -> Result<()> {
    if root.depth() > MAX_DEPTH {
        return Err(PredictorError::Encode(codec_error(format!(
            "trie is deeper than {} levels",
            MAX_DEPTH
        ))));
    }
    Ok(())
}

fn codec_error(message: String) -> bincode::Error {
    Box::new(bincode::ErrorKind::Custom(message))
}

// Fields are read one at a time from a shared cursor, so the trailing check
// happens once in `read_tree` instead.
fn field<T: DeserializeOwned>(input: &mut &[u8]) -> bincode::Result<T> {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(MAX_RECORD_BYTES)
        .deserialize_from(input)
}

/// One node header as laid out on the wire, followed by its children.
fn read_record(input: &mut &[u8]) -> bincode::Result<(TrieNode, u64)> {
    let symbol: String = field(input)?;
    let frequency: i64 = field(input)?;
    let is_leaf: bool = field(input)?;
    let child_count: u64 = field(input)?;
    Ok((TrieNode { symbol, frequency, is_leaf, children: Vec::new() }, child_count))
}

/// Rebuilds the tree from its pre-order records with an explicit stack, so
/// nesting depth never reaches the call stack.
fn read_tree(mut input: &[u8]) -> bincode::Result<TrieNode> {
    if input.len() as u64 > MAX_TRIE_BYTES {
        return Err(Box::new(bincode::ErrorKind::SizeLimit));
    }
    // Each entry is a node still collecting children and how many remain.
    let mut stack = vec![read_record(&mut input)?];
    let root = loop {
        let Some((_, remaining)) = stack.last_mut() else {
            return Err(codec_error("empty node stack".to_string()));
        };
        if *remaining > 0 {
            *remaining -= 1;
            if stack.len() >= MAX_DEPTH {
                return Err(codec_error(format!("trie is deeper than {} levels", MAX_DEPTH)));
            }
            stack.push(read_record(&mut input)?);
            continue;
        }
        let Some((node, _)) = stack.pop() else {
            return Err(codec_error("empty node stack".to_string()));
        };
        match stack.last_mut() {
            Some((parent, _)) => parent.children.push(node),
            None => break node,
        }
    };
    if !input.is_empty() {
        return Err(codec_error(format!("{} trailing bytes", input.len())));
    }
    Ok(root)
}

/// Restores an index from trie bytes. The vocabulary is re-derived from the
/// top two levels exactly as a fresh build does.
pub fn decode(bytes: &[u8], config: PredictorConfig) -> Result<PredictiveIndex> {
    let root = read_tree(bytes).map_err(PredictorError::Decode)?;
    Ok(PredictiveIndex::from_root(root, config))
}

pub fn save_to_disk(index: &PredictiveIndex, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    // Write next to the target and rename, so readers never see a half file.
    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        check_depth(index.root())?;
        let mut writer = BufWriter::new(temp_file.as_file());
        codec().serialize_into(&mut writer, index.root()).map_err(PredictorError::Encode)?;
        writer.flush()?;
    }

    temp_file.persist(path).map_err(|e| PredictorError::Io(e.error))?;
    info!("saved trie ({} nodes) to {}", index.root().node_count(), path.display());
    Ok(())
}

pub fn load_from_disk(path: &Path, config: PredictorConfig) -> Result<PredictiveIndex> {
    let bytes = fs::read(path)?;
    let index = decode(&bytes, config)?;
    info!("loaded trie ({} nodes) from {}", index.root().node_count(), path.display());
    Ok(index)
}
