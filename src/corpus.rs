// File: src/corpus.rs
use crate::core::types::{AksaraSequence, WeightedWord, START_MARKER};
use crate::error::{PredictorError, Result};
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Parses the training/test corpus format: one word per line, aksaras
/// separated by spaces, a tab, then a non-negative frequency
/// (`अ आ इ\t42`). Blank lines and lines starting with `#` are ignored.
///
/// The start marker is prepended to every word.
pub fn parse_corpus(text: &str) -> Result<Vec<WeightedWord>> {
    let mut words = Vec::new();
    let mut skipped = 0;
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            skipped += 1;
            continue;
        }
        words.push(parse_line(line).map_err(|reason| PredictorError::Corpus { line: idx + 1, reason })?);
    }
    if skipped > 0 {
        debug!("skipped {} blank or comment lines", skipped);
    }
    Ok(words)
}

fn parse_line(line: &str) -> std::result::Result<WeightedWord, String> {
    let (aksaras, frequency) = line.split_once('\t').ok_or("missing tab separator")?;

    let frequency: i64 = frequency
        .trim()
        .parse()
        .map_err(|_| format!("invalid frequency '{}'", frequency.trim()))?;
    if frequency < 0 {
        return Err(format!("negative frequency {}", frequency));
    }

    let body = AksaraSequence::from_spaced(aksaras);
    if body.is_empty() {
        return Err("no aksaras before the tab".to_string());
    }
    let word = AksaraSequence::new(vec![START_MARKER.to_string()]).concat(&body);
    Ok(WeightedWord::new(word, frequency))
}

pub fn read_corpus(path: &Path) -> Result<Vec<WeightedWord>> {
    let text = fs::read_to_string(path)?;
    let words = parse_corpus(&text)?;
    info!("read {} corpus entries from {}", words.len(), path.display());
    Ok(words)
}
