// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

/// A single grapheme cluster, treated as one indivisible unit.
pub type Aksara = String;

/// Marks the start of every word. Word-initial statistics live under it.
pub const START_MARKER: &str = "@";

/// Reserved vocabulary entry that carries the probability of unseen aksaras.
pub const OOV_MARKER: &str = "<unk>";

/// An ordered sequence of aksaras.
///
/// Two sequences are equal when their concatenated text is equal, so
/// `["क", "ा"]` and `["का"]` compare (and hash) the same.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AksaraSequence {
    aksaras: Vec<Aksara>,
}

impl AksaraSequence {
    pub fn new(aksaras: Vec<Aksara>) -> Self {
        Self { aksaras }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Splits `text` on whitespace, one aksara per token. This is the
    /// corpus line format.
    pub fn from_spaced(text: &str) -> Self {
        Self::new(text.split_whitespace().map(str::to_owned).collect())
    }

    /// One aksara per Unicode scalar. Only meaningful for scripts where every
    /// cluster is a single code point (tests, ASCII demos).
    pub fn from_chars(text: &str) -> Self {
        Self::new(text.chars().map(String::from).collect())
    }

    pub fn len(&self) -> usize {
        self.aksaras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aksaras.is_empty()
    }

    pub fn as_slice(&self) -> &[Aksara] {
        &self.aksaras
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Aksara> {
        self.aksaras.iter()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.aksaras.get(index).map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }

    /// Copies out the aksaras in `range`. Out-of-bounds ends are clamped.
    pub fn slice(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        Self::new(self.aksaras[start..end].to_vec())
    }

    /// The sequence starting at `start`.
    pub fn suffix(&self, start: usize) -> Self {
        self.slice(start..self.len())
    }

    pub fn concat(&self, other: &AksaraSequence) -> Self {
        let mut aksaras = self.aksaras.clone();
        aksaras.extend(other.aksaras.iter().cloned());
        Self::new(aksaras)
    }

    pub fn push(&mut self, aksara: impl Into<Aksara>) {
        self.aksaras.push(aksara.into());
    }

    /// The concatenated text, used for equality, hashing and cache keys.
    pub fn text(&self) -> String {
        self.aksaras.concat()
    }

    /// Whether `prefix` matches this sequence element by element from the start.
    pub fn starts_with(&self, prefix: &AksaraSequence) -> bool {
        self.aksaras.starts_with(&prefix.aksaras)
    }

    pub fn into_vec(self) -> Vec<Aksara> {
        self.aksaras
    }
}

impl PartialEq for AksaraSequence {
    fn eq(&self, other: &Self) -> bool {
        // Avoid allocating when the element lists already agree.
        self.aksaras == other.aksaras || self.text() == other.text()
    }
}

impl Eq for AksaraSequence {}

impl Hash for AksaraSequence {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text().hash(state);
    }
}

impl fmt::Display for AksaraSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for aksara in &self.aksaras {
            f.write_str(aksara)?;
        }
        Ok(())
    }
}

impl From<Vec<Aksara>> for AksaraSequence {
    fn from(aksaras: Vec<Aksara>) -> Self {
        Self::new(aksaras)
    }
}

impl From<&[&str]> for AksaraSequence {
    fn from(aksaras: &[&str]) -> Self {
        Self::new(aksaras.iter().map(|a| a.to_string()).collect())
    }
}

impl FromIterator<Aksara> for AksaraSequence {
    fn from_iter<I: IntoIterator<Item = Aksara>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AksaraSequence {
    type Item = &'a Aksara;
    type IntoIter = std::slice::Iter<'a, Aksara>;

    fn into_iter(self) -> Self::IntoIter {
        self.aksaras.iter()
    }
}

/// A sequence with its corpus frequency. Ranking may rescale `frequency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedWord {
    pub aksaras: AksaraSequence,
    pub frequency: i64,
}

impl WeightedWord {
    pub fn new(aksaras: AksaraSequence, frequency: i64) -> Self {
        Self { aksaras, frequency }
    }

    pub fn len(&self) -> usize {
        self.aksaras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aksaras.is_empty()
    }
}
