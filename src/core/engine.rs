use crate::config::PredictorConfig;
use crate::core::cache::PredictionCache;
use crate::core::trie::TrieNode;
use crate::core::types::{Aksara, AksaraSequence, WeightedWord, OOV_MARKER, START_MARKER};
use crate::corpus::read_corpus;
use crate::error::Result;
use crate::persistence::load_from_disk;
use log::info;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Raw candidates kept per `(context, length)` query before reweighting.
pub const MAX_CANDIDATES: usize = 160;

/// The suffix-indexed frequency trie plus its ranking state.
///
/// The tree is immutable once built, so queries take `&self` and may run
/// from several threads. Anything that changes ranking takes `&mut self`
/// and clears the prediction cache.
pub struct PredictiveIndex {
    root: TrieNode,
    all_aksaras: Vec<Aksara>,
    config: PredictorConfig,
    cache: Mutex<PredictionCache>,
}

impl PredictiveIndex {
    /// Builds the trie from a weighted corpus.
    ///
    /// Every suffix of every word is inserted except the one starting at
    /// offset 1. Offset 0 keeps the leading start marker, so word-initial
    /// statistics live under it, while offsets >= 2 feed the mid-word
    /// statistics used for backoff.
    pub fn build(words: &[WeightedWord], config: PredictorConfig) -> Self {
        let mut root = TrieNode::root();
        for word in words {
            let aksaras = word.aksaras.as_slice();
            for start in (0..aksaras.len()).filter(|&i| i != 1) {
                root.insert(&aksaras[start..], word.frequency);
            }
        }
        let index = Self::from_root(root, config);
        info!(
            "built suffix trie from {} words: {} nodes, {} aksaras",
            words.len(),
            index.root.node_count(),
            index.all_aksaras.len()
        );
        index
    }

    /// Wraps an already built (or decoded) tree.
    pub fn from_root(root: TrieNode, config: PredictorConfig) -> Self {
        let all_aksaras = Self::vocabulary_of(&root);
        Self { root, all_aksaras, config, cache: Mutex::new(PredictionCache::new()) }
    }

    /// Builds from a training corpus file.
    pub fn from_corpus_file(path: &Path, config: PredictorConfig) -> Result<Self> {
        let words = read_corpus(path)?;
        Ok(Self::build(&words, config))
    }

    /// Restores from a persisted trie file.
    pub fn from_file(path: &Path, config: PredictorConfig) -> Result<Self> {
        load_from_disk(path, config)
    }

    /// Symbols at the root, symbols directly after the start marker, and the
    /// OOV marker.
    fn vocabulary_of(root: &TrieNode) -> Vec<Aksara> {
        let mut vocabulary: BTreeSet<Aksara> =
            root.children().iter().map(|c| c.symbol().to_owned()).collect();
        if let Some(start) = root.child(START_MARKER) {
            vocabulary.extend(start.children().iter().map(|c| c.symbol().to_owned()));
        }
        vocabulary.insert(OOV_MARKER.to_owned());
        vocabulary.into_iter().collect()
    }

    pub fn root(&self) -> &TrieNode {
        &self.root
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Every aksara seen at the top two levels, sorted, including the OOV marker.
    pub fn vocabulary(&self) -> &[Aksara] {
        &self.all_aksaras
    }

    /// Flat listing of every root-to-leaf path.
    pub fn words(&self) -> Vec<AksaraSequence> {
        self.root.collect_words()
    }

    pub fn total_frequency(&self) -> i64 {
        self.root.child_total()
    }

    pub fn lookup(&self, sequence: &AksaraSequence) -> Option<&TrieNode> {
        self.root.lookup(sequence.as_slice())
    }

    pub fn set_context_weight(&mut self, value: f64) {
        self.config.context_factor = value;
        self.cache_mut().invalidate();
    }

    pub fn set_prediction_weight(&mut self, value: f64) {
        self.config.prediction_factor = value;
        self.cache_mut().invalidate();
    }

    pub fn set_prediction_count(&mut self, budget: usize) {
        self.config.aksara_budget = budget;
        self.cache_mut().invalidate();
    }

    /// Live entries in the prediction cache.
    pub fn cache_len(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> MutexGuard<'_, PredictionCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache_mut(&mut self) -> &mut PredictionCache {
        self.cache.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// All continuations of exactly `length` aksaras after `context`, with
    /// reweighted frequencies, most likely first.
    ///
    /// Results are cached per `(length, context text)`.
    pub fn find_predictions(&self, context: &AksaraSequence, length: usize) -> Vec<WeightedWord> {
        let slot = self.lock_cache().slot(length, context.text());
        slot.get_or_init(|| self.compute_predictions(context, length)).clone()
    }

    fn compute_predictions(&self, context: &AksaraSequence, length: usize) -> Vec<WeightedWord> {
        let node = match self.root.lookup(context.as_slice()) {
            Some(node) if !node.is_leaf() => node,
            _ => return Vec::new(),
        };

        let mut candidates = node.paths_of_length(length, START_MARKER);
        candidates.sort_by(|a, b| b.1.cmp(&a.1));
        candidates.truncate(MAX_CANDIDATES);

        let weight = ((context.len() + 1) as f64).powf(self.config.context_factor)
            * (length as f64).powf(self.config.prediction_factor);
        candidates
            .into_iter()
            .map(|(aksaras, raw)| WeightedWord::new(aksaras, (raw as f64 * weight).round() as i64))
            .collect()
    }

    /// Ranks continuations of every configured length across all backoff
    /// contexts and keeps as many as fit into `aksara_budget`.
    ///
    /// Backoff contexts are the non-empty suffixes of `context`, longest first.
    /// The walk ends at the empty context, but root statistics are a last
    /// resort: they are consulted only when no suffix yields a candidate, so
    /// mid-word root counts never outrank a matched context. An index with no
    /// candidates anywhere returns an empty list. Each selected entry costs
    /// `len + 1` budget units.
    pub fn get_most_likely_predictions(
        &self,
        context: &AksaraSequence,
        aksara_budget: usize,
    ) -> Vec<AksaraSequence> {
        let backoff: Vec<AksaraSequence> = (0..context.len()).map(|i| context.suffix(i)).collect();

        let mut pool = self.gather_candidates(&backoff);
        if pool.is_empty() {
            pool = self.gather_candidates(&[AksaraSequence::empty()]);
        }
        // Stable: on ties, earlier group sizes and more specific contexts stay first.
        pool.sort_by(|a, b| b.frequency.cmp(&a.frequency));

        select_within_budget(pool, aksara_budget)
    }

    /// `get_most_likely_predictions` with the configured budget.
    pub fn predict(&self, context: &AksaraSequence) -> Vec<AksaraSequence> {
        self.get_most_likely_predictions(context, self.config.aksara_budget)
    }

    fn gather_candidates(&self, contexts: &[AksaraSequence]) -> Vec<WeightedWord> {
        let mut seen = HashSet::new();
        let mut pool = Vec::new();
        for &length in &self.config.group_sizes {
            for context in contexts {
                for candidate in self.find_predictions(context, length) {
                    if seen.insert(candidate.aksaras.text()) {
                        pool.push(candidate);
                    }
                }
            }
        }
        pool
    }
}

/// Takes candidates in order until the next one would overrun the budget or
/// the pool runs out.
fn select_within_budget(pool: Vec<WeightedWord>, aksara_budget: usize) -> Vec<AksaraSequence> {
    let mut used = 0;
    let mut selected = Vec::new();
    for candidate in pool {
        let cost = candidate.len() + 1;
        if used + cost > aksara_budget {
            break;
        }
        used += cost;
        selected.push(candidate.aksaras);
    }
    selected
}
