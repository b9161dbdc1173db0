// File: src/core/smoothing.rs
//! Absolute-discount backoff model over the suffix trie, used to score the
//! index rather than to lay out the keyboard.

use crate::core::engine::PredictiveIndex;
use crate::core::types::{Aksara, AksaraSequence, OOV_MARKER, START_MARKER};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Added to the denominator at every backoff level.
pub const ALPHA: f64 = 0.49;
/// Subtracted from every observed count.
pub const BETA: f64 = 0.77;

impl PredictiveIndex {
    /// Probability of each vocabulary aksara (OOV marker included) following
    /// `context`. The values sum to 1.
    ///
    /// Starts at the longest indexed suffix of `context` and backs off one
    /// aksara at a time down to the root, discounting every level. The mass
    /// left after the root is spread evenly over the whole vocabulary.
    ///
    /// Callers looking up an aksara that is not in the vocabulary should use
    /// the OOV marker's entry.
    pub fn probabilities(&self, context: &AksaraSequence) -> HashMap<Aksara, f64> {
        let mut probs: HashMap<Aksara, f64> =
            self.vocabulary().iter().map(|a| (a.clone(), 0.0)).collect();

        let symbols = context.as_slice();
        let longest = (0..=symbols.len())
            .find(|&i| self.root().lookup(&symbols[i..]).is_some())
            .unwrap_or(symbols.len());

        let mut gamma = 1.0;
        for start in longest..=symbols.len() {
            // With offset 1 never indexed, a shorter suffix can be missing
            // even when a longer one is present.
            let Some(node) = self.root().lookup(&symbols[start..]) else {
                continue;
            };
            let total = node.child_total() as f64;
            let mut remaining = gamma;
            for child in node.children() {
                let discounted = (child.frequency() as f64 - BETA).max(0.0);
                let p = gamma * discounted / (total + ALPHA);
                *probs.entry(child.symbol().to_owned()).or_insert(0.0) += p;
                remaining -= p;
            }
            gamma = remaining;
        }

        spread_evenly(&mut probs, self.vocabulary(), gamma);
        probs
    }

    /// The `n` most probable single aksaras after `context`, excluding the
    /// start and OOV markers.
    pub fn get_model_predictions(&self, context: &AksaraSequence, n: usize) -> Vec<AksaraSequence> {
        let mut ranked: Vec<(Aksara, f64)> = self
            .probabilities(context)
            .into_iter()
            .filter(|(symbol, _)| symbol != START_MARKER && symbol != OOV_MARKER)
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0))
        });
        ranked
            .into_iter()
            .take(n)
            .map(|(symbol, _)| AksaraSequence::new(vec![symbol]))
            .collect()
    }
}

/// Adds `mass` to `vocabulary` in equal shares. The second pass hands out
/// whatever floating-point drift the first one left, shrinking the divisor
/// as it goes.
fn spread_evenly(probs: &mut HashMap<Aksara, f64>, vocabulary: &[Aksara], mut mass: f64) {
    if vocabulary.is_empty() {
        return;
    }
    let share = mass / vocabulary.len() as f64;
    for symbol in vocabulary {
        *probs.entry(symbol.clone()).or_insert(0.0) += share;
        mass -= share;
    }
    let mut left = vocabulary.len();
    for symbol in vocabulary {
        let share = mass / left as f64;
        *probs.entry(symbol.clone()).or_insert(0.0) += share;
        mass -= share;
        left -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PredictorConfig;
    use crate::core::types::WeightedWord;

    fn word(text: &str, freq: i64) -> WeightedWord {
        WeightedWord::new(AksaraSequence::from_chars(text), freq)
    }

    fn sample_index() -> PredictiveIndex {
        let words = vec![word("@ef", 4), word("@abcd", 1), word("@afd", 2), word("@bad", 3)];
        PredictiveIndex::build(&words, PredictorConfig::default())
    }

    fn assert_normalized(probs: &HashMap<Aksara, f64>) {
        let sum: f64 = probs.values().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum was {}", sum);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let index = sample_index();
        for context in ["", "@", "@a", "@ab", "@zz", "qqq", "f", "@bad"] {
            assert_normalized(&index.probabilities(&AksaraSequence::from_chars(context)));
        }
    }

    #[test]
    fn test_empty_index_is_uniform_over_oov() {
        let index = PredictiveIndex::build(&[], PredictorConfig::default());
        let probs = index.probabilities(&AksaraSequence::from_chars("@"));
        assert_eq!(probs.len(), 1);
        assert!((probs[OOV_MARKER] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_seen_continuation_outranks_unseen() {
        let index = sample_index();
        let probs = index.probabilities(&AksaraSequence::from_chars("@"));
        assert!(probs["e"] > probs["d"]);
        assert!(probs["d"] > 0.0);
        assert!(probs[OOV_MARKER] > 0.0);
    }

    #[test]
    fn test_model_predictions_skip_markers() {
        let index = sample_index();
        let top = index.get_model_predictions(&AksaraSequence::empty(), 100);
        assert!(top.iter().all(|s| s.text() != START_MARKER && s.text() != OOV_MARKER));
        assert_eq!(top.len(), index.vocabulary().len() - 2);

        let first = index.get_model_predictions(&AksaraSequence::from_chars("@"), 1);
        assert_eq!(first[0].text(), "e");
    }
}
