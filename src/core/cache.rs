// File: src/core/cache.rs
use crate::core::types::WeightedWord;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

type Slot = Arc<OnceLock<Vec<WeightedWord>>>;

/// Ranked results keyed by `(prediction length, context text)`.
///
/// Invalidation is wholesale: the generation counter is bumped and every
/// entry is dropped. A slot tagged with an older generation is never served.
/// Each key owns a compute-once slot, so concurrent identical queries share a
/// single computation.
#[derive(Debug, Default)]
pub struct PredictionCache {
    generation: u64,
    entries: HashMap<(usize, String), (u64, Slot)>,
}

impl PredictionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.values().filter(|(g, slot)| *g == self.generation && slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the slot for `key` under the current generation, creating it
    /// on a miss. The caller fills it outside the cache lock.
    pub(crate) fn slot(&mut self, length: usize, context: String) -> Slot {
        let generation = self.generation;
        let entry = self
            .entries
            .entry((length, context))
            .or_insert_with(|| (generation, Arc::new(OnceLock::new())));
        if entry.0 != generation {
            *entry = (generation, Arc::new(OnceLock::new()));
        }
        Arc::clone(&entry.1)
    }

    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.entries.clear();
        debug!("prediction cache invalidated (generation {})", self.generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AksaraSequence;

    fn word(text: &str, freq: i64) -> WeightedWord {
        WeightedWord::new(AksaraSequence::from_chars(text), freq)
    }

    #[test]
    fn test_slot_is_shared_per_key() {
        let mut cache = PredictionCache::new();
        let first = cache.slot(1, "@".to_string());
        first.get_or_init(|| vec![word("a", 1)]);

        let second = cache.slot(1, "@".to_string());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let other = cache.slot(2, "@".to_string());
        assert!(other.get().is_none());
    }

    #[test]
    fn test_invalidate_drops_everything() {
        let mut cache = PredictionCache::new();
        cache.slot(1, "@".to_string()).get_or_init(|| vec![word("a", 1)]);
        cache.slot(2, "@a".to_string()).get_or_init(Vec::new);
        assert_eq!(cache.len(), 2);

        cache.invalidate();
        assert_eq!(cache.generation(), 1);
        assert!(cache.is_empty());
        assert!(cache.slot(1, "@".to_string()).get().is_none());
    }
}
