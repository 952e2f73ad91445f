use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::engine::stats::{word_weight, AttemptRecord, PairStatsStore};

/// Rejected vocabulary mutation. No pool state changes when these fire.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VocabError {
    #[error("the new word set contains no valid words")]
    EmptyWordSet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub active: usize,
}

/// The active vocabulary with its statistics, the removed-word archive, and
/// the least-recently-typed frequency buffer.
///
/// Invariants, held after every mutation:
/// - active and removed word sets are disjoint
/// - `buffer` is a permutation of the active set, least recently typed first
#[derive(Clone, Debug, Default)]
pub struct WordPool {
    words: HashMap<String, AttemptRecord>,
    removed: HashMap<String, AttemptRecord>,
    buffer: Vec<String>,
}

impl WordPool {
    /// Fresh pool over a vocabulary, all stats zeroed, buffer in list order.
    pub fn with_vocabulary(vocabulary: &[String]) -> Self {
        let mut pool = Self::default();
        for word in vocabulary {
            pool.words.entry(word.clone()).or_default();
        }
        pool.buffer = vocabulary.to_vec();
        pool.buffer.dedup();
        pool.reconcile_buffer();
        pool
    }

    /// Rebuild a pool from persisted parts, restoring the invariants however
    /// stale the blobs are: buffer entries for unknown words are dropped,
    /// active words missing from the buffer are re-inserted by typing
    /// frequency, and words present in both maps stay active.
    pub fn from_parts(
        words: HashMap<String, AttemptRecord>,
        mut removed: HashMap<String, AttemptRecord>,
        buffer: Vec<String>,
        rng: &mut impl Rng,
    ) -> Self {
        removed.retain(|word, _| !words.contains_key(word));
        let mut pool = Self {
            words,
            removed,
            buffer,
        };
        if pool.buffer.is_empty() {
            pool.rebuild_buffer_by_frequency(rng);
        } else {
            pool.reconcile_buffer();
        }
        pool
    }

    pub fn is_active(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    pub fn active_count(&self) -> usize {
        self.words.len()
    }

    pub fn active_words(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    pub fn stat(&self, word: &str) -> Option<&AttemptRecord> {
        self.words.get(word)
    }

    pub fn awpm(&self, word: &str) -> f64 {
        self.words.get(word).map(|s| s.awpm).unwrap_or(0.0)
    }

    pub fn words(&self) -> &HashMap<String, AttemptRecord> {
        &self.words
    }

    pub fn removed(&self) -> &HashMap<String, AttemptRecord> {
        &self.removed
    }

    pub fn buffer(&self) -> &[String] {
        &self.buffer
    }

    /// Record one attempt against a word, lazily creating its record. A word
    /// scored while absent from the pool (e.g. right after an external edit)
    /// joins the active set rather than erroring.
    pub fn record_attempt(&mut self, word: &str, duration_ms: u64, correct: bool, weight: f64) {
        if !self.words.contains_key(word) {
            self.buffer.insert(0, word.to_string());
        }
        self.words
            .entry(word.to_string())
            .or_default()
            .record_attempt(duration_ms, correct, weight);
    }

    /// Move a word to the tail of the frequency buffer (most recently typed).
    pub fn mark_typed(&mut self, word: &str) {
        if let Some(pos) = self.buffer.iter().position(|w| w == word) {
            self.buffer.remove(pos);
        }
        if self.is_active(word) {
            self.buffer.push(word.to_string());
        }
    }

    /// First `n` active words of the buffer: the longest-untyped sample.
    pub fn least_typed(&self, n: usize) -> Vec<&str> {
        self.buffer.iter().take(n).map(String::as_str).collect()
    }

    /// Move a word from the active pool to the removed archive, keeping its
    /// stats for a later restore, and drop every pair that references it.
    pub fn remove_word(&mut self, word: &str, pairs: &mut PairStatsStore) -> bool {
        let Some(stat) = self.words.remove(word) else {
            return false;
        };
        self.removed.insert(word.to_string(), stat);
        self.buffer.retain(|w| w != word);
        let active = &self.words;
        pairs.retain_valid(|w| active.contains_key(w));
        true
    }

    /// Reset the active pool to the canonical default vocabulary, re-merging
    /// retained stats for default words from the removed archive. Words
    /// outside the default set become the new removed set.
    pub fn restore_all(&mut self, default_vocabulary: &[String], pairs: &mut PairStatsStore) {
        let mut retained: HashMap<String, AttemptRecord> = self.words.drain().collect();
        retained.extend(self.removed.drain());

        for word in default_vocabulary {
            let stat = retained.remove(word).unwrap_or_default();
            self.words.insert(word.clone(), stat);
        }
        self.removed = retained;

        self.reconcile_buffer();
        let active = &self.words;
        pairs.retain_valid(|w| active.contains_key(w));
    }

    /// Merge or replace the active vocabulary with an uploaded word set.
    ///
    /// Replace: the active pool becomes exactly `new_words`; everything else
    /// (previously active or removed) lands in the removed archive. Merge:
    /// `new_words` are unioned in, restoring any that sat in the archive.
    /// Stats are preserved by word text either way; brand-new words start
    /// zeroed. An empty candidate set is rejected with no mutation.
    pub fn merge_new_words(
        &mut self,
        new_words: &[String],
        replace_existing: bool,
        pairs: &mut PairStatsStore,
    ) -> Result<MergeReport, VocabError> {
        if new_words.is_empty() {
            return Err(VocabError::EmptyWordSet);
        }

        let mut added = 0;
        if replace_existing {
            let mut retained: HashMap<String, AttemptRecord> = self.words.drain().collect();
            retained.extend(self.removed.drain());
            for word in new_words {
                if self.words.contains_key(word) {
                    continue;
                }
                match retained.remove(word) {
                    Some(stat) => {
                        self.words.insert(word.clone(), stat);
                    }
                    None => {
                        self.words.insert(word.clone(), AttemptRecord::default());
                        added += 1;
                    }
                }
            }
            self.removed = retained;
        } else {
            for word in new_words {
                if self.words.contains_key(word) {
                    continue;
                }
                match self.removed.remove(word) {
                    Some(stat) => {
                        self.words.insert(word.clone(), stat);
                    }
                    None => {
                        self.words.insert(word.clone(), AttemptRecord::default());
                        added += 1;
                    }
                }
            }
        }

        self.reconcile_buffer();
        let active = &self.words;
        pairs.retain_valid(|w| active.contains_key(w));
        Ok(MergeReport {
            added,
            active: self.words.len(),
        })
    }

    /// True when the active set equals the canonical default vocabulary.
    pub fn matches_vocabulary(&self, vocabulary: &[String]) -> bool {
        self.words.len() == vocabulary.len()
            && vocabulary.iter().all(|w| self.words.contains_key(w))
    }

    /// Load-time migration: recompute every cached score so records persisted
    /// by older versions heal in place. Also applied when length weighting is
    /// toggled, since cached scores bake the weight in.
    pub fn rebuild_awpm(&mut self, length_weighting: bool) {
        for (word, record) in &mut self.words {
            let weight = word_weight(word, length_weighting);
            record.awpm = record.compute_awpm(weight);
        }
    }

    /// Order the whole buffer by lifetime attempt count, least typed first,
    /// shuffled within ties. Used when no persisted buffer exists.
    pub fn rebuild_buffer_by_frequency(&mut self, rng: &mut impl Rng) {
        let mut entries: Vec<&String> = self.words.keys().collect();
        entries.shuffle(rng);
        entries.sort_by_key(|w| self.words[*w].total);
        self.buffer = entries.into_iter().cloned().collect();
    }

    /// Restore the buffer-is-a-permutation-of-active invariant: drop entries
    /// for non-active words, dedup, and front-insert active words that are
    /// missing (untyped or newly added words count as least recently typed).
    fn reconcile_buffer(&mut self) {
        let mut seen: HashSet<String> = HashSet::new();
        let words = &self.words;
        let mut kept: Vec<String> = Vec::with_capacity(self.buffer.len());
        for word in self.buffer.drain(..) {
            if words.contains_key(&word) && seen.insert(word.clone()) {
                kept.push(word);
            }
        }
        self.buffer = kept;

        let mut missing: Vec<String> = self
            .words
            .keys()
            .filter(|w| !self.buffer.contains(w))
            .cloned()
            .collect();
        missing.sort();
        for word in missing.into_iter().rev() {
            self.buffer.insert(0, word);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    fn vocab(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn assert_invariants(pool: &WordPool) {
        for word in pool.active_words() {
            assert!(
                !pool.removed().contains_key(word),
                "{word:?} is both active and removed"
            );
        }
        assert_eq!(pool.buffer().len(), pool.active_count());
        for word in pool.buffer() {
            assert!(pool.is_active(word), "{word:?} in buffer but not active");
        }
    }

    #[test]
    fn fresh_pool_holds_invariants() {
        let pool = WordPool::with_vocabulary(&vocab(&["a", "b", "c"]));
        assert_eq!(pool.active_count(), 3);
        assert_invariants(&pool);
    }

    #[test]
    fn mark_typed_moves_word_to_tail() {
        let mut pool = WordPool::with_vocabulary(&vocab(&["a", "b", "c"]));
        pool.mark_typed("a");
        assert_eq!(pool.buffer().last().map(String::as_str), Some("a"));
        assert_eq!(pool.least_typed(2), vec!["b", "c"]);
        assert_invariants(&pool);
    }

    #[test]
    fn remove_word_archives_stats_and_prunes_pairs() {
        let mut pool = WordPool::with_vocabulary(&vocab(&["cat", "dog", "fish"]));
        pool.record_attempt("cat", 500, true, 1.0);

        let mut pairs = PairStatsStore::default();
        pairs.record_attempt(crate::engine::stats::PairKey::new("cat", "dog"), 900, true, 1.0);
        pairs.record_attempt(crate::engine::stats::PairKey::new("dog", "fish"), 900, true, 1.0);

        assert!(pool.remove_word("cat", &mut pairs));
        assert!(!pool.is_active("cat"));
        assert_eq!(pool.removed()["cat"].total, 1);
        assert_eq!(pairs.len(), 1);
        assert_invariants(&pool);

        // Removing an unknown word is a no-op.
        assert!(!pool.remove_word("cat", &mut pairs));
    }

    #[test]
    fn restore_all_remerges_default_words_and_archives_custom_ones() {
        let defaults = vocab(&["a", "b", "c"]);
        let mut pool = WordPool::with_vocabulary(&defaults);
        let mut pairs = PairStatsStore::default();

        pool.record_attempt("a", 400, true, 1.0);
        pool.remove_word("a", &mut pairs);
        pool.merge_new_words(&vocab(&["custom"]), false, &mut pairs).unwrap();

        pool.restore_all(&defaults, &mut pairs);
        assert!(pool.is_active("a"));
        assert_eq!(pool.stat("a").unwrap().total, 1, "stats survive the round trip");
        assert!(!pool.is_active("custom"));
        assert!(pool.removed().contains_key("custom"));
        assert_invariants(&pool);
    }

    #[test]
    fn merge_replace_swaps_active_set_preserving_stats() {
        let mut pool = WordPool::with_vocabulary(&vocab(&["a", "b"]));
        let mut pairs = PairStatsStore::default();
        pool.record_attempt("a", 400, true, 1.0);

        let report = pool
            .merge_new_words(&vocab(&["a", "x"]), true, &mut pairs)
            .unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.active, 2);
        assert!(pool.is_active("a"));
        assert!(pool.is_active("x"));
        assert!(!pool.is_active("b"));
        assert!(pool.removed().contains_key("b"));
        assert_eq!(pool.stat("a").unwrap().total, 1);
        assert_invariants(&pool);
    }

    #[test]
    fn merge_union_restores_archived_words() {
        let mut pool = WordPool::with_vocabulary(&vocab(&["a", "b"]));
        let mut pairs = PairStatsStore::default();
        pool.record_attempt("b", 350, true, 1.0);
        pool.remove_word("b", &mut pairs);

        pool.merge_new_words(&vocab(&["b", "c"]), false, &mut pairs).unwrap();
        assert!(pool.is_active("b"));
        assert_eq!(pool.stat("b").unwrap().total, 1);
        assert!(pool.is_active("c"));
        assert!(pool.removed().is_empty());
        assert_invariants(&pool);
    }

    #[test]
    fn merge_empty_set_rejected_without_mutation() {
        let mut pool = WordPool::with_vocabulary(&vocab(&["a", "b"]));
        let mut pairs = PairStatsStore::default();
        let before = pool.active_count();

        assert_eq!(
            pool.merge_new_words(&[], true, &mut pairs),
            Err(VocabError::EmptyWordSet)
        );
        assert_eq!(pool.active_count(), before);
        assert_invariants(&pool);
    }

    #[test]
    fn from_parts_heals_stale_buffer() {
        let mut words = HashMap::new();
        words.insert("a".to_string(), AttemptRecord::default());
        words.insert("b".to_string(), AttemptRecord::default());
        let removed = HashMap::new();
        // Buffer references a ghost word and misses "b".
        let buffer = vec!["ghost".to_string(), "a".to_string()];

        let mut rng = SmallRng::seed_from_u64(7);
        let pool = WordPool::from_parts(words, removed, buffer, &mut rng);
        assert_invariants(&pool);
        assert!(pool.buffer().contains(&"b".to_string()));
    }

    #[test]
    fn from_parts_rebuilds_missing_buffer_by_frequency() {
        let mut words = HashMap::new();
        let mut hot = AttemptRecord::default();
        for _ in 0..5 {
            hot.record_attempt(300, true, 1.0);
        }
        words.insert("hot".to_string(), hot);
        words.insert("cold".to_string(), AttemptRecord::default());

        let mut rng = SmallRng::seed_from_u64(7);
        let pool = WordPool::from_parts(words, HashMap::new(), Vec::new(), &mut rng);
        assert_eq!(pool.buffer().first().map(String::as_str), Some("cold"));
        assert_eq!(pool.buffer().last().map(String::as_str), Some("hot"));
        assert_invariants(&pool);
    }

    #[test]
    fn matches_vocabulary_detects_default_set() {
        let defaults = vocab(&["a", "b"]);
        let mut pool = WordPool::with_vocabulary(&defaults);
        let mut pairs = PairStatsStore::default();
        assert!(pool.matches_vocabulary(&defaults));

        pool.merge_new_words(&vocab(&["z"]), false, &mut pairs).unwrap();
        assert!(!pool.matches_vocabulary(&defaults));
    }
}
