use rand::Rng;

use crate::config::{Config, Mode};
use crate::engine::pairs::{self, PairCandidate, DIRECTIONAL_LIMIT, SINGLE_LIMIT};
use crate::engine::pool::WordPool;
use crate::engine::stats::PairStatsStore;

/// Size of the least-recently-typed sample offered to the sampler.
pub const LEAST_TYPED_SAMPLE: usize = 10;
/// Resample budget per emitted word before duplicates are force-emitted.
const RESAMPLES_PER_SLOT: usize = 20;

/// Produces practice lines one at a time, remembering the last emitted word
/// so adjacent duplicates are avoided across slot and line boundaries.
#[derive(Debug, Default)]
pub struct LineGenerator {
    last_emitted: Option<String>,
}

impl LineGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate one line of exactly `words_per_line` words (short only when
    /// the pool and focus set are both empty).
    pub fn next_line(
        &mut self,
        focus: &[String],
        pool: &WordPool,
        pairs_store: &PairStatsStore,
        config: &Config,
        rng: &mut impl Rng,
    ) -> Vec<String> {
        let least = pool.least_typed(LEAST_TYPED_SAMPLE);
        let count = config.words_per_line;
        let chance = config.least_typed_sample_chance;
        let mut line: Vec<String> = Vec::with_capacity(count);
        let mut budget = count * RESAMPLES_PER_SLOT;

        while line.len() < count && budget > 0 {
            budget -= 1;
            let Some((word, from_least)) = sample(focus, &least, chance, rng) else {
                return line;
            };

            // Least-typed draws skip the difficulty machinery in every mode,
            // but still respect the adjacent-duplicate rule.
            if from_least {
                if self.duplicates_last(&word) && least.len() > 1 {
                    continue;
                }
                self.push(&mut line, word);
                continue;
            }

            match config.mode {
                Mode::Normal => {
                    if self.duplicates_last(&word) && focus.len() > 1 {
                        continue;
                    }
                    self.push(&mut line, word);
                }
                Mode::Hard => {
                    if !self.emit_hard(&word, &mut line, count, pool, pairs_store, rng) {
                        continue;
                    }
                }
                Mode::Brutal => {
                    if !self.emit_brutal(&word, &mut line, count, pool, pairs_store, rng) {
                        continue;
                    }
                }
            }
        }

        // Budget exhausted on a degenerate pool: fill the remaining slots
        // without the duplicate check rather than return a short line.
        while line.len() < count {
            match sample(focus, &least, chance, rng) {
                Some((word, _)) => self.push(&mut line, word),
                None => break,
            }
        }
        line
    }

    /// Splice the pivot's worst transition into the line. Returns false when
    /// the caller should resample the pivot instead.
    fn emit_hard(
        &mut self,
        pivot: &str,
        line: &mut Vec<String>,
        count: usize,
        pool: &WordPool,
        pairs_store: &PairStatsStore,
        rng: &mut impl Rng,
    ) -> bool {
        let ranked = pairs::worst_pairs(
            pivot,
            pool.awpm(pivot),
            pairs_store,
            pool,
            SINGLE_LIMIT,
            rng,
        );
        if ranked.is_empty() {
            self.push(line, pivot.to_string());
            return true;
        }

        let mut chosen: Option<PairCandidate> = None;
        for _ in 0..ranked.len() {
            let candidate = &ranked[rng.gen_range(0..ranked.len())];
            if !self.duplicates_last(&candidate.key.first) {
                chosen = Some(candidate.clone());
                break;
            }
        }

        match chosen {
            Some(pair) => {
                let room_for_both = line.len() + 1 < count;
                self.push(line, pair.key.first);
                if room_for_both {
                    self.push(line, pair.key.second);
                }
                true
            }
            None if !self.duplicates_last(pivot) => {
                self.push(line, pivot.to_string());
                true
            }
            None => false,
        }
    }

    /// Build an `x -> pivot -> z` chain from the directional resolver,
    /// degrading to two- or one-word emissions near the end of the line.
    /// Returns false when the caller should resample the pivot.
    fn emit_brutal(
        &mut self,
        pivot: &str,
        line: &mut Vec<String>,
        count: usize,
        pool: &WordPool,
        pairs_store: &PairStatsStore,
        rng: &mut impl Rng,
    ) -> bool {
        let split = pairs::worst_pairs_directional(
            pivot,
            pool.awpm(pivot),
            pairs_store,
            pool,
            DIRECTIONAL_LIMIT,
            rng,
        );
        // A left neighbor that duplicates the previous word can never lead.
        let left_ok: Vec<&PairCandidate> = split
            .preceding
            .iter()
            .filter(|c| !self.duplicates_last(&c.key.first))
            .collect();
        let left = if left_ok.is_empty() {
            None
        } else {
            Some(left_ok[rng.gen_range(0..left_ok.len())].clone())
        };
        let right = if split.following.is_empty() {
            None
        } else {
            Some(split.following[rng.gen_range(0..split.following.len())].clone())
        };

        let remaining = count - line.len();
        match (left, right) {
            (Some(left), Some(right)) => {
                if remaining >= 3 {
                    self.push(line, left.key.first);
                    self.push(line, pivot.to_string());
                    self.push(line, right.key.second);
                } else if remaining == 2 {
                    if self.duplicates_last(pivot) || rng.gen_bool(0.5) {
                        self.push(line, left.key.first);
                        self.push(line, pivot.to_string());
                    } else {
                        self.push(line, pivot.to_string());
                        self.push(line, right.key.second);
                    }
                } else if self.duplicates_last(pivot) {
                    return false;
                } else {
                    self.push(line, pivot.to_string());
                }
                true
            }
            (Some(left), None) => {
                if remaining >= 2 {
                    self.push(line, left.key.first);
                    self.push(line, pivot.to_string());
                } else if self.duplicates_last(pivot) {
                    return false;
                } else {
                    self.push(line, pivot.to_string());
                }
                true
            }
            (None, Some(right)) => {
                if self.duplicates_last(pivot) {
                    return false;
                }
                self.push(line, pivot.to_string());
                if remaining >= 2 {
                    self.push(line, right.key.second);
                }
                true
            }
            (None, None) => {
                self.push(line, pivot.to_string());
                true
            }
        }
    }

    fn duplicates_last(&self, word: &str) -> bool {
        self.last_emitted.as_deref() == Some(word)
    }

    fn push(&mut self, line: &mut Vec<String>, word: String) {
        self.last_emitted = Some(word.clone());
        line.push(word);
    }
}

/// Draw one word: with `chance`% probability from the least-typed sample,
/// otherwise uniformly from the focus set. Reports whether the drawn word
/// belongs to the least-typed sample.
fn sample(
    focus: &[String],
    least: &[&str],
    chance: u8,
    rng: &mut impl Rng,
) -> Option<(String, bool)> {
    let word = if !least.is_empty() && rng.gen_range(0..100) < u32::from(chance) {
        least[rng.gen_range(0..least.len())].to_string()
    } else if !focus.is_empty() {
        focus[rng.gen_range(0..focus.len())].clone()
    } else if !least.is_empty() {
        least[rng.gen_range(0..least.len())].to_string()
    } else {
        return None;
    };
    let from_least = least.iter().any(|w| *w == word);
    Some((word, from_least))
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use super::*;

    fn vocab(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn config(mode: Mode) -> Config {
        let mut config = Config::default();
        config.mode = mode;
        // Force every draw through the focus set so tests see the duplicate
        // avoidance rather than the unconditional least-typed path.
        config.least_typed_sample_chance = 0;
        config
    }

    fn assert_no_adjacent_duplicates(words: &[String]) {
        for pair in words.windows(2) {
            assert_ne!(pair[0], pair[1], "adjacent duplicate in {words:?}");
        }
    }

    #[test]
    fn normal_mode_fills_line_without_adjacent_duplicates() {
        let focus = vocab(&["alpha", "beta", "gamma", "delta", "echo"]);
        let pool = WordPool::with_vocabulary(&focus);
        let pairs = PairStatsStore::default();
        let mut generator = LineGenerator::new();
        let mut rng = SmallRng::seed_from_u64(21);

        let mut all: Vec<String> = Vec::new();
        for _ in 0..10 {
            let line = generator.next_line(&focus, &pool, &pairs, &config(Mode::Normal), &mut rng);
            assert_eq!(line.len(), 6);
            all.extend(line);
        }
        // Duplicate avoidance must hold across line boundaries too.
        assert_no_adjacent_duplicates(&all);
    }

    #[test]
    fn least_typed_draws_avoid_adjacent_duplicates() {
        // Every draw comes from the least-typed sample; the duplicate rule
        // must still hold across slot and line boundaries.
        let words = vocab(&["aa", "bb", "cc"]);
        let pool = WordPool::with_vocabulary(&words);
        let pairs = PairStatsStore::default();
        let mut config = config(Mode::Normal);
        config.least_typed_sample_chance = 100;
        let mut generator = LineGenerator::new();
        let mut rng = SmallRng::seed_from_u64(27);

        let mut all: Vec<String> = Vec::new();
        for _ in 0..20 {
            let line = generator.next_line(&words, &pool, &pairs, &config, &mut rng);
            assert_eq!(line.len(), 6);
            all.extend(line);
        }
        assert_no_adjacent_duplicates(&all);
    }

    #[test]
    fn least_typed_draws_from_single_word_pool_may_repeat() {
        let words = vocab(&["only"]);
        let pool = WordPool::with_vocabulary(&words);
        let pairs = PairStatsStore::default();
        let mut config = config(Mode::Normal);
        config.least_typed_sample_chance = 100;
        let mut generator = LineGenerator::new();
        let mut rng = SmallRng::seed_from_u64(28);

        let line = generator.next_line(&words, &pool, &pairs, &config, &mut rng);
        assert_eq!(line.len(), 6);
        assert!(line.iter().all(|w| w == "only"));
    }

    #[test]
    fn single_word_focus_permits_duplicates() {
        let focus = vocab(&["only"]);
        let pool = WordPool::with_vocabulary(&focus);
        let pairs = PairStatsStore::default();
        let mut generator = LineGenerator::new();
        let mut rng = SmallRng::seed_from_u64(22);

        let line = generator.next_line(&focus, &pool, &pairs, &config(Mode::Normal), &mut rng);
        assert_eq!(line.len(), 6);
        assert!(line.iter().all(|w| w == "only"));
    }

    #[test]
    fn hard_mode_fills_line_from_active_words() {
        let focus = vocab(&["alpha", "beta", "gamma", "delta", "echo", "foxtrot"]);
        let pool = WordPool::with_vocabulary(&focus);
        let pairs = PairStatsStore::default();
        let mut generator = LineGenerator::new();
        let mut rng = SmallRng::seed_from_u64(23);

        let mut all: Vec<String> = Vec::new();
        for _ in 0..10 {
            let line = generator.next_line(&focus, &pool, &pairs, &config(Mode::Hard), &mut rng);
            assert_eq!(line.len(), 6);
            for word in &line {
                assert!(pool.is_active(word));
            }
            all.extend(line);
        }
        assert_no_adjacent_duplicates(&all);
    }

    #[test]
    fn hard_mode_splices_pair_words_into_line() {
        let mut pool = WordPool::with_vocabulary(&vocab(&["alpha", "beta"]));
        let mut pairs = PairStatsStore::default();
        // Make "alpha" a typed word with one dominant slow transition. The
        // only other candidate the resolver can produce is alpha->beta, so
        // every emission is a pair touching both words.
        pool.record_attempt("alpha", 500, true, 1.0);
        pairs.record_attempt(
            crate::engine::stats::PairKey::new("beta", "alpha"),
            30_000,
            true,
            1.0,
        );

        let mut generator = LineGenerator::new();
        let mut rng = SmallRng::seed_from_u64(24);
        let single_focus = vocab(&["alpha"]);
        let line = generator.next_line(&single_focus, &pool, &pairs, &config(Mode::Hard), &mut rng);
        assert_eq!(line.len(), 6);
        assert!(line.iter().any(|w| w == "beta"));
        assert!(line.iter().any(|w| w == "alpha"));
        assert_no_adjacent_duplicates(&line);
    }

    #[test]
    fn brutal_mode_fills_line_without_adjacent_duplicates() {
        let focus = vocab(&["alpha", "beta", "gamma", "delta", "echo", "foxtrot"]);
        let pool = WordPool::with_vocabulary(&focus);
        let pairs = PairStatsStore::default();
        let mut generator = LineGenerator::new();
        let mut rng = SmallRng::seed_from_u64(25);

        let mut all: Vec<String> = Vec::new();
        for _ in 0..10 {
            let line = generator.next_line(&focus, &pool, &pairs, &config(Mode::Brutal), &mut rng);
            assert_eq!(line.len(), 6);
            for word in &line {
                assert!(pool.is_active(word));
            }
            all.extend(line);
        }
        assert_no_adjacent_duplicates(&all);
    }

    #[test]
    fn empty_pool_and_focus_yield_empty_line() {
        let pool = WordPool::default();
        let pairs = PairStatsStore::default();
        let mut generator = LineGenerator::new();
        let mut rng = SmallRng::seed_from_u64(26);
        let line = generator.next_line(&[], &pool, &pairs, &config(Mode::Normal), &mut rng);
        assert!(line.is_empty());
    }
}
