use rand::Rng;

use crate::config::Config;
use crate::engine::focus::select_focus_set;
use crate::engine::pool::{MergeReport, VocabError, WordPool};
use crate::engine::stats::{pair_weight, word_weight, PairKey, PairStatsStore};
use crate::generator::LineGenerator;

/// Outcome of one scored submission, handed back to the display boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringResult {
    pub expected: String,
    pub typed: String,
    pub correct: bool,
    pub duration_ms: u64,
    /// The consecutive pair recorded with this submission, when one was.
    pub pair: Option<PairKey>,
    /// True when this submission completed the middle line and the lines
    /// rotated underneath the cursor.
    pub rotated: bool,
}

/// One row of the statistics snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct WordStatsRow {
    pub word: String,
    pub attempts: u32,
    pub recent: usize,
    pub awpm: f64,
    pub in_focus: bool,
}

/// Owns all mutable practice state: the word pool, pair stats, focus set,
/// the three visible lines and the cursor into them, and the timing anchors
/// used for word and pair durations.
///
/// The controller is clock-free: callers pass a millisecond timestamp into
/// [`Session::submit_at`] and [`Session::start_timing`], which keeps every
/// scoring path deterministic under test.
pub struct Session {
    pool: WordPool,
    pairs: PairStatsStore,
    focus_set: Vec<String>,
    lines: [Vec<String>; 3],
    line_index: usize,
    word_index: usize,
    generator: LineGenerator,
    word_started_at: Option<u64>,
    last_typed: Option<(String, u64)>,
}

impl Session {
    pub fn new(
        pool: WordPool,
        pairs: PairStatsStore,
        config: &Config,
        rng: &mut impl Rng,
    ) -> Self {
        let mut session = Self {
            pool,
            pairs,
            focus_set: Vec::new(),
            lines: [Vec::new(), Vec::new(), Vec::new()],
            line_index: 0,
            word_index: 0,
            generator: LineGenerator::new(),
            word_started_at: None,
            last_typed: None,
        };
        session.refresh(config, rng);
        session
    }

    pub fn lines(&self) -> &[Vec<String>; 3] {
        &self.lines
    }

    /// (line, word) position of the currently expected word.
    pub fn cursor(&self) -> (usize, usize) {
        (self.line_index, self.word_index)
    }

    pub fn expected_word(&self) -> Option<&str> {
        self.lines[self.line_index]
            .get(self.word_index)
            .map(String::as_str)
    }

    pub fn focus_set(&self) -> &[String] {
        &self.focus_set
    }

    pub fn pool(&self) -> &WordPool {
        &self.pool
    }

    pub fn pairs(&self) -> &PairStatsStore {
        &self.pairs
    }

    /// Anchor the word timer. Called once when typing begins and again after
    /// any interruption (screen switch, vocabulary edit).
    pub fn start_timing(&mut self, now_ms: u64) {
        self.word_started_at = Some(now_ms);
        self.last_typed = None;
    }

    /// Score one submitted word against the expected cursor word.
    ///
    /// Whitespace-only input is ignored entirely (no scoring, no advance).
    /// Otherwise the expected word's record takes the attempt, the
    /// consecutive pair is recorded when the previous submission is known,
    /// the frequency buffer advances, and the cursor moves, rotating the
    /// lines when the middle line completes.
    pub fn submit_at(
        &mut self,
        raw: &str,
        now_ms: u64,
        config: &Config,
        rng: &mut impl Rng,
    ) -> Option<ScoringResult> {
        let typed = raw.trim();
        if typed.is_empty() {
            return None;
        }
        let expected = self.expected_word()?.to_string();

        let started = self.word_started_at.unwrap_or(now_ms);
        let duration_ms = now_ms.saturating_sub(started);
        let correct = typed == expected;

        let weight = word_weight(&expected, config.length_weighting);
        self.pool.record_attempt(&expected, duration_ms, correct, weight);
        self.pool.mark_typed(&expected);

        let pair = self.last_typed.take().map(|(prev, prev_started)| {
            let key = PairKey::new(prev.as_str(), expected.as_str());
            let pair_duration = now_ms.saturating_sub(prev_started);
            let weight = pair_weight(&prev, &expected, config.length_weighting);
            self.pairs
                .record_attempt(key.clone(), pair_duration, correct, weight);
            key
        });

        self.last_typed = Some((expected.clone(), started));
        self.word_started_at = Some(now_ms);

        let rotated = self.advance(config, rng);
        Some(ScoringResult {
            expected,
            typed: typed.to_string(),
            correct,
            duration_ms,
            pair,
            rotated,
        })
    }

    /// Move the cursor; completing the middle line retires the top line,
    /// appends a fresh one, recomputes the focus set, and re-centers the
    /// cursor on the new middle line.
    fn advance(&mut self, config: &Config, rng: &mut impl Rng) -> bool {
        self.word_index += 1;
        if self.word_index < self.lines[self.line_index].len() {
            return false;
        }
        self.word_index = 0;
        self.line_index += 1;
        if self.line_index < 2 {
            return false;
        }

        self.focus_set = select_focus_set(&self.pool, &self.focus_set, config.focus_set_size, rng);
        let fresh = self.generator.next_line(
            &self.focus_set,
            &self.pool,
            &self.pairs,
            config,
            rng,
        );
        self.lines.rotate_left(1);
        self.lines[2] = fresh;
        self.line_index = 1;
        true
    }

    /// Recompute the focus set (with carry-over) and regenerate all three
    /// lines, resetting the cursor to the top. Used at startup and after any
    /// vocabulary or settings change.
    pub fn refresh(&mut self, config: &Config, rng: &mut impl Rng) {
        self.focus_set = select_focus_set(&self.pool, &self.focus_set, config.focus_set_size, rng);
        for line in &mut self.lines {
            *line = self
                .generator
                .next_line(&self.focus_set, &self.pool, &self.pairs, config, rng);
        }
        self.line_index = 0;
        self.word_index = 0;
        self.last_typed = None;
    }

    /// Retire a word from practice. Its stats move to the removed archive and
    /// every pair referencing it is pruned; the lines regenerate without it.
    pub fn remove_word(&mut self, word: &str, config: &Config, rng: &mut impl Rng) -> bool {
        if !self.pool.remove_word(word, &mut self.pairs) {
            return false;
        }
        self.refresh(config, rng);
        true
    }

    /// Merge (or replace with) an uploaded word set.
    pub fn merge_new_words(
        &mut self,
        new_words: &[String],
        replace_existing: bool,
        config: &Config,
        rng: &mut impl Rng,
    ) -> Result<MergeReport, VocabError> {
        let report = self
            .pool
            .merge_new_words(new_words, replace_existing, &mut self.pairs)?;
        self.refresh(config, rng);
        Ok(report)
    }

    /// Reset to the default vocabulary, keeping stats for default words.
    pub fn restore_default(
        &mut self,
        default_vocabulary: &[String],
        config: &Config,
        rng: &mut impl Rng,
    ) {
        self.pool.restore_all(default_vocabulary, &mut self.pairs);
        self.refresh(config, rng);
    }

    /// Recompute every cached score, e.g. after toggling length weighting
    /// (cached AWPM values bake the weight in).
    pub fn rebuild_scores(&mut self, length_weighting: bool) {
        self.pool.rebuild_awpm(length_weighting);
        self.pairs.rebuild_awpm(length_weighting);
    }

    /// Per-word statistics for the display boundary: focus words first,
    /// never-attempted before attempted, then ascending AWPM, ties broken
    /// alphabetically.
    pub fn stats_snapshot(&self) -> Vec<WordStatsRow> {
        let mut rows: Vec<WordStatsRow> = self
            .pool
            .words()
            .iter()
            .map(|(word, stat)| WordStatsRow {
                word: word.clone(),
                attempts: stat.total,
                recent: stat.recent_count(),
                awpm: stat.awpm,
                in_focus: self.focus_set.iter().any(|f| f == word),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.in_focus
                .cmp(&a.in_focus)
                .then((a.attempts > 0).cmp(&(b.attempts > 0)))
                .then(a.awpm.partial_cmp(&b.awpm).unwrap_or(std::cmp::Ordering::Equal))
                .then(a.word.cmp(&b.word))
        });
        rows
    }

    /// Tear the session apart for persistence.
    pub fn into_parts(self) -> (WordPool, PairStatsStore) {
        (self.pool, self.pairs)
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

    fn session_over(words: &[&str]) -> (Session, Config, SmallRng) {
        let mut config = Config::default();
        config.least_typed_sample_chance = 0;
        let mut rng = SmallRng::seed_from_u64(31);
        let pool = WordPool::with_vocabulary(&vocab(words));
        let session = Session::new(pool, PairStatsStore::default(), &config, &mut rng);
        (session, config, rng)
    }

    /// Type the expected word correctly, advancing `step_ms` per submission.
    fn type_expected(
        session: &mut Session,
        config: &Config,
        rng: &mut SmallRng,
        now_ms: &mut u64,
        step_ms: u64,
    ) -> ScoringResult {
        let expected = session.expected_word().unwrap().to_string();
        *now_ms += step_ms;
        session
            .submit_at(&expected, *now_ms, config, rng)
            .expect("non-empty submission scores")
    }

    #[test]
    fn new_session_has_three_full_lines_and_cursor_at_origin() {
        let (session, config, _) = session_over(&["alpha", "beta", "gamma", "delta"]);
        assert_eq!(session.cursor(), (0, 0));
        for line in session.lines() {
            assert_eq!(line.len(), config.words_per_line);
        }
        assert!(session.expected_word().is_some());
    }

    #[test]
    fn blank_submission_is_a_no_op() {
        let (mut session, config, mut rng) = session_over(&["alpha", "beta", "gamma"]);
        assert!(session.submit_at("   ", 1000, &config, &mut rng).is_none());
        assert_eq!(session.cursor(), (0, 0));
        assert!(session.pool().words().values().all(|s| s.total == 0));
    }

    #[test]
    fn submission_records_word_duration_and_advances() {
        let (mut session, config, mut rng) = session_over(&["alpha", "beta", "gamma"]);
        session.start_timing(1_000);
        let expected = session.expected_word().unwrap().to_string();
        let result = session
            .submit_at(&expected, 1_500, &config, &mut rng)
            .unwrap();

        assert!(result.correct);
        assert_eq!(result.duration_ms, 500);
        assert!(result.pair.is_none(), "first submission has no predecessor");
        assert_eq!(session.cursor(), (0, 1));
        assert_eq!(session.pool().stat(&expected).unwrap().total, 1);
    }

    #[test]
    fn consecutive_submissions_record_the_ordered_pair() {
        let (mut session, config, mut rng) = session_over(&["alpha", "beta", "gamma"]);
        session.start_timing(1_000);
        let first = session.expected_word().unwrap().to_string();
        session.submit_at(&first, 1_400, &config, &mut rng).unwrap();
        let second = session.expected_word().unwrap().to_string();
        let result = session.submit_at(&second, 1_900, &config, &mut rng).unwrap();

        let key = result.pair.expect("second submission forms a pair");
        assert_eq!(key, PairKey::new(first.as_str(), second.as_str()));
        // Pair duration spans both words: 1900 - 1000.
        let record = session.pairs().get(&key).unwrap();
        assert_eq!(record.times_ms, vec![900]);
    }

    #[test]
    fn incorrect_submission_counts_against_the_expected_word() {
        let (mut session, config, mut rng) = session_over(&["alpha", "beta", "gamma"]);
        session.start_timing(0);
        let expected = session.expected_word().unwrap().to_string();
        let result = session
            .submit_at("definitely-wrong", 600, &config, &mut rng)
            .unwrap();

        assert!(!result.correct);
        let stat = session.pool().stat(&expected).unwrap();
        assert_eq!(stat.total, 1);
        assert_eq!(stat.correct, 0);
    }

    #[test]
    fn completing_the_middle_line_rotates() {
        let (mut session, config, mut rng) = session_over(&["alpha", "beta", "gamma", "delta"]);
        session.start_timing(0);
        let mut now = 0;
        let per_line = config.words_per_line;

        // Finish line 0: no rotation yet, cursor drops to the middle line.
        for _ in 0..per_line {
            let result = type_expected(&mut session, &config, &mut rng, &mut now, 300);
            assert!(!result.rotated);
        }
        assert_eq!(session.cursor(), (1, 0));
        let old_middle = session.lines()[1].clone();
        let old_future = session.lines()[2].clone();

        // Finish line 1: rotation fires on its last word.
        for i in 0..per_line {
            let result = type_expected(&mut session, &config, &mut rng, &mut now, 300);
            assert_eq!(result.rotated, i == per_line - 1);
        }
        assert_eq!(session.cursor(), (1, 0));
        assert_eq!(&session.lines()[0], &old_middle);
        assert_eq!(&session.lines()[1], &old_future);
        assert_eq!(session.lines()[2].len(), per_line);
    }

    #[test]
    fn focus_set_recomputed_on_rotation_prefers_slow_words() {
        let (mut session, mut config, mut rng) =
            session_over(&["alpha", "beta", "gamma", "delta", "echo", "foxtrot"]);
        config.focus_set_size = 2;
        session.refresh(&config, &mut rng);
        session.start_timing(0);
        let mut now = 0;

        // Two full lines: every submission is slow, so the recomputed focus
        // set must consist of attempted (typed) or never-typed words only —
        // and it must have exactly the configured size.
        for _ in 0..(2 * config.words_per_line) {
            type_expected(&mut session, &config, &mut rng, &mut now, 2_000);
        }
        assert_eq!(session.focus_set().len(), 2);
    }

    #[test]
    fn remove_word_regenerates_lines_without_it() {
        let (mut session, config, mut rng) = session_over(&["alpha", "beta", "gamma", "delta"]);
        assert!(session.remove_word("alpha", &config, &mut rng));
        assert!(!session.pool().is_active("alpha"));
        for line in session.lines() {
            assert!(line.iter().all(|w| w != "alpha"));
        }
        assert!(session.focus_set().iter().all(|w| w != "alpha"));
        assert_eq!(session.cursor(), (0, 0));
    }

    #[test]
    fn stats_snapshot_orders_focus_then_untyped_then_awpm() {
        let (mut session, mut config, mut rng) =
            session_over(&["alpha", "beta", "gamma", "delta"]);
        config.focus_set_size = 2;
        session.refresh(&config, &mut rng);
        session.start_timing(0);

        let rows = session.stats_snapshot();
        assert_eq!(rows.len(), 4);
        assert!(rows[0].in_focus && rows[1].in_focus);
        assert!(!rows[2].in_focus && !rows[3].in_focus);
        // All untyped: ties broken alphabetically within each group.
        assert!(rows[2].word < rows[3].word);
    }
}
