use std::path::Path;

use chrono::Utc;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::engine::pool::WordPool;
use crate::engine::stats::PairStatsStore;
use crate::generator::vocabulary;
use crate::session::Session;
use crate::store::schema::ProfileData;
use crate::store::JsonStore;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Typing,
    Stats,
    Settings,
}

pub const SETTINGS_FIELDS: usize = 5;

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub session: Session,
    pub profile: ProfileData,
    pub store: Option<JsonStore>,
    pub theme: Theme,
    pub input: String,
    /// Per-word scoring colors for the three visible lines, rotated in step
    /// with the session's lines.
    pub results: [Vec<Option<bool>>; 3],
    /// One-line message for the footer: rejected settings, import outcomes.
    pub status: Option<String>,
    pub should_quit: bool,
    pub settings_selected: usize,
    pub stats_selected: usize,
    default_vocabulary: Vec<String>,
    rng: SmallRng,
}

impl App {
    pub fn new() -> Self {
        let config = Config::load().unwrap_or_default();
        let store = JsonStore::new().ok();
        let default_vocabulary = vocabulary::default_vocabulary();
        let mut rng = SmallRng::from_entropy();

        let (pool, pairs, profile) = match store {
            Some(ref s) => {
                let words = s.load_word_stats();
                let removed = s.load_removed_words();
                let buffer = s.load_buffer();
                let mut profile = s.load_profile();
                let mut pairs = s.load_pair_stats().stats;

                let mut pool = if words.stats.is_empty() && removed.words.is_empty() {
                    WordPool::with_vocabulary(&default_vocabulary)
                } else {
                    WordPool::from_parts(words.stats, removed.words, buffer.buffer, &mut rng)
                };
                // Heal records persisted before cached scores existed.
                pool.rebuild_awpm(config.length_weighting);
                pairs.rebuild_awpm(config.length_weighting);
                pairs.retain_valid(|w| pool.is_active(w));
                profile.default_vocabulary = pool.matches_vocabulary(&default_vocabulary);
                (pool, pairs, profile)
            }
            None => (
                WordPool::with_vocabulary(&default_vocabulary),
                PairStatsStore::default(),
                ProfileData::default(),
            ),
        };

        let mut session = Session::new(pool, pairs, &config, &mut rng);
        session.start_timing(Self::now_ms());
        let results = Self::blank_results(session.lines());

        Self {
            screen: AppScreen::Typing,
            config,
            session,
            profile,
            store,
            theme: Theme::default(),
            input: String::new(),
            results,
            status: None,
            should_quit: false,
            settings_selected: 0,
            stats_selected: 0,
            default_vocabulary,
            rng,
        }
    }

    fn now_ms() -> u64 {
        Utc::now().timestamp_millis().max(0) as u64
    }

    fn blank_results(lines: &[Vec<String>; 3]) -> [Vec<Option<bool>>; 3] {
        [
            vec![None; lines[0].len()],
            vec![None; lines[1].len()],
            vec![None; lines[2].len()],
        ]
    }

    /// Feed one typed character; space commits the buffered word.
    pub fn type_char(&mut self, ch: char) {
        if ch == ' ' {
            self.submit();
        } else {
            self.input.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    fn submit(&mut self) {
        let raw = std::mem::take(&mut self.input);
        let (line, word) = self.session.cursor();
        let Some(result) =
            self.session
                .submit_at(&raw, Self::now_ms(), &self.config, &mut self.rng)
        else {
            return;
        };

        if let Some(slot) = self.results[line].get_mut(word) {
            *slot = Some(result.correct);
        }
        if result.rotated {
            self.results.rotate_left(1);
            self.results[2] = vec![None; self.session.lines()[2].len()];
        }

        self.profile.total_words_typed += 1;
        self.profile.last_practice_at = Some(Utc::now());
        self.persist();
    }

    /// Fire-and-forget save of the whole practice state.
    fn persist(&mut self) {
        if let Some(ref store) = self.store {
            let _ = store.save_state(self.session.pool(), self.session.pairs(), &self.profile);
        }
    }

    fn reset_board(&mut self) {
        self.results = Self::blank_results(self.session.lines());
        self.input.clear();
        self.session.start_timing(Self::now_ms());
    }

    pub fn go_to_typing(&mut self) {
        self.screen = AppScreen::Typing;
        self.input.clear();
        self.session.start_timing(Self::now_ms());
    }

    pub fn go_to_stats(&mut self) {
        self.screen = AppScreen::Stats;
        self.stats_selected = 0;
    }

    pub fn go_to_settings(&mut self) {
        self.screen = AppScreen::Settings;
    }

    /// Regenerate lines and focus after a configuration change.
    pub fn apply_config_change(&mut self) {
        let _ = self.config.save();
        self.session.refresh(&self.config, &mut self.rng);
        self.reset_board();
    }

    pub fn remove_selected_word(&mut self) {
        let rows = self.session.stats_snapshot();
        let Some(row) = rows.get(self.stats_selected) else {
            return;
        };
        let word = row.word.clone();
        if self.session.remove_word(&word, &self.config, &mut self.rng) {
            self.profile.default_vocabulary = false;
            self.status = Some(format!("Removed {word:?} from practice"));
            self.stats_selected = self.stats_selected.min(rows.len().saturating_sub(2));
            self.reset_board();
            self.persist();
        }
    }

    pub fn restore_default_vocabulary(&mut self) {
        self.session
            .restore_default(&self.default_vocabulary, &self.config, &mut self.rng);
        self.profile.default_vocabulary = true;
        self.status = Some("Restored the default word set".to_string());
        self.stats_selected = 0;
        self.reset_board();
        self.persist();
    }

    /// Import an uploaded word file, merging into (or replacing) the active
    /// vocabulary. Errors land in the status line; state is untouched.
    pub fn import_words(&mut self, path: &Path, replace: bool) {
        let words = match vocabulary::parse_upload(path) {
            Ok(words) => words,
            Err(err) => {
                self.status = Some(err.to_string());
                return;
            }
        };
        match self
            .session
            .merge_new_words(&words, replace, &self.config, &mut self.rng)
        {
            Ok(report) => {
                self.profile.default_vocabulary = false;
                self.status = Some(format!(
                    "Imported {} new words ({} active)",
                    report.added, report.active
                ));
                self.reset_board();
                self.persist();
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    /// Adjust the selected settings field. Invalid values are rejected by the
    /// config setters and reported; the prior value stays.
    pub fn settings_adjust(&mut self, forward: bool) {
        let outcome = match self.settings_selected {
            0 => {
                self.config.mode = if forward {
                    self.config.mode.cycle()
                } else {
                    self.config.mode.cycle().cycle()
                };
                Ok(())
            }
            1 => {
                let delta = if forward { 1 } else { -1 };
                self.config
                    .set_focus_set_size(self.config.focus_set_size as i64 + delta)
            }
            2 => {
                let delta = if forward { 5 } else { -5 };
                self.config
                    .set_least_typed_sample_chance(i64::from(self.config.least_typed_sample_chance) + delta)
            }
            3 => {
                let delta = if forward { 1 } else { -1 };
                self.config
                    .set_words_per_line(self.config.words_per_line as i64 + delta)
            }
            _ => {
                self.config.length_weighting = !self.config.length_weighting;
                self.session.rebuild_scores(self.config.length_weighting);
                Ok(())
            }
        };
        match outcome {
            Ok(()) => {
                self.status = None;
                self.apply_config_change();
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    pub fn stats_select_next(&mut self) {
        let count = self.session.pool().active_count();
        if count > 0 {
            self.stats_selected = (self.stats_selected + 1).min(count - 1);
        }
    }

    pub fn stats_select_prev(&mut self) {
        self.stats_selected = self.stats_selected.saturating_sub(1);
    }
}
