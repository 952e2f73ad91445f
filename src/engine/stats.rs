use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of trailing attempts that drive the live AWPM score.
pub const RECENT_WINDOW: usize = 10;

// ---------------------------------------------------------------------------
// AttemptRecord
// ---------------------------------------------------------------------------

/// Rolling performance record, shared by single words and ordered word pairs.
///
/// `times_ms` keeps the full attempt history but only the trailing
/// [`RECENT_WINDOW`] entries are ever read; `last_ten_correct` is a bounded
/// FIFO of correctness flags for the same window. `awpm` is a cached score,
/// recomputed after every attempt (and once at load time for records persisted
/// before the field existed).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub times_ms: Vec<u64>,
    pub correct: u32,
    pub total: u32,
    #[serde(default)]
    pub last_ten_correct: VecDeque<bool>,
    #[serde(default)]
    pub awpm: f64,
}

impl AttemptRecord {
    pub fn record_attempt(&mut self, duration_ms: u64, was_correct: bool, weight: f64) {
        self.times_ms.push(duration_ms);
        self.total += 1;
        if was_correct {
            self.correct += 1;
        }
        if self.last_ten_correct.len() >= RECENT_WINDOW {
            self.last_ten_correct.pop_front();
        }
        self.last_ten_correct.push_back(was_correct);
        self.awpm = self.compute_awpm(weight);
    }

    /// Adjusted words per minute over the trailing window: raw speed minus an
    /// error penalty, clamped at zero. Degenerate inputs (no attempts, zero
    /// elapsed time) score 0 rather than inf/NaN.
    pub fn compute_awpm(&self, weight: f64) -> f64 {
        let start = self.times_ms.len().saturating_sub(RECENT_WINDOW);
        let recent = &self.times_ms[start..];
        if recent.is_empty() {
            return 0.0;
        }
        let minutes = recent.iter().sum::<u64>() as f64 / 60_000.0;
        if minutes <= 0.0 {
            return 0.0;
        }
        let attempts = recent.len() as f64;
        let recent_correct = self.last_ten_correct.iter().filter(|c| **c).count() as f64;
        let errors = attempts - recent_correct;
        ((weight * attempts) / minutes - errors / minutes).max(0.0)
    }

    pub fn attempted(&self) -> bool {
        self.total > 0
    }

    /// Attempts inside the live window.
    pub fn recent_count(&self) -> usize {
        self.times_ms.len().min(RECENT_WINDOW)
    }
}

/// Score weight for a single word. 1.0 unless length weighting is enabled.
pub fn word_weight(word: &str, length_weighting: bool) -> f64 {
    if length_weighting {
        word.chars().count() as f64 / 5.0
    } else {
        1.0
    }
}

/// Score weight for an ordered pair: mean word length over the standard
/// five-character word, when length weighting is enabled.
pub fn pair_weight(first: &str, second: &str, length_weighting: bool) -> f64 {
    if length_weighting {
        (first.chars().count() + second.chars().count()) as f64 / 2.0 / 5.0
    } else {
        1.0
    }
}

// ---------------------------------------------------------------------------
// PairKey
// ---------------------------------------------------------------------------

/// Ordered, directional word pair: `(a, b)` and `(b, a)` are distinct keys.
///
/// Serializes as the string `"first->second"` so persisted pair maps keep a
/// plain JSON-object shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub first: String,
    pub second: String,
}

impl PairKey {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn involves(&self, word: &str) -> bool {
        self.first == word || self.second == word
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.first, self.second)
    }
}

impl Serialize for PairKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct PairKeyVisitor;

impl Visitor<'_> for PairKeyVisitor {
    type Value = PairKey;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a pair key of the form \"first->second\"")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<PairKey, E> {
        match value.split_once("->") {
            Some((first, second)) if !first.is_empty() && !second.is_empty() => {
                Ok(PairKey::new(first, second))
            }
            _ => Err(E::custom(format!("malformed pair key: {value:?}"))),
        }
    }
}

impl<'de> Deserialize<'de> for PairKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(PairKeyVisitor)
    }
}

// ---------------------------------------------------------------------------
// PairStatsStore
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PairStatsStore {
    pub stats: HashMap<PairKey, AttemptRecord>,
}

impl PairStatsStore {
    /// Record one consecutive-pair attempt, lazily creating the record.
    pub fn record_attempt(&mut self, key: PairKey, duration_ms: u64, correct: bool, weight: f64) {
        self.stats
            .entry(key)
            .or_default()
            .record_attempt(duration_ms, correct, weight);
    }

    pub fn get(&self, key: &PairKey) -> Option<&AttemptRecord> {
        self.stats.get(key)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Drop every pair touching a word the predicate rejects. Called whenever
    /// the active pool changes membership.
    pub fn retain_valid(&mut self, is_valid: impl Fn(&str) -> bool) {
        self.stats
            .retain(|key, _| is_valid(&key.first) && is_valid(&key.second));
    }

    /// Load-time migration: recompute every cached score so records persisted
    /// by older versions (without `awpm` or `last_ten_correct`) heal in place.
    pub fn rebuild_awpm(&mut self, length_weighting: bool) {
        for (key, record) in &mut self.stats {
            let weight = pair_weight(&key.first, &key.second, length_weighting);
            record.awpm = record.compute_awpm(weight);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
