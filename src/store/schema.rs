use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::stats::{AttemptRecord, PairStatsStore};

pub const SCHEMA_VERSION: u32 = 1;

/// Per-word attempt records for the active pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WordStatsData {
    pub schema_version: u32,
    pub stats: HashMap<String, AttemptRecord>,
}

impl Default for WordStatsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            stats: HashMap::new(),
        }
    }
}

/// Ordered-pair attempt records, keyed as `"first->second"`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PairStatsData {
    pub schema_version: u32,
    pub stats: PairStatsStore,
}

impl Default for PairStatsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            stats: PairStatsStore::default(),
        }
    }
}

/// Archived words removed from practice, stats retained for restore.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemovedWordsData {
    pub schema_version: u32,
    pub words: HashMap<String, AttemptRecord>,
}

impl Default for RemovedWordsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            words: HashMap::new(),
        }
    }
}

/// The least-recently-typed frequency buffer, head = longest untyped.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BufferData {
    pub schema_version: u32,
    pub buffer: Vec<String>,
}

impl Default for BufferData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            buffer: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileData {
    pub schema_version: u32,
    /// False once the user has uploaded or edited the vocabulary.
    pub default_vocabulary: bool,
    pub total_words_typed: u64,
    pub last_practice_at: Option<DateTime<Utc>>,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            default_vocabulary: true,
            total_words_typed: 0,
            last_practice_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_current_schema_version() {
        assert_eq!(WordStatsData::default().schema_version, SCHEMA_VERSION);
        assert_eq!(PairStatsData::default().schema_version, SCHEMA_VERSION);
        assert_eq!(RemovedWordsData::default().schema_version, SCHEMA_VERSION);
        assert_eq!(BufferData::default().schema_version, SCHEMA_VERSION);
        let profile = ProfileData::default();
        assert!(profile.default_vocabulary);
        assert_eq!(profile.total_words_typed, 0);
    }

    #[test]
    fn word_stats_roundtrip_preserves_records() {
        let mut data = WordStatsData::default();
        let mut record = AttemptRecord::default();
        record.record_attempt(450, true, 1.0);
        data.stats.insert("hello".to_string(), record);

        let json = serde_json::to_string(&data).unwrap();
        let back: WordStatsData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.stats["hello"].total, 1);
        assert_eq!(back.stats["hello"].times_ms, vec![450]);
    }
}
