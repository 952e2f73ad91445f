use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};

use crate::engine::pool::WordPool;
use crate::engine::stats::PairStatsStore;
use crate::store::schema::{
    BufferData, PairStatsData, ProfileData, RemovedWordsData, WordStatsData,
};

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordpace");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Lenient load: a missing or unparseable file yields the default. Stats
    /// are valuable but never worth refusing to start over.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => T::default(),
            }
        } else {
            T::default()
        }
    }

    /// Atomic save: write to a temp file, fsync, rename over the target.
    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn load_word_stats(&self) -> WordStatsData {
        self.load("words.json")
    }

    pub fn save_word_stats(&self, data: &WordStatsData) -> Result<()> {
        self.save("words.json", data)
    }

    pub fn load_pair_stats(&self) -> PairStatsData {
        self.load("word_pairs.json")
    }

    pub fn save_pair_stats(&self, data: &PairStatsData) -> Result<()> {
        self.save("word_pairs.json", data)
    }

    pub fn load_removed_words(&self) -> RemovedWordsData {
        self.load("removed_words.json")
    }

    pub fn save_removed_words(&self, data: &RemovedWordsData) -> Result<()> {
        self.save("removed_words.json", data)
    }

    pub fn load_buffer(&self) -> BufferData {
        self.load("word_buffer.json")
    }

    pub fn save_buffer(&self, data: &BufferData) -> Result<()> {
        self.save("word_buffer.json", data)
    }

    pub fn load_profile(&self) -> ProfileData {
        self.load("profile.json")
    }

    pub fn save_profile(&self, data: &ProfileData) -> Result<()> {
        self.save("profile.json", data)
    }

    /// Persist the whole practice state in one pass. Called after every
    /// scoring cycle and vocabulary mutation.
    pub fn save_state(
        &self,
        pool: &WordPool,
        pairs: &PairStatsStore,
        profile: &ProfileData,
    ) -> Result<()> {
        self.save_word_stats(&WordStatsData {
            stats: pool.words().clone(),
            ..Default::default()
        })?;
        self.save_pair_stats(&PairStatsData {
            stats: pairs.clone(),
            ..Default::default()
        })?;
        self.save_removed_words(&RemovedWordsData {
            words: pool.removed().clone(),
            ..Default::default()
        })?;
        self.save_buffer(&BufferData {
            buffer: pool.buffer().to_vec(),
            ..Default::default()
        })?;
        self.save_profile(profile)?;
        Ok(())
    }
}
