use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Normal,
    Hard,
    Brutal,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Hard => "hard",
            Mode::Brutal => "brutal",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            Mode::Normal => Mode::Hard,
            Mode::Hard => Mode::Brutal,
            Mode::Brutal => Mode::Normal,
        }
    }
}

/// Rejected configuration input. The prior value is always retained.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("focus set size must be a positive integer")]
    FocusSetSize,
    #[error("least-typed sample chance must be between 0 and 100")]
    SampleChance,
    #[error("words per line must be a positive integer")]
    WordsPerLine,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_focus_set_size")]
    pub focus_set_size: usize,
    #[serde(default = "default_least_typed_sample_chance")]
    pub least_typed_sample_chance: u8,
    #[serde(default = "default_words_per_line")]
    pub words_per_line: usize,
    #[serde(default = "default_length_weighting")]
    pub length_weighting: bool,
}

fn default_focus_set_size() -> usize {
    5
}
fn default_least_typed_sample_chance() -> u8 {
    10
}
fn default_words_per_line() -> usize {
    6
}
fn default_length_weighting() -> bool {
    false
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            focus_set_size: default_focus_set_size(),
            least_typed_sample_chance: default_least_typed_sample_chance(),
            words_per_line: default_words_per_line(),
            length_weighting: default_length_weighting(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordpace")
            .join("config.toml")
    }

    /// Reset out-of-range values from stale or hand-edited config files.
    fn normalize(&mut self) {
        if self.focus_set_size == 0 {
            self.focus_set_size = default_focus_set_size();
        }
        if self.least_typed_sample_chance > 100 {
            self.least_typed_sample_chance = default_least_typed_sample_chance();
        }
        if self.words_per_line == 0 {
            self.words_per_line = default_words_per_line();
        }
    }

    pub fn set_focus_set_size(&mut self, value: i64) -> Result<(), ConfigError> {
        if value < 1 {
            return Err(ConfigError::FocusSetSize);
        }
        self.focus_set_size = value as usize;
        Ok(())
    }

    pub fn set_least_typed_sample_chance(&mut self, value: i64) -> Result<(), ConfigError> {
        if !(0..=100).contains(&value) {
            return Err(ConfigError::SampleChance);
        }
        self.least_typed_sample_chance = value as u8;
        Ok(())
    }

    pub fn set_words_per_line(&mut self, value: i64) -> Result<(), ConfigError> {
        if value < 1 {
            return Err(ConfigError::WordsPerLine);
        }
        self.words_per_line = value as usize;
        Ok(())
    }
}
