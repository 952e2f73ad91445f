pub mod controller;

pub use controller::{ScoringResult, Session, WordStatsRow};
