pub mod focus;
pub mod pairs;
pub mod pool;
pub mod stats;

pub use pairs::{DirectionalCandidates, PairCandidate};
pub use stats::PairKey;
