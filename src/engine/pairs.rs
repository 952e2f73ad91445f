use rand::Rng;

use crate::engine::pool::WordPool;
use crate::engine::stats::{PairKey, PairStatsStore};

/// Candidate target for the single-direction query (hard mode).
pub const SINGLE_LIMIT: usize = 10;
/// Candidate target per side for the directional query (brutal mode).
pub const DIRECTIONAL_LIMIT: usize = 5;

/// One ranked transition involving the pivot word.
#[derive(Clone, Debug, PartialEq)]
pub struct PairCandidate {
    pub key: PairKey,
    pub awpm: f64,
    pub attempted: bool,
}

/// Candidates split by the pivot's position in the pair.
#[derive(Clone, Debug, Default)]
pub struct DirectionalCandidates {
    /// Pairs ending in the pivot (`x -> pivot`).
    pub preceding: Vec<PairCandidate>,
    /// Pairs starting with the pivot (`pivot -> y`).
    pub following: Vec<PairCandidate>,
}

/// Rank the worst transitions around `pivot`, either direction, worst first:
///
/// 1. typed pairs strictly slower than the pivot's own AWPM, slowest first
/// 2. untyped pairs, in random order
/// 3. remaining typed pairs, by ascending AWPM
///
/// Stored pairs touching a non-active word are excluded. When fewer than
/// `limit` stored candidates exist, untyped candidates are synthesized by
/// pairing the pivot with random other active words (random direction), under
/// a bounded number of sampling attempts.
pub fn worst_pairs(
    pivot: &str,
    pivot_awpm: f64,
    pairs: &PairStatsStore,
    pool: &WordPool,
    limit: usize,
    rng: &mut impl Rng,
) -> Vec<PairCandidate> {
    let mut candidates = stored_candidates(pivot, pairs, pool, |_| true);

    let others = pool.active_count().saturating_sub(1);
    if candidates.len() < limit && others > 0 {
        let active: Vec<&str> = pool.active_words().filter(|w| *w != pivot).collect();
        let mut attempts = (3 * others).min(300);
        while candidates.len() < limit && attempts > 0 {
            attempts -= 1;
            let other = active[rng.gen_range(0..active.len())];
            let key = if rng.gen_bool(0.5) {
                PairKey::new(pivot, other)
            } else {
                PairKey::new(other, pivot)
            };
            if candidates.iter().any(|c| c.key == key) {
                continue;
            }
            candidates.push(PairCandidate {
                key,
                awpm: 0.0,
                attempted: false,
            });
        }
    }

    rank(&mut candidates, pivot_awpm, rng);
    candidates.truncate(limit);
    candidates
}

/// Directional variant: rank up to `per_side` pairs preceding the pivot and
/// `per_side` following it, each side independently, by the same priority
/// rule as [`worst_pairs`].
pub fn worst_pairs_directional(
    pivot: &str,
    pivot_awpm: f64,
    pairs: &PairStatsStore,
    pool: &WordPool,
    per_side: usize,
    rng: &mut impl Rng,
) -> DirectionalCandidates {
    let mut preceding = stored_candidates(pivot, pairs, pool, |key| key.second == pivot);
    let mut following = stored_candidates(pivot, pairs, pool, |key| key.first == pivot);

    let others = pool.active_count().saturating_sub(1);
    if others > 0 && (preceding.len() < per_side || following.len() < per_side) {
        let active: Vec<&str> = pool.active_words().filter(|w| *w != pivot).collect();
        let mut attempts = (2 * others).min(200);
        while (preceding.len() < per_side || following.len() < per_side) && attempts > 0 {
            attempts -= 1;
            let other = active[rng.gen_range(0..active.len())];
            let side = if preceding.len() < per_side && following.len() < per_side {
                rng.gen_bool(0.5)
            } else {
                preceding.len() < per_side
            };
            let (key, bucket) = if side {
                (PairKey::new(other, pivot), &mut preceding)
            } else {
                (PairKey::new(pivot, other), &mut following)
            };
            if bucket.iter().any(|c| c.key == key) {
                continue;
            }
            bucket.push(PairCandidate {
                key,
                awpm: 0.0,
                attempted: false,
            });
        }
    }

    rank(&mut preceding, pivot_awpm, rng);
    preceding.truncate(per_side);
    rank(&mut following, pivot_awpm, rng);
    following.truncate(per_side);
    DirectionalCandidates {
        preceding,
        following,
    }
}

fn stored_candidates(
    pivot: &str,
    pairs: &PairStatsStore,
    pool: &WordPool,
    position: impl Fn(&PairKey) -> bool,
) -> Vec<PairCandidate> {
    pairs
        .stats
        .iter()
        .filter(|(key, _)| key.involves(pivot) && position(key))
        .filter(|(key, _)| pool.is_active(&key.first) && pool.is_active(&key.second))
        .map(|(key, record)| PairCandidate {
            key: key.clone(),
            awpm: record.awpm,
            attempted: record.attempted(),
        })
        .collect()
}

/// Decorate-and-sort implementing the canonical priority ordering as an
/// explicit (class, key) pair. Untyped pairs draw a random sort key so their
/// ties break uniformly.
fn rank(candidates: &mut [PairCandidate], pivot_awpm: f64, rng: &mut impl Rng) {
    let mut decorated: Vec<(u8, f64, PairCandidate)> = candidates
        .iter()
        .map(|c| {
            if c.attempted && c.awpm < pivot_awpm {
                (0, c.awpm, c.clone())
            } else if !c.attempted {
                (1, rng.gen::<f64>(), c.clone())
            } else {
                (2, c.awpm, c.clone())
            }
        })
        .collect();
    decorated.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then(a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    });
    for (slot, (_, _, candidate)) in candidates.iter_mut().zip(decorated) {
        *slot = candidate;
    }
}
