use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::pool::WordPool;

/// Distinct-sampling attempts per unfilled slot before the fallback tier
/// starts permitting duplicates.
const FILL_ATTEMPTS_PER_SLOT: usize = 10;

/// Pick `count` focus words from the active pool, slowest weaknesses first.
///
/// Selection tiers, in order:
/// 1. words from the previous focus set that were never attempted (they stay
///    until the user has actually typed them once)
/// 2. remaining untyped active words, uniformly at random
/// 3. typed active words by ascending AWPM
/// 4. random active words, when the pool is smaller than `count`; duplicates
///    only appear after bounded distinct-sampling attempts fail
pub fn select_focus_set(
    pool: &WordPool,
    previous: &[String],
    count: usize,
    rng: &mut impl Rng,
) -> Vec<String> {
    let mut selected: Vec<String> = Vec::with_capacity(count);

    for word in previous {
        if selected.len() >= count {
            break;
        }
        if let Some(stat) = pool.stat(word) {
            if !stat.attempted() && !selected.contains(word) {
                selected.push(word.clone());
            }
        }
    }

    if selected.len() < count {
        let mut untyped: Vec<&str> = pool
            .active_words()
            .filter(|w| !pool.stat(w).map(|s| s.attempted()).unwrap_or(false))
            .filter(|w| !selected.iter().any(|s| s == w))
            .collect();
        untyped.shuffle(rng);
        for word in untyped {
            if selected.len() >= count {
                break;
            }
            selected.push(word.to_string());
        }
    }

    if selected.len() < count {
        let mut typed: Vec<(&str, f64)> = pool
            .active_words()
            .filter(|w| pool.stat(w).map(|s| s.attempted()).unwrap_or(false))
            .filter(|w| !selected.iter().any(|s| s == w))
            .map(|w| (w, pool.awpm(w)))
            .collect();
        typed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        for (word, _) in typed {
            if selected.len() >= count {
                break;
            }
            selected.push(word.to_string());
        }
    }

    // The pool may hold fewer than `count` active words. Stalled previous
    // focus words (untyped carry-overs) never reappear as fill; if nothing
    // else exists, duplicate what was already selected rather than spin.
    if selected.len() < count && pool.active_count() > 0 {
        let fillable: Vec<&str> = pool
            .active_words()
            .filter(|w| {
                !(previous.iter().any(|p| p == *w)
                    && !pool.stat(w).map(|s| s.attempted()).unwrap_or(false))
            })
            .collect();

        let mut attempts = (count - selected.len()) * FILL_ATTEMPTS_PER_SLOT;
        while selected.len() < count && attempts > 0 && !fillable.is_empty() {
            attempts -= 1;
            let word = fillable[rng.gen_range(0..fillable.len())];
            if selected.iter().any(|s| s == word) {
                continue;
            }
            selected.push(word.to_string());
        }
        while selected.len() < count {
            let word = if fillable.is_empty() {
                match selected.first() {
                    Some(first) => first.clone(),
                    None => break,
                }
            } else {
                fillable[rng.gen_range(0..fillable.len())].to_string()
            };
            selected.push(word);
        }
    }

    selected
}
