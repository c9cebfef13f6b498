//! Chip-amount decomposition.
//!
//! Turns a target bet amount into an ordered list of chip denominations
//! summing to it, using canonical coin-change with a first-fit rule:
//! at every amount the first solvable denomination in descending order
//! wins and no further denominations are tried. That keeps results
//! deterministic and biased toward larger chips (fewer clicks), without
//! guaranteeing a globally minimal chip count.

use std::num::NonZeroU64;
use tracing::debug;

/// Decompose `target` into denominations drawn from `available`.
///
/// Returns the ordered click path, or `None` when no combination of the
/// available denominations reaches the target. A zero target is
/// vacuously composable as the empty path. Input order, duplicates, and
/// zero entries in `available` do not affect the result.
///
/// The table is strided by the denominations' gcd: only multiples of it
/// are reachable, so time is O(target/gcd × |available|) and space
/// O(target/gcd). Callers bound `target` (the executor's max bet).
pub fn compose(target: u64, available: &[u64]) -> Option<Vec<u64>> {
    if target == 0 {
        return Some(Vec::new());
    }

    // Deduplicated descending order drives the first-fit tie-break:
    // larger chips are preferred at every amount.
    let mut denoms: Vec<u64> = available.iter().copied().filter(|d| *d > 0).collect();
    denoms.sort_unstable_by(|a, b| b.cmp(a));
    denoms.dedup();
    if denoms.is_empty() {
        debug!(target, "no denominations available");
        return None;
    }

    let stride = denoms.iter().copied().fold(0, gcd);
    if target % stride != 0 {
        debug!(target, stride, "target not on denomination stride");
        return None;
    }

    // choice[i] is the first denomination that solves amount i × stride,
    // None where no combination exists.
    let slots = (target / stride) as usize;
    let mut choice: Vec<Option<NonZeroU64>> = vec![None; slots + 1];

    for slot in 1..=slots {
        let amount = slot as u64 * stride;
        for &d in &denoms {
            if d > amount {
                continue;
            }
            let prev = ((amount - d) / stride) as usize;
            if prev == 0 || choice[prev].is_some() {
                choice[slot] = NonZeroU64::new(d);
                break;
            }
        }
    }

    choice[slots]?;

    // Walk back down from the target, reporting the denomination chosen
    // at each remaining amount.
    let mut path = Vec::new();
    let mut remaining = target;
    while remaining > 0 {
        let d = choice[(remaining / stride) as usize]?.get();
        path.push(d);
        remaining -= d;
    }

    debug!(target, chips = path.len(), "composed amount");
    Some(path)
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
