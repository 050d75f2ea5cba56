//! State resolver.
//!
//! Pure functions mapping `(sequence, policy, elapsed)` to the interval that is
//! active, the time left in it, and the cycle in progress. Live ticking and
//! restore-after-suspension both go through [`resolve_from`], so applying
//! 600 one-second deltas lands on exactly the same state as one 600-second
//! delta.
//!
//! ## Boundaries
//!
//! Intervals are half-open (`[start, end)`): at an exact boundary the next
//! interval is active. Reaching the end of the final permitted round yields
//! [`ResolvedState::Finished`] rather than a last interval with zero time
//! left. Zero-length intervals are walked over and never reported active.
//!
//! ```text
//! [30s, 20s], once,     e = 40s  -> Active { index: 1, remaining: 10s, cycle: 1 }
//! [30s, 20s], once,     e = 50s  -> Finished
//! [30s, 20s], infinite, e = 170s -> Active { index: 0, remaining: 10s, cycle: 4 }
//! ```

use serde::{Deserialize, Serialize};

use super::policy::LoopPolicy;
use super::sequence::IntervalSequence;

/// Where the timer is at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ResolvedState {
    Active {
        /// 0-based position in the sequence.
        index: usize,
        /// Time left in the active interval; always > 0.
        remaining_ms: u64,
        /// 1-based cycle in progress.
        cycle: u32,
    },
    /// Rounds exhausted, or nothing to run (empty/invalid input).
    Finished,
}

impl ResolvedState {
    /// Top of the first interval of cycle 1, before zero-length intervals
    /// are skipped. Use [`initial_state`] for the normalized form.
    pub fn start_of(sequence: &IntervalSequence) -> Self {
        match sequence.duration_ms(0) {
            Some(duration) => ResolvedState::Active {
                index: 0,
                remaining_ms: duration,
                cycle: 1,
            },
            None => ResolvedState::Finished,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, ResolvedState::Finished)
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            ResolvedState::Active { index, .. } => Some(*index),
            ResolvedState::Finished => None,
        }
    }

    pub fn remaining_ms(&self) -> u64 {
        match self {
            ResolvedState::Active { remaining_ms, .. } => *remaining_ms,
            ResolvedState::Finished => 0,
        }
    }

    pub fn cycle(&self) -> Option<u32> {
        match self {
            ResolvedState::Active { cycle, .. } => Some(*cycle),
            ResolvedState::Finished => None,
        }
    }

    /// 0.0 .. 1.0 progress within the active interval.
    pub fn progress(&self, sequence: &IntervalSequence) -> f64 {
        match self {
            ResolvedState::Active {
                index,
                remaining_ms,
                ..
            } => {
                let total = sequence.duration_ms(*index).unwrap_or(0);
                if total == 0 {
                    return 0.0;
                }
                let remaining = (*remaining_ms).min(total);
                1.0 - (remaining as f64 / total as f64)
            }
            ResolvedState::Finished => 1.0,
        }
    }
}

/// Length of one full cycle.
pub fn cycle_duration_ms(sequence: &IntervalSequence) -> u64 {
    sequence.total_ms()
}

/// State after `elapsed_ms` from the very start of cycle 1.
pub fn resolve(sequence: &IntervalSequence, policy: LoopPolicy, elapsed_ms: u64) -> ResolvedState {
    resolve_from(sequence, policy, ResolvedState::start_of(sequence), elapsed_ms)
}

/// The state a freshly started (or reset) timer shows.
pub fn initial_state(sequence: &IntervalSequence, policy: LoopPolicy) -> ResolvedState {
    resolve(sequence, policy, 0)
}

/// State after consuming `elapsed_ms` starting from `baseline`.
///
/// A baseline that does not fit the sequence (finished, index out of range,
/// cycle beyond the round budget) resolves to [`ResolvedState::Finished`].
/// A baseline `remaining_ms` longer than its interval is clamped to it.
pub fn resolve_from(
    sequence: &IntervalSequence,
    policy: LoopPolicy,
    baseline: ResolvedState,
    elapsed_ms: u64,
) -> ResolvedState {
    let ResolvedState::Active {
        index,
        remaining_ms,
        cycle,
    } = baseline
    else {
        return ResolvedState::Finished;
    };

    let intervals = sequence.intervals();
    let len = intervals.len();
    let cycle = cycle.max(1);
    if index >= len || !policy.allows_cycle(cycle) {
        return ResolvedState::Finished;
    }

    let remaining = remaining_ms.min(intervals[index].duration_ms);
    if elapsed_ms < remaining {
        return ResolvedState::Active {
            index,
            remaining_ms: remaining - elapsed_ms,
            cycle,
        };
    }

    let total = cycle_duration_ms(sequence);
    let mut elapsed = elapsed_ms - remaining;
    let mut index = index;
    let mut cycle = cycle;

    loop {
        index += 1;
        if index == len {
            let next = cycle.saturating_add(1);
            if total == 0 || !policy.allows_cycle(next) {
                return ResolvedState::Finished;
            }
            index = 0;
            cycle = next;

            if elapsed >= total {
                let wraps = elapsed / total;
                elapsed %= total;
                let target = u64::from(cycle) + wraps;
                if let Some(limit) = policy.round_limit() {
                    if target > u64::from(limit) {
                        return ResolvedState::Finished;
                    }
                }
                cycle = u32::try_from(target).unwrap_or(u32::MAX);
            }
        }

        let duration = intervals[index].duration_ms;
        if elapsed < duration {
            return ResolvedState::Active {
                index,
                remaining_ms: duration - elapsed,
                cycle,
            };
        }
        elapsed -= duration;
    }
}
