use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{LoopPolicy, ResolvedState, TimerStatus};

/// Feedback raised when the resolved position changes between two
/// observations. Subscribers (sound, haptics, display) decide what to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    /// Active interval changed within the same cycle.
    IntervalTransition {
        from_index: usize,
        to_index: usize,
        cycle: u32,
    },
    /// The sequence wrapped and another round is running.
    RoundComplete {
        completed_rounds: u32,
        cycle: u32,
        index: usize,
    },
    /// The round budget is exhausted; the timer has stopped.
    TimerEnd { completed_rounds: u32 },
}

impl Transition {
    /// Classify the move from `before` to `after`, if anything observable
    /// changed. `before` must be an active state. Several wraps in one step
    /// collapse into a single `RoundComplete`.
    pub fn between(
        before: &ResolvedState,
        after: &ResolvedState,
        policy: LoopPolicy,
    ) -> Option<Self> {
        let ResolvedState::Active {
            index: from_index,
            cycle: from_cycle,
            ..
        } = *before
        else {
            return None;
        };
        match *after {
            ResolvedState::Finished => Some(Transition::TimerEnd {
                completed_rounds: policy.round_limit().unwrap_or(from_cycle),
            }),
            ResolvedState::Active { index, cycle, .. } if cycle > from_cycle => {
                Some(Transition::RoundComplete {
                    completed_rounds: cycle - 1,
                    cycle,
                    index,
                })
            }
            ResolvedState::Active { index, cycle, .. } if index != from_index => {
                Some(Transition::IntervalTransition {
                    from_index,
                    to_index: index,
                    cycle,
                })
            }
            ResolvedState::Active { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Transition::TimerEnd { .. })
    }
}

/// Every state change in the timer produces an Event.
/// Hosts print, log, or forward them; transitions are also broadcast by the
/// tick driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        index: usize,
        cycle: u32,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        index: usize,
        cycle: u32,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        index: usize,
        cycle: u32,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    IntervalSkipped {
        from_index: usize,
        to_index: Option<usize>,
        at: DateTime<Utc>,
    },
    /// Timer picked up again from a saved snapshot.
    TimerRestored {
        status: TimerStatus,
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    Transition {
        transition: Transition,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: TimerStatus,
        index: Option<usize>,
        title: Option<String>,
        remaining_ms: u64,
        total_ms: u64,
        cycle: u32,
        completed_cycles: u32,
        round_limit: Option<u32>,
        progress: f64,
        finished: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The transition carried by this event, if any.
    pub fn transition(&self) -> Option<Transition> {
        match self {
            Event::Transition { transition, .. } => Some(*transition),
            _ => None,
        }
    }
}
