//! Interval timer engine.
//!
//! A wall-clock-based state machine. It does not use internal threads - the
//! caller (usually [`TickDriver`](super::TickDriver)) calls `tick_at()`
//! periodically and every advance goes through the resolver.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running <-> Paused
//!    ^          |           |
//!    +----------+-----------+   (stop, reset, or rounds exhausted)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = IntervalTimer::new(sequence, LoopPolicy::rounds(8));
//! timer.start();
//! // In a loop:
//! for event in timer.tick() { /* transitions */ }
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info, trace, warn};

use super::policy::LoopPolicy;
use super::resolver::{initial_state, resolve_from, ResolvedState};
use super::sequence::{Interval, IntervalSequence};
use super::snapshot::{elapsed_ms, Snapshot, TimerStatus};
use crate::events::{Event, Transition};

/// Core interval timer.
///
/// Commands return the events they produced; an empty vector means the
/// command did not apply in the current status.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    sequence: IntervalSequence,
    policy: LoopPolicy,
    status: TimerStatus,
    state: ResolvedState,
    /// Instant the running state was last brought up to date.
    last_tick: Option<DateTime<Utc>>,
    /// Rounds completed by the last run that reached its end.
    finished_rounds: Option<u32>,
}

impl IntervalTimer {
    pub fn new(sequence: IntervalSequence, policy: LoopPolicy) -> Self {
        let state = initial_state(&sequence, policy);
        Self {
            sequence,
            policy,
            status: TimerStatus::Stopped,
            state,
            last_tick: None,
            finished_rounds: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn sequence(&self) -> &IntervalSequence {
        &self.sequence
    }

    pub fn policy(&self) -> LoopPolicy {
        self.policy
    }

    /// State as of the last tick or command.
    pub fn resolved(&self) -> ResolvedState {
        self.state
    }

    /// State at `now` without advancing the timer.
    pub fn state_at(&self, now: DateTime<Utc>) -> ResolvedState {
        match (self.status, self.last_tick) {
            (TimerStatus::Running, Some(last)) => {
                resolve_from(&self.sequence, self.policy, self.state, elapsed_ms(last, now))
            }
            _ => self.state,
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.state.index()
    }

    pub fn active_interval(&self) -> Option<&Interval> {
        self.state.index().and_then(|i| self.sequence.get(i))
    }

    pub fn remaining_ms(&self) -> u64 {
        self.state.remaining_ms()
    }

    /// 1-based cycle in progress; 0 when there is nothing to run.
    pub fn current_cycle(&self) -> u32 {
        self.state.cycle().unwrap_or(0)
    }

    pub fn completed_cycles(&self) -> u32 {
        match self.finished_rounds {
            Some(rounds) => rounds,
            None => self.current_cycle().saturating_sub(1),
        }
    }

    /// 0.0 .. 1.0 progress within the active interval.
    pub fn progress(&self) -> f64 {
        self.state.progress(&self.sequence)
    }

    /// True once a run reached the end of its rounds, or when the sequence
    /// has nothing to run. Cleared by `reset` and `start`.
    pub fn is_finished(&self) -> bool {
        self.finished_rounds.is_some() || self.state.is_finished()
    }

    /// Build a full state snapshot event.
    pub fn snapshot_event(&self, at: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            status: self.status,
            index: self.active_index(),
            title: self.active_interval().map(|i| i.title.clone()),
            remaining_ms: self.remaining_ms(),
            total_ms: self.active_interval().map(|i| i.duration_ms).unwrap_or(0),
            cycle: self.current_cycle(),
            completed_cycles: self.completed_cycles(),
            round_limit: self.policy.round_limit(),
            progress: self.progress(),
            finished: self.is_finished(),
            at,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        match self.status {
            TimerStatus::Running => Vec::new(),
            TimerStatus::Paused => self.resume_at(now),
            TimerStatus::Stopped => {
                let ResolvedState::Active {
                    index,
                    remaining_ms,
                    cycle,
                } = self.state
                else {
                    warn!(
                        intervals = self.sequence.len(),
                        playable = self.sequence.playable_len(),
                        "start ignored: sequence has nothing to run"
                    );
                    return Vec::new();
                };
                self.status = TimerStatus::Running;
                self.last_tick = Some(now);
                self.finished_rounds = None;
                info!(index, cycle, remaining_ms, "timer started");
                vec![Event::TimerStarted {
                    index,
                    cycle,
                    remaining_ms,
                    at: now,
                }]
            }
        }
    }

    /// Pause at exactly the state reached at `now`.
    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.status != TimerStatus::Running {
            return Vec::new();
        }
        let mut events = self.flush(now);
        // Flushing may have run the timer to its end.
        if self.status == TimerStatus::Running {
            self.status = TimerStatus::Paused;
            self.last_tick = None;
            info!(remaining_ms = self.remaining_ms(), "timer paused");
            events.push(Event::TimerPaused {
                index: self.active_index().unwrap_or(0),
                cycle: self.current_cycle(),
                remaining_ms: self.remaining_ms(),
                at: now,
            });
        }
        events
    }

    /// Continue from the paused state; `now` becomes the new reference.
    pub fn resume_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.status != TimerStatus::Paused {
            return Vec::new();
        }
        self.status = TimerStatus::Running;
        self.last_tick = Some(now);
        info!(remaining_ms = self.remaining_ms(), "timer resumed");
        vec![Event::TimerResumed {
            index: self.active_index().unwrap_or(0),
            cycle: self.current_cycle(),
            remaining_ms: self.remaining_ms(),
            at: now,
        }]
    }

    /// Halt and return to the first interval. No-op when already stopped.
    pub fn stop_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.status == TimerStatus::Stopped {
            return Vec::new();
        }
        self.rewind();
        info!("timer stopped");
        vec![Event::TimerStopped { at: now }]
    }

    pub fn reset_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        self.rewind();
        self.finished_rounds = None;
        info!("timer reset");
        vec![Event::TimerReset { at: now }]
    }

    /// Jump to the start of the next interval, firing the same transition a
    /// natural boundary would. No-op while stopped.
    pub fn skip_current_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.status == TimerStatus::Stopped {
            return Vec::new();
        }
        let mut events = self.tick_at(now);
        let before = self.state;
        let ResolvedState::Active {
            index: from_index,
            remaining_ms,
            ..
        } = before
        else {
            return events;
        };
        let after = resolve_from(&self.sequence, self.policy, before, remaining_ms);
        info!(from_index, to_index = ?after.index(), "interval skipped");
        events.push(Event::IntervalSkipped {
            from_index,
            to_index: after.index(),
            at: now,
        });
        self.apply(before, after, now, &mut events);
        events
    }

    /// Bring a running timer up to `now`.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        if self.status != TimerStatus::Running {
            return Vec::new();
        }
        self.flush(now)
    }

    pub fn start(&mut self) -> Vec<Event> {
        self.start_at(Utc::now())
    }

    pub fn pause(&mut self) -> Vec<Event> {
        self.pause_at(Utc::now())
    }

    pub fn resume(&mut self) -> Vec<Event> {
        self.resume_at(Utc::now())
    }

    pub fn stop(&mut self) -> Vec<Event> {
        self.stop_at(Utc::now())
    }

    pub fn reset(&mut self) -> Vec<Event> {
        self.reset_at(Utc::now())
    }

    pub fn skip_current(&mut self) -> Vec<Event> {
        self.skip_current_at(Utc::now())
    }

    /// Call periodically. Returns transition events when the position moved.
    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(Utc::now())
    }

    /// Replace the sequence. Only meant for a stopped or paused timer; the
    /// timer is reset either way.
    pub fn set_sequence(&mut self, sequence: IntervalSequence) {
        self.sequence = sequence;
        self.reset();
    }

    pub fn set_policy(&mut self, policy: LoopPolicy) {
        self.policy = policy;
        self.reset();
    }

    // ── Suspension ───────────────────────────────────────────────────

    /// Capture the state at `now` for storage across suspension.
    pub fn suspend_at(&self, now: DateTime<Utc>) -> Snapshot {
        Snapshot {
            reference: now,
            state: self.state_at(now),
            status: self.status,
        }
    }

    /// Pick up from a stored snapshot, fast-forwarding through everything
    /// that happened since it was taken.
    ///
    /// Only the final transition is reported; intermediate ones that passed
    /// while suspended are not replayed.
    pub fn restore_at(&mut self, snapshot: Snapshot, now: DateTime<Utc>) -> Vec<Event> {
        let elapsed = snapshot.elapsed_since_ms(now);
        let mut events = vec![Event::TimerRestored {
            status: snapshot.status,
            elapsed_ms: elapsed,
            at: now,
        }];
        self.finished_rounds = None;

        match snapshot.status {
            TimerStatus::Running => {
                let before = snapshot.state;
                if resolve_from(&self.sequence, self.policy, before, 0).is_finished() {
                    warn!(state = ?before, "running snapshot does not fit sequence, resetting");
                    self.rewind();
                    return events;
                }
                let after = resolve_from(&self.sequence, self.policy, before, elapsed);
                debug!(elapsed, ?before, ?after, "fast-forwarding restored timer");
                self.state = before;
                self.status = TimerStatus::Running;
                // A clock behind the reference keeps the reference.
                self.last_tick = Some(now.max(snapshot.reference));
                self.apply(before, after, now, &mut events);
            }
            TimerStatus::Paused => {
                let state = resolve_from(&self.sequence, self.policy, snapshot.state, 0);
                if state.is_finished() {
                    warn!(state = ?snapshot.state, "paused snapshot does not fit sequence, resetting");
                    self.rewind();
                } else {
                    self.state = state;
                    self.status = TimerStatus::Paused;
                    self.last_tick = None;
                }
            }
            TimerStatus::Stopped => self.rewind(),
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();
        let Some(last) = self.last_tick else {
            return events;
        };
        if now.timestamp_millis() < last.timestamp_millis() {
            // Keep the old reference until the clock catches up again.
            warn!(%last, %now, "clock moved backwards, treating as zero elapsed");
            return events;
        }
        let elapsed = elapsed_ms(last, now);
        self.last_tick = Some(now);
        let before = self.state;
        let after = resolve_from(&self.sequence, self.policy, before, elapsed);
        trace!(elapsed, remaining_ms = after.remaining_ms(), "tick");
        self.apply(before, after, now, &mut events);
        events
    }

    fn apply(
        &mut self,
        before: ResolvedState,
        after: ResolvedState,
        now: DateTime<Utc>,
        events: &mut Vec<Event>,
    ) {
        self.state = after;
        let Some(transition) = Transition::between(&before, &after, self.policy) else {
            return;
        };
        debug!(?transition, "transition");
        events.push(Event::Transition {
            transition,
            at: now,
        });
        if let Transition::TimerEnd { completed_rounds } = transition {
            self.finish(completed_rounds);
        }
    }

    fn finish(&mut self, completed_rounds: u32) {
        info!(completed_rounds, "timer finished");
        self.rewind();
        self.finished_rounds = Some(completed_rounds);
    }

    fn rewind(&mut self) {
        self.status = TimerStatus::Stopped;
        self.last_tick = None;
        self.state = initial_state(&self.sequence, self.policy);
    }
}
