//! Tick driver.
//!
//! Runs one cooperative ticking task per timer. Each tick takes the timer
//! lock, advances it to the clock's current time, and broadcasts any
//! transitions before releasing the lock; the next tick is only scheduled
//! after the previous one returns. `pause`, `stop`, `reset`, and `suspend`
//! abort the ticking task and wait for it to be gone before touching the
//! timer, so no stale tick can land afterwards.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::engine::IntervalTimer;
use super::snapshot::{Snapshot, TimerStatus};
use crate::events::{Event, Transition};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);
pub const MAX_TICK_INTERVAL: Duration = Duration::from_millis(1000);

const CHANNEL_CAPACITY: usize = 64;

/// Read-only view of the timer for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerView {
    pub status: TimerStatus,
    pub index: Option<usize>,
    pub title: Option<String>,
    pub remaining_ms: u64,
    pub cycle: u32,
    pub completed_cycles: u32,
    pub progress: f64,
    pub finished: bool,
}

impl TimerView {
    fn of(timer: &IntervalTimer) -> Self {
        Self {
            status: timer.status(),
            index: timer.active_index(),
            title: timer.active_interval().map(|i| i.title.clone()),
            remaining_ms: timer.remaining_ms(),
            cycle: timer.current_cycle(),
            completed_cycles: timer.completed_cycles(),
            progress: timer.progress(),
            finished: timer.is_finished(),
        }
    }
}

#[derive(Clone)]
pub struct TickDriver {
    timer: Arc<Mutex<IntervalTimer>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    transition_sender: broadcast::Sender<Transition>,
}

impl TickDriver {
    pub fn new(timer: IntervalTimer) -> Self {
        Self::with_clock(timer, Arc::new(SystemClock))
    }

    pub fn with_clock(timer: IntervalTimer, clock: Arc<dyn Clock>) -> Self {
        let (transition_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            timer: Arc::new(Mutex::new(timer)),
            ticker: Arc::new(Mutex::new(None)),
            clock,
            tick_interval: DEFAULT_TICK_INTERVAL,
            transition_sender,
        }
    }

    /// Set the tick period, clamped to 10ms..=1s.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.clamp(MIN_TICK_INTERVAL, MAX_TICK_INTERVAL);
        self
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Subscribe to interval, round, and end transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<Transition> {
        self.transition_sender.subscribe()
    }

    pub async fn view(&self) -> TimerView {
        TimerView::of(&*self.timer.lock().await)
    }

    /// Run `f` against the timer under its lock.
    pub async fn with_timer<R>(&self, f: impl FnOnce(&IntervalTimer) -> R) -> R {
        f(&*self.timer.lock().await)
    }

    pub async fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // ── Controls ─────────────────────────────────────────────────────

    pub async fn start(&self) -> Vec<Event> {
        let (events, running) = self.command(|timer, now| timer.start_at(now)).await;
        if running && !events.is_empty() {
            self.spawn_ticker().await;
        }
        events
    }

    pub async fn pause(&self) -> Vec<Event> {
        self.cancel_ticker().await;
        self.command(|timer, now| timer.pause_at(now)).await.0
    }

    pub async fn resume(&self) -> Vec<Event> {
        let (events, running) = self.command(|timer, now| timer.resume_at(now)).await;
        if running && !events.is_empty() {
            self.spawn_ticker().await;
        }
        events
    }

    pub async fn stop(&self) -> Vec<Event> {
        self.cancel_ticker().await;
        self.command(|timer, now| timer.stop_at(now)).await.0
    }

    pub async fn reset(&self) -> Vec<Event> {
        self.cancel_ticker().await;
        self.command(|timer, now| timer.reset_at(now)).await.0
    }

    pub async fn skip_current(&self) -> Vec<Event> {
        let (events, running) = self.command(|timer, now| timer.skip_current_at(now)).await;
        if !running {
            self.cancel_ticker().await;
        }
        events
    }

    /// Stop ticking and capture the state for storage. The timer keeps its
    /// status; call [`restore`](Self::restore) to pick up again.
    pub async fn suspend(&self) -> Snapshot {
        self.cancel_ticker().await;
        let timer = self.timer.lock().await;
        let snapshot = timer.suspend_at(self.clock.now());
        debug!(?snapshot, "timer suspended");
        snapshot
    }

    pub async fn restore(&self, snapshot: Snapshot) -> Vec<Event> {
        self.cancel_ticker().await;
        let (events, running) = self
            .command(move |timer, now| timer.restore_at(snapshot, now))
            .await;
        if running {
            self.spawn_ticker().await;
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    async fn command(
        &self,
        f: impl FnOnce(&mut IntervalTimer, chrono::DateTime<chrono::Utc>) -> Vec<Event>,
    ) -> (Vec<Event>, bool) {
        let mut timer = self.timer.lock().await;
        let events = f(&mut *timer, self.clock.now());
        publish(&self.transition_sender, &events);
        (events, timer.is_running())
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
            let _ = handle.await;
        }

        let timer = self.timer.clone();
        let clock = self.clock.clone();
        let sender = self.transition_sender.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let mut guard = timer.lock().await;
                if !guard.is_running() {
                    break;
                }
                let events = guard.tick_at(clock.now());
                trace!(remaining_ms = guard.remaining_ms(), "driver tick");
                publish(&sender, &events);
                if !guard.is_running() {
                    break;
                }
            }
            debug!("ticker exited");
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        let handle = self.ticker.lock().await.take();
        if let Some(handle) = handle {
            handle.abort();
            // Wait until the task is really gone.
            let _ = handle.await;
        }
    }
}

fn publish(sender: &broadcast::Sender<Transition>, events: &[Event]) {
    for transition in events.iter().filter_map(Event::transition) {
        // No subscribers is fine.
        sender.send(transition).ok();
    }
}
