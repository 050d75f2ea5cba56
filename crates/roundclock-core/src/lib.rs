//! # Roundclock Core Library
//!
//! Core logic for Roundclock, an interval timer for workouts and routines.
//! Everything runs in-process: the CLI binary and any GUI host are thin
//! layers over this library.
//!
//! ## Architecture
//!
//! - **Resolver**: A pure function from (sequence, loop policy, elapsed time)
//!   to the active interval, its remaining time, and the cycle number
//! - **Timer Engine**: A wall-clock-based state machine that advances through
//!   the resolver whenever the caller invokes `tick()`
//! - **Tick Driver**: A tokio task that ticks the engine and broadcasts
//!   transitions to subscribers
//! - **Storage**: TOML configuration and a JSON snapshot file for suspension
//!
//! ## Key Components
//!
//! - [`IntervalTimer`]: Core timer state machine
//! - [`TickDriver`]: Async ticking and transition broadcast
//! - [`resolve`]: Elapsed time to position
//! - [`Config`]: Application configuration management
//! - [`SessionStore`]: Snapshot persistence across runs

pub mod timer;
pub mod storage;
pub mod events;
pub mod error;

pub use timer::{
    reorder, resolve, resolve_from, Interval, IntervalSequence, IntervalTimer, LoopPolicy,
    ResolvedState, Snapshot, TickDriver, TimerStatus, TimerView,
};
pub use storage::{Config, SessionStore};
pub use events::{Event, Transition};
pub use error::{ConfigError, CoreError, ValidationError};
