mod clock;
mod driver;
mod engine;
mod policy;
mod reorder;
mod resolver;
mod sequence;
mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{
    TickDriver, TimerView, DEFAULT_TICK_INTERVAL, MAX_TICK_INTERVAL, MIN_TICK_INTERVAL,
};
pub use engine::IntervalTimer;
pub use policy::LoopPolicy;
pub use reorder::{move_elements, reorder};
pub use resolver::{cycle_duration_ms, initial_state, resolve, resolve_from, ResolvedState};
pub use sequence::{Interval, IntervalSequence};
pub use snapshot::{elapsed_ms, Snapshot, TimerStatus};
