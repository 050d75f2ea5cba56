//! Plain-data bridge across process suspension.
//!
//! The host stores a [`Snapshot`] when the app goes to the background and hands
//! it back on resume. Only the reference instant and the state at that instant
//! are kept; the resolved state is recomputed from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resolver::ResolvedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[default]
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Wall-clock instant the state below was observed at.
    pub reference: DateTime<Utc>,
    pub state: ResolvedState,
    pub status: TimerStatus,
}

impl Snapshot {
    /// Milliseconds between `reference` and `now`. A clock that moved
    /// backwards yields zero.
    pub fn elapsed_since_ms(&self, now: DateTime<Utc>) -> u64 {
        elapsed_ms(self.reference, now)
    }
}

/// Whole milliseconds from `from` to `to`, clamped at zero.
///
/// Both instants are reduced to epoch milliseconds before subtracting, so a
/// run of consecutive deltas sums to exactly the delta across the whole run.
pub fn elapsed_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    let delta = to.timestamp_millis().saturating_sub(from.timestamp_millis());
    u64::try_from(delta).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 7, 0, 0).unwrap()
    }

    #[test]
    fn negative_elapsed_is_zero() {
        assert_eq!(elapsed_ms(t0(), t0() - Duration::seconds(5)), 0);
        assert_eq!(elapsed_ms(t0(), t0() + Duration::milliseconds(1500)), 1500);
    }

    #[test]
    fn sub_millisecond_deltas_sum_exactly() {
        let start = t0() + Duration::microseconds(300);
        let steps = [
            start + Duration::microseconds(900),
            start + Duration::microseconds(2_100),
            start + Duration::microseconds(2_700),
            start + Duration::microseconds(10_050),
        ];
        let mut previous = start;
        let mut sum = 0;
        for step in steps {
            sum += elapsed_ms(previous, step);
            previous = step;
        }
        assert_eq!(sum, elapsed_ms(start, previous));
    }

    #[test]
    fn snapshot_json_shape() {
        let snapshot = Snapshot {
            reference: t0(),
            state: ResolvedState::Active {
                index: 1,
                remaining_ms: 4000,
                cycle: 2,
            },
            status: TimerStatus::Running,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "running");
        assert_eq!(json["state"]["state"], "active");
        assert_eq!(json["state"]["cycle"], 2);
        let back: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
        assert_eq!(back.elapsed_since_ms(t0() + Duration::seconds(3)), 3000);
    }
}
