use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// One named, timed segment of a workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Stable identity across edits.
    pub id: Uuid,
    pub title: String,
    /// Duration in milliseconds. Zero is legal and skipped instantly.
    pub duration_ms: u64,
    /// Position in the sequence; renumbered densely after every edit.
    #[serde(default)]
    pub order: u32,
}

impl Interval {
    pub fn new(title: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            duration_ms,
            order: 0,
        }
    }

    /// Convenience constructor taking whole seconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn from_secs(title: impl Into<String>, secs: u64) -> Self {
        Self::new(title, secs.saturating_mul(1000))
    }
}

/// Ordered list of intervals making up one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Interval>", into = "Vec<Interval>")]
pub struct IntervalSequence {
    intervals: Vec<Interval>,
}

impl IntervalSequence {
    /// Build a sequence, renumbering `order` to the given positions.
    pub fn new(intervals: Vec<Interval>) -> Self {
        let mut sequence = Self { intervals };
        sequence.renumber();
        sequence
    }

    /// Build a sequence from `(title, seconds)` pairs.
    pub fn from_secs<'a>(items: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        Self::new(
            items
                .into_iter()
                .map(|(title, secs)| Interval::from_secs(title, secs))
                .collect(),
        )
    }

    /// Build a sequence of untitled intervals from millisecond durations.
    pub fn from_durations_ms(durations: &[u64]) -> Self {
        Self::new(
            durations
                .iter()
                .enumerate()
                .map(|(i, &ms)| Interval::new(format!("Interval {}", i + 1), ms))
                .collect(),
        )
    }

    /// The default Tabata-style sequence.
    pub fn default_tabata() -> Self {
        Self::from_secs([("Work", 20), ("Rest", 10)])
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Interval> {
        self.intervals.get(index)
    }

    pub fn duration_ms(&self, index: usize) -> Option<u64> {
        self.intervals.get(index).map(|i| i.duration_ms)
    }

    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.intervals.iter().position(|i| i.id == id)
    }

    pub fn find(&self, id: Uuid) -> Option<&Interval> {
        self.intervals.iter().find(|i| i.id == id)
    }

    /// Sum of all durations (one full cycle).
    pub fn total_ms(&self) -> u64 {
        self.intervals
            .iter()
            .fold(0u64, |acc, i| acc.saturating_add(i.duration_ms))
    }

    /// Cumulative milliseconds up to (but not including) `index`.
    pub fn cumulative_ms(&self, index: usize) -> u64 {
        self.intervals
            .iter()
            .take(index)
            .fold(0u64, |acc, i| acc.saturating_add(i.duration_ms))
    }

    /// Number of intervals with a non-zero duration.
    pub fn playable_len(&self) -> usize {
        self.intervals.iter().filter(|i| i.duration_ms > 0).count()
    }

    // ── Edits ────────────────────────────────────────────────────────
    //
    // The size limit is a product constraint and is enforced by the editing
    // caller (see `ensure_capacity`), not here.

    pub fn push(&mut self, interval: Interval) {
        self.intervals.push(interval);
        self.renumber();
    }

    pub fn insert(&mut self, index: usize, interval: Interval) -> Result<(), ValidationError> {
        if index > self.intervals.len() {
            return Err(ValidationError::OutOfBounds {
                collection: "sequence".into(),
                index,
                len: self.intervals.len(),
            });
        }
        self.intervals.insert(index, interval);
        self.renumber();
        Ok(())
    }

    pub fn remove(&mut self, id: Uuid) -> Result<Interval, ValidationError> {
        let index = self
            .position(id)
            .ok_or_else(|| ValidationError::UnknownInterval(id.to_string()))?;
        let removed = self.intervals.remove(index);
        self.renumber();
        Ok(removed)
    }

    /// Update title and/or duration of an interval in place.
    pub fn update(
        &mut self,
        id: Uuid,
        title: Option<String>,
        duration_ms: Option<u64>,
    ) -> Result<&Interval, ValidationError> {
        let interval = self
            .intervals
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| ValidationError::UnknownInterval(id.to_string()))?;
        if let Some(title) = title {
            interval.title = title;
        }
        if let Some(ms) = duration_ms {
            interval.duration_ms = ms;
        }
        Ok(&*interval)
    }

    /// Move the intervals at `from` so they start at `to`, then renumber.
    pub fn move_intervals(&mut self, from: &[usize], to: usize) {
        super::reorder::move_elements(&mut self.intervals, from, to);
        self.renumber();
    }

    /// Reset every `order` field to its 0-based position.
    pub fn renumber(&mut self) {
        for (position, interval) in self.intervals.iter_mut().enumerate() {
            interval.order = u32::try_from(position).unwrap_or(u32::MAX);
        }
    }

    pub fn ensure_capacity(&self, max: usize) -> Result<(), ValidationError> {
        if self.intervals.len() >= max {
            return Err(ValidationError::TooManyIntervals { max });
        }
        Ok(())
    }
}

impl From<Vec<Interval>> for IntervalSequence {
    fn from(intervals: Vec<Interval>) -> Self {
        Self::new(intervals)
    }
}

impl From<IntervalSequence> for Vec<Interval> {
    fn from(sequence: IntervalSequence) -> Self {
        sequence.intervals
    }
}

impl FromIterator<Interval> for IntervalSequence {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
