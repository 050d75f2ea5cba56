//! "Move rows" reordering used when editing a sequence.

use super::sequence::IntervalSequence;

/// Move the elements at `from` so they form one contiguous block at `to`.
///
/// `to` is an offset in the original indexing (the slot the block lands in
/// front of), so moving row 0 to offset 2 of `[a, b, c, d]` gives
/// `[b, a, c, d]`. Duplicate and out-of-range source indices are ignored and
/// `to` is clamped to the length. The moved elements keep their relative order.
pub fn move_elements<T>(items: &mut Vec<T>, from: &[usize], to: usize) {
    let len = items.len();
    let mut sources: Vec<usize> = from.iter().copied().filter(|&i| i < len).collect();
    sources.sort_unstable();
    sources.dedup();
    if sources.is_empty() {
        return;
    }

    let to = to.min(len);
    let shift = sources.iter().filter(|&&i| i < to).count();

    // Highest index first so the remaining indices stay valid.
    let mut moved: Vec<T> = sources.iter().rev().map(|&i| items.remove(i)).collect();
    moved.reverse();

    let destination = to - shift;
    items.splice(destination..destination, moved);
}

/// Return a copy of `sequence` with the intervals at `from` moved to `to` and
/// every `order` renumbered to its new position.
pub fn reorder(sequence: &IntervalSequence, from: &[usize], to: usize) -> IntervalSequence {
    let mut reordered = sequence.clone();
    reordered.move_intervals(from, to);
    reordered
}
