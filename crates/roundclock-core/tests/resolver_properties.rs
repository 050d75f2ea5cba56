//! Property-based tests for the interval resolver and reordering.
//!
//! 1. A non-looping sequence is finished exactly from the end of its total
//! 2. Looping: cycle = elapsed / total + 1 and the offset within the cycle
//!    lands inside the reported interval
//! 3. A round budget of n ends exactly at n * total
//! 4. Many small advances equal one jump over the same time
//! 5. Reordering is a permutation with dense order values

use proptest::prelude::*;
use roundclock_core::timer::{
    move_elements, reorder, resolve, resolve_from, IntervalSequence, LoopPolicy, ResolvedState,
};

// ── Strategies ──────────────────────────────────────────────────────────

/// Durations in milliseconds, including some zero-length intervals.
fn durations_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(prop_oneof![1 => Just(0u64), 6 => 1u64..90_000], 1..10)
}

fn positive_durations_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..90_000, 1..10)
}

fn sequence(durations: &[u64]) -> IntervalSequence {
    IntervalSequence::from_durations_ms(durations)
}

/// Offset of `state` within its cycle: time consumed so far in the cycle.
fn offset_in_cycle(seq: &IntervalSequence, state: ResolvedState) -> u64 {
    match state {
        ResolvedState::Active {
            index,
            remaining_ms,
            ..
        } => seq.cumulative_ms(index) + seq.duration_ms(index).unwrap_or(0) - remaining_ms,
        ResolvedState::Finished => panic!("expected an active state"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Non-looping completion
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn single_pass_finishes_at_total(
        durations in durations_strategy(),
        extra in 0u64..1_000_000,
    ) {
        let seq = sequence(&durations);
        let total = seq.total_ms();
        prop_assert_eq!(resolve(&seq, LoopPolicy::once(), total + extra), ResolvedState::Finished);
        if total > 0 {
            let before_end = resolve(&seq, LoopPolicy::once(), total - 1);
            prop_assert_eq!(before_end.cycle(), Some(1));
            prop_assert_eq!(before_end.remaining_ms(), 1);
        }
    }

    #[test]
    fn single_pass_position_matches_offset(
        durations in durations_strategy(),
        fraction in 0.0f64..1.0,
    ) {
        let seq = sequence(&durations);
        let total = seq.total_ms();
        prop_assume!(total > 0);
        let elapsed = ((total as f64) * fraction) as u64 % total;
        let state = resolve(&seq, LoopPolicy::once(), elapsed);
        prop_assert!(state.remaining_ms() > 0);
        prop_assert_eq!(offset_in_cycle(&seq, state), elapsed);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Looping cycle formula
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn infinite_cycle_formula(
        durations in durations_strategy(),
        elapsed in 0u64..50_000_000,
    ) {
        let seq = sequence(&durations);
        let total = seq.total_ms();
        let state = resolve(&seq, LoopPolicy::Infinite, elapsed);
        if total == 0 {
            prop_assert_eq!(state, ResolvedState::Finished);
        } else {
            prop_assert_eq!(state.cycle(), Some((elapsed / total + 1) as u32));
            prop_assert_eq!(offset_in_cycle(&seq, state), elapsed % total);
            let index = state.index().unwrap();
            prop_assert!(seq.duration_ms(index).unwrap() > 0);
        }
    }

    #[test]
    fn resolve_is_pure(
        durations in durations_strategy(),
        elapsed in 0u64..10_000_000,
        rounds in 1u32..6,
    ) {
        let seq = sequence(&durations);
        for policy in [LoopPolicy::Rounds(rounds), LoopPolicy::Infinite] {
            prop_assert_eq!(resolve(&seq, policy, elapsed), resolve(&seq, policy, elapsed));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Round budget
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rounds_end_exactly_at_budget(
        durations in positive_durations_strategy(),
        rounds in 1u32..8,
    ) {
        let seq = sequence(&durations);
        let budget = seq.total_ms() * u64::from(rounds);
        let policy = LoopPolicy::Rounds(rounds);
        prop_assert_eq!(resolve(&seq, policy, budget), ResolvedState::Finished);
        let last = resolve(&seq, policy, budget - 1);
        prop_assert_eq!(last.cycle(), Some(rounds));
        prop_assert_eq!(last.index(), Some(durations.len() - 1));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Incremental advance equals a single jump
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ticks_equal_jump(
        durations in durations_strategy(),
        steps in prop::collection::vec(0u64..40_000, 0..60),
        rounds in 1u32..5,
        infinite in any::<bool>(),
    ) {
        let seq = sequence(&durations);
        let policy = if infinite { LoopPolicy::Infinite } else { LoopPolicy::Rounds(rounds) };

        let mut state = resolve(&seq, policy, 0);
        for step in &steps {
            state = resolve_from(&seq, policy, state, *step);
        }
        let jump = resolve(&seq, policy, steps.iter().sum());
        prop_assert_eq!(state, jump);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Reordering
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reorder_is_a_permutation_with_dense_order(
        durations in positive_durations_strategy(),
        from in prop::collection::vec(0usize..12, 0..4),
        to in 0usize..12,
    ) {
        let seq = sequence(&durations);
        let moved = reorder(&seq, &from, to);

        prop_assert_eq!(moved.len(), seq.len());
        let mut before: Vec<_> = seq.intervals().iter().map(|i| i.id).collect();
        let mut after: Vec<_> = moved.intervals().iter().map(|i| i.id).collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);

        for (position, interval) in moved.intervals().iter().enumerate() {
            prop_assert_eq!(interval.order as usize, position);
        }
    }

    #[test]
    fn moved_block_is_contiguous_and_ordered(
        len in 1usize..12,
        from in prop::collection::vec(0usize..12, 1..4),
        to in 0usize..13,
    ) {
        let mut items: Vec<usize> = (0..len).collect();
        move_elements(&mut items, &from, to);

        let mut sources: Vec<usize> = from.iter().copied().filter(|&i| i < len).collect();
        sources.sort_unstable();
        sources.dedup();
        prop_assume!(!sources.is_empty());

        let start = items.iter().position(|v| *v == sources[0]).unwrap();
        prop_assert_eq!(&items[start..start + sources.len()], sources.as_slice());

        // Untouched elements keep their relative order.
        let rest: Vec<usize> = items.iter().copied().filter(|v| !sources.contains(v)).collect();
        let expected: Vec<usize> = (0..len).filter(|v| !sources.contains(v)).collect();
        prop_assert_eq!(rest, expected);
    }
}
