//! Debug assertion macros for the ring-buffer invariants.
//!
//! Active only in debug builds, so the release-mode hot paths carry zero
//! checking overhead. Used by `SpscRing`, `MpscRing`, and `Slot`.

// =============================================================================
// Bounded occupancy: 0 <= (tail - head) <= capacity
// =============================================================================

/// Assert that the number of enqueued elements never exceeds capacity.
///
/// Checked after every counter advance on both variants.
macro_rules! debug_assert_bounded_len {
    ($len:expr, $capacity:expr) => {
        debug_assert!(
            $len <= $capacity,
            "occupancy {} exceeds capacity {}",
            $len,
            $capacity
        )
    };
}

// =============================================================================
// Monotonic progress: head and tail only ever increase
// =============================================================================

/// Assert that a counter never moves backwards.
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "{} decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

// =============================================================================
// Slot generation advance: freeing a slot never rewinds its sequence
// =============================================================================

/// Assert that a slot's sequence is non-decreasing across a free.
///
/// A freed slot moves from `reservation + 1` to `reservation + capacity`,
/// which rewinds only if the sequence protocol itself has been corrupted
/// (e.g. a second concurrent consumer).
macro_rules! debug_assert_generation_advance {
    ($old_seq:expr, $new_seq:expr) => {
        debug_assert!(
            $new_seq >= $old_seq,
            "slot sequence rewound from {} to {}",
            $old_seq,
            $new_seq
        )
    };
}

pub(crate) use debug_assert_bounded_len;
pub(crate) use debug_assert_generation_advance;
pub(crate) use debug_assert_monotonic;
