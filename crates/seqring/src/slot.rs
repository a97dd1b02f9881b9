use crate::invariants::debug_assert_generation_advance;
use crossbeam_utils::Backoff;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

/// One slot of the MPSC ring: a monotonic sequence number plus a value cell.
///
/// The sequence number encodes the slot's position in its lifecycle. For a
/// slot constructed at index `i` in a ring of capacity `c`:
///
/// - `sequence == t` where `t` is a tail reservation value mapping to this
///   slot: writable - a producer that wins the tail CAS at `t` owns it.
/// - `sequence == t + 1`: readable - the value has been published and the
///   consumer may take it once `head` reaches `t`.
/// - freeing advances the sequence to `t + c`, the slot's next writable
///   generation.
///
/// Each full write/read cycle therefore moves the sequence forward by
/// exactly `c`, so a stale observer can never confuse a recycled slot with
/// its previous incarnation (the ABA guard).
///
/// The value cell is an `Option<T>` rather than uninitialized storage:
/// `None` is the empty state, `Some` the published state. A readable slot
/// holding `None` is impossible under the protocol and treated as
/// corruption, not silently skipped.
pub(crate) struct Slot<T> {
    sequence: AtomicU64,
    value: UnsafeCell<Option<T>>,
}

impl<T> Slot<T> {
    /// How many scheduler yields `publish` tolerates after exponential
    /// backoff is exhausted before declaring the protocol corrupted.
    const PUBLISH_YIELD_LIMIT: u32 = 1 << 12;

    /// Creates a slot in its first writable generation.
    pub(crate) fn new(sequence: u64) -> Self {
        Self {
            sequence: AtomicU64::new(sequence),
            value: UnsafeCell::new(None),
        }
    }

    /// Current sequence number (acquire: pairs with the release stores in
    /// `publish` and `free`, so a matching value observed here also makes
    /// the cell contents visible).
    #[inline]
    pub(crate) fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }

    /// Publishes `value` into the slot owned via the tail reservation
    /// `reservation`.
    ///
    /// The value store happens strictly before the sequence advance that
    /// makes it visible (release). The wait loop guards against out-of-order
    /// completion of overlapping generations on the same index - a state the
    /// CAS-tail protocol already rules out, so it is expected to fall
    /// through on the first check; the bound turns an impossible hang into a
    /// loud failure.
    ///
    /// # Panics
    ///
    /// Panics if the slot never reaches the expected generation, which means
    /// the threading contract was violated (the sequence was moved by a
    /// thread that did not own it).
    pub(crate) fn publish(&self, reservation: u64, value: T) {
        let backoff = Backoff::new();
        let mut yields = 0;
        while self.sequence.load(Ordering::Acquire) != reservation {
            if backoff.is_completed() {
                yields += 1;
                assert!(
                    yields <= Self::PUBLISH_YIELD_LIMIT,
                    "slot stuck at sequence {} while publishing reservation {}: \
                     ring threading contract violated",
                    self.sequence.load(Ordering::Acquire),
                    reservation,
                );
                thread::yield_now();
            } else {
                backoff.snooze();
            }
        }

        // SAFETY: the caller won the tail CAS for `reservation`, and the
        // sequence check above confirmed the consumer has freed the previous
        // generation. No other thread reads or writes the cell until the
        // release store below moves the sequence to `reservation + 1`.
        unsafe {
            *self.value.get() = Some(value);
        }
        self.sequence.store(reservation.wrapping_add(1), Ordering::Release);
    }

    /// Takes the value if the slot is readable for head position `head`,
    /// i.e. its sequence is exactly `head + 1`.
    ///
    /// Returns `None` when the reserving producer has not finished
    /// publishing yet - the caller reports "empty" rather than waiting.
    ///
    /// # Panics
    ///
    /// Panics if the slot is readable but its cell is empty. Only a second
    /// concurrent consumer can produce that state.
    pub(crate) fn read_if_ready(&self, head: u64) -> Option<T> {
        if self.sequence.load(Ordering::Acquire) != head.wrapping_add(1) {
            return None;
        }

        // SAFETY: the acquire load above observed the producer's release
        // publish for this generation, and only the single consumer reaches
        // this point before `free` recycles the slot.
        let value = unsafe { (*self.value.get()).take() };
        match value {
            Some(v) => Some(v),
            None => panic!(
                "readable slot at sequence {} held no value: \
                 a second consumer violated the single-consumer contract",
                head.wrapping_add(1),
            ),
        }
    }

    /// Recycles the slot into its next writable generation after a read,
    /// advancing the sequence by `capacity - 1` (from `reservation + 1` to
    /// `reservation + capacity`).
    pub(crate) fn free(&self, capacity: u64) {
        let seq = self.sequence.load(Ordering::Relaxed);
        let next = seq.wrapping_sub(1).wrapping_add(capacity);
        debug_assert_generation_advance!(seq, next);
        self.sequence.store(next, Ordering::Release);
    }
}
