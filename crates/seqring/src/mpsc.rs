use crate::invariants::{debug_assert_bounded_len, debug_assert_monotonic};
use crate::slot::Slot;
use crate::{ConfigError, Full, RingQueue};
use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// SLOT-SEQUENCING PROTOCOL
// =============================================================================
//
// Vyukov-style bounded queue, specialized for a single consumer:
//
// **Producers** race for the next tail position with a CAS. Winning the CAS
// grants exclusive ownership of slot `tail & mask` for that generation; the
// winner stores its element and then release-bumps the slot sequence to
// `tail + 1`, which is what actually makes the element visible.
//
// **The consumer** owns `head` outright (plain store, no CAS - no other
// thread ever writes it). It reads slot `head & mask` only once the slot
// sequence reaches `head + 1`, then recycles the slot one full lap ahead.
//
// Sequence values per slot only ever increase: init `i`, published
// `t + 1`, recycled `t + capacity`. A producer comparing a slot's sequence
// against its tail snapshot can therefore never mistake a recycled slot for
// the generation it reserved (no ABA).
//
// Both failure paths are fail-fast by design: a full ring and a
// not-yet-published slot both surface immediately instead of spinning, so
// externally observable outcomes depend only on the interleaving of
// completed operations, never on hidden internal waits. The sole retry is
// the CAS restart after losing a reservation race, and the sole wait is the
// defensive bound inside `Slot::publish`.
//
// This gives FIFO completion ordering of reservations, but NOT
// linearizability of `try_send` against `try_recv`: a receive may return
// `None` while a logically earlier send's value store is still in flight.
// After all operations settle, the history is consistent with some valid
// sequential order (quiescent consistency).
//
// =============================================================================

/// Multi-producer single-consumer ring buffer - the primary variant.
///
/// Capacity must be a power of two: slot indices are computed by masking,
/// and the slot-generation arithmetic (`+ capacity` per lap) stays exact
/// under wraparound. Counters are unbounded `u64` sequences, so counter
/// wraparound is not a practical concern.
///
/// # Threading contract
///
/// Any number of threads may call [`try_send`](Self::try_send)
/// concurrently. Exactly one thread may call [`try_recv`](Self::try_recv);
/// a second concurrent consumer is unsupported. Where a violated contract
/// leaves cheap evidence (a readable slot with an empty cell, a slot
/// sequence that never settles) the ring fails loudly instead of losing
/// data silently.
pub struct MpscRing<T> {
    /// Next position to reserve for writing; producers advance it via CAS.
    tail: CachePadded<AtomicU64>,
    /// Next position to read; written only by the consumer.
    head: CachePadded<AtomicU64>,
    /// Slot `i` starts at sequence `i`, its first writable generation.
    slots: Box<[Slot<T>]>,
    capacity: usize,
    mask: u64,
}

// SAFETY: slot cells are handed between threads through the sequence
// protocol above - each cell has exactly one owner per generation, and
// ownership transfers happen through acquire/release sequence stores.
unsafe impl<T: Send> Send for MpscRing<T> {}
unsafe impl<T: Send> Sync for MpscRing<T> {}

impl<T> std::fmt::Debug for MpscRing<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MpscRing")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<T> MpscRing<T> {
    /// Creates a ring with `capacity` slots.
    ///
    /// # Errors
    ///
    /// `ConfigError::ZeroCapacity` if `capacity` is 0,
    /// `ConfigError::CapacityNotPowerOfTwo` if it is not a power of two.
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if capacity & (capacity - 1) != 0 {
            return Err(ConfigError::CapacityNotPowerOfTwo { got: capacity });
        }

        let mut slots = Vec::with_capacity(capacity);
        for i in 0..capacity {
            slots.push(Slot::new(i as u64));
        }

        Ok(Self {
            tail: CachePadded::new(AtomicU64::new(0)),
            head: CachePadded::new(AtomicU64::new(0)),
            slots: slots.into_boxed_slice(),
            capacity,
            mask: (capacity - 1) as u64,
        })
    }

    /// Returns the fixed capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current number of enqueued elements (`tail - head`).
    /// Advisory under concurrent mutation, exact at quiescence.
    #[inline]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Relaxed);
        tail.wrapping_sub(head) as usize
    }

    /// True when no element is enqueued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every slot is occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Attempts to enqueue `value` from any producer thread.
    ///
    /// Returns `Err(Full(value))` when the ring is full from this call's
    /// snapshot, or when the reserved slot's previous generation is still
    /// in flight (a racing producer mid-publish, or the consumer mid-free).
    /// Both cases fail fast rather than spin; the caller chooses its own
    /// retry policy. The only internal retry is restarting after a lost
    /// reservation race.
    pub fn try_send(&self, value: T) -> Result<(), Full<T>> {
        loop {
            let tail = self.tail.load(Ordering::Relaxed);
            let head = self.head.load(Ordering::Acquire);

            // Observably full from this snapshot. A consumer may be about
            // to free a slot, but this call does not wait for it.
            if tail.wrapping_sub(head) as usize >= self.capacity {
                return Err(Full(value));
            }

            let slot = &self.slots[(tail & self.mask) as usize];

            // The slot has not reached this tail's writable generation:
            // either the consumer has not recycled it yet, or a producer
            // from the previous lap is still publishing. Effectively full
            // for this attempt.
            if slot.sequence() != tail {
                return Err(Full(value));
            }

            match self.tail.compare_exchange(
                tail,
                tail.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    // Exclusive owner of this slot for this generation.
                    debug_assert_bounded_len!(
                        tail.wrapping_add(1).wrapping_sub(head) as usize,
                        self.capacity
                    );
                    slot.publish(tail, value);
                    return Ok(());
                }
                // Lost the reservation race to another producer.
                Err(_) => continue,
            }
        }
    }

    /// Attempts to dequeue from the single consumer thread.
    ///
    /// Returns `None` when the ring is empty, or when the producer that
    /// reserved the next slot has not finished publishing - the element
    /// will be visible to a later call, never silently skipped.
    pub fn try_recv(&self) -> Option<T> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if head == tail {
            return None;
        }

        let slot = &self.slots[(head & self.mask) as usize];
        let value = slot.read_if_ready(head)?;

        let next = head.wrapping_add(1);
        debug_assert_monotonic!("head", head, next);
        self.head.store(next, Ordering::Release);
        slot.free(self.capacity as u64);

        Some(value)
    }
}

impl<T> RingQueue<T> for MpscRing<T> {
    #[inline]
    fn capacity(&self) -> usize {
        self.capacity()
    }

    #[inline]
    fn len(&self) -> usize {
        self.len()
    }

    #[inline]
    fn try_send(&self, value: T) -> Result<(), Full<T>> {
        self.try_send(value)
    }

    #[inline]
    fn try_recv(&self) -> Option<T> {
        self.try_recv()
    }
}
