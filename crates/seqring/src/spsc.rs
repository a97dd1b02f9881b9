use crate::invariants::{debug_assert_bounded_len, debug_assert_monotonic};
use crate::{ConfigError, Full, RingQueue};
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// SYNCHRONIZATION STRATEGY
// =============================================================================
//
// Classic two-counter SPSC protocol. Each counter has exactly one writer:
//
// **Producer:**
// 1. Load `write_seq` with Relaxed (only the producer writes it)
// 2. Load `read_seq` with Acquire (synchronizes with the consumer's Release)
// 3. Write the element into its slot
// 4. Store `write_seq + 1` with Release (publishes the element)
//
// **Consumer:**
// 1. Load `read_seq` with Relaxed (only the consumer writes it)
// 2. Load `write_seq` with Acquire (synchronizes with the producer's Release)
// 3. Take the element out of its slot
// 4. Store `read_seq + 1` with Release (publishes the free slot)
//
// The counter increment is always the last visible effect of an operation,
// so the opposite side never observes a length change before the slot
// contents it implies. No CAS anywhere: cross-visibility of the two
// counters is the only synchronization this variant needs.
//
// =============================================================================

/// Single-producer single-consumer ring buffer - the baseline variant.
///
/// Unbounded `u64` counters are used instead of wrapped indices; the slot
/// index is `sequence % capacity`. Any capacity `>= 1` is accepted (the
/// power-of-two requirement is specific to [`MpscRing`](crate::MpscRing)'s
/// masked indexing and slot-generation arithmetic).
///
/// # Threading contract
///
/// Exactly one thread may call [`try_send`](Self::try_send) and exactly one
/// thread may call [`try_recv`](Self::try_recv) for the lifetime of the
/// ring. The contract is established by construction of the caller, not
/// enforced at runtime - violating it is unspecified behavior, not a
/// detected error.
pub struct SpscRing<T> {
    /// Next sequence to write (written by the producer, read by the consumer).
    write_seq: CachePadded<AtomicU64>,
    /// Next sequence to read (written by the consumer, read by the producer).
    read_seq: CachePadded<AtomicU64>,
    /// Fixed slot storage; `None` marks an empty slot.
    buffer: Box<[UnsafeCell<Option<T>>]>,
    capacity: usize,
}

// SAFETY: the slot cells are handed between the two threads through the
// acquire/release counter protocol above; a cell is only touched by the
// side that currently owns its sequence range.
unsafe impl<T: Send> Send for SpscRing<T> {}
unsafe impl<T: Send> Sync for SpscRing<T> {}

impl<T> std::fmt::Debug for SpscRing<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpscRing")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<T> SpscRing<T> {
    /// Creates a ring with `capacity` slots.
    ///
    /// # Errors
    ///
    /// `ConfigError::ZeroCapacity` if `capacity` is 0.
    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let mut buffer = Vec::with_capacity(capacity);
        buffer.resize_with(capacity, || UnsafeCell::new(None));

        Ok(Self {
            write_seq: CachePadded::new(AtomicU64::new(0)),
            read_seq: CachePadded::new(AtomicU64::new(0)),
            buffer: buffer.into_boxed_slice(),
            capacity,
        })
    }

    /// Returns the fixed capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current number of enqueued elements. Advisory under
    /// concurrent mutation, exact at quiescence.
    #[inline]
    pub fn len(&self) -> usize {
        let write = self.write_seq.load(Ordering::Relaxed);
        let read = self.read_seq.load(Ordering::Relaxed);
        write.wrapping_sub(read) as usize
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

    /// Attempts to enqueue `value`. Returns `Err(Full(value))` when the
    /// ring is full from this call's perspective; never blocks.
    ///
    /// Producer side of the contract: at most one thread may call this.
    pub fn try_send(&self, value: T) -> Result<(), Full<T>> {
        let write = self.write_seq.load(Ordering::Relaxed);
        let read = self.read_seq.load(Ordering::Acquire);

        if write.wrapping_sub(read) as usize >= self.capacity {
            return Err(Full(value));
        }

        let idx = (write as usize) % self.capacity;
        // SAFETY: `write - read < capacity`, so the consumer has already
        // vacated this slot; only the single producer writes it until the
        // Release store below publishes the new write_seq.
        unsafe {
            *self.buffer[idx].get() = Some(value);
        }

        let next = write.wrapping_add(1);
        debug_assert_monotonic!("write_seq", write, next);
        debug_assert_bounded_len!(next.wrapping_sub(read) as usize, self.capacity);
        self.write_seq.store(next, Ordering::Release);
        Ok(())
    }

    /// Attempts to dequeue. Returns `None` when the ring is empty from this
    /// call's perspective; never blocks.
    ///
    /// Consumer side of the contract: at most one thread may call this.
    pub fn try_recv(&self) -> Option<T> {
        let read = self.read_seq.load(Ordering::Relaxed);
        let write = self.write_seq.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) % self.capacity;
        // SAFETY: `read < write`, so the producer published this slot before
        // its Release store of write_seq, which the Acquire load above
        // observed. Only the single consumer reads it until read_seq
        // advances.
        let value = unsafe { (*self.buffer[idx].get()).take() };
        debug_assert!(value.is_some(), "occupied slot held no value");

        let next = read.wrapping_add(1);
        debug_assert_monotonic!("read_seq", read, next);
        self.read_seq.store(next, Ordering::Release);
        value
    }
}

impl<T> RingQueue<T> for SpscRing<T> {
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
