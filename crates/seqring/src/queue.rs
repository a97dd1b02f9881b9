use crate::Full;

/// The queue capability shared by every ring-buffer variant.
///
/// Both [`SpscRing`](crate::SpscRing) and [`MpscRing`](crate::MpscRing)
/// implement this trait while sharing no internal state or base type - the
/// contract is the only thing they have in common.
///
/// All operations are non-blocking: they complete or fail immediately,
/// never waiting for a peer thread. `len` (and the derived `is_empty` /
/// `is_full`) is advisory under concurrent mutation - it may be
/// instantaneously stale and must not be used as a synchronization
/// primitive. At quiescent points (no operation in flight) it is exact:
/// `len == successful sends - successful receives`.
pub trait RingQueue<T> {
    /// The fixed number of slots, set at construction.
    fn capacity(&self) -> usize;

    /// Number of elements currently enqueued (`tail - head`). Advisory
    /// under concurrency, exact at quiescence.
    fn len(&self) -> usize;

    /// Attempts to enqueue `value` without blocking.
    ///
    /// Returns `Err(Full(value))` - handing the element back - if the queue
    /// is full from this call's perspective. A concurrent receive may be
    /// about to free a slot; this call does not wait for it.
    fn try_send(&self, value: T) -> Result<(), Full<T>>;

    /// Attempts to dequeue without blocking. Returns `None` if nothing is
    /// readable from this call's perspective.
    fn try_recv(&self) -> Option<T>;

    /// True when `len() == 0`.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when `len() == capacity()`.
    #[inline]
    fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }
}
