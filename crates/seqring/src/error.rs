use std::fmt;
use thiserror::Error;

/// Construction-time configuration errors.
///
/// A ring that fails construction never exists: `with_capacity` returns
/// `Err` and no half-initialized instance is reachable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Capacity must be at least 1.
    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    /// The MPSC ring requires a power-of-two capacity so that slot indices
    /// can be computed by masking and sequence wraparound arithmetic stays
    /// exact.
    #[error("capacity {got} is not a power of two")]
    CapacityNotPowerOfTwo {
        /// The rejected capacity.
        got: usize,
    },
}

/// Returned by `try_send` when the queue is full from that call's
/// perspective.
///
/// Carries the rejected element back to the caller; nothing is stored and
/// nothing is lost. This is a routine outcome, not a fault - callers decide
/// whether to retry, back off, or drop.
#[derive(Clone, Copy, PartialEq, Eq, Error)]
#[error("sending into a full ring buffer")]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Recovers the element that could not be enqueued.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

// Manual Debug so Full<T> is debuggable without requiring T: Debug
// (the element may be arbitrary user data).
impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Full(..)")
    }
}
