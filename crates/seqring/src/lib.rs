//! seqring - Fixed-Capacity Lock-Free Ring-Buffer Queues
//!
//! Array-backed, fixed-capacity queues for inter-thread data transfer
//! without locks:
//!
//! - [`MpscRing`] - multi-producer single-consumer ring using a CAS-reserved
//!   tail and per-slot monotonic sequence numbers (Disruptor/Vyukov-style
//!   slot sequencing). The per-slot sequence doubles as an ABA guard: each
//!   write/read cycle moves a slot's sequence forward by `capacity`, so a
//!   reused slot is always distinguishable from its previous incarnation.
//! - [`SpscRing`] - single-producer single-consumer ring with plain
//!   acquire/release counters; the simpler baseline variant.
//!
//! Both variants implement the [`RingQueue`] capability trait and are
//! strictly non-blocking: `try_send` fails immediately with [`Full`] when no
//! slot is available, `try_recv` returns `None` when nothing is readable.
//! Callers bring their own retry/backoff policy.
//!
//! # Example
//!
//! ```
//! use seqring::MpscRing;
//!
//! // MPSC capacity must be a power of two.
//! let ring = MpscRing::with_capacity(8).unwrap();
//!
//! ring.try_send(42u64).unwrap();
//! assert_eq!(ring.len(), 1);
//! assert_eq!(ring.try_recv(), Some(42));
//! assert_eq!(ring.try_recv(), None);
//! ```
//!
//! # Threading contract
//!
//! [`SpscRing`] requires exactly one producer thread and one consumer
//! thread; [`MpscRing`] supports any number of producer threads but exactly
//! one consumer thread. Neither variant guards the contract with locks -
//! see the per-type docs for what each does (and does not) detect.

mod error;
mod invariants;
mod mpsc;
mod queue;
mod slot;
mod spsc;

pub use error::{ConfigError, Full};
pub use mpsc::MpscRing;
pub use queue::RingQueue;
pub use spsc::SpscRing;
