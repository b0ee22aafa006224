//! Error types used by ordered chains and their slots.
//!
//! This module defines two types:
//!
//! - [`ProtocolViolation`] — a slot was resolved more than once (caller bug).
//! - [`Abandoned`] — early-return marker produced by [`QueueSlot::abandon`](crate::QueueSlot::abandon).
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::borrow::Cow;
use thiserror::Error;

/// # A slot was resolved more than once.
///
/// Every slot is single-use. A second `resolve`/`skip`/`abandon` on the same slot
/// is a logic error in the calling code: the panicking entry points
/// ([`Slot::resolve`](crate::Slot::resolve) and friends) abort the calling task
/// with this diagnostic, [`Slot::try_resolve`](crate::Slot::try_resolve) returns it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("slot #{seq} of chain {chain:?} resolved more than once")]
pub struct ProtocolViolation {
    /// Label of the chain the slot belongs to.
    pub chain: Cow<'static, str>,
    /// Sequence number of the offending slot (1-based, reservation order).
    pub seq: u64,
}

impl ProtocolViolation {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskorder::ProtocolViolation;
    ///
    /// let err = ProtocolViolation { chain: "jobs".into(), seq: 3 };
    /// assert_eq!(err.as_label(), "slot_resolved_twice");
    /// ```
    pub fn as_label(&self) -> &'static str {
        "slot_resolved_twice"
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        format!("resolved twice: chain={} seq={}", self.chain, self.seq)
    }
}

/// # The producing task gave up its slot.
///
/// Returned (always as `Err`) by [`QueueSlot::abandon`](crate::QueueSlot::abandon)
/// once the slot has been resolved as a no-op. Propagate it with `?` so that
/// nothing else in the task runs.
///
/// # Example
/// ```
/// use taskorder::{Abandoned, OrderedQueue, QueueSlot};
///
/// async fn work(slot: QueueSlot, input: Option<u32>) -> Result<u32, Abandoned> {
///     let Some(v) = input else {
///         match slot.abandon().await? {}
///     };
///     slot.resolve(|| v * 2).await;
///     Ok(v)
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let queue = OrderedQueue::new();
/// let err = work(queue.reserve(), None).await.unwrap_err();
/// assert_eq!(err.seq, 1);
/// assert_eq!(work(queue.reserve(), Some(4)).await, Ok(4));
/// # }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("slot #{seq} of chain {chain:?} abandoned by its task")]
pub struct Abandoned {
    /// Label of the chain the slot belongs to.
    pub chain: Cow<'static, str>,
    /// Sequence number of the abandoned slot.
    pub seq: u64,
}

impl Abandoned {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        "slot_abandoned"
    }

    /// Returns a human-readable message with details about the abandonment.
    pub fn as_message(&self) -> String {
        format!("abandoned: chain={} seq={}", self.chain, self.seq)
    }
}
