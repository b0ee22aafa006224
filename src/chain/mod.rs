//! # Ordering chains and their slots.
//!
//! This module provides the public chain types:
//! - [`OrderedChain`] - hands out [`Slot`]s, waits for the whole chain
//! - [`OrderedQueue`] - same mechanism, hands out [`QueueSlot`]s (skip/abandon)
//! - [`Slot`] - single-use position in the order
//!
//! Both chains share the internal `Tail`, which guards the chain end.

mod group;
mod queue;
mod slot;
mod tail;

pub use group::OrderedChain;
pub use queue::{OrderedQueue, QueueSlot};
pub use slot::Slot;
