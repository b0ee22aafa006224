//! # OrderedChain: ordered fan-in for concurrent tasks.
//!
//! [`OrderedChain`] hands out [`Slot`]s in submission order and lets any task wait
//! until every slot reserved so far has run its action.
//!
//! ## Flow
//! ```text
//! orchestrator                      worker k
//! ────────────                      ────────
//! slot_k = chain.reserve()  ──────► do work (any duration)
//! spawn(worker k)                   slot_k.resolve(action)
//!     ...                             ├─ waits slot_{k-1}
//! chain.wait()                        ├─ action()
//!     └─ returns after slot_N ◄───────┴─ releases slot_{k+1}
//! ```

use crate::chain::slot::Slot;
use crate::chain::tail::Tail;
use crate::config::Config;

/// Chain of [`Slot`]s whose actions run in reservation order.
///
/// Cheap to construct, safe to share (`&self` everywhere). Put it in an `Arc` when
/// reservations happen from several tasks.
///
/// # Example
/// ```
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
/// use taskorder::OrderedChain;
///
/// # #[tokio::main]
/// # async fn main() {
/// let chain = OrderedChain::new();
/// let merged = Arc::new(Mutex::new(String::new()));
///
/// for (word, delay) in [("ordered ", 20u64), ("fan-", 5), ("in", 1)] {
///     let slot = chain.reserve();
///     let merged = merged.clone();
///     tokio::spawn(async move {
///         tokio::time::sleep(Duration::from_millis(delay)).await;
///         slot.resolve(|| merged.lock().unwrap().push_str(word)).await;
///     });
/// }
///
/// chain.wait().await;
/// assert_eq!(*merged.lock().unwrap(), "ordered fan-in");
/// # }
/// ```
#[derive(Debug)]
pub struct OrderedChain {
    tail: Tail,
}

impl OrderedChain {
    /// Creates an empty chain with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty chain with the given [`Config`].
    ///
    /// # Panics
    /// Construction never panics. With a non-zero `stall_warning`, a slot of this chain
    /// that has to wait panics when the current tokio runtime was built without
    /// `enable_time()`.
    pub fn with_config(config: Config) -> Self {
        Self {
            tail: Tail::new(config),
        }
    }

    /// Appends a new slot and returns it. Never blocks on other slots.
    ///
    /// Call it from the task that defines submission order, once per unit of work,
    /// before dispatching that work.
    pub fn reserve(&self) -> Slot {
        self.tail.reserve()
    }

    /// Waits until the slot that is the tail *now* has resolved.
    ///
    /// Returns immediately if nothing was ever reserved. Slots reserved while
    /// waiting are not covered; call again to cover them.
    pub async fn wait(&self) {
        self.tail.wait().await
    }

    /// Blocking flavour of [`wait`](Self::wait) for plain OS threads.
    pub fn wait_blocking(&self) {
        self.tail.wait_blocking()
    }

    /// Number of slots reserved so far.
    pub fn reserved(&self) -> u64 {
        self.tail.reserved()
    }

    /// Returns `true` if nothing was reserved or the latest slot has resolved.
    pub fn is_idle(&self) -> bool {
        self.tail.is_idle()
    }

    /// Configuration this chain was built with.
    pub fn config(&self) -> &Config {
        self.tail.config()
    }
}

impl Default for OrderedChain {
    fn default() -> Self {
        Self::new()
    }
}
