//! # OrderedQueue: ordered chain with skip/abandon shortcuts.
//!
//! Same mechanism as [`OrderedChain`](crate::OrderedChain); its slots are
//! [`QueueSlot`]s, which add:
//! - [`skip`](QueueSlot::skip) — resolve with a no-op, releasing the successor;
//! - [`abandon`](QueueSlot::abandon) — skip, then hand back [`Abandoned`] so the task
//!   returns right away through `?`.
//!
//! ## Abandon flow
//! ```text
//! worker k:  ... decides it has nothing to contribute
//!            slot.abandon().await?
//!              ├─► wait slot_{k-1}
//!              ├─► release slot_{k+1}
//!              └─► Err(Abandoned) ──► task returns, nothing below runs
//! ```

use std::convert::Infallible;
use std::future::Future;

use tracing::debug;

use crate::chain::slot::Slot;
use crate::chain::tail::Tail;
use crate::config::Config;
use crate::error::{Abandoned, ProtocolViolation};

/// Chain of [`QueueSlot`]s whose actions run in reservation order.
///
/// # Example
/// ```
/// use std::sync::{Arc, Mutex};
/// use taskorder::{Abandoned, OrderedQueue};
///
/// # #[tokio::main]
/// # async fn main() {
/// let queue = OrderedQueue::new();
/// let evens = Arc::new(Mutex::new(Vec::new()));
///
/// let mut handles = Vec::new();
/// for n in 1..=6u32 {
///     let slot = queue.reserve();
///     let evens = evens.clone();
///     handles.push(tokio::spawn(async move {
///         if n % 2 == 1 {
///             slot.abandon().await?;
///         }
///         slot.resolve(|| evens.lock().unwrap().push(n)).await;
///         Ok::<_, Abandoned>(n)
///     }));
/// }
///
/// queue.wait().await;
/// assert_eq!(*evens.lock().unwrap(), vec![2, 4, 6]);
/// # }
/// ```
#[derive(Debug)]
pub struct OrderedQueue {
    tail: Tail,
}

impl OrderedQueue {
    /// Creates an empty queue with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty queue with the given [`Config`].
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
    pub fn reserve(&self) -> QueueSlot {
        QueueSlot {
            inner: self.tail.reserve(),
        }
    }

    /// Waits until the slot that is the tail *now* has resolved.
    ///
    /// Returns immediately if nothing was ever reserved.
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

    /// Configuration this queue was built with.
    pub fn config(&self) -> &Config {
        self.tail.config()
    }
}

impl Default for OrderedQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Slot`] of an [`OrderedQueue`], with [`skip`](Self::skip) and [`abandon`](Self::abandon).
///
/// Exactly one of `resolve*`, `skip*`, `abandon*` may be called; a second one panics
/// with a [`ProtocolViolation`].
#[derive(Debug)]
pub struct QueueSlot {
    inner: Slot,
}

impl QueueSlot {
    /// Position in reservation order (first slot is `1`).
    pub fn seq(&self) -> u64 {
        self.inner.seq()
    }

    /// Returns `true` once the slot has resolved (action run, skipped or abandoned).
    pub fn is_resolved(&self) -> bool {
        self.inner.is_resolved()
    }

    /// See [`Slot::resolve`].
    pub async fn resolve<F, R>(&self, action: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.inner.resolve(action).await
    }

    /// See [`Slot::try_resolve`].
    pub async fn try_resolve<F, R>(&self, action: F) -> Result<R, ProtocolViolation>
    where
        F: FnOnce() -> R,
    {
        self.inner.try_resolve(action).await
    }

    /// See [`Slot::resolve_async`].
    pub async fn resolve_async<F, Fut, R>(&self, action: F) -> R
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        self.inner.resolve_async(action).await
    }

    /// See [`Slot::resolve_blocking`].
    pub fn resolve_blocking<F, R>(&self, action: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.inner.resolve_blocking(action)
    }

    /// Resolves the slot without an action: waits for the predecessor, then releases
    /// the successor.
    ///
    /// # Panics
    /// If the slot was already resolved.
    pub async fn skip(&self) {
        self.inner.resolve(|| ()).await
    }

    /// Blocking flavour of [`skip`](Self::skip).
    pub fn skip_blocking(&self) {
        self.inner.resolve_blocking(|| ())
    }

    /// Skips the slot, then returns `Err(Abandoned)` so the calling task can exit
    /// immediately with `?`.
    ///
    /// Never returns `Ok`. In positions that need a diverging expression, write
    /// `match slot.abandon().await? {}`.
    ///
    /// # Panics
    /// If the slot was already resolved.
    pub async fn abandon(&self) -> Result<Infallible, Abandoned> {
        self.skip().await;
        Err(self.abandoned())
    }

    /// Blocking flavour of [`abandon`](Self::abandon).
    pub fn abandon_blocking(&self) -> Result<Infallible, Abandoned> {
        self.skip_blocking();
        Err(self.abandoned())
    }

    fn abandoned(&self) -> Abandoned {
        let label = &self.inner.config().label;
        debug!(chain = %label, seq = self.seq(), "slot abandoned by its task");
        Abandoned {
            chain: label.clone(),
            seq: self.seq(),
        }
    }
}
