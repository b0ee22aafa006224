//! # Slot: one reserved position in an ordering chain.
//!
//! A [`Slot`] is handed out by [`OrderedChain::reserve`](crate::OrderedChain::reserve)
//! (or wrapped in a [`QueueSlot`](crate::QueueSlot) by the queue). It owns its own
//! completion [`Signal`] and keeps a non-owning [`Waiter`] on the predecessor's signal.
//!
//! ## Resolution
//! ```text
//! resolve(action)
//!   ├─► claim          (second claim → ProtocolViolation)
//!   ├─► wait predecessor signal   (stall watchdog, optional)
//!   ├─► action()       (serialized across the whole chain)
//!   ├─► fire own signal
//!   └─► release predecessor handle
//! ```
//!
//! ## Rules
//! - A slot is claimed at most once; later attempts fail loudly.
//! - A resolve future dropped before its action started gives the claim back.
//! - The action of slot *k* starts only after slots 1..k-1 have resolved.
//! - A slot dropped while still pending (task panicked or aborted) hands its
//!   position over to its predecessor: the successor then waits for whatever the
//!   dropped slot would have waited for.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::time;
use tracing::{debug, error, trace, warn};

use crate::config::Config;
use crate::error::ProtocolViolation;
use crate::signal::{Signal, Waiter};

/// Single-use position in an ordering chain.
///
/// Obtain one from [`OrderedChain::reserve`](crate::OrderedChain::reserve), move it into
/// the task doing the work, and call exactly one of the `resolve*` methods.
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
/// let results = Arc::new(Mutex::new(Vec::new()));
///
/// for delay in [30u64, 10, 20] {
///     let slot = chain.reserve();
///     let results = results.clone();
///     tokio::spawn(async move {
///         tokio::time::sleep(Duration::from_millis(delay)).await;
///         slot.resolve(|| results.lock().unwrap().push(delay)).await;
///     });
/// }
///
/// chain.wait().await;
/// assert_eq!(*results.lock().unwrap(), vec![30, 10, 20]);
/// # }
/// ```
#[derive(Debug)]
pub struct Slot {
    seq: u64,
    config: Arc<Config>,
    signal: Signal,
    predecessor: Mutex<Option<Waiter>>,
    claimed: AtomicBool,
}

impl Slot {
    pub(crate) fn new(seq: u64, config: Arc<Config>, predecessor: Option<Waiter>) -> Self {
        Self {
            seq,
            config,
            signal: Signal::new(),
            predecessor: Mutex::new(predecessor),
            claimed: AtomicBool::new(false),
        }
    }

    pub(crate) fn waiter(&self) -> Waiter {
        self.signal.waiter()
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    /// Position in reservation order (first slot is `1`).
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Returns `true` once the slot's action has run and its successor is released.
    pub fn is_resolved(&self) -> bool {
        !self.signal.is_pending()
    }

    /// Runs `action` after every earlier slot of the chain has resolved, then releases
    /// the next slot. Returns whatever `action` returns.
    ///
    /// # Cancel safety
    /// Dropping the returned future while it still waits on the predecessor gives the
    /// claim back: the slot stays pending and can be resolved (or skipped) again. Once
    /// `action` has started, the slot counts as resolved.
    ///
    /// # Panics
    /// If the slot was already resolved (or a resolution is in progress). The panic
    /// carries a [`ProtocolViolation`] diagnostic and only ends the calling task.
    pub async fn resolve<F, R>(&self, action: F) -> R
    where
        F: FnOnce() -> R,
    {
        match self.try_resolve(action).await {
            Ok(out) => out,
            Err(violation) => fail(violation),
        }
    }

    /// Same as [`resolve`](Self::resolve), but reports double resolution as an error
    /// instead of panicking. `action` is not run in that case.
    pub async fn try_resolve<F, R>(&self, action: F) -> Result<R, ProtocolViolation>
    where
        F: FnOnce() -> R,
    {
        let claim = self.claim()?;
        self.await_predecessor().await;
        claim.commit();
        let out = action();
        self.release();
        Ok(out)
    }

    /// Async flavour of [`resolve`](Self::resolve): the future built by `action` is
    /// driven to completion before the successor is released, so async actions never
    /// overlap either.
    ///
    /// Cancel safety follows [`resolve`](Self::resolve); dropping the future in the
    /// middle of `action` ends the slot like a drop of the slot itself.
    ///
    /// # Panics
    /// Same as [`resolve`](Self::resolve).
    pub async fn resolve_async<F, Fut, R>(&self, action: F) -> R
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        let claim = match self.claim() {
            Ok(claim) => claim,
            Err(violation) => fail(violation),
        };
        self.await_predecessor().await;
        claim.commit();
        let out = action().await;
        self.release();
        out
    }

    /// Blocking flavour of [`resolve`](Self::resolve) for plain OS threads.
    ///
    /// Parks the current thread while waiting; do not call it from an async context.
    ///
    /// # Panics
    /// Same as [`resolve`](Self::resolve).
    pub fn resolve_blocking<F, R>(&self, action: F) -> R
    where
        F: FnOnce() -> R,
    {
        futures::executor::block_on(self.resolve(action))
    }

    fn claim(&self) -> Result<Claim<'_>, ProtocolViolation> {
        if self.claimed.swap(true, Ordering::AcqRel) {
            return Err(ProtocolViolation {
                chain: self.config.label.clone(),
                seq: self.seq,
            });
        }
        Ok(Claim {
            claimed: &self.claimed,
            committed: false,
        })
    }

    fn predecessor(&self) -> Option<Waiter> {
        self.predecessor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn await_predecessor(&self) {
        let Some(prev) = self.predecessor() else {
            return;
        };

        let watchdog = self
            .config
            .stall_threshold()
            .filter(|_| tokio::runtime::Handle::try_current().is_ok());

        match watchdog {
            Some(after) => {
                if time::timeout(after, prev.wait()).await.is_err() {
                    warn!(
                        chain = %self.config.label,
                        seq = self.seq,
                        waited = ?after,
                        "slot still waiting on its predecessor"
                    );
                    prev.wait().await;
                }
            }
            None => prev.wait().await,
        }
    }

    fn release(&self) {
        self.signal.fire();
        self.predecessor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        trace!(chain = %self.config.label, seq = self.seq, "slot resolved");
    }
}

/// Resolution claim; given back on drop unless the action has started.
struct Claim<'a> {
    claimed: &'a AtomicBool,
    committed: bool,
}

impl Claim<'_> {
    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.claimed.store(false, Ordering::Release);
        }
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        if !self.signal.is_pending() {
            return;
        }
        let upstream = self
            .predecessor
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        debug!(
            chain = %self.config.label,
            seq = self.seq,
            "slot dropped unresolved; successor falls back to its predecessor"
        );
        self.signal.hand_over(upstream);
    }
}

fn fail(violation: ProtocolViolation) -> ! {
    error!(
        chain = %violation.chain,
        seq = violation.seq,
        label = violation.as_label(),
        "slot resolved more than once"
    );
    panic!("{violation}");
}
