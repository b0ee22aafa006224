//! # One-shot broadcast gate.
//!
//! [`Signal`] is the completion flag owned by every slot, [`Waiter`] is the
//! non-owning handle the successor slot (and the chain tail) keeps on it.
//!
//! Both sides share one `Gate`: a phase cell plus a [`tokio::sync::Notify`] that
//! wakes every waiter on transition. Waiting needs no runtime, so the same gate works
//! from tokio tasks and from plain threads (through `futures::executor::block_on`).
//!
//! ## Phases
//! ```text
//! Pending ──fire()──────────────► Fired
//!    │
//!    └──hand_over(upstream)─────► HandedOver(upstream)
//!                                   waiters continue on `upstream`
//!                                   (None = nothing left to wait for)
//! ```
//!
//! ## Rules
//! - A signal leaves `Pending` exactly once; the owning slot guarantees it.
//! - Any number of waiters are released by the transition (broadcast).
//! - Waiting on a released signal returns immediately.
//! - A waiter never keeps the owning slot alive, only the shared gate.
//! - `hand_over` stores the nearest still-pending upstream gate, so released links
//!   are never kept; gates that still form a run are unlinked iteratively on drop.

use std::pin::pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

#[derive(Debug)]
enum Phase {
    Pending,
    Fired,
    HandedOver(Option<Waiter>),
}

/// What a waiter should do after looking at a gate.
enum Look {
    Pending,
    Released,
    Follow(Waiter),
}

#[derive(Debug)]
struct Gate {
    phase: Mutex<Phase>,
    notify: Notify,
}

impl Gate {
    fn lock(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn look(&self) -> Look {
        match &*self.lock() {
            Phase::Pending => Look::Pending,
            Phase::Fired | Phase::HandedOver(None) => Look::Released,
            Phase::HandedOver(Some(up)) => Look::Follow(up.clone()),
        }
    }

    fn take_upstream(&mut self) -> Option<Waiter> {
        match self.phase.get_mut().unwrap_or_else(PoisonError::into_inner) {
            Phase::HandedOver(up) => up.take(),
            _ => None,
        }
    }
}

impl Drop for Gate {
    // unlink runs of handed-over gates one by one instead of recursing
    fn drop(&mut self) {
        let mut next = self.take_upstream();
        while let Some(waiter) = next {
            next = match Arc::try_unwrap(waiter.gate) {
                Ok(mut gate) => gate.take_upstream(),
                Err(_shared) => None,
            };
        }
    }
}

/// Owning side of a one-shot gate.
#[derive(Debug)]
pub(crate) struct Signal {
    gate: Arc<Gate>,
}

/// Non-owning handle used to wait for a [`Signal`].
#[derive(Clone, Debug)]
pub(crate) struct Waiter {
    gate: Arc<Gate>,
}

impl Signal {
    pub(crate) fn new() -> Self {
        Self {
            gate: Arc::new(Gate {
                phase: Mutex::new(Phase::Pending),
                notify: Notify::new(),
            }),
        }
    }

    pub(crate) fn waiter(&self) -> Waiter {
        Waiter {
            gate: Arc::clone(&self.gate),
        }
    }

    /// Releases every current and future waiter.
    pub(crate) fn fire(&self) {
        self.transition(Phase::Fired);
    }

    /// Releases the gate without completing it: waiters move on to `upstream`.
    ///
    /// Used when the owner goes away unresolved, so successors still respect
    /// everything ordered before it. Already released upstream gates are skipped.
    pub(crate) fn hand_over(&self, upstream: Option<Waiter>) {
        let target = upstream.and_then(Waiter::first_pending);
        self.transition(Phase::HandedOver(target));
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(*self.gate.lock(), Phase::Pending)
    }

    fn transition(&self, phase: Phase) {
        *self.gate.lock() = phase;
        self.gate.notify.notify_waiters();
    }
}

impl Drop for Signal {
    fn drop(&mut self) {
        // owner gone without a transition: nothing left to wait for
        if self.is_pending() {
            self.transition(Phase::HandedOver(None));
        }
    }
}

impl Waiter {
    /// Suspends until the gate (and any gate it was handed over to) is released.
    pub(crate) async fn wait(&self) {
        let mut gate = Arc::clone(&self.gate);
        loop {
            let upstream = {
                let mut notified = pin!(gate.notify.notified());
                notified.as_mut().enable();
                match gate.look() {
                    Look::Pending => {
                        notified.await;
                        continue;
                    }
                    Look::Released => return,
                    Look::Follow(up) => up,
                }
            };
            gate = upstream.gate;
        }
    }

    /// Non-blocking check: `true` once [`wait`](Self::wait) would return immediately.
    pub(crate) fn is_released(&self) -> bool {
        self.clone().first_pending().is_none()
    }

    /// Follows hand-overs to the first gate that is still pending.
    fn first_pending(self) -> Option<Waiter> {
        let mut current = self;
        loop {
            match current.gate.look() {
                Look::Pending => return Some(current),
                Look::Released => return None,
                Look::Follow(up) => current = up,
            }
        }
    }
}
