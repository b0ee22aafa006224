//! # Shared tail of an ordering chain.
//!
//! [`Tail`] is the mechanism behind both [`OrderedChain`](crate::OrderedChain) and
//! [`OrderedQueue`](crate::OrderedQueue). It holds the only datum that several tasks
//! mutate: a waiter on the most recently reserved slot.
//!
//! ## Architecture
//! ```text
//! reserve() ──► lock ──► seq += 1
//!                    ├─► Slot::new(seq, predecessor = old tail)
//!                    └─► tail = new slot's waiter
//!
//! wait()    ──► lock ──► clone tail ──► unlock ──► tail.wait()
//! ```
//!
//! ## Rules
//! - The critical section never awaits; `reserve()` never blocks on other slots.
//! - Whichever `reserve()` takes the lock first is earlier in the order.
//! - The tail keeps no reference to any slot, only to its signal.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::chain::slot::Slot;
use crate::config::Config;
use crate::signal::Waiter;

#[derive(Debug, Default)]
struct TailState {
    last: Option<Waiter>,
    reserved: u64,
}

#[derive(Debug)]
pub(crate) struct Tail {
    config: Arc<Config>,
    state: Mutex<TailState>,
}

impl Tail {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            state: Mutex::new(TailState::default()),
        }
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    /// Appends a new slot behind the current tail.
    pub(crate) fn reserve(&self) -> Slot {
        let mut state = self.lock();
        state.reserved += 1;
        let seq = state.reserved;
        let slot = Slot::new(seq, self.config.clone(), state.last.take());
        state.last = Some(slot.waiter());
        drop(state);

        trace!(chain = %self.config.label, seq, "slot reserved");
        slot
    }

    pub(crate) async fn wait(&self) {
        if let Some(last) = self.last() {
            last.wait().await;
        }
    }

    pub(crate) fn wait_blocking(&self) {
        if let Some(last) = self.last() {
            futures::executor::block_on(last.wait());
        }
    }

    pub(crate) fn reserved(&self) -> u64 {
        self.lock().reserved
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.last().is_none_or(|last| last.is_released())
    }

    fn last(&self) -> Option<Waiter> {
        self.lock().last.clone()
    }

    fn lock(&self) -> MutexGuard<'_, TailState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
