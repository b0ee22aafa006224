//! # taskorder
//!
//! **taskorder** lets concurrently running tasks apply their results in the order the
//! work was *submitted*, not the order it *finished*.
//!
//! Each unit of work reserves a [`Slot`] up front. The worker does its job at its own
//! pace and then resolves the slot with an action (append a result, write a line...).
//! Actions run one at a time, in reservation order, no matter which worker finishes first.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   orchestrator:   reserve() ─► slot#1   reserve() ─► slot#2   reserve() ─► slot#3
//!                        │                     │                     │
//!                        ▼                     ▼                     ▼
//!   workers:        work (30ms)           work (5ms)            work (10ms)
//!                        │                     │                     │
//!                   resolve(a1)           resolve(a2)           resolve(a3)
//!                        │                     │ waits #1            │ waits #2
//!                        ▼                     ▼                     ▼
//!   actions:        a1 ──────────────────► a2 ────────────────► a3
//!                                                                    │
//!   wait():         ◄────────────────────────────────────────────────┘
//! ```
//!
//! ### Building blocks
//! ```text
//! Signal   one-shot broadcast gate (tokio::sync::Notify)
//!   └─► Slot          owns its Signal, waits on the predecessor's
//!         └─► OrderedChain   tail pointer, reserve()/wait()
//!               └─► OrderedQueue   same, slots add skip()/abandon()
//! ```
//!
//! ## Guarantees
//! - Actions run strictly in reservation order and never overlap.
//! - [`OrderedChain::reserve`] never waits on other slots.
//! - [`OrderedChain::wait`] covers every slot reserved before the call.
//! - A slot dropped without resolving (panic, abort) passes its turn on, so the
//!   chain never deadlocks and the remaining order still holds.
//! - Resolving a slot twice panics with a [`ProtocolViolation`].
//!
//! ## Features
//! | Area              | Description                                                  | Key types                            |
//! |-------------------|--------------------------------------------------------------|--------------------------------------|
//! | **Ordering**      | Reserve slots, resolve them from any task.                   | [`OrderedChain`], [`Slot`]           |
//! | **Shortcuts**     | Skip a slot or abandon the producing task.                   | [`OrderedQueue`], [`QueueSlot`]      |
//! | **Errors**        | Typed double-resolution and abandonment markers.             | [`ProtocolViolation`], [`Abandoned`] |
//! | **Configuration** | Chain label for logs, stall watchdog.                        | [`Config`]                           |
//!
//! Logging goes through [`tracing`]; the crate never installs a subscriber.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use taskorder::OrderedChain;
//!
//! #[tokio::main]
//! async fn main() {
//!     let chain = OrderedChain::new();
//!     let results = Arc::new(Mutex::new(Vec::new()));
//!
//!     for delay in [4u64, 15, 3, 7, 1] {
//!         let slot = chain.reserve();
//!         let results = results.clone();
//!         tokio::spawn(async move {
//!             tokio::time::sleep(Duration::from_millis(delay)).await;
//!             slot.resolve(|| results.lock().unwrap().push(delay)).await;
//!         });
//!     }
//!
//!     chain.wait().await;
//!     assert_eq!(*results.lock().unwrap(), vec![4, 15, 3, 7, 1]);
//! }
//! ```
mod chain;
mod config;
mod error;
mod signal;

// ---- Public re-exports ----

pub use chain::{OrderedChain, OrderedQueue, QueueSlot, Slot};
pub use config::Config;
pub use error::{Abandoned, ProtocolViolation};
