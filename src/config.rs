//! # Chain configuration.
//!
//! Provides [`Config`] settings shared by every slot of one chain.
//!
//! Config is used in two ways:
//! 1. **Chain creation**: `OrderedChain::with_config(config)` / `OrderedQueue::with_config(config)`
//! 2. **Slot behaviour**: each reserved slot keeps a shared handle to it (label, watchdog)
//!
//! ## Sentinel values
//! - `stall_warning = 0s` → watchdog disabled (no timer is armed while waiting)

use std::borrow::Cow;
use std::time::Duration;

/// Configuration for an ordered chain.
///
/// ## Field semantics
/// - `label`: Name attached to log events and errors produced by the chain
/// - `stall_warning`: Wait time on a predecessor after which a warning is logged (`0s` = never)
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over checking sentinels by hand.
#[derive(Clone, Debug)]
pub struct Config {
    /// Human-readable chain name.
    ///
    /// Shows up as the `chain` field of every `tracing` event and in
    /// [`ProtocolViolation`](crate::ProtocolViolation) / [`Abandoned`](crate::Abandoned).
    pub label: Cow<'static, str>,

    /// Stall watchdog threshold.
    ///
    /// - `Duration::ZERO` = disabled
    /// - `> 0` = a slot that waits on its predecessor longer than this emits one `warn` event,
    ///   then keeps waiting
    ///
    /// The watchdog needs a current tokio runtime with the time driver enabled: on a
    /// runtime built without `enable_time()` a waiting slot panics ("timers are
    /// disabled"). Blocking variants called from plain threads never arm it.
    pub stall_warning: Duration,
}

impl Config {
    /// Returns a config with the given label and default everything else.
    pub fn labeled(label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Returns the stall watchdog threshold as an `Option`.
    ///
    /// - `None` → watchdog disabled
    /// - `Some(d)` → warn after waiting `d` on a predecessor
    #[inline]
    pub fn stall_threshold(&self) -> Option<Duration> {
        if self.stall_warning == Duration::ZERO {
            None
        } else {
            Some(self.stall_warning)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `label = "ordered"`
    /// - `stall_warning = 0s` (watchdog disabled)
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("ordered"),
            stall_warning: Duration::ZERO,
        }
    }
}
