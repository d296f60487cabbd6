//! Per-sample notification hook.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Called by the scheduler right after each host's result is applied.
///
/// Runs on the scheduler task, so implementations must return quickly.
pub trait AlertHook: Send + Sync + Debug {
    fn on_sample(&self, host: &str, replied: bool);
}

/// Audible alert on every successful reply.
///
/// The scheduler only counts pending rings; the front end that owns the
/// terminal drains them with [`take_pending`](Self::take_pending) and emits
/// the bell character.
#[derive(Debug, Default)]
pub struct Bell {
    enabled: AtomicBool,
    pending: AtomicUsize,
}

impl Bell {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            pending: AtomicUsize::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        if !enabled {
            self.pending.store(0, Ordering::Relaxed);
        }
    }

    /// Flip the enable flag and return the new state.
    pub fn toggle(&self) -> bool {
        let enabled = !self.enabled.fetch_xor(true, Ordering::Relaxed);
        if !enabled {
            self.pending.store(0, Ordering::Relaxed);
        }
        enabled
    }

    /// Queue one ring if beeping is enabled.
    pub fn ring(&self) {
        if self.is_enabled() {
            self.pending.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of rings queued since the last call; resets the counter.
    pub fn take_pending(&self) -> usize {
        self.pending.swap(0, Ordering::Relaxed)
    }
}

impl AlertHook for Bell {
    fn on_sample(&self, _host: &str, replied: bool) {
        if replied {
            self.ring();
        }
    }
}
