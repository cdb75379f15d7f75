//! Cooperative cancellation.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort flag, polled between propagation sweeps and between core
/// probes.
///
/// Cloning shares the underlying flag. A tripped flag makes the running
/// solve return a cancellation error instead of a verdict; no state outlives
/// the solve, so a canceled solver can simply be invoked again.
#[derive(Clone, Debug, Default)]
pub struct Abort {
    flag: Arc<AtomicBool>,
}

impl Abort {
    /// Create a new, unset abort flag.
    pub fn new() -> Abort {
        Abort::default()
    }

    /// The shared flag itself, e.g. for registering a signal handler.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Request cancellation.
    pub fn set(&self) {
        self.flag.store(true, Ordering::SeqCst)
    }

    /// Whether cancellation was requested.
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
