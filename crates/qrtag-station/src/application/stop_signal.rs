//! Cooperative cancellation shared between the signal handler and the
//! blocking loops (QR detection, waiting for a tag).

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A cloneable "please stop" flag.
///
/// Every clone observes the same flag. Once requested it stays requested.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks every loop observing this signal to wind down.
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
