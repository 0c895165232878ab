//! Cooperative cancellation for a labeling pass.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag polled by candidate generation at coarse granularity.
///
/// Clones share the same flag, so a token handed to worker threads can be cancelled from the
/// thread driving the labeling pass. Placement code only ever reads it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that any in-flight generation stops at its next check point.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Clear a previous cancellation so the token can drive another pass.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
