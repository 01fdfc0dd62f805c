//! Shared cancellation flag for a running path session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable, thread-safe stop flag.
///
/// The controller calls [`cancel`](CancelToken::cancel) and forgets about it;
/// the session polls the flag at the top of each step and again after the
/// pacing delay. There is no acknowledgement: watch the session status (or
/// join its thread) to learn when it actually stopped.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
