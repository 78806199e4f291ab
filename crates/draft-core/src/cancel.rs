use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared flag for cancelling an in-flight batch.
///
/// Clones observe the same flag. The runner checks it before each row.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
