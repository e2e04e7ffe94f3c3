use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide shutdown flag.
///
/// Set once, never cleared. The engine only polls it; it never waits on it.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) {
        if !self.flag.swap(true, Ordering::AcqRel) {
            tracing::info!("Shutdown signal received");
        }
    }

    pub fn is_signaled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
