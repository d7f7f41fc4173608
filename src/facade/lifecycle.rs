use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// The host's answer to "has the ready event already fired?"
pub trait HostLifecycle: Send + Sync {
    fn is_ready(&self) -> bool;
}

/// Fire-once ready flag. Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct ReadySignal {
    fired: Arc<AtomicBool>,
}

impl ReadySignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal for hosts that are already past their ready point.
    pub fn fired() -> Self {
        let signal = Self::new();
        signal.fire();
        signal
    }

    pub fn fire(&self) {
        self.fired.store(true, Ordering::SeqCst);
    }
}

impl HostLifecycle for ReadySignal {
    fn is_ready(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}
