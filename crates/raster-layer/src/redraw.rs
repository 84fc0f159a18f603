//! Redraw invalidation between a layer and its host.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Redraw requests shared between a layer and its host.
///
/// The layer requests a redraw when its data, color, opacity or visibility
/// change, and whenever a bitmap decode is delivered. The host awaits `wait`
/// (or compares `requested` between frames) and then runs the layer's draw
/// callback, which applies any delivered decodes before drawing.
///
/// Requests coalesce: several requests before the host wakes cost one draw.
#[derive(Debug, Clone, Default)]
pub struct RedrawSignal {
    notify: Arc<Notify>,
    requests: Arc<AtomicU64>,
}

impl RedrawSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.notify.notify_one();
    }

    /// Total number of redraw requests so far.
    pub fn requested(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Wait for the next request (or consume one already pending).
    pub async fn wait(&self) {
        self.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_are_counted_across_clones() {
        let signal = RedrawSignal::new();
        let shared = signal.clone();
        signal.request();
        signal.request();
        assert_eq!(shared.requested(), 2);
    }
}
