// Resize debouncing: a burst of layout changes collapses into one resize.

use crate::surface::SurfaceSize;
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingResize {
    size: SurfaceSize,
    due: Timestamp,
}

/// Holds the latest requested size until the burst has been quiet long enough.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    quiet_ms: f64,
    pending: Option<PendingResize>,
}

impl ResizeDebouncer {
    pub fn new(quiet_ms: f64) -> Self {
        ResizeDebouncer {
            quiet_ms,
            pending: None,
        }
    }

    /// Record a request, pushing the deadline back.
    pub fn request(&mut self, size: SurfaceSize, now: Timestamp) {
        self.pending = Some(PendingResize {
            size,
            due: now.plus_millis(self.quiet_ms),
        });
    }

    /// The size to apply if the deadline has passed.
    pub fn take_due(&mut self, now: Timestamp) -> Option<SurfaceSize> {
        match self.pending {
            Some(pending) if now >= pending.due => {
                self.pending = None;
                Some(pending.size)
            }
            _ => None,
        }
    }

    /// When the pending resize becomes due.
    pub fn deadline(&self) -> Option<Timestamp> {
        self.pending.map(|p| p.due)
    }
}
