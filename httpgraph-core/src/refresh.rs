use std::time::{Duration, Instant};

pub const DEFAULT_REFRESH_WINDOW: Duration = Duration::from_millis(100);

/// Collapses bursts of refresh requests into one refresh per window.
///
/// The first request opens the window; later requests inside it are
/// absorbed. `due` fires once when the window has elapsed.
#[derive(Debug, Clone)]
pub struct RefreshCoalescer {
    window: Duration,
    pending_since: Option<Instant>,
}

impl RefreshCoalescer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending_since: None,
        }
    }

    pub fn request(&mut self, now: Instant) {
        self.pending_since.get_or_insert(now);
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn due(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(since) if now.saturating_duration_since(since) >= self.window => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.pending_since = None;
    }
}

impl Default for RefreshCoalescer {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_WINDOW)
    }
}
