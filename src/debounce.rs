//! Time-driven debouncing for typed input.
//!
//! The caller owns the event loop: it reports each edit with `push` and
//! periodically calls `poll`. A value is released once `delay` has elapsed
//! with no newer edit.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Changes the quiet period; a pending value is measured against the new one.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Replaces any pending value and restarts the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Releases the pending value if the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now.saturating_duration_since(*at) >= self.delay => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the pending value without releasing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
