use std::time::{Duration, Instant};

/// Delay applied to filter text before the rows are re-filtered
pub const FILTER_DEBOUNCE_MS: u64 = 250;

/// Trailing-edge debouncer: rapid calls are coalesced and only the value from
/// the last call fires, once `delay` has passed without a newer call.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    /// The duration to wait after the last call before firing
    delay: Duration,
    /// Most recent value and when it arrived
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    /// Create a new debouncer with the specified delay in milliseconds
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Register a call; any earlier pending value is dropped
    pub fn call(&mut self, value: T) {
        self.call_at(Instant::now(), value);
    }

    pub fn call_at(&mut self, now: Instant, value: T) {
        self.pending = Some((now, value));
    }

    /// Take the pending value if the quiet period has elapsed
    pub fn poll(&mut self) -> Option<T> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        let ready = matches!(
            &self.pending,
            Some((last, _)) if now.saturating_duration_since(*last) >= self.delay
        );
        if ready {
            self.pending.take().map(|(_, value)| value)
        } else {
            None
        }
    }

    /// Time left before the pending value fires; None if nothing is pending
    pub fn time_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(last, _)| self.delay.saturating_sub(now.saturating_duration_since(*last)))
    }

    pub fn time_remaining(&self) -> Option<Duration> {
        self.time_remaining_at(Instant::now())
    }

    /// Drop any pending call without firing it
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
