use std::time::{Duration, Instant};

/// A single-slot deferred task.
///
/// Holds at most one pending payload together with the instant it becomes
/// due. Scheduling a new payload replaces the previous one, so the slot acts
/// as a debouncer: a burst of `schedule` calls yields a single `poll` hit
/// carrying the last payload. Time is always supplied by the caller.
#[derive(Debug, Clone)]
pub struct PendingTask<T> {
    delay: Duration,
    slot: Option<(Instant, T)>,
}

impl<T> PendingTask<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, slot: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending payload and restart the delay from `now`.
    pub fn schedule(&mut self, payload: T, now: Instant) {
        self.slot = Some((now + self.delay, payload));
    }

    /// Drop the pending payload, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.slot.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    pub fn peek(&self) -> Option<&T> {
        self.slot.as_ref().map(|(_, payload)| payload)
    }

    /// Time left until the pending payload is due. `None` when idle.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.slot
            .as_ref()
            .map(|(due, _)| due.saturating_duration_since(now))
    }

    /// Take the payload if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.slot {
            Some((due, _)) if *due <= now => self.slot.take().map(|(_, payload)| payload),
            _ => None,
        }
    }
}
