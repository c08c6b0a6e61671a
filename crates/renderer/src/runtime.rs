use std::time::{Duration, Instant};

/// Fixed-rate timer driving the canvas clock from the event loop.
///
/// Deadlines advance by whole intervals from the start instant, so a slow
/// frame does not shift later ticks. When the loop falls more than one
/// interval behind, the schedule is re-anchored instead of bursting ticks.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    interval: Duration,
    next: Instant,
}

impl TickScheduler {
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            next: start + interval,
        }
    }

    /// Returns true when a tick is due at `now` and schedules the following one.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            tracing::trace!(
                behind_ms = now.duration_since(self.next).as_millis(),
                "tick scheduler fell behind; re-anchoring"
            );
            self.next = now + self.interval;
        }
        true
    }

    pub fn next_deadline(&self) -> Instant {
        self.next
    }
}
