use std::time::{Duration, Instant};

/// Outcome of offering a trigger to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// Run the pass synchronously on the caller's turn.
    RunNow,
    /// A deferred pass is scheduled for the contained deadline; the host's
    /// timer collaborator should call back then.
    Deferred(Instant),
}

/// Trailing-edge throttle over externally supplied timestamps.
///
/// The first trigger, or any trigger arriving at least `threshold` after
/// the last accepted run with no deferral pending, runs synchronously.
/// Every other trigger cancels and replaces the single pending deferral,
/// rescheduling it for `threshold` from the trigger. Timestamps come from
/// the caller, so the gate is a pure state machine.
#[derive(Debug)]
pub struct ThrottleGate {
    threshold: Duration,
    last_accepted: Option<Instant>,
    deferred: Option<Instant>,
}

impl ThrottleGate {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            last_accepted: None,
            deferred: None,
        }
    }

    /// Offer a trigger at `now`.
    pub fn on_trigger(&mut self, now: Instant) -> ThrottleDecision {
        let too_soon = self
            .last_accepted
            .is_some_and(|last| now.duration_since(last) < self.threshold);
        if self.deferred.is_some() || too_soon {
            let deadline = now + self.threshold;
            self.deferred = Some(deadline);
            ThrottleDecision::Deferred(deadline)
        } else {
            self.last_accepted = Some(now);
            ThrottleDecision::RunNow
        }
    }

    /// Consume the pending deferral when its deadline has passed. Returns
    /// true exactly when the deferred pass should run now.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deferred {
            Some(deadline) if deadline <= now => {
                self.deferred = None;
                self.last_accepted = Some(now);
                true
            }
            _ => false,
        }
    }

    pub fn pending_deadline(&self) -> Option<Instant> {
        self.deferred
    }
}
