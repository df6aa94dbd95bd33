//! Change detection across poll ticks.
//!
//! An observation is a new event only when its fingerprint differs from the
//! last accepted one *and* the cooldown since that event has elapsed. Some
//! clipboard backends report one copy several times in quick succession; the
//! time gate suppresses that independent of content.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::fingerprint::Fingerprint;

/// Default minimum time between accepted events.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(3);

/// What the loop remembers between ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    pub last_fingerprint: Option<Fingerprint>,
    pub last_event_time: Option<Instant>,
}

/// Decides whether a fingerprint observed at `now` is a new event.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    cooldown: Duration,
    state: PollState,
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

impl ChangeDetector {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            state: PollState::default(),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// True when `fingerprint` would be accepted at `now`. Does not mutate.
    pub fn is_new(&self, fingerprint: &Fingerprint, now: Instant) -> bool {
        if self.state.last_fingerprint.as_ref() == Some(fingerprint) {
            return false;
        }
        self.cooldown_elapsed(now)
    }

    /// Whether strictly more than the cooldown has passed since the last event.
    /// With no prior event the cooldown is always considered elapsed.
    pub fn cooldown_elapsed(&self, now: Instant) -> bool {
        match self.state.last_event_time {
            Some(last) => now.saturating_duration_since(last) > self.cooldown,
            None => true,
        }
    }

    /// Record `fingerprint` as the latest accepted event.
    pub fn mark(&mut self, fingerprint: Fingerprint, now: Instant) {
        self.state.last_fingerprint = Some(fingerprint);
        self.state.last_event_time = Some(now);
    }

    /// Accept and mark `fingerprint` if it is new; rejected observations
    /// leave the state untouched.
    pub fn observe(&mut self, fingerprint: &Fingerprint, now: Instant) -> bool {
        if !self.is_new(fingerprint, now) {
            debug!(fingerprint = fingerprint.short(), "Observation rejected");
            return false;
        }
        self.mark(fingerprint.clone(), now);
        true
    }
}
