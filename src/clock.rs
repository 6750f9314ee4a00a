//! Time sources for the orchestrator.
//!
//! Objective time limits are measured against an injected [`Clock`] so that
//! tests can advance time explicitly instead of sleeping.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// A source of wall-clock timestamps.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward by `seconds` (fractional seconds allowed).
    pub fn advance_secs(&self, seconds: f64) {
        let delta = Duration::milliseconds((seconds * 1000.0).round() as i64);
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Seconds elapsed from `earlier` to `later`, never negative.
pub fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    let millis = (later - earlier).num_milliseconds();
    (millis.max(0) as f64) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances_shared_instant() {
        let clock = ManualClock::default();
        let other = clock.clone();
        let start = clock.now();
        other.advance_secs(1.5);
        assert!((seconds_between(start, clock.now()) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_seconds_between_clamps_negative() {
        let clock = ManualClock::default();
        let start = clock.now();
        clock.advance_secs(3.0);
        assert_eq!(seconds_between(clock.now(), start), 0.0);
    }
}
