//! Periodic auto-save scheduling
//!
//! The scheduler is a deadline tracker, not a thread: the event loop
//! polls it with the current instant, and when a tick is due the caller
//! runs the very same save path a manual save uses. Disarming clears the
//! deadline immediately, so no tick is observable after disable. A
//! failed save leaves the scheduler armed; it simply retries on the
//! next tick.

use log::{debug, info};
use std::time::{Duration, Instant};

/// Default auto-save period: 5 minutes.
const DEFAULT_INTERVAL_MINUTES: u64 = 5;
/// Accepted interval range, in minutes.
const MIN_INTERVAL_MINUTES: u64 = 1;
const MAX_INTERVAL_MINUTES: u64 = 60;

/// Whether auto-save is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSaveState {
    Disabled,
    Armed,
}

/// Recurring save timer for the active tab.
#[derive(Debug)]
pub struct AutoSaveScheduler {
    state: AutoSaveState,
    interval: Duration,
    next_deadline: Option<Instant>,
}

impl Default for AutoSaveScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoSaveScheduler {
    /// Create a disabled scheduler with the default 5-minute interval.
    pub fn new() -> Self {
        Self {
            state: AutoSaveState::Disabled,
            interval: Duration::from_secs(DEFAULT_INTERVAL_MINUTES * 60),
            next_deadline: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> AutoSaveState {
        self.state
    }

    /// Configured interval in whole minutes.
    pub fn interval_minutes(&self) -> u64 {
        self.interval.as_secs() / 60
    }

    /// Flip between disabled and armed, relative to `now`.
    ///
    /// Arming starts the recurring timer at the configured interval;
    /// disarming cancels the pending tick. Returns the new state.
    pub fn toggle(&mut self, now: Instant) -> AutoSaveState {
        match self.state {
            AutoSaveState::Disabled => {
                self.state = AutoSaveState::Armed;
                self.next_deadline = Some(now + self.interval);
                info!("Auto-save enabled, every {} minute(s)", self.interval_minutes());
            }
            AutoSaveState::Armed => {
                self.state = AutoSaveState::Disabled;
                self.next_deadline = None;
                info!("Auto-save disabled");
            }
        }
        self.state
    }

    /// Change the interval, clamped to 1..=60 minutes.
    ///
    /// When armed the timer is re-armed at the new period from `now`;
    /// otherwise the new period takes effect on the next arm.
    pub fn set_interval(&mut self, minutes: u64, now: Instant) {
        let minutes = minutes.clamp(MIN_INTERVAL_MINUTES, MAX_INTERVAL_MINUTES);
        self.interval = Duration::from_secs(minutes * 60);
        if self.state == AutoSaveState::Armed {
            self.next_deadline = Some(now + self.interval);
        }
        info!("Auto-save interval set to {} minute(s)", minutes);
    }

    /// Check whether a tick is due at `now`.
    ///
    /// Returns `true` at most once per period; the deadline advances by
    /// one interval when it fires. Disabled schedulers never tick.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_deadline {
            Some(deadline) if self.state == AutoSaveState::Armed && now >= deadline => {
                self.next_deadline = Some(now + self.interval);
                debug!("Auto-save tick");
                true
            }
            _ => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_starts_disabled_with_default_interval() {
        let sched = AutoSaveScheduler::new();
        assert_eq!(sched.state(), AutoSaveState::Disabled);
        assert_eq!(sched.interval_minutes(), 5);
    }

    #[test]
    fn test_disabled_never_ticks() {
        let mut sched = AutoSaveScheduler::new();
        let t0 = Instant::now();
        assert!(!sched.poll(t0 + secs(3600)));
    }

    #[test]
    fn test_toggle_arms_and_ticks_after_interval() {
        let mut sched = AutoSaveScheduler::new();
        let t0 = Instant::now();
        assert_eq!(sched.toggle(t0), AutoSaveState::Armed);
        assert!(!sched.poll(t0 + secs(299)));
        assert!(sched.poll(t0 + secs(300)));
    }

    #[test]
    fn test_tick_fires_once_per_period() {
        let mut sched = AutoSaveScheduler::new();
        let t0 = Instant::now();
        sched.toggle(t0);
        let t1 = t0 + secs(300);
        assert!(sched.poll(t1));
        assert!(!sched.poll(t1 + secs(1)));
        assert!(sched.poll(t1 + secs(300)));
    }

    #[test]
    fn test_disarm_cancels_pending_tick() {
        let mut sched = AutoSaveScheduler::new();
        let t0 = Instant::now();
        sched.toggle(t0);
        sched.toggle(t0 + secs(10));
        assert_eq!(sched.state(), AutoSaveState::Disabled);
        // No tick after disable, however long we wait
        assert!(!sched.poll(t0 + secs(100_000)));
    }

    #[test]
    fn test_set_interval_clamps_to_range() {
        let mut sched = AutoSaveScheduler::new();
        let t0 = Instant::now();
        sched.set_interval(0, t0);
        assert_eq!(sched.interval_minutes(), 1);
        sched.set_interval(600, t0);
        assert_eq!(sched.interval_minutes(), 60);
        sched.set_interval(10, t0);
        assert_eq!(sched.interval_minutes(), 10);
    }

    #[test]
    fn test_set_interval_rearms_when_armed() {
        let mut sched = AutoSaveScheduler::new();
        let t0 = Instant::now();
        sched.toggle(t0);
        sched.set_interval(1, t0 + secs(10));
        // Old 5-minute deadline no longer applies; new 1-minute one does
        assert!(!sched.poll(t0 + secs(69)));
        assert!(sched.poll(t0 + secs(70)));
    }

    #[test]
    fn test_set_interval_while_disabled_applies_on_next_arm() {
        let mut sched = AutoSaveScheduler::new();
        let t0 = Instant::now();
        sched.set_interval(2, t0);
        sched.toggle(t0 + secs(5));
        assert!(!sched.poll(t0 + secs(124)));
        assert!(sched.poll(t0 + secs(125)));
    }
}
