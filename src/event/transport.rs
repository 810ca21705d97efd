//! Beat clock — a cancellable, drift-free periodic timer driven by polling.
//!
//! The clock never sleeps or spawns anything. The host asks it for the next
//! deadline and calls [`BeatClock::poll`] with a clock reading; each poll
//! yields at most one fire. Deadlines are `armed_at + (k + 1) * period`, so
//! late polls do not push later beats back.
//!
//! Every [`BeatClock::arm`] and [`BeatClock::cancel`] bumps a generation
//! counter. A [`BeatFire`] carries the [`TimerHandle`] it was issued under,
//! and consumers drop fires whose handle is no longer current.

use log::debug;

/// Whether the clock is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Running,
}

/// Identifies one arming of a [`BeatClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Arm count that issued this handle.
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// One periodic fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatFire {
    pub handle: TimerHandle,
    /// 0 for the first fire after arming.
    pub tick: u32,
    /// The scheduled time of this fire, in clock milliseconds.
    pub due_ms: f64,
}

#[derive(Debug)]
pub struct BeatClock {
    state: PlayState,
    period_ms: f64,
    armed_at_ms: f64,
    fired: u32,
    generation: u64,
}

impl BeatClock {
    /// Create a stopped clock.
    pub fn new() -> Self {
        Self {
            state: PlayState::Stopped,
            period_ms: 0.0,
            armed_at_ms: 0.0,
            fired: 0,
            generation: 0,
        }
    }

    /// Start firing every `period_ms`, first at `now_ms + period_ms`.
    ///
    /// Any handle issued before this call becomes stale.
    pub fn arm(&mut self, now_ms: f64, period_ms: f64) -> TimerHandle {
        self.generation += 1;
        self.state = PlayState::Running;
        self.period_ms = period_ms;
        self.armed_at_ms = now_ms;
        self.fired = 0;
        debug!(
            "beat clock armed: generation {}, period {period_ms:.1}ms",
            self.generation
        );
        TimerHandle(self.generation)
    }

    /// Stop firing and invalidate the current handle.
    pub fn cancel(&mut self) {
        if self.state == PlayState::Running {
            debug!("beat clock cancelled: generation {}", self.generation);
        }
        self.generation += 1;
        self.state = PlayState::Stopped;
    }

    /// Whether the clock is armed.
    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Number of fires since the last arm.
    pub fn fired(&self) -> u32 {
        self.fired
    }

    /// Whether `handle` belongs to the current arming.
    pub fn is_current(&self, handle: TimerHandle) -> bool {
        self.state == PlayState::Running && handle.0 == self.generation
    }

    /// Deadline of the next fire, if running.
    pub fn next_deadline(&self) -> Option<f64> {
        match self.state {
            PlayState::Running => {
                Some(self.armed_at_ms + (self.fired as f64 + 1.0) * self.period_ms)
            }
            PlayState::Stopped => None,
        }
    }

    /// Return the next fire if its deadline has passed.
    ///
    /// Call repeatedly to catch up after a long gap.
    pub fn poll(&mut self, now_ms: f64) -> Option<BeatFire> {
        let due_ms = self.next_deadline()?;
        if now_ms < due_ms {
            return None;
        }
        let fire = BeatFire {
            handle: TimerHandle(self.generation),
            tick: self.fired,
            due_ms,
        };
        self.fired += 1;
        Some(fire)
    }
}

impl Default for BeatClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state() {
        let c = BeatClock::new();
        assert_eq!(c.state(), PlayState::Stopped);
        assert_eq!(c.next_deadline(), None);
    }

    #[test]
    fn fires_on_period_boundaries() {
        let mut c = BeatClock::new();
        let h = c.arm(100.0, 500.0);
        assert_eq!(c.next_deadline(), Some(600.0));
        assert!(c.poll(599.9).is_none());

        let f = c.poll(600.0).unwrap();
        assert_eq!(f.tick, 0);
        assert_eq!(f.handle, h);
        assert_eq!(f.due_ms, 600.0);
        assert_eq!(c.next_deadline(), Some(1100.0));
    }

    #[test]
    fn late_poll_catches_up_without_drift() {
        let mut c = BeatClock::new();
        c.arm(0.0, 1000.0);
        let a = c.poll(2500.0).unwrap();
        let b = c.poll(2500.0).unwrap();
        assert!(c.poll(2500.0).is_none());
        assert_eq!((a.tick, a.due_ms), (0, 1000.0));
        assert_eq!((b.tick, b.due_ms), (1, 2000.0));
        assert_eq!(c.next_deadline(), Some(3000.0));
    }

    #[test]
    fn rearming_invalidates_old_handle() {
        let mut c = BeatClock::new();
        let old = c.arm(0.0, 1000.0);
        let stale = c.poll(1000.0).unwrap();
        let new = c.arm(1000.0, 800.0);
        assert_ne!(old, new);
        assert!(!c.is_current(stale.handle));
        assert!(c.is_current(new));
        assert_eq!(c.fired(), 0);
        assert_eq!(c.poll(1800.0).unwrap().tick, 0);
    }

    #[test]
    fn cancel_stops_and_invalidates() {
        let mut c = BeatClock::new();
        let h = c.arm(0.0, 1000.0);
        c.cancel();
        assert_eq!(c.state(), PlayState::Stopped);
        assert!(!c.is_current(h));
        assert!(c.poll(5000.0).is_none());
    }
}
