//! The shared tick, as a pure state machine.
//!
//! Time is passed in as Unix milliseconds so the same scheduler drives both the
//! tokio runtime and deterministic tests.

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running { next_tick_ms: i64 },
}

/// Whether the hosting page is currently shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickScheduler {
    interval_ms: i64,
    state: SchedulerState,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL_MS)
    }
}

impl TickScheduler {
    /// A stopped scheduler ticking every `interval_ms` (at least 1).
    pub fn new(interval_ms: u64) -> Self {
        TickScheduler {
            interval_ms: interval_ms.clamp(1, i64::MAX as u64) as i64,
            state: SchedulerState::Stopped,
        }
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SchedulerState::Running { .. })
    }

    /// Start ticking; the first tick lands on the next interval boundary.
    ///
    /// Starting a running scheduler re-aligns it from `now_ms`.
    pub fn start(&mut self, now_ms: i64) {
        let next_tick_ms = now_ms + (self.interval_ms - now_ms.rem_euclid(self.interval_ms));
        self.state = SchedulerState::Running { next_tick_ms };
    }

    pub fn stop(&mut self) {
        self.state = SchedulerState::Stopped;
    }

    pub fn next_deadline(&self) -> Option<i64> {
        match self.state {
            SchedulerState::Running { next_tick_ms } => Some(next_tick_ms),
            SchedulerState::Stopped => None,
        }
    }

    /// Hiding stops the scheduler. Showing re-aligns it from `now_ms` and returns
    /// true, meaning the caller should refresh right away rather than wait for
    /// the first aligned tick.
    pub fn set_visibility(&mut self, visibility: Visibility, now_ms: i64) -> bool {
        match visibility {
            Visibility::Hidden => {
                self.stop();
                false
            }
            Visibility::Visible => {
                self.start(now_ms);
                true
            }
        }
    }

    /// Milliseconds until the next tick, zero when it is already due.
    pub fn delay_until_next(&self, now_ms: i64) -> Option<u64> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(now_ms).max(0) as u64)
    }

    /// Fire the pending tick if it is due, returning its scheduled time.
    ///
    /// Ticks missed while the caller was busy collapse into this one; the next
    /// deadline stays on the original grid.
    pub fn take_due(&mut self, now_ms: i64) -> Option<i64> {
        let SchedulerState::Running { next_tick_ms } = self.state else {
            return None;
        };
        if now_ms < next_tick_ms {
            return None;
        }
        let missed = (now_ms - next_tick_ms) / self.interval_ms;
        self.state = SchedulerState::Running {
            next_tick_ms: next_tick_ms + (missed + 1) * self.interval_ms,
        };
        Some(next_tick_ms)
    }
}
