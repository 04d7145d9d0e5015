//! Control loop pacing.
//!
//! Portable fixed-period scheduling without async/await or platform
//! timers. The caller sleeps between ticks for as long as
//! [`TickResult::sleep_duration`] says.

use embassy_time::{Duration, Instant};

use crate::config::TICK_PERIOD;

/// Something that runs once per tick
pub trait ControlLoop {
    fn tick(&mut self, now: Instant);
}

/// Result of a scheduler tick
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// The deadline for the next tick.
    pub next_deadline: Instant,
    /// How long to wait until the next tick (zero if behind schedule).
    pub sleep_duration: Duration,
    /// Return true if the schedule was resynchronised to `now`
    pub resynced: bool,
}

/// Fixed-period scheduler with drift correction
///
/// ```ignore
/// let mut scheduler = TickScheduler::new(fixture);
///
/// loop {
///     let result = scheduler.tick(Instant::from_millis(millis()));
///     delay_ms(result.sleep_duration.as_millis());
/// }
/// ```
pub struct TickScheduler<L: ControlLoop> {
    control: L,
    next_tick: Option<Instant>,
    period: Duration,
}

impl<L: ControlLoop> TickScheduler<L> {
    /// Create a scheduler with the default period
    pub fn new(control: L) -> Self {
        Self::with_period(control, TICK_PERIOD)
    }

    /// Create a scheduler with a custom period
    pub fn with_period(control: L, period: Duration) -> Self {
        Self {
            control,
            next_tick: None,
            period,
        }
    }

    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Run one tick and return the timing of the next one
    ///
    /// If the loop fell behind by more than two periods the schedule
    /// restarts from `now` instead of bursting through the backlog.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        let max_drift = Duration::from_ticks(self.period.as_ticks() * 2);
        let mut deadline = self.next_tick.unwrap_or(now);
        let resynced = now > deadline + max_drift;
        if resynced {
            deadline = now;
        }

        self.control.tick(now);

        let next = deadline + self.period;
        self.next_tick = Some(next);

        TickResult {
            next_deadline: next,
            sleep_duration: next.saturating_duration_since(now),
            resynced,
        }
    }

    pub const fn control(&self) -> &L {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut L {
        &mut self.control
    }

    pub fn into_inner(self) -> L {
        self.control
    }
}
