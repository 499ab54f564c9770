use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Restartable periodic refresh trigger.
///
/// Owns exactly one [`Interval`] at a time.  [`restart`](Self::restart)
/// replaces it wholesale, so a changed period applies immediately instead of
/// after the old countdown runs out.  Ticks missed while a refresh was
/// running are skipped, never delivered as a burst.
#[derive(Debug)]
pub struct RefreshTimer {
    interval: Interval,
    period:   Duration,
}

impl RefreshTimer {
    /// The first tick fires one full `period` from now.
    pub fn new(period: Duration) -> Self {
        Self {
            interval: make_interval(period),
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Drop the current countdown and start a new one with `period`.
    /// Returns `true` if the period changed.
    pub fn restart(&mut self, period: Duration) -> bool {
        let changed = period != self.period;
        self.interval = make_interval(period);
        self.period = period;
        changed
    }

    /// Wait for the next tick.  Cancel-safe.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

fn make_interval(period: Duration) -> Interval {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}
