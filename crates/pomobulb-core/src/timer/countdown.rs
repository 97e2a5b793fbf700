//! Per-second countdown.
//!
//! [`Countdown`] is a pure iterator over the remaining time of a phase.
//! [`Ticker`] supplies the one second suspension between items so the engine
//! can be driven by a fake clock in tests.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Time left in a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remaining {
    pub minutes: u64,
    pub seconds: u64,
}

impl Remaining {
    pub fn from_secs(total: u64) -> Self {
        Self {
            minutes: total / 60,
            seconds: total % 60,
        }
    }

    pub fn total_secs(&self) -> u64 {
        self.minutes * 60 + self.seconds
    }
}

impl std::fmt::Display for Remaining {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

/// Yields `duration * 60` values, from one second short of the full
/// duration down to `00:00`.
#[derive(Debug, Clone)]
pub struct Countdown {
    left: u64,
}

impl Countdown {
    pub fn new(duration_minutes: u32) -> Self {
        Self {
            left: u64::from(duration_minutes) * 60,
        }
    }
}

impl Iterator for Countdown {
    type Item = Remaining;

    fn next(&mut self) -> Option<Remaining> {
        if self.left == 0 {
            return None;
        }
        self.left -= 1;
        Some(Remaining::from_secs(self.left))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::try_from(self.left).unwrap_or(usize::MAX);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Countdown {}

/// Source of the one second pause between countdown ticks.
pub trait Ticker {
    /// Called once before the first tick of every phase.
    fn start(&mut self);

    /// Suspend until the next tick is due.
    fn wait(&mut self) -> impl Future<Output = ()>;
}

/// Ticks against absolute deadlines so time spent in notification calls and
/// scheduling jitter does not accumulate over a phase.
#[derive(Debug)]
pub struct WallClockTicker {
    period: Duration,
    next: Instant,
}

impl WallClockTicker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next: Instant::now(),
        }
    }
}

impl Default for WallClockTicker {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for WallClockTicker {
    fn start(&mut self) {
        self.next = Instant::now();
    }

    async fn wait(&mut self) {
        self.next += self.period;
        tokio::time::sleep_until(self.next).await;
    }
}
