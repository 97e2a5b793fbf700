use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, Remaining};

/// Every state change in the engine produces an Event.
/// The CLI renders them; tests record them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    PhaseStarted {
        phase: Phase,
        cycle_index: u32,
        pomodoro_index: u32,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Published once per second before the engine sleeps.
    Tick {
        phase: Phase,
        remaining: Remaining,
    },
    PhaseCompleted {
        phase: Phase,
        next: Phase,
        cycle_index: u32,
        pomodoro_index: u32,
        at: DateTime<Utc>,
    },
    /// The engine was interrupted; the phase in progress did not complete.
    Stopped {
        phase: Phase,
        cycle_index: u32,
        pomodoro_index: u32,
        at: DateTime<Utc>,
    },
}
