use serde::{Deserialize, Serialize};

use crate::storage::PomodoroConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::ShortBreak => "Short break",
            Phase::LongBreak => "Long break",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Phase::Work => "🍅",
            Phase::ShortBreak => "☕",
            Phase::LongBreak => "🌴",
        }
    }

    /// Body of the desktop popup shown when the phase begins.
    pub fn start_message(self) -> &'static str {
        match self {
            Phase::Work => "🍅 Work session started!",
            Phase::ShortBreak => "☕ Short break started!",
            Phase::LongBreak => "🌴 Long break started!",
        }
    }

    /// Configured length of this phase in minutes.
    pub fn minutes(self, pomodoro: &PomodoroConfig) -> u32 {
        match self {
            Phase::Work => pomodoro.duration,
            Phase::ShortBreak => pomodoro.short_break,
            Phase::LongBreak => pomodoro.long_break,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the engine is in the work/break cycle.
///
/// `cycle_index` counts completed work phases since the last long break and
/// never exceeds the long break threshold. `pomodoro_index` counts completed
/// long breaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclePosition {
    pub cycle_index: u32,
    pub pomodoro_index: u32,
}

impl CyclePosition {
    /// Record that `phase` ran to completion and return the phase that
    /// follows it.
    pub fn complete(&mut self, phase: Phase, cycles_before_long_break: u32) -> Phase {
        match phase {
            Phase::Work => {
                self.cycle_index += 1;
                if self.cycle_index % cycles_before_long_break.max(1) == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                }
            }
            Phase::ShortBreak => Phase::Work,
            Phase::LongBreak => {
                self.pomodoro_index += 1;
                self.cycle_index = 0;
                Phase::Work
            }
        }
    }
}
