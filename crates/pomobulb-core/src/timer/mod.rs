mod countdown;
mod engine;
mod phase;

pub use countdown::{Countdown, Remaining, Ticker, WallClockTicker};
pub use engine::{PhaseEngine, RunSummary};
pub use phase::{CyclePosition, Phase};
