//! # pomobulb Core Library
//!
//! Business logic for a Pomodoro timer that signals phase changes through a
//! desktop popup and a Tuya smart bulb. The CLI binary is a thin layer over
//! this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: cycles Work, ShortBreak and LongBreak phases with a
//!   per-second countdown until a shutdown future resolves
//! - **Payloads**: pure RGB to DPS command encoding, including hue conversion
//! - **Channels**: bulb and desktop notifiers behind traits, each with a
//!   no-op variant
//! - **Storage**: YAML/JSON/TOML configuration with named profiles
//! - **Tuya**: minimal local protocol client used by the bulb channel
//!
//! ## Key Components
//!
//! - [`PhaseEngine`]: phase-cycle state machine
//! - [`Config`]: operator configuration and profile lookup
//! - [`BulbChannel`] / [`DesktopChannel`]: notification capabilities
//! - [`encode`]: phase color to DPS payload

pub mod channels;
pub mod error;
pub mod events;
pub mod payload;
pub mod storage;
pub mod timer;
pub mod tuya;

pub use channels::{
    BulbChannel, Channels, DesktopChannel, DesktopNotifier, NoOpBulb, NoOpDesktop,
    SmartBulbNotifier,
};
pub use error::{BulbError, ConfigError, CoreError, NotifyError};
pub use events::Event;
pub use payload::{encode, encode_hsv, rgb_to_hue, DpsPayload, DpsValue, PhasePayloads};
pub use storage::{Config, PhaseColor, PomodoroConfig, SmartBulbConfig, ThemeConfig};
pub use timer::{
    Countdown, CyclePosition, Phase, PhaseEngine, Remaining, RunSummary, Ticker,
    WallClockTicker,
};
