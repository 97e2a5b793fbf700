mod color;
mod dps;

pub use color::{decode_hsv, encode, encode_hsv, rgb_to_hue};
pub use dps::{dp, DpsPayload, DpsValue};

use crate::error::ConfigError;
use crate::storage::ThemeConfig;
use crate::timer::Phase;

/// Bulb payloads for every phase of a theme, encoded once at startup so a
/// malformed raw override fails before the timer runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePayloads {
    pub work: DpsPayload,
    pub short_break: DpsPayload,
    pub long_break: DpsPayload,
}

impl PhasePayloads {
    pub fn from_theme(theme: &ThemeConfig) -> Result<Self, ConfigError> {
        let key = |phase: &str| format!("themes.{}.{phase}", theme.name);
        Ok(Self {
            work: encode(&theme.work, &key("work"))?,
            short_break: encode(&theme.short_break, &key("short_break"))?,
            long_break: encode(&theme.long_break, &key("long_break"))?,
        })
    }

    pub fn for_phase(&self, phase: Phase) -> &DpsPayload {
        match phase {
            Phase::Work => &self.work,
            Phase::ShortBreak => &self.short_break,
            Phase::LongBreak => &self.long_break,
        }
    }
}
