//! RGB to DPS payload encoding.
//!
//! Tuya bulbs take color as a 12 character hex string packing hue (0-360),
//! saturation (0-1000) and value (0-1000) into four digits each. Pure white
//! switches the bulb into white mode and pure black turns it off, since the
//! device has no black color.

use super::dps::{dp, DpsPayload};
use crate::error::ConfigError;
use crate::storage::PhaseColor;

/// Build the DPS payload for one phase.
///
/// `key` names the phase in error messages (e.g. `themes.Tomato.work`).
///
/// # Errors
///
/// Only a malformed raw override fails.
pub fn encode(color: &PhaseColor, key: &str) -> Result<DpsPayload, ConfigError> {
    if let Some(raw) = color.raw_override() {
        return DpsPayload::parse_raw(raw, &format!("{key}.raw"));
    }

    let payload = match color.rgb() {
        (255, 255, 255) => DpsPayload::new()
            .with(dp::POWER, true)
            .with(dp::MODE, "white")
            .with(dp::BRIGHTNESS, color.brightness)
            .with(dp::TEMPERATURE, color.temperature),
        (0, 0, 0) => DpsPayload::power_off(),
        (r, g, b) => DpsPayload::new()
            .with(dp::POWER, true)
            .with(dp::MODE, "colour")
            .with(
                dp::COLOUR,
                encode_hsv(rgb_to_hue(r, g, b), color.saturation, color.brightness),
            ),
    };
    Ok(payload)
}

/// Hue component of the HSV conversion, in whole degrees.
///
/// Grays (including black and white) map to 0. Halves round to even and a
/// result of 360 wraps to 0.
pub fn rgb_to_hue(r: u8, g: u8, b: u8) -> u16 {
    let (r, g, b) = (
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
    );
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    if delta == 0.0 {
        return 0;
    }

    let hue = if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    (hue.round_ties_even() as u16) % 360
}

/// Pack hue, saturation and value as `%04x%04x%04x`.
pub fn encode_hsv(h: u16, s: u16, v: u16) -> String {
    format!("{h:04x}{s:04x}{v:04x}")
}

/// Inverse of [`encode_hsv`]; `None` unless given exactly 12 hex digits.
pub fn decode_hsv(hsv: &str) -> Option<(u16, u16, u16)> {
    if hsv.len() != 12 || !hsv.is_ascii() {
        return None;
    }
    let field = |i: usize| u16::from_str_radix(&hsv[i * 4..i * 4 + 4], 16).ok();
    Some((field(0)?, field(1)?, field(2)?))
}
