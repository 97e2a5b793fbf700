//! Operator configuration file.
//!
//! Holds three named collections:
//! - `smart_bulbs`: Tuya bulbs reachable on the local network
//! - `pomodoros`: work/break durations and the long-break threshold
//! - `themes`: the bulb color shown during each phase
//!
//! The file may be YAML, JSON or TOML; the format is picked from the file
//! extension. Entries are looked up by case-insensitive name, and a missing
//! name selects the first entry.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Local network credentials for one smart bulb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartBulbConfig {
    pub name: String,
    pub device_id: String,
    /// IP address or hostname; the Tuya port is implied.
    pub address: String,
    /// 16 character AES key extracted from the vendor cloud.
    pub local_key: String,
    /// Protocol revision, 3.1 through 3.5.
    pub version: f64,
}

/// Durations in minutes plus the long break threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroConfig {
    pub name: String,
    /// Work phase length.
    pub duration: u32,
    pub short_break: u32,
    pub long_break: u32,
    pub cycles_before_long_break: u32,
}

/// Bulb settings for a single phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseColor {
    #[serde(alias = "rgb")]
    pub color: [u8; 3],
    #[serde(default = "default_1000")]
    pub saturation: u16,
    #[serde(default = "default_1000")]
    pub brightness: u16,
    /// Only used when `color` is pure white.
    #[serde(default = "default_temperature")]
    pub temperature: u16,
    /// Pre-encoded DPS payload, used verbatim when non-empty.
    #[serde(default, alias = "raw_override", skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
    pub work: PhaseColor,
    pub short_break: PhaseColor,
    pub long_break: PhaseColor,
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub smart_bulbs: Vec<SmartBulbConfig>,
    #[serde(default)]
    pub pomodoros: Vec<PomodoroConfig>,
    #[serde(default)]
    pub themes: Vec<ThemeConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick a format from the file extension. Unknown extensions are read as
    /// YAML, which also accepts plain JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => ConfigFormat::Json,
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

fn default_1000() -> u16 {
    1000
}
fn default_temperature() -> u16 {
    500
}

trait Named {
    fn name(&self) -> &str;
}

impl Named for SmartBulbConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for PomodoroConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for ThemeConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

/// First entry when `name` is `None`, otherwise the case-insensitive match.
fn select<'a, T: Named>(
    items: &'a [T],
    name: Option<&str>,
    plural: &'static str,
    kind: &'static str,
) -> Result<&'a T, ConfigError> {
    let first = items.first().ok_or(ConfigError::Missing(plural))?;
    let Some(name) = name else {
        return Ok(first);
    };
    let wanted = name.to_lowercase();
    items
        .iter()
        .find(|item| item.name().to_lowercase() == wanted)
        .ok_or_else(|| ConfigError::NotFound {
            kind,
            name: name.to_string(),
        })
}

fn invalid(key: String, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        message: message.into(),
    }
}

fn check_range(key: String, value: u16, min: u16, max: u16) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(invalid(key, format!("{value} is outside [{min}, {max}]")));
    }
    Ok(())
}

impl SmartBulbConfig {
    pub const MIN_VERSION: f64 = 3.1;
    pub const MAX_VERSION: f64 = 3.5;

    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = |field: &str| format!("smart_bulbs.{}.{field}", self.name);
        if self.device_id.is_empty() {
            return Err(invalid(key("device_id"), "must not be empty"));
        }
        if self.address.is_empty() {
            return Err(invalid(key("address"), "must not be empty"));
        }
        if self.local_key.len() != 16 {
            return Err(invalid(
                key("local_key"),
                format!("expected 16 bytes, got {}", self.local_key.len()),
            ));
        }
        // Versions are written with one decimal; allow float noise.
        const EPS: f64 = 1e-9;
        if !(Self::MIN_VERSION - EPS..=Self::MAX_VERSION + EPS).contains(&self.version) {
            return Err(invalid(
                key("version"),
                format!(
                    "{} is outside [{}, {}]",
                    self.version,
                    Self::MIN_VERSION,
                    Self::MAX_VERSION
                ),
            ));
        }
        Ok(())
    }
}

impl PomodoroConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("duration", self.duration),
            ("short_break", self.short_break),
            ("long_break", self.long_break),
            ("cycles_before_long_break", self.cycles_before_long_break),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(invalid(
                    format!("pomodoros.{}.{field}", self.name),
                    "must be greater than 0",
                ));
            }
        }
        Ok(())
    }
}

impl PhaseColor {
    pub fn rgb(&self) -> (u8, u8, u8) {
        let [r, g, b] = self.color;
        (r, g, b)
    }

    /// Raw override, treating an empty string as absent.
    pub fn raw_override(&self) -> Option<&str> {
        self.raw.as_deref().map(str::trim).filter(|raw| !raw.is_empty())
    }

    fn validate(&self, prefix: &str) -> Result<(), ConfigError> {
        check_range(format!("{prefix}.saturation"), self.saturation, 10, 1000)?;
        check_range(format!("{prefix}.brightness"), self.brightness, 10, 1000)?;
        check_range(format!("{prefix}.temperature"), self.temperature, 0, 1000)
    }
}

impl ThemeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.work.validate(&format!("themes.{}.work", self.name))?;
        self.short_break
            .validate(&format!("themes.{}.short_break", self.name))?;
        self.long_break
            .validate(&format!("themes.{}.long_break", self.name))
    }
}

impl Config {
    /// `config.yaml` in the data directory. The CLI resolves
    /// `$POMOBULB_CONFIG` before falling back to this.
    pub fn default_path() -> PathBuf {
        data_dir().join("config.yaml")
    }

    /// Read and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `LoadFailed` when the file cannot be read and `ParseFailed`
    /// when its content does not match the expected shape.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::parse(&content, ConfigFormat::from_path(path))?;
        tracing::debug!(
            path = %path.display(),
            bulbs = config.smart_bulbs.len(),
            pomodoros = config.pomodoros.len(),
            themes = config.themes.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let parsed = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(ConfigError::ParseFailed)
    }

    /// Resolve and validate a bulb profile.
    pub fn smart_bulb(&self, name: Option<&str>) -> Result<&SmartBulbConfig, ConfigError> {
        let bulb = select(&self.smart_bulbs, name, "smart bulbs", "Smart bulb")?;
        bulb.validate()?;
        Ok(bulb)
    }

    /// Resolve and validate a timer profile.
    pub fn pomodoro(&self, name: Option<&str>) -> Result<&PomodoroConfig, ConfigError> {
        let pomodoro = select(
            &self.pomodoros,
            name,
            "pomodoro configurations",
            "Pomodoro configuration",
        )?;
        pomodoro.validate()?;
        Ok(pomodoro)
    }

    /// Resolve and validate a color theme.
    pub fn theme(&self, name: Option<&str>) -> Result<&ThemeConfig, ConfigError> {
        let theme = select(&self.themes, name, "themes", "Theme")?;
        theme.validate()?;
        Ok(theme)
    }
}
