mod config;

pub use config::{
    Config, ConfigFormat, PhaseColor, PomodoroConfig, SmartBulbConfig, ThemeConfig,
};

use std::path::{Path, PathBuf};

/// Returns `~/.config/pomobulb[-dev]/` based on POMOBULB_ENV.
///
/// Set POMOBULB_ENV=dev to use development data directory. The directory is
/// not created.
pub fn data_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let env = std::env::var("POMOBULB_ENV").ok();
    data_dir_in(&home, env.as_deref())
}

fn data_dir_in(home: &Path, env: Option<&str>) -> PathBuf {
    let name = match env {
        Some("dev") => "pomobulb-dev",
        _ => "pomobulb",
    };
    home.join(".config").join(name)
}
