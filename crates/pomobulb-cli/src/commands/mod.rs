pub mod run;
pub mod status;

use pomobulb_core::{Config, ConfigError};
use std::path::Path;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load the file given with `--config` or `$POMOBULB_CONFIG`, or the default
/// location.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load(path),
        None => Config::load(&Config::default_path()),
    }
}
