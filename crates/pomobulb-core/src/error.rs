//! Core error types for pomobulb-core.
//!
//! Configuration problems are fatal and surface before the engine starts.
//! Bulb and desktop failures belong to their channels; the engine logs and
//! moves on (see [`crate::timer::PhaseEngine`]).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomobulb-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Smart bulb errors
    #[error("Bulb error: {0}")]
    Bulb(#[from] BulbError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to parse the configuration file
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// A required collection is missing or empty
    #[error("No {0} found in configuration file")]
    Missing(&'static str),

    /// A requested entry does not exist
    #[error("{kind} with name '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// A raw DPS override could not be parsed
    #[error("Invalid raw payload for '{key}': {message}")]
    InvalidRawPayload { key: String, message: String },
}

/// Errors raised while talking to a smart bulb.
#[derive(Error, Debug)]
pub enum BulbError {
    /// Socket-level failure
    #[error("Connection to {address} failed: {source}")]
    Io {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The device speaks a protocol revision we do not implement
    #[error("Protocol version {0} is not supported")]
    UnsupportedVersion(String),

    /// Malformed frame on the wire
    #[error("Bad frame: {0}")]
    Frame(String),

    /// Decryption, padding or HMAC failure
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Device answered with something we cannot interpret
    #[error("Unexpected device response: {0}")]
    Response(String),
}

/// Errors raised by the desktop notification channel.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The notification server rejected or never received the popup
    #[error("Failed to show notification: {0}")]
    Delivery(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
