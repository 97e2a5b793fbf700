//! Client for the Tuya local network protocol (3.2 to 3.4).
//!
//! Only the two operations a bulb channel needs are implemented: writing a
//! DPS map and reading the current data points.

pub mod cipher;
mod device;
pub mod frame;

pub use device::{ProtocolVersion, TuyaDevice, DEFAULT_PORT, DEFAULT_TIMEOUT};
pub use device::session_key;
