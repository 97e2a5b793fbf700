use crate::error::{BulbError, NotifyError};
use crate::payload::DpsPayload;

/// A light that reflects the current phase.
///
/// Implementations own their error handling; the engine only logs what they
/// return.
pub trait BulbChannel: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Send a DPS command map to the device.
    fn apply(&mut self, payload: &DpsPayload) -> Result<(), BulbError>;

    /// Switch the light off.
    fn turn_off(&mut self) -> Result<(), BulbError>;

    /// Current data points as reported by the device.
    fn status(&mut self) -> Result<serde_json::Value, BulbError>;
}

/// An OS level popup.
pub trait DesktopChannel: Send {
    fn notify(&mut self, title: &str, message: &str) -> Result<(), NotifyError>;
}

/// Stand-in used when the bulb is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpBulb;

impl BulbChannel for NoOpBulb {
    fn name(&self) -> &str {
        "none"
    }

    fn apply(&mut self, _payload: &DpsPayload) -> Result<(), BulbError> {
        Ok(())
    }

    fn turn_off(&mut self) -> Result<(), BulbError> {
        Ok(())
    }

    fn status(&mut self) -> Result<serde_json::Value, BulbError> {
        Ok(serde_json::Value::Object(Default::default()))
    }
}

/// Stand-in used when desktop notifications are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpDesktop;

impl DesktopChannel for NoOpDesktop {
    fn notify(&mut self, _title: &str, _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}
