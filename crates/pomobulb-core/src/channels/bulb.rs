use super::traits::BulbChannel;
use crate::error::BulbError;
use crate::payload::DpsPayload;
use crate::storage::SmartBulbConfig;
use crate::tuya::TuyaDevice;

/// A Tuya bulb on the local network.
#[derive(Debug)]
pub struct SmartBulbNotifier {
    name: String,
    device: TuyaDevice,
}

impl SmartBulbNotifier {
    pub fn new(config: &SmartBulbConfig) -> Result<Self, BulbError> {
        Ok(Self {
            name: config.name.clone(),
            device: TuyaDevice::from_config(config)?,
        })
    }
}

impl BulbChannel for SmartBulbNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self, payload: &DpsPayload) -> Result<(), BulbError> {
        self.device.set_dps(payload)
    }

    fn turn_off(&mut self) -> Result<(), BulbError> {
        self.device.set_dps(&DpsPayload::power_off())
    }

    fn status(&mut self) -> Result<serde_json::Value, BulbError> {
        self.device.status()
    }
}
