use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConfigError;

/// Data point ids understood by Tuya RGBCW bulbs.
pub mod dp {
    pub const POWER: &str = "20";
    pub const MODE: &str = "21";
    pub const BRIGHTNESS: &str = "22";
    pub const TEMPERATURE: &str = "23";
    pub const COLOUR: &str = "24";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DpsValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl From<bool> for DpsValue {
    fn from(value: bool) -> Self {
        DpsValue::Bool(value)
    }
}

impl From<u16> for DpsValue {
    fn from(value: u16) -> Self {
        DpsValue::Int(i64::from(value))
    }
}

impl From<&str> for DpsValue {
    fn from(value: &str) -> Self {
        DpsValue::Str(value.to_string())
    }
}

impl From<String> for DpsValue {
    fn from(value: String) -> Self {
        DpsValue::Str(value)
    }
}

/// A DPS command map, serialized as a JSON object keyed by data point id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DpsPayload(BTreeMap<String, DpsValue>);

impl DpsPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, value: impl Into<DpsValue>) -> Self {
        self.0.insert(id.to_string(), value.into());
        self
    }

    pub fn get(&self, id: &str) -> Option<&DpsValue> {
        self.0.get(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Payload that switches the bulb off.
    pub fn power_off() -> Self {
        Self::new().with(dp::POWER, false)
    }

    /// Parse an operator supplied literal payload.
    ///
    /// The input must be a JSON object whose values are booleans, integers or
    /// strings. `key` names the config field in error messages.
    pub fn parse_raw(raw: &str, key: &str) -> Result<Self, ConfigError> {
        let fail = |message: String| ConfigError::InvalidRawPayload {
            key: key.to_string(),
            message,
        };
        let object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(raw).map_err(|e| fail(e.to_string()))?;

        let mut payload = DpsPayload::new();
        for (id, value) in object {
            let value = match value {
                serde_json::Value::Bool(b) => DpsValue::Bool(b),
                serde_json::Value::String(s) => DpsValue::Str(s),
                serde_json::Value::Number(ref n) => match n.as_i64() {
                    Some(n) => DpsValue::Int(n),
                    None => return Err(fail(format!("dp {id}: {n} is not an integer"))),
                },
                other => {
                    return Err(fail(format!(
                        "dp {id}: unsupported value {other}, expected bool, integer or string"
                    )))
                }
            };
            payload.0.insert(id, value);
        }
        if payload.is_empty() {
            return Err(fail("payload has no data points".into()));
        }
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_object() {
        let payload = DpsPayload::new()
            .with(dp::POWER, true)
            .with(dp::MODE, "white")
            .with(dp::BRIGHTNESS, 400u16);
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"20":true,"21":"white","22":400}"#);
    }

    #[test]
    fn parse_raw_keeps_values_verbatim() {
        let payload =
            DpsPayload::parse_raw(r#"{"20": true, "21": "scene", "25": "010e0d0000", "26": 3}"#, "k")
                .unwrap();
        assert_eq!(payload.len(), 4);
        assert_eq!(payload.get("21"), Some(&DpsValue::Str("scene".into())));
        assert_eq!(payload.get("26"), Some(&DpsValue::Int(3)));
    }

    #[test]
    fn parse_raw_rejects_non_objects_and_nested_values() {
        assert!(DpsPayload::parse_raw("[1, 2]", "k").is_err());
        assert!(DpsPayload::parse_raw("{\"20\": {\"a\": 1}}", "k").is_err());
        assert!(DpsPayload::parse_raw("{\"22\": 1.5}", "k").is_err());
        assert!(DpsPayload::parse_raw("{}", "k").is_err());
        assert!(DpsPayload::parse_raw("not json", "k").is_err());
    }

    #[test]
    fn parse_raw_error_names_the_field() {
        let err = DpsPayload::parse_raw("{", "themes.Night.work.raw").unwrap_err();
        assert!(err.to_string().contains("themes.Night.work.raw"));
    }
}
