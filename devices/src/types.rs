use crate::{device::PowerCapable, error::DeviceError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    /// Accepts the loose spellings users type into a prompt or a bridge request.
    pub fn parse(val: &str) -> Self {
        match val.trim().to_lowercase().as_str() {
            "1" | "true" | "on" => PowerState::On,
            _ => PowerState::Off,
        }
    }

    pub fn is_on(self) -> bool {
        self == PowerState::On
    }

    pub fn as_key(self) -> &'static str {
        match self {
            PowerState::On => "on",
            PowerState::Off => "off",
        }
    }
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on {
            PowerState::On
        } else {
            PowerState::Off
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceValue {
    pub key: PowerState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionValue {
    pub device_values: Vec<DeviceValue>,
}

/// One feature instance and its current value, in the shape the device API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDescriptor {
    pub function_class: String,
    pub function_instance: String,
    pub values: Vec<FunctionValue>,
}

impl FunctionDescriptor {
    pub fn new(function_class: &str, function_instance: &str, state: PowerState) -> Self {
        Self {
            function_class: function_class.to_string(),
            function_instance: function_instance.to_string(),
            values: vec![FunctionValue {
                device_values: vec![DeviceValue { key: state }],
            }],
        }
    }

    /// First device value of the first value entry, if any.
    pub fn state(&self) -> Option<PowerState> {
        self.values
            .first()
            .and_then(|v| v.device_values.first())
            .map(|dv| dv.key)
    }
}

#[derive(Debug, Clone)]
pub enum ControlStyle {
    Toggle { on: &'static str, off: &'static str },
}

pub type ExtractHandler = fn(&dyn PowerCapable) -> Vec<FunctionDescriptor>;
pub type SetHandler =
    fn(&mut dyn PowerCapable, &str, &str) -> Result<FunctionDescriptor, DeviceError>;

#[derive(Clone)]
pub struct FeatureSpec {
    pub func_class: &'static str,
    pub label: &'static str,
    pub style: ControlStyle,

    pub extract_handler: ExtractHandler,
    /// Takes the target instance name and the raw value to apply.
    pub set_handler: SetHandler,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_wire_shape() {
        let d = FunctionDescriptor::new("power", "instance1", PowerState::On);
        assert_eq!(
            serde_json::to_value(&d).unwrap(),
            json!({
                "functionClass": "power",
                "functionInstance": "instance1",
                "values": [{"deviceValues": [{"key": "on"}]}]
            })
        );
    }

    #[test]
    fn state_reads_first_value() {
        let d: FunctionDescriptor = serde_json::from_value(json!({
            "functionClass": "power",
            "functionInstance": "default",
            "values": [{"deviceValues": [{"key": "off"}, {"key": "on"}]}]
        }))
        .unwrap();
        assert_eq!(d.state(), Some(PowerState::Off));

        let empty = FunctionDescriptor {
            values: vec![],
            ..d
        };
        assert_eq!(empty.state(), None);
    }

    #[test]
    fn lenient_parse() {
        for raw in ["1", "true", "ON", " on "] {
            assert_eq!(PowerState::parse(raw), PowerState::On, "{raw}");
        }
        for raw in ["0", "false", "off", "", "maybe"] {
            assert_eq!(PowerState::parse(raw), PowerState::Off, "{raw}");
        }
    }
}
