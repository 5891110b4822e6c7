use hubspace_devices::{
    extract_functions, set_function, Device, DeviceError, FunctionDescriptor, DEFAULT_INSTANCE,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_instance() -> String {
    DEFAULT_INSTANCE.to_string()
}

#[derive(Deserialize, Debug)]
pub struct StateChange {
    pub function_class: String,
    #[serde(default = "default_instance")]
    pub function_instance: String,
    pub value: Value,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    ListDevices,
    GetDevice { device_id: String },
    ExtractFunctions { device: Device },
    SetDeviceState { device_id: String, state: StateChange },
}

/// Device entry in the camelCase shape discovery consumers read (`deviceId`, `type`, ...).
#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFunctions {
    pub device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    pub functions: Vec<FunctionDescriptor>,
}

impl From<&Device> for DeviceFunctions {
    fn from(device: &Device) -> Self {
        Self {
            device_id: device.device_id.clone(),
            friendly_name: device.friendly_name.clone(),
            device_class: device.device_class.clone(),
            functions: extract_functions(device),
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Devices {
        devices: Vec<DeviceFunctions>,
    },
    Device {
        device: DeviceFunctions,
    },
    Functions {
        functions: Vec<FunctionDescriptor>,
    },
    StateChanged {
        device_id: String,
        function: FunctionDescriptor,
        functions: Vec<FunctionDescriptor>,
    },
    Error {
        error: String,
    },
}

impl Response {
    fn error(err: impl ToString) -> Self {
        Response::Error {
            error: err.to_string(),
        }
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Holds the device snapshot the bridge answers from.
#[derive(Default)]
pub struct Bridge {
    devices: Vec<Device>,
}

impl Bridge {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    fn device_mut(&mut self, device_id: &str) -> Result<&mut Device, DeviceError> {
        self.devices
            .iter_mut()
            .find(|d| d.device_id == device_id)
            .ok_or_else(|| DeviceError::DeviceNotFound {
                device_id: device_id.to_string(),
            })
    }

    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::ListDevices => Response::Devices {
                devices: self.devices.iter().map(DeviceFunctions::from).collect(),
            },
            Request::GetDevice { device_id } => {
                match self.devices.iter().find(|d| d.device_id == device_id) {
                    Some(device) => Response::Device {
                        device: device.into(),
                    },
                    None => Response::error(DeviceError::DeviceNotFound { device_id }),
                }
            }
            Request::ExtractFunctions { device } => Response::Functions {
                functions: extract_functions(&device),
            },
            Request::SetDeviceState { device_id, state } => {
                let value = value_to_string(&state.value);
                let result = self.device_mut(&device_id).and_then(|device| {
                    let function = set_function(
                        &mut *device,
                        &state.function_class,
                        &state.function_instance,
                        &value,
                    )?;
                    Ok((function, extract_functions(&*device)))
                });
                match result {
                    Ok((function, functions)) => {
                        log::info!(
                            "Device {} {} '{}' -> {:?}",
                            device_id,
                            function.function_class,
                            function.function_instance,
                            function.state()
                        );
                        Response::StateChanged {
                            device_id,
                            function,
                            functions,
                        }
                    }
                    Err(err) => {
                        log::warn!("set_device_state failed for {}: {}", device_id, err);
                        Response::error(err)
                    }
                }
            }
        }
    }

    /// Parses one request line and renders the response line, without the trailing newline.
    pub fn handle_line(&mut self, line: &str) -> String {
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                log::debug!("Request: {:?}", request);
                self.handle(request)
            }
            Err(err) => {
                log::error!("Failed to parse request: {} ({})", err, line);
                Response::error(format!("invalid request: {}", err))
            }
        };
        serde_json::to_string(&response)
            .unwrap_or_else(|err| format!(r#"{{"error":"failed to encode response: {}"}}"#, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hubspace_devices::parse_snapshot;
    use serde_json::json;

    fn bridge() -> Bridge {
        Bridge::new(
            parse_snapshot(
                r#"[
                {"device_id":"outlet","friendly_name":"Porch","type":"outlet","on":{"left":{"func_class":"power","on":false},"":{"func_class":"power","on":true}}},
                {"device_id":"fan","on":"unsupported"}
            ]"#,
            )
            .unwrap(),
        )
    }

    fn call(bridge: &mut Bridge, line: &str) -> Value {
        serde_json::from_str(&bridge.handle_line(line)).unwrap()
    }

    #[test]
    fn list_devices() {
        let mut b = bridge();
        let res = call(&mut b, r#"{"command":"list_devices"}"#);
        assert_eq!(
            res,
            json!({"devices": [
                {
                    "deviceId": "outlet",
                    "friendlyName": "Porch",
                    "type": "outlet",
                    "functions": [
                        {"functionClass": "power", "functionInstance": "left", "values": [{"deviceValues": [{"key": "off"}]}]},
                        {"functionClass": "power", "functionInstance": "default", "values": [{"deviceValues": [{"key": "on"}]}]}
                    ]
                },
                {"deviceId": "fan", "functions": []}
            ]})
        );
    }

    #[test]
    fn extract_functions_is_stateless() {
        let mut b = Bridge::default();
        let line = r#"{"command":"extract_functions","device":{"device_id":"x","on":{"instance1":{"func_class":"power","on":true}}}}"#;
        let first = call(&mut b, line);
        assert_eq!(first, call(&mut b, line));
        assert_eq!(first["functions"][0]["functionInstance"], "instance1");
        assert_eq!(first["functions"][0]["values"][0]["deviceValues"][0]["key"], "on");
    }

    #[test]
    fn set_device_state_updates_snapshot() {
        let mut b = bridge();
        let res = call(
            &mut b,
            r#"{"command":"set_device_state","device_id":"outlet","state":{"function_class":"power","value":false}}"#,
        );
        assert_eq!(res["function"]["functionInstance"], "default");
        assert_eq!(res["function"]["values"][0]["deviceValues"][0]["key"], "off");

        let res = call(&mut b, r#"{"command":"get_device","device_id":"outlet"}"#);
        assert_eq!(res["device"]["functions"][1]["values"][0]["deviceValues"][0]["key"], "off");
    }

    #[test]
    fn errors_keep_the_loop_alive() {
        let mut b = bridge();
        assert!(call(&mut b, "not json")["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid request"));
        assert_eq!(
            call(&mut b, r#"{"command":"get_device","device_id":"ghost"}"#),
            json!({"error": "Device not found: ghost"})
        );
        assert_eq!(
            call(
                &mut b,
                r#"{"command":"set_device_state","device_id":"fan","state":{"function_class":"power","value":"on"}}"#
            ),
            json!({"error": "Device has no power features"})
        );
        let res = call(&mut b, r#"{"command":"list_devices"}"#);
        assert_eq!(res["devices"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn set_device_state_with_reported_class() {
        let mut b = Bridge::new(
            parse_snapshot(r#"[{"deviceId":"strip","on":{"usb":{"func_class":"toggle","on":false}}}]"#)
                .unwrap(),
        );
        let listed = call(&mut b, r#"{"command":"list_devices"}"#);
        assert_eq!(listed["devices"][0]["functions"][0]["functionClass"], "toggle");

        let res = call(
            &mut b,
            r#"{"command":"set_device_state","device_id":"strip","state":{"function_class":"toggle","function_instance":"usb","value":"on"}}"#,
        );
        assert_eq!(res["function"]["functionClass"], "toggle");
        assert_eq!(res["functions"][0]["values"][0]["deviceValues"][0]["key"], "on");
    }

    #[test]
    fn value_spellings() {
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&json!(1)), "1");
        assert_eq!(value_to_string(&json!("on")), "on");
    }
}
