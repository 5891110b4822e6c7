use crate::{
    device::{instance_name, PowerCapable},
    error::DeviceError,
    types::{ControlStyle, FeatureSpec, FunctionDescriptor, PowerState},
};

pub const FEAT_POWER: FeatureSpec = {
    fn extract(device: &dyn PowerCapable) -> Vec<FunctionDescriptor> {
        let Some(features) = device.power_features() else {
            return Vec::new();
        };
        features
            .iter()
            .map(|(instance, feat)| {
                FunctionDescriptor::new(
                    &feat.func_class,
                    instance_name(instance),
                    PowerState::from(feat.on),
                )
            })
            .collect()
    }
    fn set(
        device: &mut dyn PowerCapable,
        instance: &str,
        val: &str,
    ) -> Result<FunctionDescriptor, DeviceError> {
        let features = device
            .power_features_mut()
            .ok_or(DeviceError::NoPowerFeatures)?;
        let feat = features
            .get_mut(instance)
            .ok_or_else(|| DeviceError::UnknownInstance {
                instance: instance.to_string(),
            })?;
        let state = PowerState::parse(val);
        feat.on = state.is_on();
        Ok(FunctionDescriptor::new(
            &feat.func_class,
            instance_name(instance),
            state,
        ))
    }
    FeatureSpec {
        func_class: "power",
        label: "Power",
        style: ControlStyle::Toggle { on: "on", off: "off" },
        extract_handler: extract,
        set_handler: set,
    }
};
