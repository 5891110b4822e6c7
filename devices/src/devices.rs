use crate::{
    device::{instance_name, PowerCapable},
    error::DeviceError,
    features::FEAT_POWER,
    types::{FeatureSpec, FunctionDescriptor},
};

const ALL_FEATURES: &[&FeatureSpec] = &[&FEAT_POWER];

pub fn resolve(device: &dyn PowerCapable) -> Vec<&'static FeatureSpec> {
    let mut features = Vec::new();

    if device.power_features().is_some() {
        features.push(&FEAT_POWER);
    }

    features
}

pub fn find_feature(func_class: &str) -> Option<&'static FeatureSpec> {
    ALL_FEATURES
        .iter()
        .copied()
        .find(|f| f.func_class == func_class)
}

/// Descriptors for every supported feature instance of `device`, in instance order.
pub fn extract_functions(device: &dyn PowerCapable) -> Vec<FunctionDescriptor> {
    resolve(device)
        .into_iter()
        .flat_map(|feat| (feat.extract_handler)(device))
        .collect()
}

// Device records may carry their own class tag (e.g. "toggle" under the power map).
fn reporting_feature(
    device: &dyn PowerCapable,
    func_class: &str,
    instance: &str,
) -> Option<&'static FeatureSpec> {
    let instance = instance_name(instance);
    resolve(device).into_iter().find(|feat| {
        (feat.extract_handler)(device)
            .iter()
            .any(|d| d.function_class == func_class && d.function_instance == instance)
    })
}

/// Applies `value` to one feature instance and returns the descriptor to send upstream.
pub fn set_function(
    device: &mut dyn PowerCapable,
    func_class: &str,
    instance: &str,
    value: &str,
) -> Result<FunctionDescriptor, DeviceError> {
    let feat = find_feature(func_class)
        .or_else(|| reporting_feature(&*device, func_class, instance))
        .ok_or_else(|| DeviceError::UnsupportedFunction {
            function_class: func_class.to_string(),
        })?;
    log::debug!("Setting {} instance '{}' to '{}'", feat.label, instance, value);
    (feat.set_handler)(device, instance, value)
}
