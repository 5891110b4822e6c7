pub mod device;
pub mod devices;
pub mod error;
pub mod features;
pub mod snapshot;
pub mod types;

pub use device::{Device, PowerCapable, PowerFeature, PowerFeatures, DEFAULT_INSTANCE};
pub use devices::{extract_functions, find_feature, resolve as get_features_for_device, set_function};
pub use error::DeviceError;
pub use snapshot::{load_snapshot, parse_snapshot, save_snapshot};
pub use types::{ControlStyle, FeatureSpec, FunctionDescriptor, PowerState};
