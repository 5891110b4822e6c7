use serde::{
    de::{IgnoredAny, MapAccess, SeqAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::fmt;

/// Instance name reported for power features stored under an empty key.
pub const DEFAULT_INSTANCE: &str = "default";

pub fn instance_name(key: &str) -> &str {
    if key.is_empty() {
        DEFAULT_INSTANCE
    } else {
        key
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerFeature {
    pub func_class: String,
    pub on: bool,
}

/// Power feature records keyed by instance name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerFeatures {
    entries: Vec<(String, PowerFeature)>,
}

impl PowerFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the record in place when the key already exists.
    pub fn insert(&mut self, instance: impl Into<String>, feature: PowerFeature) {
        let instance = instance.into();
        match self.entries.iter_mut().find(|(k, _)| *k == instance) {
            Some((_, slot)) => *slot = feature,
            None => self.entries.push((instance, feature)),
        }
    }

    fn position(&self, instance: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k == instance)
            .or_else(|| {
                if instance == DEFAULT_INSTANCE {
                    self.entries.iter().position(|(k, _)| k.is_empty())
                } else {
                    None
                }
            })
    }

    /// Looks up by raw key; `"default"` also matches the empty key.
    pub fn get(&self, instance: &str) -> Option<&PowerFeature> {
        self.position(instance).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, instance: &str) -> Option<&mut PowerFeature> {
        self.position(instance).map(move |i| &mut self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PowerFeature)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, PowerFeature)> for PowerFeatures {
    fn from_iter<I: IntoIterator<Item = (K, PowerFeature)>>(iter: I) -> Self {
        let mut features = PowerFeatures::new();
        for (k, v) in iter {
            features.insert(k, v);
        }
        features
    }
}

impl Serialize for PowerFeatures {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct PowerFeaturesVisitor;

impl<'de> Visitor<'de> for PowerFeaturesVisitor {
    type Value = PowerFeatures;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of instance names to power features")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut features = PowerFeatures::new();
        while let Some((k, v)) = map.next_entry::<String, PowerFeature>()? {
            features.insert(k, v);
        }
        Ok(features)
    }
}

impl<'de> Deserialize<'de> for PowerFeatures {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(PowerFeaturesVisitor)
    }
}

// A map yields features; any other JSON value means the device has no power capability.
struct PowerSlotVisitor;

impl<'de> Visitor<'de> for PowerSlotVisitor {
    type Value = Option<PowerFeatures>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("any value")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        PowerFeaturesVisitor.visit_map(map).map(Some)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_bool<E>(self, _: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_i64<E>(self, _: i64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_u64<E>(self, _: u64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_f64<E>(self, _: f64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_str<E>(self, _: &str) -> Result<Self::Value, E> {
        Ok(None)
    }
}

fn power_slot<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PowerFeatures>, D::Error> {
    deserializer.deserialize_any(PowerSlotVisitor)
}

/// Anything that may carry power feature instances.
pub trait PowerCapable {
    fn power_features(&self) -> Option<&PowerFeatures>;
    fn power_features_mut(&mut self) -> Option<&mut PowerFeatures>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(alias = "deviceId")]
    pub device_id: String,
    #[serde(default, alias = "friendlyName", skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(
        default,
        deserialize_with = "power_slot",
        skip_serializing_if = "Option::is_none"
    )]
    pub on: Option<PowerFeatures>,
}

impl Device {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            friendly_name: None,
            device_class: None,
            on: None,
        }
    }

    pub fn with_power(mut self, features: PowerFeatures) -> Self {
        self.on = Some(features);
        self
    }

    pub fn display_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.device_id)
    }

    pub fn is_any_on(&self) -> bool {
        self.on
            .as_ref()
            .map_or(false, |features| features.iter().any(|(_, f)| f.on))
    }
}

impl PowerCapable for Device {
    fn power_features(&self) -> Option<&PowerFeatures> {
        self.on.as_ref()
    }

    fn power_features_mut(&mut self) -> Option<&mut PowerFeatures> {
        self.on.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn power(on: bool) -> PowerFeature {
        PowerFeature {
            func_class: "power".to_string(),
            on,
        }
    }

    #[test]
    fn keeps_document_order() {
        let dev: Device = serde_json::from_str(
            r#"{"device_id":"d1","on":{"zeta":{"func_class":"power","on":true},"alpha":{"func_class":"power","on":false},"mid":{"func_class":"toggle","on":true}}}"#,
        )
        .unwrap();
        let keys: Vec<&str> = dev.on.as_ref().unwrap().iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn non_map_power_is_absent() {
        for on in [json!(true), json!(1), json!("on"), json!([1, 2]), json!(null)] {
            let dev: Device = serde_json::from_value(json!({"device_id": "d", "on": on})).unwrap();
            assert!(dev.on.is_none(), "{on}");
        }
        let dev: Device = serde_json::from_value(json!({"deviceId": "d"})).unwrap();
        assert!(dev.on.is_none());
    }

    #[test]
    fn malformed_feature_is_rejected() {
        let res = serde_json::from_value::<Device>(json!({
            "device_id": "d",
            "on": {"a": {"on": true}}
        }));
        assert!(res.is_err());
    }

    #[test]
    fn duplicate_key_keeps_position() {
        let dev: Device = serde_json::from_str(
            r#"{"device_id":"d","on":{"a":{"func_class":"power","on":false},"b":{"func_class":"power","on":false},"a":{"func_class":"power","on":true}}}"#,
        )
        .unwrap();
        let features = dev.on.unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features.iter().next(), Some(("a", &power(true))));
    }

    #[test]
    fn default_matches_empty_key() {
        let mut features: PowerFeatures = [("", power(false))].into_iter().collect();
        assert_eq!(features.get(DEFAULT_INSTANCE), Some(&power(false)));
        features.get_mut("default").unwrap().on = true;
        assert_eq!(features.get(""), Some(&power(true)));
        assert!(features.get("other").is_none());
    }

    #[test]
    fn serializes_in_order() {
        let dev = Device::new("d").with_power(
            [("b", power(true)), ("a", power(false))].into_iter().collect(),
        );
        assert_eq!(
            serde_json::to_string(&dev).unwrap(),
            r#"{"device_id":"d","on":{"b":{"func_class":"power","on":true},"a":{"func_class":"power","on":false}}}"#
        );
    }
}
