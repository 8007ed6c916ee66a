// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugins compiled into simbridge.
//!
//! Sensors publish their readings as [`Message::Sample`](simbridge_core::Message)
//! at a configurable rate; actuators drain commands from their topic and
//! apply them to the device once per tick.

mod actuator;
mod sensor;

pub use actuator::{EmitterPlugin, LedPlugin};
pub use sensor::{SensorPlugin, SensorSettings};

use simbridge_core::{DeviceTag, PluginContext, PropertyMap, SimbridgeError, SimulationEngine};

/// Property overriding the topic a built-in publishes on or listens to.
pub const TOPIC_NAME_PROPERTY: &str = "topicName";

/// Topic name derived from a device name: `/` followed by the name with
/// dashes and spaces replaced by underscores.
pub fn default_topic_name(device_name: &str) -> String {
    format!("/{}", fixed_name(device_name))
}

/// Device name with dashes and spaces replaced by underscores.
pub fn fixed_name(device_name: &str) -> String {
    device_name.replace(['-', ' '], "_")
}

/// The mandatory `name` property injected by the driver.
pub(crate) fn required_name(
    plugin: &str,
    properties: &PropertyMap,
) -> Result<String, SimbridgeError> {
    properties
        .get(PropertyMap::NAME)
        .map(str::to_string)
        .ok_or_else(|| SimbridgeError::plugin(plugin, "missing `name` property"))
}

/// Look a device up by name in engine enumeration order.
pub(crate) fn find_device(engine: &dyn SimulationEngine, name: &str) -> Option<DeviceTag> {
    (0..engine.device_count())
        .filter_map(|index| engine.device_by_index(index))
        .find(|tag| engine.device_name(*tag) == name)
}

/// Resolve a device by name through the shared engine, failing if it is unknown.
pub(crate) fn bind_device(
    plugin: &str,
    context: &PluginContext,
    name: &str,
) -> Result<DeviceTag, SimbridgeError> {
    context
        .with_engine(|engine| find_device(engine, name))?
        .ok_or_else(|| SimbridgeError::plugin(plugin, format!("device `{name}` does not exist")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_topic_replaces_dashes_and_spaces() {
        assert_eq!(default_topic_name("front lidar-2"), "/front_lidar_2");
        assert_eq!(default_topic_name("camera"), "/camera");
    }

    #[test]
    fn required_name_is_reported() {
        let err = required_name("Lidar", &PropertyMap::device_defaults()).unwrap_err();
        assert!(err.to_string().contains("missing `name`"));
    }
}
