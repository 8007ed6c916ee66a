// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the engine boundary, plugins and the driver.

use std::collections::HashMap;
use std::collections::hash_map;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::SimbridgeError;

/// Value returned by [`SimulationEngine::step`](crate::SimulationEngine::step)
/// once the simulation has terminated.
pub const STEP_TERMINATED: i32 = -1;

/// Opaque handle of an engine device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceTag(pub u32);

/// Device category as reported by the simulation engine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum DeviceCategory {
    Lidar,
    Camera,
    Gps,
    RangeFinder,
    DistanceSensor,
    LightSensor,
    Led,
    Emitter,
    Receiver,
    Compass,
    Motor,
    PositionSensor,
    Accelerometer,
    Gyro,
    InertialUnit,
    TouchSensor,
    Speaker,
    Display,
    Pen,
    Connector,
    Radar,
    Brake,
    Skin,
    Altimeter,
    VacuumGripper,
    Unknown,
}

/// Flat `name -> value` configuration of a device or a plugin declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap(HashMap<String, String>);

impl PropertyMap {
    /// Key controlling whether a device gets a built-in plugin.
    pub const ENABLED: &'static str = "enabled";

    /// Key carrying the engine-reported device name.
    pub const NAME: &'static str = "name";

    /// Create an empty map.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Create the map every device starts from: `{enabled: "true"}`.
    pub fn device_defaults() -> Self {
        let mut map = Self::new();
        map.insert(Self::ENABLED, "true");
        map
    }

    /// Get a property value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Insert or override a property, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns true if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// A device is disabled only by the exact value `"false"`.
    pub fn is_disabled(&self) -> bool {
        self.get(Self::ENABLED) == Some("false")
    }

    /// Parse a property with `FromStr`, falling back to `default` when absent.
    ///
    /// `plugin` only names the owner in the error.
    pub fn parse_or<T: FromStr>(
        &self,
        plugin: &str,
        key: &str,
        default: T,
    ) -> Result<T, SimbridgeError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|_| SimbridgeError::InvalidProperty {
                plugin: plugin.to_string(),
                key: key.to_string(),
                value: raw.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            }),
        }
    }

    /// Parse a boolean property (`true`/`false`, `1`/`0`), falling back to `default`.
    pub fn bool_or(&self, plugin: &str, key: &str, default: bool) -> Result<bool, SimbridgeError> {
        match self.get(key).map(str::trim) {
            None => Ok(default),
            Some("true") | Some("1") => Ok(true),
            Some("false") | Some("0") => Ok(false),
            Some(other) => Err(SimbridgeError::InvalidProperty {
                plugin: plugin.to_string(),
                key: key.to_string(),
                value: other.to_string(),
                expected: "true or false".to_string(),
            }),
        }
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no properties are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for PropertyMap {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A device discovered during initialization, with its resolved properties.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDescriptor {
    pub tag: DeviceTag,
    pub category: DeviceCategory,
    pub name: String,
    pub properties: PropertyMap,
}

/// One sample read from a sensor device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceReading {
    /// Range measurements in meters, one per beam (lidar layers are concatenated).
    Ranges(Vec<f32>),
    /// BGRA image.
    Image { width: u32, height: u32, data: Vec<u8> },
    /// Depth image in meters.
    DepthImage {
        width: u32,
        height: u32,
        depths: Vec<f32>,
    },
    /// Absolute position with ground speed in m/s.
    Position { coordinates: [f64; 3], speed: f64 },
    /// A single scalar value (distance, irradiance).
    Scalar(f64),
    /// A 3-axis vector (magnetic field direction).
    Vector3([f64; 3]),
    /// Packets pending in a receiver queue, oldest first.
    Packets(Vec<Vec<u8>>),
}

/// A command applied to an actuator device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// Set an LED to the given value (0 = off, 1.. = color index or intensity).
    Led(i32),
    /// Send one payload through an emitter.
    Emit(Vec<u8>),
}

/// A message exchanged with the messaging collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Free text, also used for removal requests and receiver packets.
    Text(String),
    /// Integer command, such as an LED value.
    Int(i32),
    /// A stamped sensor reading.
    Sample {
        /// Frame the reading is expressed in.
        frame_id: String,
        /// Engine time of the reading, in seconds.
        stamp: f64,
        reading: DeviceReading,
    },
}
