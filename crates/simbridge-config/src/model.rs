// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the simbridge driver.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::path::Path;

use serde::{Deserialize, Serialize};
use simbridge_core::{DeviceCategory, SimbridgeError};

/// Top-level simbridge configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SimbridgeConfig {
    /// Driver node identity and robot description.
    #[serde(default)]
    pub driver: DriverConfig,

    /// Plugin search paths and sandbox limits.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Headless engine used by `simbridge run`.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Driver node configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Node name, also the payload of the shutdown notification.
    #[serde(default = "default_driver_name")]
    pub name: String,

    /// Inline robot description. Overridden by `robot_description_file` if both set.
    #[serde(default)]
    pub robot_description: String,

    /// Path to a robot description file.
    #[serde(default)]
    pub robot_description_file: Option<String>,

    /// Push the engine URDF export to the robot state publisher on startup.
    #[serde(default)]
    pub set_robot_state_publisher: bool,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            name: default_driver_name(),
            robot_description: String::new(),
            robot_description_file: None,
            set_robot_state_publisher: false,
            log_level: default_log_level(),
        }
    }
}

impl DriverConfig {
    /// The robot description text, read from `robot_description_file` when set.
    pub fn load_robot_description(&self) -> Result<String, SimbridgeError> {
        match &self.robot_description_file {
            Some(path) => std::fs::read_to_string(Path::new(path)).map_err(|e| {
                SimbridgeError::Config(format!("cannot read robot description '{path}': {e}"))
            }),
            None => Ok(self.robot_description.clone()),
        }
    }
}

fn default_driver_name() -> String {
    "simbridge".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Plugin discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Directories scanned for native plugin manifests.
    #[serde(default = "default_native_paths")]
    pub native_paths: Vec<String>,

    /// Directories searched for WebAssembly plugin modules.
    #[serde(default = "default_wasm_paths")]
    pub wasm_paths: Vec<String>,

    /// Fuel granted to each WebAssembly `init`/`step` call.
    #[serde(default = "default_wasm_fuel")]
    pub wasm_fuel_per_call: u64,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            native_paths: default_native_paths(),
            wasm_paths: default_wasm_paths(),
            wasm_fuel_per_call: default_wasm_fuel(),
        }
    }
}

fn default_native_paths() -> Vec<String> {
    vec!["~/.simbridge/plugins".to_string()]
}

fn default_wasm_paths() -> Vec<String> {
    vec!["~/.simbridge/wasm".to_string()]
}

fn default_wasm_fuel() -> u64 {
    10_000_000
}

/// Headless engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// World basic time step in milliseconds.
    #[serde(default = "default_basic_time_step")]
    pub basic_time_step_ms: u32,

    /// Steps before the engine reports termination. 0 runs until interrupted.
    #[serde(default)]
    pub max_steps: u64,

    /// Devices of the simulated robot, in enumeration order.
    #[serde(default)]
    pub devices: Vec<VirtualDeviceConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            basic_time_step_ms: default_basic_time_step(),
            max_steps: 0,
            devices: Vec::new(),
        }
    }
}

fn default_basic_time_step() -> u32 {
    32
}

/// A device of the headless engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VirtualDeviceConfig {
    /// Device name reported by the engine.
    pub name: String,
    /// Engine category of the device.
    pub category: DeviceCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = SimbridgeConfig::default();
        assert_eq!(config.driver.name, "simbridge");
        assert_eq!(config.driver.log_level, "info");
        assert!(!config.driver.set_robot_state_publisher);
        assert_eq!(config.plugins.wasm_fuel_per_call, 10_000_000);
        assert_eq!(config.engine.basic_time_step_ms, 32);
        assert!(config.engine.devices.is_empty());
    }

    #[test]
    fn devices_deserialize_with_categories() {
        let toml_str = r#"
[engine]
basic_time_step_ms = 16

[[engine.devices]]
name = "front lidar"
category = "Lidar"

[[engine.devices]]
name = "status led"
category = "Led"
"#;
        let config: SimbridgeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.basic_time_step_ms, 16);
        assert_eq!(
            config.engine.devices,
            vec![
                VirtualDeviceConfig {
                    name: "front lidar".into(),
                    category: DeviceCategory::Lidar
                },
                VirtualDeviceConfig {
                    name: "status led".into(),
                    category: DeviceCategory::Led
                },
            ]
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        let toml_str = r#"
[[engine.devices]]
name = "x"
category = "Teleporter"
"#;
        assert!(toml::from_str::<SimbridgeConfig>(toml_str).is_err());
    }

    #[test]
    fn inline_description_is_used_without_file() {
        let driver = DriverConfig {
            robot_description: "<robot/>".into(),
            ..DriverConfig::default()
        };
        assert_eq!(driver.load_robot_description().unwrap(), "<robot/>");
    }

    #[test]
    fn description_file_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rover.urdf");
        std::fs::write(&path, "<robot name=\"rover\"/>").unwrap();
        let driver = DriverConfig {
            robot_description: "<robot/>".into(),
            robot_description_file: Some(path.display().to_string()),
            ..DriverConfig::default()
        };
        assert_eq!(
            driver.load_robot_description().unwrap(),
            "<robot name=\"rover\"/>"
        );
    }
}
