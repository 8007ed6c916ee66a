// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;
use std::path::Path;

use crate::diagnostic::ConfigError;
use crate::model::SimbridgeConfig;

/// Log levels accepted by `driver.log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &SimbridgeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.driver.name.trim().is_empty() {
        fail("driver.name must not be empty".to_string());
    }

    if !LOG_LEVELS.contains(&config.driver.log_level.as_str()) {
        fail(format!(
            "driver.log_level `{}` is not one of {}",
            config.driver.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if let Some(file) = &config.driver.robot_description_file {
        if !Path::new(file).is_file() {
            fail(format!(
                "driver.robot_description_file `{file}` does not exist"
            ));
        }
    }

    if config.plugins.wasm_fuel_per_call == 0 {
        fail("plugins.wasm_fuel_per_call must be greater than 0".to_string());
    }

    if config.engine.basic_time_step_ms == 0 {
        fail("engine.basic_time_step_ms must be greater than 0".to_string());
    }

    let mut seen_names = HashSet::new();
    for (i, device) in config.engine.devices.iter().enumerate() {
        if device.name.trim().is_empty() {
            fail(format!("engine.devices[{i}].name must not be empty"));
        } else if !seen_names.insert(device.name.as_str()) {
            fail(format!(
                "duplicate device name `{}` in [[engine.devices]]",
                device.name
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use simbridge_core::DeviceCategory;

    use super::*;
    use crate::model::VirtualDeviceConfig;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&SimbridgeConfig::default()).is_ok());
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = SimbridgeConfig::default();
        config.driver.log_level = "verbose".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "driver.log_level"));
    }

    #[test]
    fn zero_step_and_fuel_are_both_reported() {
        let mut config = SimbridgeConfig::default();
        config.engine.basic_time_step_ms = 0;
        config.plugins.wasm_fuel_per_call = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(has_error(&errors, "basic_time_step_ms"));
        assert!(has_error(&errors, "wasm_fuel_per_call"));
    }

    #[test]
    fn duplicate_device_names_fail_validation() {
        let mut config = SimbridgeConfig::default();
        config.engine.devices = vec![
            VirtualDeviceConfig {
                name: "camera".into(),
                category: DeviceCategory::Camera,
            },
            VirtualDeviceConfig {
                name: "camera".into(),
                category: DeviceCategory::Lidar,
            },
        ];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "duplicate device name `camera`"));
    }

    #[test]
    fn missing_description_file_fails_validation() {
        let mut config = SimbridgeConfig::default();
        config.driver.robot_description_file = Some("/nonexistent/rover.urdf".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "does not exist"));
    }

    #[test]
    fn blank_driver_name_fails_validation() {
        let mut config = SimbridgeConfig::default();
        config.driver.name = "  ".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "driver.name"));
    }
}
