// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the simbridge configuration system.

use std::io::Write;
use std::path::Path;

use simbridge_config::diagnostic::{ConfigError, suggest_key};
use simbridge_config::model::SimbridgeConfig;
use simbridge_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
};
use simbridge_core::DeviceCategory;

/// Valid TOML with every section deserializes successfully.
#[test]
fn valid_toml_deserializes_into_simbridge_config() {
    let toml = r#"
[driver]
name = "rover_driver"
robot_description = "<robot name=\"rover\"/>"
set_robot_state_publisher = true
log_level = "debug"

[plugins]
native_paths = ["/opt/simbridge/plugins"]
wasm_paths = []
wasm_fuel_per_call = 5000

[engine]
basic_time_step_ms = 16
max_steps = 100

[[engine.devices]]
name = "front lidar"
category = "Lidar"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.driver.name, "rover_driver");
    assert!(config.driver.set_robot_state_publisher);
    assert_eq!(config.driver.log_level, "debug");
    assert_eq!(config.plugins.native_paths, vec!["/opt/simbridge/plugins"]);
    assert!(config.plugins.wasm_paths.is_empty());
    assert_eq!(config.plugins.wasm_fuel_per_call, 5000);
    assert_eq!(config.engine.basic_time_step_ms, 16);
    assert_eq!(config.engine.max_steps, 100);
    assert_eq!(config.engine.devices[0].category, DeviceCategory::Lidar);
}

/// Unknown field in [driver] is rejected by `deny_unknown_fields`.
#[test]
fn unknown_field_in_driver_produces_error() {
    let toml = r#"
[driver]
naem = "test"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("naem"),
        "error should mention the bad key, got: {err_str}"
    );
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let toml = r#"
[network]
port = 8080
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.driver.name, "simbridge");
    assert_eq!(config.engine.basic_time_step_ms, 32);
    assert_eq!(config.plugins.native_paths, vec!["~/.simbridge/plugins"]);
}

/// Figment file providers skip files that do not exist.
#[test]
fn missing_config_file_is_silently_skipped() {
    let config = load_config_from_path(Path::new("/nonexistent/path/simbridge.toml"))
        .expect("missing file should be silently skipped");
    assert_eq!(config.driver.name, SimbridgeConfig::default().driver.name);
}

/// `SIMBRIDGE_DRIVER_LOG_LEVEL` maps to `driver.log_level`, not `driver.log.level`.
#[test]
fn env_var_overrides_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "rover.toml",
            r#"
[driver]
name = "from-file"
log_level = "warn"
"#,
        )?;
        jail.set_env("SIMBRIDGE_DRIVER_LOG_LEVEL", "debug");
        jail.set_env("SIMBRIDGE_ENGINE_BASIC_TIME_STEP_MS", "8");

        let config = load_config_from_path(Path::new("rover.toml"))?;
        assert_eq!(config.driver.name, "from-file");
        assert_eq!(config.driver.log_level, "debug");
        assert_eq!(config.engine.basic_time_step_ms, 8);
        Ok(())
    });
}

#[test]
fn env_var_overrides_apply_to_every_section() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("empty.toml", "")?;
        jail.set_env("SIMBRIDGE_DRIVER_NAME", "env-rover");
        jail.set_env("SIMBRIDGE_PLUGINS_WASM_FUEL_PER_CALL", "5000");
        jail.set_env("SIMBRIDGE_ENGINE_MAX_STEPS", "12");

        let config = load_config_from_path(Path::new("empty.toml"))?;
        assert_eq!(config.driver.name, "env-rover");
        assert_eq!(config.plugins.wasm_fuel_per_call, 5000);
        assert_eq!(config.engine.max_steps, 12);
        Ok(())
    });
}

#[test]
fn diagnostic_naem_suggests_name() {
    let valid_keys = &["name", "robot_description", "log_level"];
    assert_eq!(suggest_key("naem", valid_keys), Some("name".to_string()));
}

#[test]
fn diagnostic_no_suggestion_for_distant_typo() {
    let valid_keys = &["name", "robot_description", "log_level"];
    assert!(suggest_key("zzzzzz", valid_keys).is_none());
}

/// Errors from `load_and_validate_str` carry the key, suggestion and valid keys.
#[test]
fn diagnostic_error_includes_unknown_key() {
    let toml = r#"
[driver]
log_levl = "info"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "log_levl"
                && suggestion.as_deref() == Some("log_level")
                && valid_keys.contains("robot_description")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'log_levl', got: {errors:?}"
    );
}

#[test]
fn unknown_key_in_file_points_at_the_key() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[engine]\nbasic_time_stp_ms = 16").unwrap();

    let errors = load_and_validate_path(file.path()).expect_err("should produce errors");
    let (key, suggestion, span) = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key,
                suggestion,
                span,
                ..
            } => Some((key.as_str(), suggestion.as_deref(), *span)),
            _ => None,
        })
        .expect("should report the unknown key");
    assert_eq!(key, "basic_time_stp_ms");
    assert_eq!(suggestion, Some("basic_time_step_ms"));
    if let Some(span) = span {
        assert_eq!(span.offset(), "[engine]\n".len());
        assert_eq!(span.len(), key.len());
    }
}

#[test]
fn find_key_offset_skips_other_sections() {
    let content = "[driver]\nname = \"a\"\n\n[[engine.devices]]\nname = \"lidar\"\n";
    let offset = simbridge_config::diagnostic::find_key_offset(
        content,
        &["engine".to_string()],
        "name",
    )
    .unwrap();
    assert_eq!(&content[offset..offset + 4], "name");
    assert!(offset > content.find("[[engine").unwrap());
}

#[test]
fn invalid_category_is_reported() {
    let toml = r#"
[[engine.devices]]
name = "arm"
category = "Robot"
"#;
    assert!(load_and_validate_str(toml).is_err());
}

#[test]
fn config_error_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::UnknownKey {
        key: "naem".to_string(),
        suggestion: Some("name".to_string()),
        valid_keys: "name, log_level".to_string(),
        span: None,
        src: None,
    };

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("naem"));
    assert!(buf.contains("did you mean `name`"));
}

#[test]
fn load_and_validate_valid_toml() {
    let toml = r#"
[driver]
name = "rover_driver"
"#;
    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.driver.name, "rover_driver");
}

#[test]
fn validation_errors_are_collected() {
    let toml = r#"
[driver]
log_level = "loud"

[engine]
basic_time_step_ms = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    let validation_messages: Vec<_> = errors
        .iter()
        .filter_map(|e| match e {
            ConfigError::Validation { message } => Some(message.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(validation_messages.len(), 2, "got: {validation_messages:?}");
}

#[test]
fn robot_description_file_takes_precedence() {
    let mut urdf = tempfile::NamedTempFile::new().unwrap();
    write!(urdf, "<robot name=\"from_file\"/>").unwrap();

    let toml = format!(
        "[driver]\nrobot_description = \"<robot name=\\\"inline\\\"/>\"\nrobot_description_file = {:?}\n",
        urdf.path().display().to_string()
    );
    let config = load_and_validate_str(&toml).expect("config should validate");
    assert_eq!(
        config.driver.load_robot_description().unwrap(),
        "<robot name=\"from_file\"/>"
    );
}
