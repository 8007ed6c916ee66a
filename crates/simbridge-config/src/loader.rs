// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./simbridge.toml` > `<config dir>/simbridge/simbridge.toml` >
//! `/etc/simbridge/simbridge.toml`, with environment variable overrides via
//! the `SIMBRIDGE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SimbridgeConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/simbridge/simbridge.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "simbridge.toml";

/// Per-user configuration file, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("simbridge").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/simbridge/simbridge.toml`
/// 3. `<config dir>/simbridge/simbridge.toml`
/// 4. `./simbridge.toml`
/// 5. `SIMBRIDGE_*` environment variables
pub fn load_config() -> Result<SimbridgeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SimbridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SimbridgeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SimbridgeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SimbridgeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchical config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SimbridgeConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment variable provider mapping the section prefix to a dot.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that keys containing
/// underscores survive: `SIMBRIDGE_DRIVER_LOG_LEVEL` maps to
/// `driver.log_level`, not `driver.log.level`. Figment passes the key in its
/// original case, so it is lowercased before the section prefix is matched.
fn env_provider() -> Env {
    Env::prefixed("SIMBRIDGE_").map(|key| {
        key.as_str()
            .to_ascii_lowercase()
            .replacen("driver_", "driver.", 1)
            .replacen("plugins_", "plugins.", 1)
            .replacen("engine_", "engine.", 1)
            .into()
    })
}
