// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Native plugin manifest parsing from TOML.
//!
//! A manifest sits next to a shared library and tells the native registry
//! which plugin type the library provides and which symbol constructs it:
//!
//! ```toml
//! [plugin]
//! type = "rover::DriveController"
//! library = "librover_drive.so"
//! symbol = "simbridge_plugin_create"
//! description = "Differential drive controller"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use simbridge_core::SimbridgeError;

/// Entry symbol looked up when a manifest does not name one.
pub const DEFAULT_ENTRY_SYMBOL: &str = "simbridge_plugin_create";

/// A parsed native plugin manifest with its library path resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativePluginManifest {
    /// Plugin type the library provides, matched against `<plugin type>`.
    pub type_name: String,
    /// Shared library path, absolute or resolved against the manifest.
    pub library: PathBuf,
    /// Entry symbol constructing the plugin.
    pub symbol: String,
    /// Human-readable description.
    pub description: Option<String>,
}

// --- TOML intermediate structs ---

#[derive(Debug, Deserialize)]
struct ManifestFile {
    plugin: PluginSection,
}

/// The [plugin] section of the manifest.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PluginSection {
    #[serde(rename = "type")]
    type_name: String,
    library: String,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Parses a native plugin manifest from a TOML string.
///
/// A relative `library` path is resolved against `manifest_dir`.
pub fn parse_native_manifest(
    toml_content: &str,
    manifest_dir: &Path,
) -> Result<NativePluginManifest, SimbridgeError> {
    let file: ManifestFile = toml::from_str(toml_content)
        .map_err(|e| SimbridgeError::Config(format!("failed to parse plugin manifest: {e}")))?;
    let section = file.plugin;

    if section.type_name.trim().is_empty() {
        return Err(SimbridgeError::Config(
            "plugin type must not be empty".to_string(),
        ));
    }
    if section.library.trim().is_empty() {
        return Err(SimbridgeError::Config(format!(
            "plugin {} does not name a library",
            section.type_name
        )));
    }

    let library = PathBuf::from(&section.library);
    let library = if library.is_absolute() {
        library
    } else {
        manifest_dir.join(library)
    };

    Ok(NativePluginManifest {
        type_name: section.type_name,
        library,
        symbol: section
            .symbol
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_ENTRY_SYMBOL.to_string()),
        description: section.description,
    })
}

/// Loads and parses a manifest file.
pub fn load_native_manifest(path: &Path) -> Result<NativePluginManifest, SimbridgeError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SimbridgeError::Config(format!(
            "failed to read plugin manifest '{}': {e}",
            path.display()
        ))
    })?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_native_manifest(&content, dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_manifest_full() {
        let toml = r#"
[plugin]
type = "rover::DriveController"
library = "lib/librover_drive.so"
symbol = "create_drive"
description = "Differential drive controller"
"#;
        let manifest = parse_native_manifest(toml, Path::new("/opt/plugins")).unwrap();
        assert_eq!(manifest.type_name, "rover::DriveController");
        assert_eq!(
            manifest.library,
            PathBuf::from("/opt/plugins/lib/librover_drive.so")
        );
        assert_eq!(manifest.symbol, "create_drive");
        assert_eq!(
            manifest.description.as_deref(),
            Some("Differential drive controller")
        );
    }

    #[test]
    fn parse_manifest_minimal_uses_default_symbol() {
        let toml = r#"
[plugin]
type = "arm"
library = "/usr/lib/libarm.so"
"#;
        let manifest = parse_native_manifest(toml, Path::new("/ignored")).unwrap();
        assert_eq!(manifest.library, PathBuf::from("/usr/lib/libarm.so"));
        assert_eq!(manifest.symbol, DEFAULT_ENTRY_SYMBOL);
        assert!(manifest.description.is_none());
    }

    #[test]
    fn parse_manifest_missing_type_fails() {
        let toml = r#"
[plugin]
library = "libx.so"
"#;
        assert!(parse_native_manifest(toml, Path::new(".")).is_err());
    }

    #[test]
    fn parse_manifest_empty_type_fails() {
        let toml = r#"
[plugin]
type = "  "
library = "libx.so"
"#;
        let err = parse_native_manifest(toml, Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn parse_manifest_unknown_field_fails() {
        let toml = r#"
[plugin]
type = "x"
library = "libx.so"
entry = "oops"
"#;
        assert!(parse_native_manifest(toml, Path::new(".")).is_err());
    }
}
