// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `simbridge plugins`: list what the driver can load.

use std::fmt::Write;

use simbridge_config::model::PluginsConfig;
use simbridge_plugin::{NativePluginManifest, NativeRegistry, search_catalog};

pub fn run_plugins(config: &PluginsConfig, query: &str) {
    let mut registry = NativeRegistry::new();
    for path in &config.native_paths {
        registry.add_search_path(path);
    }
    let manifests = registry.discover();
    print!("{}", format_listing(query, &manifests));
}

/// Built-in catalog rows followed by native manifests matching `query`.
pub fn format_listing(query: &str, manifests: &[NativePluginManifest]) -> String {
    let query_lower = query.to_lowercase();
    let mut out = String::new();

    let builtins = search_catalog(query);
    let _ = writeln!(out, "built-in ({}):", builtins.len());
    for entry in &builtins {
        let kind = if entry.variant.is_actuator() {
            "actuator"
        } else {
            "sensor"
        };
        let _ = writeln!(
            out,
            "  {:<16} {:<8} {}",
            entry.variant.to_string(),
            kind,
            entry.description
        );
    }

    let native: Vec<_> = manifests
        .iter()
        .filter(|m| {
            query.is_empty()
                || m.type_name.to_lowercase().contains(&query_lower)
                || m.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&query_lower))
        })
        .collect();
    let _ = writeln!(out, "native ({}):", native.len());
    for manifest in native {
        let _ = writeln!(
            out,
            "  {:<16} {}",
            manifest.type_name,
            manifest.library.display()
        );
    }

    out
}
