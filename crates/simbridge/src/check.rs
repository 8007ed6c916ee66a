// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `simbridge check`: show what a robot description configures.

use std::fmt::Write;
use std::path::Path;

use simbridge_core::{PropertyMap, SimbridgeError};
use simbridge_description::{ConfigDocument, DeviceConfigResolver};

pub fn run_check(path: &Path) -> Result<(), SimbridgeError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        SimbridgeError::Config(format!("cannot read '{}': {e}", path.display()))
    })?;
    print!("{}", describe(&text)?);
    Ok(())
}

/// Human-readable report of the device overrides and plugin declarations.
pub fn describe(text: &str) -> Result<String, SimbridgeError> {
    let document = ConfigDocument::from_description(text)?;
    let resolver = DeviceConfigResolver::new(&document);
    let declarations = resolver.plugin_declarations()?;
    let devices = resolver.configured_devices();

    let mut out = String::new();
    if document.is_empty() {
        out.push_str("empty robot description, every device uses defaults\n");
        return Ok(out);
    }

    let _ = writeln!(out, "devices ({}):", devices.len());
    for name in devices {
        let properties = resolver.resolve_device_properties(name);
        let state = if properties.is_disabled() {
            "disabled"
        } else {
            "enabled"
        };
        let _ = writeln!(out, "  {name} [{state}]");
        write_properties(&mut out, &properties, &[PropertyMap::ENABLED]);
    }

    let _ = writeln!(out, "plugins ({}):", declarations.len());
    for declaration in &declarations {
        let _ = writeln!(
            out,
            "  {} (line {})",
            declaration.type_name, declaration.line
        );
        write_properties(&mut out, &declaration.properties, &[]);
    }

    Ok(out)
}

fn write_properties(out: &mut String, properties: &PropertyMap, skip: &[&str]) {
    let mut entries: Vec<_> = properties
        .iter()
        .filter(|(key, _)| !skip.contains(key))
        .collect();
    entries.sort();
    for (key, value) in entries {
        let _ = writeln!(out, "    {key} = {value:?}");
    }
}
