// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered store of live plugins.
//!
//! Plugins are appended only after a successful `init` and stepped in
//! insertion order for the rest of the process lifetime.

use simbridge_core::{Plugin, PluginContext, PropertyMap, SimbridgeError};
use tracing::{debug, info};

use crate::catalog::BuiltinVariant;
use crate::loader::Ecosystem;

/// Where a registered plugin came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginOrigin {
    /// A built-in plugin bound to a discovered device.
    Builtin {
        /// Engine name of the device.
        device: String,
        /// Catalog variant driving it.
        variant: BuiltinVariant,
    },
    /// A plugin declared in the robot description.
    Declared {
        /// The declared `type`.
        type_name: String,
        /// Where the loader found it.
        ecosystem: Ecosystem,
    },
}

impl std::fmt::Display for PluginOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginOrigin::Builtin { device, variant } => write!(f, "{variant} ({device})"),
            PluginOrigin::Declared {
                type_name,
                ecosystem,
            } => write!(f, "{type_name} ({ecosystem})"),
        }
    }
}

/// A live plugin and its origin.
pub struct PluginEntry {
    /// How the plugin was created.
    pub origin: PluginOrigin,
    plugin: Box<dyn Plugin>,
}

impl std::fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginEntry")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Lifecycle manager for every plugin of the driver.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    entries: Vec<PluginEntry>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize `plugin` and append it.
    ///
    /// A plugin whose `init` fails is dropped and the error returned.
    pub fn initialize(
        &mut self,
        origin: PluginOrigin,
        mut plugin: Box<dyn Plugin>,
        context: &PluginContext,
        properties: &PropertyMap,
    ) -> Result<(), SimbridgeError> {
        plugin.init(context, properties)?;
        info!(plugin = %origin, position = self.entries.len(), "plugin initialized");
        self.entries.push(PluginEntry { origin, plugin });
        Ok(())
    }

    /// Step every plugin once, in registration order.
    ///
    /// Stops at the first failure.
    pub fn step_all(&mut self) -> Result<(), SimbridgeError> {
        for entry in &mut self.entries {
            entry.plugin.step().inspect_err(|e| {
                debug!(plugin = %entry.origin, error = %e, "plugin step failed");
            })?;
        }
        Ok(())
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered plugin origins, in step order.
    pub fn origins(&self) -> impl Iterator<Item = &PluginOrigin> {
        self.entries.iter().map(|e| &e.origin)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use simbridge_test_utils::{MockEngine, RecordingMessenger, RecordingPlugin, plugin_context};

    use super::*;

    fn context() -> PluginContext {
        let engine = Arc::new(Mutex::new(MockEngine::new(32)));
        plugin_context(engine, Arc::new(RecordingMessenger::new()))
    }

    fn declared(name: &str) -> PluginOrigin {
        PluginOrigin::Declared {
            type_name: name.to_string(),
            ecosystem: Ecosystem::Native,
        }
    }

    #[test]
    fn plugins_step_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let ctx = context();
        let mut registry = PluginRegistry::new();
        for name in ["a", "b", "c"] {
            registry
                .initialize(
                    declared(name),
                    Box::new(RecordingPlugin::with_log(name, log.clone())),
                    &ctx,
                    &PropertyMap::new(),
                )
                .unwrap();
        }

        registry.step_all().unwrap();
        registry.step_all().unwrap();

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                "a:init", "b:init", "c:init", "a:step", "b:step", "c:step", "a:step", "b:step",
                "c:step"
            ]
        );
    }

    #[test]
    fn failed_init_is_not_registered() {
        let mut registry = PluginRegistry::new();
        let err = registry
            .initialize(
                declared("bad"),
                Box::new(RecordingPlugin::new("bad").failing_init()),
                &context(),
                &PropertyMap::new(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("bad"));
        assert!(registry.is_empty());
    }

    #[test]
    fn step_failure_stops_the_pass() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let ctx = context();
        let mut registry = PluginRegistry::new();
        registry
            .initialize(
                declared("a"),
                Box::new(RecordingPlugin::with_log("a", log.clone()).failing_step_at(1)),
                &ctx,
                &PropertyMap::new(),
            )
            .unwrap();
        registry
            .initialize(
                declared("b"),
                Box::new(RecordingPlugin::with_log("b", log.clone())),
                &ctx,
                &PropertyMap::new(),
            )
            .unwrap();

        assert!(registry.step_all().is_err());
        assert!(!log.lock().unwrap().contains(&"b:step".to_string()));
    }

    #[test]
    fn origin_display_names_the_source() {
        let builtin = PluginOrigin::Builtin {
            device: "front lidar".into(),
            variant: BuiltinVariant::Lidar,
        };
        assert_eq!(builtin.to_string(), "Lidar (front lidar)");
        assert_eq!(declared("rover::Drive").to_string(), "rover::Drive (native)");
    }
}
