// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-tier plugin loading: native first, then interpreted.

use simbridge_core::{Plugin, PluginContext, PropertyMap, SimbridgeError};
use tracing::debug;

use crate::native::{NativeLookup, NativeRegistry};
use crate::wasm::WasmPluginFactory;

/// A source of natively compiled plugins.
pub trait NativeSource {
    /// Construct `type_name`.
    ///
    /// `Ok(NotFound)` lets the caller try another ecosystem; `Err` is final.
    fn create(&self, type_name: &str) -> Result<NativeLookup, SimbridgeError>;
}

/// A source of interpreted plugins.
pub trait InterpretedSource {
    /// Construct `type_name`, or `None` if this source cannot produce it.
    fn create_from_type(&self, type_name: &str) -> Option<Box<dyn Plugin>>;
}

impl NativeSource for NativeRegistry {
    fn create(&self, type_name: &str) -> Result<NativeLookup, SimbridgeError> {
        NativeRegistry::create(self, type_name)
    }
}

impl InterpretedSource for WasmPluginFactory {
    fn create_from_type(&self, type_name: &str) -> Option<Box<dyn Plugin>> {
        WasmPluginFactory::create_from_type(self, type_name).map(|p| Box::new(p) as Box<dyn Plugin>)
    }
}

/// Ecosystem a plugin was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Ecosystem {
    /// Shared library or statically registered factory.
    Native,
    /// WebAssembly module.
    Interpreted,
}

/// A plugin together with the ecosystem that produced it.
pub enum LoadedPlugin {
    /// Built by the native registry.
    Native(Box<dyn Plugin>),
    /// Built by the interpreted (WASM) factory.
    Interpreted(Box<dyn Plugin>),
}

impl LoadedPlugin {
    /// Which ecosystem produced the plugin.
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            Self::Native(_) => Ecosystem::Native,
            Self::Interpreted(_) => Ecosystem::Interpreted,
        }
    }

    /// Drop the ecosystem tag and keep the plugin.
    pub fn into_inner(self) -> Box<dyn Plugin> {
        match self {
            Self::Native(p) | Self::Interpreted(p) => p,
        }
    }
}

impl std::fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LoadedPlugin({})", self.ecosystem())
    }
}

impl Plugin for LoadedPlugin {
    fn init(
        &mut self,
        context: &PluginContext,
        properties: &PropertyMap,
    ) -> Result<(), SimbridgeError> {
        match self {
            Self::Native(p) | Self::Interpreted(p) => p.init(context, properties),
        }
    }

    fn step(&mut self) -> Result<(), SimbridgeError> {
        match self {
            Self::Native(p) | Self::Interpreted(p) => p.step(),
        }
    }
}

/// Resolve a plugin type name to a live instance.
///
/// The native source is consulted exactly once. The interpreted source is
/// consulted at most once, and only when the native source does not know
/// the type.
pub fn load_plugin(
    native: &dyn NativeSource,
    interpreted: &dyn InterpretedSource,
    type_name: &str,
) -> Result<LoadedPlugin, SimbridgeError> {
    match native.create(type_name)? {
        NativeLookup::Created(plugin) => Ok(LoadedPlugin::Native(plugin)),
        NativeLookup::NotFound { reason } => {
            debug!(plugin = type_name, %reason, "no native plugin, trying interpreted");
            interpreted
                .create_from_type(type_name)
                .map(LoadedPlugin::Interpreted)
                .ok_or_else(|| SimbridgeError::PluginNotFound {
                    type_name: type_name.to_string(),
                })
        }
    }
}

/// Owns both plugin sources for the lifetime of the driver.
pub struct PluginLoader {
    native: Box<dyn NativeSource>,
    interpreted: Box<dyn InterpretedSource>,
}

impl PluginLoader {
    pub fn new(
        native: impl NativeSource + 'static,
        interpreted: impl InterpretedSource + 'static,
    ) -> Self {
        Self {
            native: Box::new(native),
            interpreted: Box::new(interpreted),
        }
    }

    /// Load `type_name`, native first. See [`load_plugin`].
    pub fn load(&self, type_name: &str) -> Result<LoadedPlugin, SimbridgeError> {
        load_plugin(self.native.as_ref(), self.interpreted.as_ref(), type_name)
    }
}
