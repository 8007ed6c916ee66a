// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The plugin capability contract.

use crate::context::PluginContext;
use crate::error::SimbridgeError;
use crate::types::PropertyMap;

/// Contract shared by every plugin, whatever ecosystem it comes from.
///
/// `init` is called exactly once, before the first tick. `step` is called
/// once per tick, after the engine has advanced, in registry order.
/// Either may fail; failures are not isolated by the caller.
pub trait Plugin: Send {
    /// Bind the plugin to the driver context and its configuration.
    fn init(
        &mut self,
        context: &PluginContext,
        properties: &PropertyMap,
    ) -> Result<(), SimbridgeError>;

    /// Run one tick of plugin work.
    fn step(&mut self) -> Result<(), SimbridgeError>;
}

impl<P: Plugin + ?Sized> Plugin for Box<P> {
    fn init(
        &mut self,
        context: &PluginContext,
        properties: &PropertyMap,
    ) -> Result<(), SimbridgeError> {
        (**self).init(context, properties)
    }

    fn step(&mut self) -> Result<(), SimbridgeError> {
        (**self).step()
    }
}
