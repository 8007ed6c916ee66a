// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The owning context handed to every plugin on `init`.

use std::sync::Arc;

use crate::error::SimbridgeError;
use crate::traits::{Messenger, SharedEngine, SimulationEngine};
use crate::types::Message;

/// Handles a plugin may keep for the rest of the process lifetime.
///
/// Cloning is cheap: the engine and messenger are shared.
#[derive(Clone)]
pub struct PluginContext {
    node_name: Arc<str>,
    engine: SharedEngine,
    messenger: Arc<dyn Messenger>,
}

impl PluginContext {
    /// Create a context for the driver node `node_name`.
    pub fn new(
        node_name: impl Into<Arc<str>>,
        engine: SharedEngine,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            node_name: node_name.into(),
            engine,
            messenger,
        }
    }

    /// Logical name of the driver node.
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// The shared engine handle.
    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    /// The messaging collaborator.
    pub fn messenger(&self) -> &Arc<dyn Messenger> {
        &self.messenger
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with_engine<R>(
        &self,
        f: impl FnOnce(&mut dyn SimulationEngine) -> R,
    ) -> Result<R, SimbridgeError> {
        let mut engine = self
            .engine
            .lock()
            .map_err(|_| SimbridgeError::Engine("engine lock poisoned".to_string()))?;
        Ok(f(&mut *engine))
    }

    /// Publish a message on `topic`.
    pub fn publish(&self, topic: &str, message: Message) -> Result<(), SimbridgeError> {
        self.messenger.publish(topic, message)
    }
}

impl std::fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContext")
            .field("node_name", &self.node_name)
            .finish_non_exhaustive()
    }
}
