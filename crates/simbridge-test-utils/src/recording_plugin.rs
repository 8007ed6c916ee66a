// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin that logs its lifecycle calls.

use std::sync::{Arc, Mutex, PoisonError};

use simbridge_core::{Plugin, PluginContext, PropertyMap, SimbridgeError};

/// Appends `"<label>:init"` and `"<label>:step"` to a shared log.
///
/// Several plugins sharing one log record their interleaving.
pub struct RecordingPlugin {
    label: String,
    log: Arc<Mutex<Vec<String>>>,
    properties: Arc<Mutex<Option<PropertyMap>>>,
    fail_init: bool,
    fail_step_at: Option<usize>,
    steps: usize,
}

impl RecordingPlugin {
    /// Create a plugin with its own log.
    pub fn new(label: &str) -> Self {
        Self::with_log(label, Arc::new(Mutex::new(Vec::new())))
    }

    /// Create a plugin appending to `log`.
    pub fn with_log(label: &str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            label: label.to_string(),
            log,
            properties: Arc::new(Mutex::new(None)),
            fail_init: false,
            fail_step_at: None,
            steps: 0,
        }
    }

    /// Make `init` fail.
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Make the `n`th call to `step` fail (1-based).
    pub fn failing_step_at(mut self, n: usize) -> Self {
        self.fail_step_at = Some(n);
        self
    }

    /// Handle to the properties received on `init`.
    pub fn properties(&self) -> Arc<Mutex<Option<PropertyMap>>> {
        self.properties.clone()
    }

    fn record(&self, event: &str) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{}:{event}", self.label));
    }
}

impl Plugin for RecordingPlugin {
    fn init(
        &mut self,
        _context: &PluginContext,
        properties: &PropertyMap,
    ) -> Result<(), SimbridgeError> {
        self.record("init");
        *self
            .properties
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(properties.clone());
        if self.fail_init {
            return Err(SimbridgeError::plugin(&self.label, "init failed"));
        }
        Ok(())
    }

    fn step(&mut self) -> Result<(), SimbridgeError> {
        self.steps += 1;
        self.record("step");
        if self.fail_step_at == Some(self.steps) {
            return Err(SimbridgeError::plugin(
                &self.label,
                format!("step {} failed", self.steps),
            ));
        }
        Ok(())
    }
}
