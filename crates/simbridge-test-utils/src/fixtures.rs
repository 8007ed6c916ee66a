// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Robot descriptions and context helpers shared by tests.

use std::sync::{Arc, Mutex};

use simbridge_core::PluginContext;

use crate::mock_engine::MockEngine;
use crate::recording_messenger::RecordingMessenger;

/// Node name used by test contexts.
pub const TEST_NODE_NAME: &str = "rover_driver";

/// Build a plugin context over concrete test doubles.
pub fn plugin_context(
    engine: Arc<Mutex<MockEngine>>,
    messenger: Arc<RecordingMessenger>,
) -> PluginContext {
    PluginContext::new(TEST_NODE_NAME, engine, messenger)
}

/// A description disabling `camera` and renaming the lidar topic.
pub const ROVER_DESCRIPTION: &str = r#"<?xml version="1.0"?>
<robot name="rover">
  <webots>
    <device reference="lidar">
      <ros>
        <topicName>/rover/scan</topicName>
      </ros>
    </device>
    <device reference="camera">
      <ros>
        <enabled>false</enabled>
      </ros>
    </device>
  </webots>
</robot>
"#;

/// A description declaring plugins of the given types, in order.
pub fn description_with_plugins(types: &[&str]) -> String {
    let plugins: String = types
        .iter()
        .map(|t| format!("    <plugin type=\"{t}\"/>\n"))
        .collect();
    format!("<robot name=\"rover\">\n  <webots>\n{plugins}  </webots>\n</robot>\n")
}
