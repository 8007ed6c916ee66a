// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-driven actuator plugins.

use simbridge_core::{
    DeviceCommand, DeviceTag, Message, Plugin, PluginContext, PropertyMap, SimbridgeError,
};
use tracing::{info, warn};

use super::{TOPIC_NAME_PROPERTY, bind_device, default_topic_name, required_name};

struct ActuatorBinding {
    context: PluginContext,
    device: DeviceTag,
    name: String,
    topic_name: String,
}

impl ActuatorBinding {
    fn bind(
        label: &str,
        context: &PluginContext,
        properties: &PropertyMap,
    ) -> Result<Self, SimbridgeError> {
        let name = required_name(label, properties)?;
        let topic_name = properties
            .get(TOPIC_NAME_PROPERTY)
            .map(str::to_string)
            .unwrap_or_else(|| default_topic_name(&name));
        let device = bind_device(label, context, &name)?;
        info!(plugin = label, device = %name, topic = %topic_name, "listening for commands");
        Ok(Self {
            context: context.clone(),
            device,
            name,
            topic_name,
        })
    }

    fn take_commands(&self) -> Vec<Message> {
        self.context.messenger().take_commands(&self.topic_name)
    }

    fn write(&self, command: DeviceCommand) -> Result<(), SimbridgeError> {
        let device = self.device;
        self.context
            .with_engine(|engine| engine.write(device, command))?
    }
}

fn unbound(label: &str) -> SimbridgeError {
    SimbridgeError::plugin(label, "stepped before init")
}

/// Sets an LED from integer commands. Only the latest command of a tick is applied.
#[derive(Default)]
pub struct LedPlugin {
    binding: Option<ActuatorBinding>,
}

impl LedPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for LedPlugin {
    fn init(
        &mut self,
        context: &PluginContext,
        properties: &PropertyMap,
    ) -> Result<(), SimbridgeError> {
        self.binding = Some(ActuatorBinding::bind("Led", context, properties)?);
        Ok(())
    }

    fn step(&mut self) -> Result<(), SimbridgeError> {
        let binding = self.binding.as_ref().ok_or_else(|| unbound("Led"))?;

        let mut latest = None;
        for command in binding.take_commands() {
            match command {
                Message::Int(value) => latest = Some(value),
                other => warn!(device = %binding.name, ?other, "ignoring non-integer LED command"),
            }
        }

        match latest {
            Some(value) => binding.write(DeviceCommand::Led(value)),
            None => Ok(()),
        }
    }
}

/// Sends every text command it receives through an emitter, in arrival order.
#[derive(Default)]
pub struct EmitterPlugin {
    binding: Option<ActuatorBinding>,
}

impl EmitterPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for EmitterPlugin {
    fn init(
        &mut self,
        context: &PluginContext,
        properties: &PropertyMap,
    ) -> Result<(), SimbridgeError> {
        self.binding = Some(ActuatorBinding::bind("Emitter", context, properties)?);
        Ok(())
    }

    fn step(&mut self) -> Result<(), SimbridgeError> {
        let binding = self.binding.as_ref().ok_or_else(|| unbound("Emitter"))?;

        for command in binding.take_commands() {
            match command {
                Message::Text(text) => binding.write(DeviceCommand::Emit(text.into_bytes()))?,
                other => warn!(device = %binding.name, ?other, "ignoring non-text emitter command"),
            }
        }
        Ok(())
    }
}
