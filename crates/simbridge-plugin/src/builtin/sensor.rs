// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sampled sensor plugins.

use simbridge_core::{
    DeviceReading, DeviceTag, Message, Plugin, PluginContext, PropertyMap, SimbridgeError,
};
use tracing::{debug, info};

use super::{TOPIC_NAME_PROPERTY, bind_device, default_topic_name, fixed_name, required_name};
use crate::catalog::BuiltinVariant;

/// Publishing behavior of a sensor, read from its device properties.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSettings {
    /// Engine device name.
    pub name: String,
    /// Topic the samples are published on.
    pub topic_name: String,
    /// Frame id stamped on every sample.
    pub frame_name: String,
    /// Minimum time between two publishes, in milliseconds. Zero publishes every tick.
    pub publish_period_ms: u32,
    /// Forwarded to the engine when the device is enabled.
    pub always_on: bool,
}

impl SensorSettings {
    pub const UPDATE_RATE_PROPERTY: &'static str = "updateRate";
    pub const FRAME_NAME_PROPERTY: &'static str = "frameName";
    pub const ALWAYS_ON_PROPERTY: &'static str = "alwaysOn";

    /// Read settings from the resolved device properties.
    pub fn from_properties(plugin: &str, properties: &PropertyMap) -> Result<Self, SimbridgeError> {
        let name = required_name(plugin, properties)?;

        let topic_name = properties
            .get(TOPIC_NAME_PROPERTY)
            .map(str::to_string)
            .unwrap_or_else(|| default_topic_name(&name));
        let frame_name = properties
            .get(Self::FRAME_NAME_PROPERTY)
            .map(str::to_string)
            .unwrap_or_else(|| fixed_name(&name));

        let update_rate: f64 = properties.parse_or(plugin, Self::UPDATE_RATE_PROPERTY, 0.0)?;
        if !update_rate.is_finite() || update_rate < 0.0 {
            return Err(SimbridgeError::InvalidProperty {
                plugin: plugin.to_string(),
                key: Self::UPDATE_RATE_PROPERTY.to_string(),
                value: update_rate.to_string(),
                expected: "a non-negative rate in Hz".to_string(),
            });
        }
        let publish_period_ms = if update_rate > 0.0 {
            (1000.0 / update_rate).round() as u32
        } else {
            0
        };

        let always_on = properties.bool_or(plugin, Self::ALWAYS_ON_PROPERTY, false)?;

        Ok(Self {
            name,
            topic_name,
            frame_name,
            publish_period_ms,
            always_on,
        })
    }

    /// Device sampling period: the publish period rounded up to a whole
    /// number of basic steps, never less than one step.
    ///
    /// Periods too long for a `u32` clamp to the largest whole multiple of
    /// the step.
    pub fn sampling_period_ms(&self, basic_time_step_ms: u32) -> u32 {
        let step = basic_time_step_ms.max(1);
        self.publish_period_ms
            .div_ceil(step)
            .max(1)
            .checked_mul(step)
            .unwrap_or(u32::MAX / step * step)
    }
}

struct BoundSensor {
    context: PluginContext,
    device: DeviceTag,
    settings: SensorSettings,
    last_publish_ms: Option<i64>,
}

impl BoundSensor {
    fn is_due(&self, now_ms: i64) -> bool {
        match self.last_publish_ms {
            None => true,
            Some(last) => now_ms - last >= i64::from(self.settings.publish_period_ms),
        }
    }
}

/// Publishes the readings of one sensor device.
pub struct SensorPlugin {
    variant: BuiltinVariant,
    bound: Option<BoundSensor>,
}

impl SensorPlugin {
    pub fn new(variant: BuiltinVariant) -> Self {
        Self {
            variant,
            bound: None,
        }
    }

    /// Settings in effect, once initialized.
    pub fn settings(&self) -> Option<&SensorSettings> {
        self.bound.as_ref().map(|b| &b.settings)
    }
}

impl Plugin for SensorPlugin {
    fn init(
        &mut self,
        context: &PluginContext,
        properties: &PropertyMap,
    ) -> Result<(), SimbridgeError> {
        let label = self.variant.to_string();
        let settings = SensorSettings::from_properties(&label, properties)?;
        let device = bind_device(&label, context, &settings.name)?;

        let sampling_period = context.with_engine(|engine| {
            let period = settings.sampling_period_ms(engine.basic_time_step());
            engine
                .enable(device, period, settings.always_on)
                .map(|()| period)
        })??;

        info!(
            variant = %self.variant,
            device = %settings.name,
            topic = %settings.topic_name,
            sampling_period_ms = sampling_period,
            "sensor enabled"
        );

        self.bound = Some(BoundSensor {
            context: context.clone(),
            device,
            settings,
            last_publish_ms: None,
        });
        Ok(())
    }

    fn step(&mut self) -> Result<(), SimbridgeError> {
        let variant = self.variant;
        let Some(bound) = self.bound.as_mut() else {
            return Err(SimbridgeError::plugin(variant.to_string(), "stepped before init"));
        };

        let now = bound.context.with_engine(|engine| engine.time())?;
        let now_ms = (now * 1000.0).round() as i64;
        if !bound.is_due(now_ms) {
            return Ok(());
        }
        bound.last_publish_ms = Some(now_ms);

        let device = bound.device;
        let reading = bound.context.with_engine(|engine| engine.read(device))??;
        let topic = &bound.settings.topic_name;

        match reading {
            DeviceReading::Packets(packets) if variant == BuiltinVariant::Receiver => {
                debug!(device = %bound.settings.name, count = packets.len(), "forwarding packets");
                for packet in packets {
                    let text = String::from_utf8_lossy(&packet).into_owned();
                    bound.context.publish(topic, Message::Text(text))?;
                }
            }
            reading => {
                bound.context.publish(
                    topic,
                    Message::Sample {
                        frame_id: bound.settings.frame_name.clone(),
                        stamp: now,
                        reading,
                    },
                )?;
            }
        }
        Ok(())
    }
}
