// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Headless engine with synthetic devices.
//!
//! Devices come from the `[engine]` configuration section. Sensors return
//! deterministic readings derived from the simulation time, actuators log
//! the commands they receive.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use simbridge_config::model::EngineConfig;
use simbridge_core::{
    DeviceCategory, DeviceCommand, DeviceReading, DeviceTag, STEP_TERMINATED, SimbridgeError,
    SimulationEngine,
};
use tracing::{debug, info, trace};

use crate::shutdown::ShutdownSignal;

const LIDAR_BEAMS: usize = 180;
const IMAGE_WIDTH: u32 = 64;
const IMAGE_HEIGHT: u32 = 48;

#[derive(Debug)]
struct VirtualDevice {
    name: String,
    category: DeviceCategory,
    sampling_period_ms: Option<u32>,
    packets: VecDeque<Vec<u8>>,
    led_value: i32,
}

/// A simulation engine without physics, for headless runs and demos.
#[derive(Debug)]
pub struct VirtualEngine {
    basic_time_step_ms: u32,
    max_steps: u64,
    steps: u64,
    time_ms: u64,
    devices: Vec<VirtualDevice>,
    stop_signal: Option<ShutdownSignal>,
}

impl VirtualEngine {
    /// Build an engine from configuration. `max_steps = 0` never terminates.
    pub fn from_config(config: &EngineConfig) -> Self {
        let devices = config
            .devices
            .iter()
            .map(|d| VirtualDevice {
                name: d.name.clone(),
                category: d.category,
                sampling_period_ms: None,
                packets: VecDeque::new(),
                led_value: 0,
            })
            .collect();
        Self {
            basic_time_step_ms: config.basic_time_step_ms,
            max_steps: config.max_steps,
            steps: 0,
            time_ms: 0,
            devices,
            stop_signal: None,
        }
    }

    /// Remove the robot once `signal` is requested.
    ///
    /// The step following the request reports termination, as a simulator
    /// does after the driver asked it to remove the robot.
    pub fn stop_on(mut self, signal: ShutdownSignal) -> Self {
        self.stop_signal = Some(signal);
        self
    }

    /// Queue a packet on the receiver called `name`.
    pub fn deliver_packet(&mut self, name: &str, packet: Vec<u8>) -> Result<(), SimbridgeError> {
        let device = self
            .devices
            .iter_mut()
            .find(|d| d.name == name && d.category == DeviceCategory::Receiver)
            .ok_or_else(|| SimbridgeError::Engine(format!("no receiver named `{name}`")))?;
        device.packets.push_back(packet);
        Ok(())
    }

    /// Last value written to the LED called `name`.
    pub fn led_value(&self, name: &str) -> Option<i32> {
        self.devices
            .iter()
            .find(|d| d.name == name && d.category == DeviceCategory::Led)
            .map(|d| d.led_value)
    }

    fn device(&self, tag: DeviceTag) -> Option<&VirtualDevice> {
        (tag.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.devices.get(i))
    }

    fn device_mut(&mut self, tag: DeviceTag) -> Result<&mut VirtualDevice, SimbridgeError> {
        (tag.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.devices.get_mut(i))
            .ok_or_else(|| SimbridgeError::Engine(format!("unknown device tag {}", tag.0)))
    }

    fn synthesize(category: DeviceCategory, seconds: f64) -> Option<DeviceReading> {
        let phase = (seconds * 0.5).sin();
        let reading = match category {
            DeviceCategory::Lidar => DeviceReading::Ranges(
                (0..LIDAR_BEAMS)
                    .map(|i| {
                        let angle = TAU * i as f64 / LIDAR_BEAMS as f64;
                        (2.0 + (angle + seconds).cos()) as f32
                    })
                    .collect(),
            ),
            DeviceCategory::Camera => {
                let shade = (128.0 + 127.0 * phase) as u8;
                let pixels = (IMAGE_WIDTH * IMAGE_HEIGHT) as usize;
                DeviceReading::Image {
                    width: IMAGE_WIDTH,
                    height: IMAGE_HEIGHT,
                    data: [shade, shade, shade, 255].repeat(pixels),
                }
            }
            DeviceCategory::RangeFinder => DeviceReading::DepthImage {
                width: IMAGE_WIDTH,
                height: IMAGE_HEIGHT,
                depths: vec![(3.0 + phase) as f32; (IMAGE_WIDTH * IMAGE_HEIGHT) as usize],
            },
            DeviceCategory::Gps => DeviceReading::Position {
                coordinates: [seconds * 0.1, 0.0, 0.0],
                speed: 0.1,
            },
            DeviceCategory::DistanceSensor => DeviceReading::Scalar(1.0 + 0.5 * phase),
            DeviceCategory::LightSensor => DeviceReading::Scalar(500.0 + 100.0 * phase),
            DeviceCategory::Compass => {
                DeviceReading::Vector3([seconds.cos(), 0.0, seconds.sin()])
            }
            _ => return None,
        };
        Some(reading)
    }
}

impl SimulationEngine for VirtualEngine {
    fn basic_time_step(&self) -> u32 {
        self.basic_time_step_ms
    }

    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn device_by_index(&self, index: usize) -> Option<DeviceTag> {
        (index < self.devices.len()).then(|| DeviceTag(index as u32 + 1))
    }

    fn device_name(&self, device: DeviceTag) -> String {
        self.device(device).map(|d| d.name.clone()).unwrap_or_default()
    }

    fn device_category(&self, device: DeviceTag) -> DeviceCategory {
        self.device(device)
            .map_or(DeviceCategory::Unknown, |d| d.category)
    }

    fn step(&mut self, duration_ms: u32) -> i32 {
        if self.max_steps > 0 && self.steps >= self.max_steps {
            return STEP_TERMINATED;
        }
        if self.stop_signal.as_ref().is_some_and(ShutdownSignal::is_requested) {
            info!(steps = self.steps, "robot removed from virtual world");
            return STEP_TERMINATED;
        }
        self.steps += 1;
        self.time_ms += u64::from(duration_ms);
        trace!(step = self.steps, time_ms = self.time_ms, "virtual engine step");
        0
    }

    fn time(&self) -> f64 {
        self.time_ms as f64 / 1000.0
    }

    fn urdf(&self, prefix: &str) -> String {
        let links: String = self
            .devices
            .iter()
            .map(|d| format!("  <link name=\"{prefix}{}\"/>\n", d.name.replace(' ', "_")))
            .collect();
        format!(
            "<?xml version=\"1.0\"?>\n<robot name=\"virtual\">\n  <link name=\"{prefix}base_link\"/>\n{links}</robot>\n"
        )
    }

    fn enable(
        &mut self,
        device: DeviceTag,
        sampling_period_ms: u32,
        always_on: bool,
    ) -> Result<(), SimbridgeError> {
        let device = self.device_mut(device)?;
        device.sampling_period_ms = Some(sampling_period_ms);
        debug!(device = %device.name, sampling_period_ms, always_on, "device enabled");
        Ok(())
    }

    fn read(&mut self, device: DeviceTag) -> Result<DeviceReading, SimbridgeError> {
        let seconds = self.time();
        let device = self.device_mut(device)?;
        if device.sampling_period_ms.is_none() {
            return Err(SimbridgeError::Engine(format!(
                "device {} is not enabled",
                device.name
            )));
        }
        if device.category == DeviceCategory::Receiver {
            return Ok(DeviceReading::Packets(device.packets.drain(..).collect()));
        }
        Self::synthesize(device.category, seconds)
            .ok_or_else(|| SimbridgeError::Engine(format!("device {} cannot be read", device.name)))
    }

    fn write(&mut self, device: DeviceTag, command: DeviceCommand) -> Result<(), SimbridgeError> {
        let device = self.device_mut(device)?;
        match (&command, device.category) {
            (DeviceCommand::Led(value), DeviceCategory::Led) => {
                device.led_value = *value;
                debug!(device = %device.name, value, "led set");
            }
            (DeviceCommand::Emit(payload), DeviceCategory::Emitter) => {
                debug!(device = %device.name, bytes = payload.len(), "packet emitted");
            }
            _ => {
                return Err(SimbridgeError::Engine(format!(
                    "device {} does not accept {command:?}",
                    device.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use simbridge_config::model::VirtualDeviceConfig;

    use super::*;

    fn config(max_steps: u64) -> EngineConfig {
        EngineConfig {
            basic_time_step_ms: 16,
            max_steps,
            devices: vec![
                VirtualDeviceConfig {
                    name: "front lidar".into(),
                    category: DeviceCategory::Lidar,
                },
                VirtualDeviceConfig {
                    name: "status".into(),
                    category: DeviceCategory::Led,
                },
                VirtualDeviceConfig {
                    name: "radio".into(),
                    category: DeviceCategory::Receiver,
                },
            ],
        }
    }

    #[test]
    fn terminates_after_max_steps() {
        let mut engine = VirtualEngine::from_config(&config(2));
        assert_eq!(engine.step(16), 0);
        assert_eq!(engine.step(16), 0);
        assert_eq!(engine.step(16), STEP_TERMINATED);
        assert!((engine.time() - 0.032).abs() < 1e-9);
    }

    #[test]
    fn zero_max_steps_runs_forever() {
        let mut engine = VirtualEngine::from_config(&config(0));
        for _ in 0..1000 {
            assert_eq!(engine.step(16), 0);
        }
    }

    #[test]
    fn stop_signal_terminates_the_next_step() {
        let signal = ShutdownSignal::manual();
        let mut engine = VirtualEngine::from_config(&config(0)).stop_on(signal.clone());
        assert_eq!(engine.step(16), 0);
        signal.request();
        assert_eq!(engine.step(16), STEP_TERMINATED);
        assert_eq!(engine.step(16), STEP_TERMINATED);
    }

    #[test]
    fn devices_follow_configuration_order() {
        let engine = VirtualEngine::from_config(&config(0));
        assert_eq!(engine.device_count(), 3);
        let tag = engine.device_by_index(0).unwrap();
        assert_eq!(engine.device_name(tag), "front lidar");
        assert_eq!(engine.device_category(tag), DeviceCategory::Lidar);
        assert!(engine.device_by_index(3).is_none());
    }

    #[test]
    fn read_requires_enable() {
        let mut engine = VirtualEngine::from_config(&config(0));
        let lidar = engine.device_by_index(0).unwrap();
        assert!(engine.read(lidar).is_err());
        engine.enable(lidar, 16, false).unwrap();
        match engine.read(lidar).unwrap() {
            DeviceReading::Ranges(ranges) => assert_eq!(ranges.len(), LIDAR_BEAMS),
            other => panic!("unexpected reading {other:?}"),
        }
    }

    #[test]
    fn receiver_drains_delivered_packets() {
        let mut engine = VirtualEngine::from_config(&config(0));
        let radio = engine.device_by_index(2).unwrap();
        engine.enable(radio, 16, false).unwrap();
        engine.deliver_packet("radio", b"ping".to_vec()).unwrap();
        assert_eq!(
            engine.read(radio).unwrap(),
            DeviceReading::Packets(vec![b"ping".to_vec()])
        );
        assert_eq!(engine.read(radio).unwrap(), DeviceReading::Packets(vec![]));
        assert!(engine.deliver_packet("status", b"x".to_vec()).is_err());
    }

    #[test]
    fn led_accepts_only_led_commands() {
        let mut engine = VirtualEngine::from_config(&config(0));
        let led = engine.device_by_index(1).unwrap();
        engine.write(led, DeviceCommand::Led(3)).unwrap();
        assert_eq!(engine.led_value("status"), Some(3));
        assert!(engine.write(led, DeviceCommand::Emit(vec![1])).is_err());
    }

    #[test]
    fn urdf_lists_devices_with_prefix() {
        let engine = VirtualEngine::from_config(&config(0));
        let urdf = engine.urdf("rover/");
        assert!(urdf.contains("<link name=\"rover/base_link\"/>"));
        assert!(urdf.contains("<link name=\"rover/front_lidar\"/>"));
    }
}
