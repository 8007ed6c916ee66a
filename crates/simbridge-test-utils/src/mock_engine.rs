// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock simulation engine for deterministic testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use simbridge_core::{
    DeviceCategory, DeviceCommand, DeviceReading, DeviceTag, STEP_TERMINATED, SimbridgeError,
    SimulationEngine,
};

struct MockDevice {
    name: String,
    category: DeviceCategory,
    reading: Option<DeviceReading>,
    packets: VecDeque<Vec<u8>>,
    enabled: Option<(u32, bool)>,
    reads: usize,
    commands: Vec<DeviceCommand>,
}

/// An engine whose devices, readings and termination point are scripted.
///
/// Time advances by exactly the requested duration on every successful step.
pub struct MockEngine {
    basic_time_step: u32,
    devices: Vec<MockDevice>,
    time_ms: u64,
    step_calls: usize,
    terminate_after: Option<usize>,
    urdf: String,
}

impl MockEngine {
    /// Create an engine without devices.
    pub fn new(basic_time_step: u32) -> Self {
        Self {
            basic_time_step,
            devices: Vec::new(),
            time_ms: 0,
            step_calls: 0,
            terminate_after: None,
            urdf: "<robot name=\"mock\"/>".to_string(),
        }
    }

    /// Add a device. Tags are assigned in insertion order, starting at 1.
    pub fn with_device(mut self, name: &str, category: DeviceCategory) -> Self {
        self.devices.push(MockDevice {
            name: name.to_string(),
            category,
            reading: None,
            packets: VecDeque::new(),
            enabled: None,
            reads: 0,
            commands: Vec::new(),
        });
        self
    }

    /// Override the reading returned for a device.
    pub fn with_reading(mut self, name: &str, reading: DeviceReading) -> Self {
        if let Some(device) = self.devices.iter_mut().find(|d| d.name == name) {
            device.reading = Some(reading);
        }
        self
    }

    /// Report termination from the step call following `steps` successful steps.
    pub fn terminate_after(mut self, steps: usize) -> Self {
        self.terminate_after = Some(steps);
        self
    }

    pub fn with_urdf(mut self, urdf: &str) -> Self {
        self.urdf = urdf.to_string();
        self
    }

    /// Wrap the engine for sharing with a driver while keeping concrete access.
    pub fn into_shared(self) -> Arc<Mutex<MockEngine>> {
        Arc::new(Mutex::new(self))
    }

    /// Queue a packet on a receiver.
    pub fn queue_packet(&mut self, name: &str, packet: &[u8]) {
        if let Some(device) = self.devices.iter_mut().find(|d| d.name == name) {
            device.packets.push_back(packet.to_vec());
        }
    }

    /// Number of `step` calls received, including terminated ones.
    pub fn step_calls(&self) -> usize {
        self.step_calls
    }

    /// Sampling period and always-on flag of an enabled device.
    pub fn enabled(&self, name: &str) -> Option<(u32, bool)> {
        self.device(name).and_then(|d| d.enabled)
    }

    /// Number of reads of a device.
    pub fn reads(&self, name: &str) -> usize {
        self.device(name).map_or(0, |d| d.reads)
    }

    /// Commands written to a device, oldest first.
    pub fn commands(&self, name: &str) -> Vec<DeviceCommand> {
        self.device(name).map(|d| d.commands.clone()).unwrap_or_default()
    }

    fn device(&self, name: &str) -> Option<&MockDevice> {
        self.devices.iter().find(|d| d.name == name)
    }

    fn device_mut(&mut self, tag: DeviceTag) -> Result<&mut MockDevice, SimbridgeError> {
        (tag.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.devices.get_mut(i))
            .ok_or_else(|| SimbridgeError::Engine(format!("unknown device tag {}", tag.0)))
    }

    fn default_reading(category: DeviceCategory) -> Option<DeviceReading> {
        match category {
            DeviceCategory::Lidar => Some(DeviceReading::Ranges(vec![1.0; 4])),
            DeviceCategory::Camera => Some(DeviceReading::Image {
                width: 2,
                height: 2,
                data: vec![0; 16],
            }),
            DeviceCategory::RangeFinder => Some(DeviceReading::DepthImage {
                width: 2,
                height: 2,
                depths: vec![1.0; 4],
            }),
            DeviceCategory::Gps => Some(DeviceReading::Position {
                coordinates: [0.0; 3],
                speed: 0.0,
            }),
            DeviceCategory::DistanceSensor | DeviceCategory::LightSensor => {
                Some(DeviceReading::Scalar(0.0))
            }
            DeviceCategory::Compass => Some(DeviceReading::Vector3([1.0, 0.0, 0.0])),
            _ => None,
        }
    }
}

impl SimulationEngine for MockEngine {
    fn basic_time_step(&self) -> u32 {
        self.basic_time_step
    }

    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn device_by_index(&self, index: usize) -> Option<DeviceTag> {
        (index < self.devices.len()).then(|| DeviceTag(index as u32 + 1))
    }

    fn device_name(&self, device: DeviceTag) -> String {
        (device.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.devices.get(i))
            .map(|d| d.name.clone())
            .unwrap_or_default()
    }

    fn device_category(&self, device: DeviceTag) -> DeviceCategory {
        (device.0 as usize)
            .checked_sub(1)
            .and_then(|i| self.devices.get(i))
            .map_or(DeviceCategory::Unknown, |d| d.category)
    }

    fn step(&mut self, duration_ms: u32) -> i32 {
        self.step_calls += 1;
        if self
            .terminate_after
            .is_some_and(|limit| self.step_calls > limit)
        {
            return STEP_TERMINATED;
        }
        self.time_ms += u64::from(duration_ms);
        0
    }

    fn time(&self) -> f64 {
        self.time_ms as f64 / 1000.0
    }

    fn urdf(&self, _prefix: &str) -> String {
        self.urdf.clone()
    }

    fn enable(
        &mut self,
        device: DeviceTag,
        sampling_period_ms: u32,
        always_on: bool,
    ) -> Result<(), SimbridgeError> {
        self.device_mut(device)?.enabled = Some((sampling_period_ms, always_on));
        Ok(())
    }

    fn read(&mut self, device: DeviceTag) -> Result<DeviceReading, SimbridgeError> {
        let device = self.device_mut(device)?;
        if device.enabled.is_none() {
            return Err(SimbridgeError::Engine(format!(
                "device {} is not enabled",
                device.name
            )));
        }
        device.reads += 1;

        if device.category == DeviceCategory::Receiver {
            return Ok(DeviceReading::Packets(device.packets.drain(..).collect()));
        }
        device
            .reading
            .clone()
            .or_else(|| Self::default_reading(device.category))
            .ok_or_else(|| {
                SimbridgeError::Engine(format!("device {} cannot be read", device.name))
            })
    }

    fn write(&mut self, device: DeviceTag, command: DeviceCommand) -> Result<(), SimbridgeError> {
        self.device_mut(device)?.commands.push(command);
        Ok(())
    }
}
