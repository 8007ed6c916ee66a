// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulation engine boundary.

use std::sync::{Arc, Mutex};

use crate::error::SimbridgeError;
use crate::types::{DeviceCategory, DeviceCommand, DeviceReading, DeviceTag};

/// The simulator as seen by the driver.
///
/// Device enumeration is stable for the lifetime of the process.
pub trait SimulationEngine: Send {
    /// Basic time step of the world, in milliseconds.
    fn basic_time_step(&self) -> u32;

    /// Number of devices on the controlled robot.
    fn device_count(&self) -> usize;

    /// Device handle at `index`, in engine enumeration order.
    fn device_by_index(&self, index: usize) -> Option<DeviceTag>;

    /// Name of a device.
    fn device_name(&self, device: DeviceTag) -> String;

    /// Category of a device.
    fn device_category(&self, device: DeviceTag) -> DeviceCategory;

    /// Advance the simulation by `duration_ms`, blocking until done.
    ///
    /// Returns [`STEP_TERMINATED`](crate::types::STEP_TERMINATED) once the
    /// simulation has ended.
    fn step(&mut self, duration_ms: u32) -> i32;

    /// Current simulation time in seconds.
    fn time(&self) -> f64;

    /// Export the robot model as a URDF document, prefixing link names.
    fn urdf(&self, prefix: &str) -> String;

    /// Start sampling a sensor every `sampling_period_ms`.
    fn enable(
        &mut self,
        device: DeviceTag,
        sampling_period_ms: u32,
        always_on: bool,
    ) -> Result<(), SimbridgeError>;

    /// Read the latest sample of a sensor. Receivers drain their queue.
    fn read(&mut self, device: DeviceTag) -> Result<DeviceReading, SimbridgeError>;

    /// Apply a command to an actuator.
    fn write(&mut self, device: DeviceTag, command: DeviceCommand) -> Result<(), SimbridgeError>;
}

/// Engine handle shared by the step coordinator and the plugins.
///
/// Only ever locked for the duration of a single call.
pub type SharedEngine = Arc<Mutex<dyn SimulationEngine>>;
