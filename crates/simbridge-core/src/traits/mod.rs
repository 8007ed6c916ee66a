// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits at the seams between the driver and its collaborators.
//!
//! - [`Plugin`]: what every built-in or dynamically loaded plugin implements
//! - [`SimulationEngine`]: the simulator as seen by the driver and plugins
//! - [`Messenger`]: the host messaging layer (topics and remote parameters)

pub mod engine;
pub mod messaging;
pub mod plugin;

pub use engine::{SharedEngine, SimulationEngine};
pub use messaging::{Messenger, REMOVE_URDF_ROBOT_TOPIC};
pub use plugin::Plugin;
