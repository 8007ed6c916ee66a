// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Driver node for the simbridge device bridge.
//!
//! [`DriverNode::init`] binds a plugin to every enabled engine device,
//! loads the plugins declared in the robot description, and hands them to
//! a [`StepCoordinator`] that advances the simulation one tick at a time.
//! [`VirtualEngine`] and [`LocalMessenger`] let the driver run without a
//! simulator or a messaging middleware.

pub mod coordinator;
pub mod messenger;
pub mod node;
pub mod shutdown;
pub mod virtual_engine;

pub use coordinator::{CoordinatorState, StepCoordinator};
pub use messenger::LocalMessenger;
pub use node::{DriverNode, DriverOptions, plugin_loader};
pub use shutdown::{ShutdownSignal, install_signal_handler};
pub use virtual_engine::VirtualEngine;
