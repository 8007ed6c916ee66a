// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the simbridge device bridge.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the workspace. Every plugin, whether built in,
//! loaded from a shared library or from a WebAssembly module, implements
//! [`Plugin`] and receives a [`PluginContext`] on initialization.

pub mod context;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use context::PluginContext;
pub use error::SimbridgeError;
pub use traits::{Messenger, Plugin, REMOVE_URDF_ROBOT_TOPIC, SharedEngine, SimulationEngine};
pub use types::{
    DeviceCategory, DeviceCommand, DeviceDescriptor, DeviceReading, DeviceTag, Message,
    PropertyMap, STEP_TERMINATED,
};
