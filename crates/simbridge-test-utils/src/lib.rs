// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for simbridge integration tests.
//!
//! Provides a scriptable engine, a recording messenger and plugins for fast,
//! deterministic tests without a running simulator.
//!
//! # Components
//!
//! - [`MockEngine`] - In-memory engine with configurable devices and termination
//! - [`RecordingMessenger`] - Messenger capturing publishes and remote calls
//! - [`RecordingPlugin`] - Plugin logging its lifecycle calls
//! - [`fixtures`] - Robot descriptions and context helpers

pub mod fixtures;
pub mod mock_engine;
pub mod recording_messenger;
pub mod recording_plugin;

pub use fixtures::plugin_context;
pub use mock_engine::MockEngine;
pub use recording_messenger::{RecordingMessenger, RemoteParameter};
pub use recording_plugin::RecordingPlugin;
