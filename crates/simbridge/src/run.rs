// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `simbridge run`: the driver on the virtual engine.

use std::sync::{Arc, Mutex};

use simbridge_config::SimbridgeConfig;
use simbridge_core::{PluginContext, SimbridgeError};
use simbridge_description::ConfigDocument;
use simbridge_driver::{
    DriverNode, DriverOptions, LocalMessenger, VirtualEngine, install_signal_handler,
    plugin_loader,
};
use tracing::info;

/// Initialize the tracing subscriber. `RUST_LOG` overrides `log_level`.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("simbridge={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

/// Run the driver until the engine terminates or Ctrl+C removes the robot.
pub fn run_driver(config: &SimbridgeConfig) -> Result<(), SimbridgeError> {
    let shutdown = install_signal_handler()?;

    let description = config.driver.load_robot_description()?;
    let document = ConfigDocument::from_description(&description)?;

    let engine = Arc::new(Mutex::new(
        VirtualEngine::from_config(&config.engine).stop_on(shutdown.clone()),
    ));
    let messenger = Arc::new(LocalMessenger::new());
    let context = PluginContext::new(config.driver.name.as_str(), engine, messenger.clone());

    let loader = plugin_loader(&config.plugins)?;
    let mut node = DriverNode::init(
        context,
        &document,
        &loader,
        shutdown,
        DriverOptions {
            set_robot_state_publisher: config.driver.set_robot_state_publisher,
        },
    )?;

    info!(
        node = %config.driver.name,
        plugins = node.registry().len(),
        time_step_ms = node.coordinator().time_step_ms(),
        "driver running, press Ctrl+C to stop"
    );
    let ticks = node.run()?;

    for (topic, count) in messenger.summary() {
        info!(topic = %topic, messages = count, "topic summary");
    }
    info!(ticks, "driver stopped");
    Ok(())
}
