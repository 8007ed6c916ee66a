// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-tick driving of the engine and the plugin registry.

use simbridge_core::{
    Message, PluginContext, REMOVE_URDF_ROBOT_TOPIC, STEP_TERMINATED, SimbridgeError,
};
use simbridge_plugin::PluginRegistry;
use strum::Display;
use tracing::{debug, info, warn};

use crate::shutdown::ShutdownSignal;

/// Observable phase of a [`StepCoordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CoordinatorState {
    /// Stepping normally.
    Running,
    /// The removal notification went out; stepping continues until the
    /// engine stops.
    ShuttingDown,
    /// The engine reported termination. No further steps happen.
    Terminated,
}

/// Advances the engine one basic time step per tick and steps every plugin.
#[derive(Debug)]
pub struct StepCoordinator {
    context: PluginContext,
    registry: PluginRegistry,
    shutdown: ShutdownSignal,
    time_step_ms: u32,
    notification_sent: bool,
    terminated: bool,
}

impl StepCoordinator {
    /// Create a coordinator stepping `registry` at the engine's basic time step.
    pub fn new(
        context: PluginContext,
        registry: PluginRegistry,
        shutdown: ShutdownSignal,
    ) -> Result<Self, SimbridgeError> {
        let time_step_ms = context.with_engine(|engine| engine.basic_time_step())?;
        Ok(Self {
            context,
            registry,
            shutdown,
            time_step_ms,
            notification_sent: false,
            terminated: false,
        })
    }

    /// Run one tick and return the engine step result.
    ///
    /// When a shutdown has been requested, the robot removal notification
    /// is published before the engine advances, once per coordinator, even
    /// after termination. Once the engine returns [`STEP_TERMINATED`], no
    /// plugin is stepped for that tick or any later one, and later ticks do
    /// not touch the engine.
    pub fn step(&mut self) -> Result<i32, SimbridgeError> {
        if self.shutdown.is_requested() && !self.notification_sent {
            self.send_removal_notification();
        }

        if self.terminated {
            return Ok(STEP_TERMINATED);
        }

        let time_step_ms = self.time_step_ms;
        let result = self
            .context
            .with_engine(|engine| engine.step(time_step_ms))?;
        if result == STEP_TERMINATED {
            info!("simulation terminated");
            self.terminated = true;
            return Ok(result);
        }

        self.registry.step_all()?;
        Ok(result)
    }

    fn send_removal_notification(&mut self) {
        let node_name = self.context.node_name().to_string();
        match self
            .context
            .publish(REMOVE_URDF_ROBOT_TOPIC, Message::Text(node_name.clone()))
        {
            Ok(()) => info!(node = %node_name, topic = REMOVE_URDF_ROBOT_TOPIC, "requested robot removal"),
            Err(e) => warn!(
                node = %node_name,
                topic = REMOVE_URDF_ROBOT_TOPIC,
                error = %e,
                "robot removal request failed, not retrying"
            ),
        }
        self.notification_sent = true;
        debug!("coordinator shutting down");
    }

    /// Current phase.
    pub fn state(&self) -> CoordinatorState {
        if self.terminated {
            CoordinatorState::Terminated
        } else if self.notification_sent {
            CoordinatorState::ShuttingDown
        } else {
            CoordinatorState::Running
        }
    }

    pub fn notification_sent(&self) -> bool {
        self.notification_sent
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Basic time step used for every engine step, in milliseconds.
    pub fn time_step_ms(&self) -> u32 {
        self.time_step_ms
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }
}
