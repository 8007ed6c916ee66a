// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host messaging boundary.

use std::time::Duration;

use crate::error::SimbridgeError;
use crate::types::Message;

/// Broadcast channel on which a driver announces that its robot should be removed.
pub const REMOVE_URDF_ROBOT_TOPIC: &str = "/remove_urdf_robot";

/// Publish/subscribe and remote-parameter access used by the driver and its plugins.
pub trait Messenger: Send + Sync {
    /// Publish a message on a topic.
    fn publish(&self, topic: &str, message: Message) -> Result<(), SimbridgeError>;

    /// Drain the commands received on `topic` since the last call, oldest first.
    fn take_commands(&self, topic: &str) -> Vec<Message>;

    /// Ask the peer process `peer` to set parameter `name` to `value`.
    ///
    /// Waits at most `wait` for the peer to become reachable, then sends
    /// the request without awaiting a response.
    fn set_remote_parameter(
        &self,
        peer: &str,
        name: &str,
        value: &str,
        wait: Duration,
    ) -> Result<(), SimbridgeError>;
}
