// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process messenger that logs publications.
//!
//! Stands in for a messaging middleware in headless runs: publications are
//! traced and counted, commands are injected with [`LocalMessenger::send_command`],
//! and no remote peer is ever reachable.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use simbridge_core::{DeviceReading, Message, Messenger, SimbridgeError};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct LocalMessenger {
    publish_counts: Mutex<HashMap<String, u64>>,
    commands: Mutex<HashMap<String, VecDeque<Message>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LocalMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command for the plugin consuming `topic`.
    pub fn send_command(&self, topic: &str, message: Message) {
        lock(&self.commands)
            .entry(topic.to_string())
            .or_default()
            .push_back(message);
    }

    /// Number of messages published on `topic`.
    pub fn publish_count(&self, topic: &str) -> u64 {
        lock(&self.publish_counts).get(topic).copied().unwrap_or(0)
    }

    /// Published topics with their message counts, sorted by topic.
    pub fn summary(&self) -> Vec<(String, u64)> {
        let mut counts: Vec<_> = lock(&self.publish_counts)
            .iter()
            .map(|(topic, count)| (topic.clone(), *count))
            .collect();
        counts.sort();
        counts
    }
}

/// Short description of a message for log lines.
fn describe(message: &Message) -> String {
    match message {
        Message::Text(text) => format!("text({} bytes)", text.len()),
        Message::Int(value) => format!("int({value})"),
        Message::Sample { reading, .. } => match reading {
            DeviceReading::Ranges(ranges) => format!("ranges({})", ranges.len()),
            DeviceReading::Image { width, height, .. } => format!("image({width}x{height})"),
            DeviceReading::DepthImage { width, height, .. } => {
                format!("depth_image({width}x{height})")
            }
            DeviceReading::Position { .. } => "position".to_string(),
            DeviceReading::Scalar(value) => format!("scalar({value:.3})"),
            DeviceReading::Vector3(_) => "vector3".to_string(),
            DeviceReading::Packets(packets) => format!("packets({})", packets.len()),
        },
    }
}

impl Messenger for LocalMessenger {
    fn publish(&self, topic: &str, message: Message) -> Result<(), SimbridgeError> {
        *lock(&self.publish_counts)
            .entry(topic.to_string())
            .or_insert(0) += 1;
        let stamp = match &message {
            Message::Sample { stamp, .. } => Some(*stamp),
            _ => None,
        };
        debug!(topic, message = %describe(&message), ?stamp, "published");
        Ok(())
    }

    fn take_commands(&self, topic: &str) -> Vec<Message> {
        lock(&self.commands)
            .get_mut(topic)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    fn set_remote_parameter(
        &self,
        peer: &str,
        name: &str,
        _value: &str,
        wait: Duration,
    ) -> Result<(), SimbridgeError> {
        info!(peer, parameter = name, "no remote peers in local mode");
        Err(SimbridgeError::Messaging(format!(
            "{peer} not reachable within {}ms",
            wait.as_millis()
        )))
    }
}
