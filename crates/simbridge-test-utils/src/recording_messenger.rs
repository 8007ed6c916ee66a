// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messenger that records traffic for assertions.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use simbridge_core::{Message, Messenger, SimbridgeError};
use tracing::debug;

/// A remote parameter request captured by [`RecordingMessenger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteParameter {
    pub peer: String,
    pub name: String,
    pub value: String,
    pub wait: Duration,
}

/// Captures publishes and remote parameter requests; commands are injected
/// with [`push_command`](Self::push_command).
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    attempts: Mutex<Vec<String>>,
    published: Mutex<Vec<(String, Message)>>,
    commands: Mutex<HashMap<String, VecDeque<Message>>>,
    remote: Mutex<Vec<RemoteParameter>>,
    failing_topics: Mutex<HashSet<String>>,
    fail_remote: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every publish on `topic` fail.
    pub fn failing_on(self, topic: &str) -> Self {
        lock(&self.failing_topics).insert(topic.to_string());
        self
    }

    /// Make remote parameter requests fail.
    pub fn failing_remote(self) -> Self {
        self.fail_remote.store(true, Ordering::SeqCst);
        self
    }

    /// Queue a command for the next `take_commands` on `topic`.
    pub fn push_command(&self, topic: &str, message: Message) {
        lock(&self.commands)
            .entry(topic.to_string())
            .or_default()
            .push_back(message);
    }

    /// Successful publishes, oldest first.
    pub fn published(&self) -> Vec<(String, Message)> {
        lock(&self.published).clone()
    }

    /// Successful publishes on `topic`, oldest first.
    pub fn published_on(&self, topic: &str) -> Vec<Message> {
        lock(&self.published)
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Number of publish attempts on `topic`, failed ones included.
    pub fn attempts_on(&self, topic: &str) -> usize {
        lock(&self.attempts).iter().filter(|t| *t == topic).count()
    }

    /// Remote parameter requests, oldest first.
    pub fn remote_parameters(&self) -> Vec<RemoteParameter> {
        lock(&self.remote).clone()
    }
}

impl Messenger for RecordingMessenger {
    fn publish(&self, topic: &str, message: Message) -> Result<(), SimbridgeError> {
        lock(&self.attempts).push(topic.to_string());
        if lock(&self.failing_topics).contains(topic) {
            return Err(SimbridgeError::Messaging(format!("publish on {topic} rejected")));
        }
        debug!(topic, ?message, "recorded publish");
        lock(&self.published).push((topic.to_string(), message));
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
        value: &str,
        wait: Duration,
    ) -> Result<(), SimbridgeError> {
        lock(&self.remote).push(RemoteParameter {
            peer: peer.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            wait,
        });
        if self.fail_remote.load(Ordering::SeqCst) {
            return Err(SimbridgeError::Messaging(format!("{peer} is not reachable")));
        }
        Ok(())
    }
}
