// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the simbridge device bridge.

use thiserror::Error;

/// The primary error type used across plugin traits and core operations.
#[derive(Debug, Error)]
pub enum SimbridgeError {
    /// The robot description is not well-formed or lacks the `<robot>` root.
    #[error("invalid robot description: {0}")]
    Description(String),

    /// A `<plugin>` declaration has no `type` attribute.
    #[error("invalid robot description: a plugin is missing a `type` property at line {line}")]
    MissingPluginType { line: u32 },

    /// The native registry located the class but could not construct it.
    #[error("the {type_name} class cannot be initialized: {reason}")]
    PluginInit { type_name: String, reason: String },

    /// Neither the native registry nor the interpreted factory produced the plugin.
    #[error("the {type_name} plugin cannot be found (native or interpreted)")]
    PluginNotFound { type_name: String },

    /// A plugin reported a failure from `init` or `step`.
    #[error("plugin {name} failed: {message}")]
    Plugin { name: String, message: String },

    /// A plugin property could not be interpreted.
    #[error("invalid value `{value}` for property `{key}` of {plugin}: expected {expected}")]
    InvalidProperty {
        plugin: String,
        key: String,
        value: String,
        expected: String,
    },

    /// Engine access failed (device read/write, poisoned lock).
    #[error("engine error: {0}")]
    Engine(String),

    /// The messaging collaborator rejected a publish or a remote call.
    #[error("messaging error: {0}")]
    Messaging(String),

    /// Driver configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SimbridgeError {
    /// Shorthand for a plugin failure with a formatted message.
    pub fn plugin(name: impl Into<String>, message: impl Into<String>) -> Self {
        SimbridgeError::Plugin {
            name: name.into(),
            message: message.into(),
        }
    }
}
