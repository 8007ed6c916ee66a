// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Robot description parsing and property resolution.
//!
//! The robot description is a markup document whose `<webots>` section
//! overrides per-device properties and declares dynamic plugins:
//!
//! ```xml
//! <robot>
//!   <webots>
//!     <device reference="camera">
//!       <ros><topicName>/front_camera</topicName></ros>
//!     </device>
//!     <plugin type="rover::Drive"><wheelRadius>0.05</wheelRadius></plugin>
//!   </webots>
//! </robot>
//! ```

pub mod document;
pub mod resolver;

pub use document::{ConfigDocument, ConfigNode};
pub use resolver::{DeviceConfigResolver, PluginDeclaration};
