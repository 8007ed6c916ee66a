// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin catalog, loading and lifecycle for simbridge.
//!
//! Built-in plugins are bound to engine devices through a fixed category
//! table. Plugins declared in the robot description are resolved by type
//! name, first against native plugins (in-process factories and shared
//! libraries described by TOML manifests), then against WebAssembly
//! modules. Every live plugin is kept in a [`PluginRegistry`] and stepped
//! in order.

pub mod builtin;
pub mod catalog;
pub mod loader;
pub mod manifest;
pub mod native;
pub mod registry;
pub mod wasm;

pub use catalog::{BuiltinVariant, CatalogEntry, builtin_catalog, search_catalog};
pub use loader::{Ecosystem, InterpretedSource, LoadedPlugin, NativeSource, PluginLoader, load_plugin};
pub use manifest::{NativePluginManifest, parse_native_manifest};
pub use native::{NativeLookup, NativeRegistry, PluginEntryFn};
pub use registry::{PluginEntry, PluginOrigin, PluginRegistry};
pub use wasm::{WasmPlugin, WasmPluginFactory};
