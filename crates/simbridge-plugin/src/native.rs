// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Native plugin registry.
//!
//! Native plugins come from two places:
//!
//! - **Static factories** registered in-process with
//!   [`NativeRegistry::register_factory`].
//! - **Shared libraries** described by a TOML manifest (see
//!   [`crate::manifest`]) found in the registry search paths. The library
//!   must export an entry point with the [`PluginEntryFn`] signature
//!   returning a heap-allocated `Box<dyn Plugin>`, or null on failure.
//!
//! A type no factory or manifest provides, or whose library cannot be
//! opened, is reported as [`NativeLookup::NotFound`] so that the loader can
//! try the interpreted ecosystem. Once a library is open, any failure to
//! construct the plugin is final.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use libloading::Library;
use simbridge_core::{Plugin, PluginContext, PropertyMap, SimbridgeError};
use tracing::{debug, info, warn};

use crate::manifest::{NativePluginManifest, load_native_manifest};

/// Entry point exported by native plugin libraries.
#[allow(improper_ctypes_definitions)]
pub type PluginEntryFn = unsafe extern "C" fn() -> *mut Box<dyn Plugin>;

/// In-process constructor for a native plugin type.
pub type PluginFactoryFn = Box<dyn Fn() -> Result<Box<dyn Plugin>, SimbridgeError> + Send + Sync>;

/// Outcome of a native lookup that did not hit a hard failure.
pub enum NativeLookup {
    /// The class was found and constructed.
    Created(Box<dyn Plugin>),
    /// No library provides the type; the loader may fall back.
    NotFound {
        /// Why the lookup missed, for debug logs.
        reason: String,
    },
}

impl std::fmt::Debug for NativeLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created(_) => f.write_str("Created(..)"),
            Self::NotFound { reason } => f.debug_struct("NotFound").field("reason", reason).finish(),
        }
    }
}

/// A plugin constructed from a shared library.
///
/// The plugin is declared before the library so it is dropped first.
struct LibraryPlugin {
    plugin: Box<dyn Plugin>,
    _library: Library,
}

impl Plugin for LibraryPlugin {
    fn init(
        &mut self,
        context: &PluginContext,
        properties: &PropertyMap,
    ) -> Result<(), SimbridgeError> {
        self.plugin.init(context, properties)
    }

    fn step(&mut self) -> Result<(), SimbridgeError> {
        self.plugin.step()
    }
}

/// Registry of native plugin types.
#[derive(Default)]
pub struct NativeRegistry {
    search_paths: Vec<PathBuf>,
    manifests: HashMap<String, NativePluginManifest>,
    factories: HashMap<String, PluginFactoryFn>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory scanned by [`discover`](Self::discover).
    ///
    /// A leading `~/` is expanded to the home directory. Duplicates are ignored.
    pub fn add_search_path(&mut self, path: impl AsRef<Path>) {
        let expanded = expand_home(path.as_ref());
        if !self.search_paths.contains(&expanded) {
            self.search_paths.push(expanded);
        }
    }

    /// Search paths in scan order.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Register an in-process constructor for `type_name`.
    ///
    /// Factories take precedence over manifests of the same type.
    pub fn register_factory<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Box<dyn Plugin>, SimbridgeError> + Send + Sync + 'static,
    {
        self.factories.insert(type_name.into(), Box::new(factory));
    }

    /// Scan the search paths for `*.toml` manifests.
    ///
    /// Missing directories and invalid manifests are skipped. When two
    /// manifests declare the same type, the first one found wins. Returns
    /// the manifests added by this call.
    pub fn discover(&mut self) -> Vec<NativePluginManifest> {
        let mut added = Vec::new();

        for search_path in &self.search_paths {
            let entries = match std::fs::read_dir(search_path) {
                Ok(entries) => entries,
                Err(e) => {
                    debug!(path = %search_path.display(), error = %e, "skipping plugin search path");
                    continue;
                }
            };

            let mut paths: Vec<PathBuf> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("toml"))
                .collect();
            paths.sort();

            for path in paths {
                let manifest = match load_native_manifest(&path) {
                    Ok(manifest) => manifest,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "ignoring invalid plugin manifest");
                        continue;
                    }
                };

                if self.manifests.contains_key(&manifest.type_name) {
                    debug!(plugin = %manifest.type_name, path = %path.display(), "plugin type already discovered");
                    continue;
                }

                debug!(plugin = %manifest.type_name, library = %manifest.library.display(), "discovered native plugin");
                self.manifests
                    .insert(manifest.type_name.clone(), manifest.clone());
                added.push(manifest);
            }
        }

        if !added.is_empty() {
            info!(count = added.len(), "native plugins discovered");
        }
        added
    }

    /// Manifest registered for `type_name`, if any.
    pub fn manifest(&self, type_name: &str) -> Option<&NativePluginManifest> {
        self.manifests.get(type_name)
    }

    /// Returns true if a factory or manifest provides `type_name`.
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name) || self.manifests.contains_key(type_name)
    }

    /// All known native plugin types, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .factories
            .keys()
            .chain(self.manifests.keys().filter(|k| !self.factories.contains_key(*k)))
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    /// Look up and construct `type_name`.
    ///
    /// Returns `Ok(NotFound)` when no source provides the type or its library
    /// cannot be opened, and `Err(PluginInit)` when the type was located but
    /// construction failed.
    pub fn create(&self, type_name: &str) -> Result<NativeLookup, SimbridgeError> {
        if let Some(factory) = self.factories.get(type_name) {
            return match catch_unwind(AssertUnwindSafe(|| factory())) {
                Ok(Ok(plugin)) => Ok(NativeLookup::Created(plugin)),
                Ok(Err(e)) => Err(init_error(type_name, e.to_string())),
                Err(_) => Err(init_error(type_name, "constructor panicked")),
            };
        }

        let Some(manifest) = self.manifests.get(type_name) else {
            return Ok(NativeLookup::NotFound {
                reason: "no native plugin declares this type".to_string(),
            });
        };

        // SAFETY: loading a library runs its initializers. Libraries are
        // only taken from manifests in the configured search paths.
        let library = match unsafe { Library::new(&manifest.library) } {
            Ok(library) => library,
            Err(e) => {
                return Ok(NativeLookup::NotFound {
                    reason: format!(
                        "cannot open library '{}': {e}",
                        manifest.library.display()
                    ),
                });
            }
        };

        // SAFETY: the manifest asserts that the symbol has the
        // `PluginEntryFn` signature.
        let raw = unsafe {
            let entry: libloading::Symbol<'_, PluginEntryFn> = library
                .get(manifest.symbol.as_bytes())
                .map_err(|e| {
                    init_error(
                        type_name,
                        format!("missing entry point '{}': {e}", manifest.symbol),
                    )
                })?;
            entry()
        };

        if raw.is_null() {
            return Err(init_error(type_name, "entry point returned null"));
        }

        // SAFETY: a non-null pointer returned by the entry point is a
        // `Box<Box<dyn Plugin>>` leaked with `Box::into_raw`.
        let plugin = unsafe { *Box::from_raw(raw) };

        info!(plugin = type_name, library = %manifest.library.display(), "native plugin loaded");
        Ok(NativeLookup::Created(Box::new(LibraryPlugin {
            plugin,
            _library: library,
        })))
    }
}

impl std::fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeRegistry")
            .field("search_paths", &self.search_paths)
            .field("manifests", &self.manifests.keys().collect::<Vec<_>>())
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Expand a leading `~/` to the home directory.
pub(crate) fn expand_home(path: &Path) -> PathBuf {
    match path.to_str().and_then(|s| s.strip_prefix("~/")) {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        None => path.to_path_buf(),
    }
}

fn init_error(type_name: &str, reason: impl Into<String>) -> SimbridgeError {
    SimbridgeError::PluginInit {
        type_name: type_name.to_string(),
        reason: reason.into(),
    }
}
