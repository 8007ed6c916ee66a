// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebAssembly plugins using wasmtime.
//!
//! A plugin type `a::B` is looked up as `a::B.wasm`, then `a/B.wasm` (with
//! `::` and `.` mapped to path separators), in each search path. Text
//! (`.wat`) modules are accepted next to binaries.
//!
//! Modules import host functions from the `simbridge` namespace and export
//! `memory`, `init() -> i32` and `step() -> i32` (zero means success):
//!
//! | import | signature |
//! |---|---|
//! | `log` | `(level: i32, ptr: i32, len: i32)` |
//! | `property_len` | `(key_ptr: i32, key_len: i32) -> i32`, `-1` if missing |
//! | `property` | `(key_ptr: i32, key_len: i32, out_ptr: i32) -> i32` |
//! | `publish` | `(topic_ptr: i32, topic_len: i32, data_ptr: i32, data_len: i32) -> i32` |
//! | `sim_time` | `() -> f64` |
//!
//! Every call into the guest gets a fresh fuel budget.

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use simbridge_core::{Message, Plugin, PluginContext, PropertyMap, SimbridgeError};
use tracing::{debug, error, info, trace, warn};
use wasmtime::{Caller, Config, Engine, Linker, Memory, Module, Store, TypedFunc};

use crate::native::expand_home;

/// Host namespace imported by guest modules.
pub const HOST_MODULE: &str = "simbridge";

/// Fuel granted to each guest call when none is configured.
pub const DEFAULT_FUEL_PER_CALL: u64 = 10_000_000;

/// State stored in the wasmtime Store of one plugin instance.
struct GuestState {
    type_name: String,
    properties: PropertyMap,
    /// Set on `init`; host functions needing it trap before that.
    context: Option<PluginContext>,
}

/// Compiles and instantiates WebAssembly plugins.
///
/// The engine is shared by every module the factory creates.
pub struct WasmPluginFactory {
    engine: Engine,
    search_paths: Vec<PathBuf>,
    fuel_per_call: u64,
}

impl WasmPluginFactory {
    /// Creates a factory with fuel metering enabled.
    pub fn new(fuel_per_call: u64) -> Result<Self, SimbridgeError> {
        let mut config = Config::new();
        config.consume_fuel(true);

        let engine = Engine::new(&config).map_err(|e| {
            SimbridgeError::Internal(format!("failed to create wasmtime engine: {e}"))
        })?;

        debug!(fuel_per_call, "WASM plugin factory initialized");

        Ok(Self {
            engine,
            search_paths: Vec::new(),
            fuel_per_call,
        })
    }

    /// Add a directory searched for modules.
    ///
    /// A leading `~/` is expanded to the home directory. Duplicates are ignored.
    pub fn add_search_path(&mut self, path: impl AsRef<Path>) {
        let path = expand_home(path.as_ref());
        if !self.search_paths.contains(&path) {
            self.search_paths.push(path);
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Find the module file for `type_name`.
    pub fn locate(&self, type_name: &str) -> Option<PathBuf> {
        let nested = type_name.replace("::", "/").replace('.', "/");
        let stems = [type_name.to_string(), nested];

        for dir in &self.search_paths {
            for stem in &stems {
                for ext in ["wasm", "wat"] {
                    let candidate = dir.join(format!("{stem}.{ext}"));
                    if candidate.is_file() {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }

    /// Create a plugin of `type_name`, or `None` if no usable module exists.
    ///
    /// A module that is found but cannot be compiled or lacks the required
    /// exports is logged and treated as absent.
    pub fn create_from_type(&self, type_name: &str) -> Option<WasmPlugin> {
        let Some(path) = self.locate(type_name) else {
            debug!(plugin = type_name, "no WASM module found");
            return None;
        };

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(plugin = type_name, path = %path.display(), error = %e, "cannot read WASM module");
                return None;
            }
        };

        match self.instantiate(type_name, &bytes) {
            Ok(plugin) => {
                info!(plugin = type_name, path = %path.display(), "WASM plugin loaded");
                Some(plugin)
            }
            Err(e) => {
                warn!(plugin = type_name, path = %path.display(), error = %e, "cannot load WASM module");
                None
            }
        }
    }

    /// Compile and instantiate a module from binary or text bytes.
    pub fn instantiate(&self, type_name: &str, bytes: &[u8]) -> Result<WasmPlugin, SimbridgeError> {
        let module = Module::new(&self.engine, bytes).map_err(|e| {
            SimbridgeError::plugin(type_name, format!("failed to compile WASM module: {e}"))
        })?;

        let state = GuestState {
            type_name: type_name.to_string(),
            properties: PropertyMap::new(),
            context: None,
        };
        let mut store = Store::new(&self.engine, state);

        let mut linker = Linker::new(&self.engine);
        define_host_functions(&mut linker)?;

        let instance = linker
            .instantiate(&mut store, &module)
            .map_err(|e| SimbridgeError::plugin(type_name, format!("instantiation failed: {e:#}")))?;

        let init_fn = instance
            .get_typed_func::<(), i32>(&mut store, "init")
            .map_err(|e| SimbridgeError::plugin(type_name, format!("module has no 'init' export: {e}")))?;
        let step_fn = instance
            .get_typed_func::<(), i32>(&mut store, "step")
            .map_err(|e| SimbridgeError::plugin(type_name, format!("module has no 'step' export: {e}")))?;

        Ok(WasmPlugin {
            type_name: type_name.to_string(),
            store,
            init_fn,
            step_fn,
            fuel_per_call: self.fuel_per_call,
        })
    }
}

/// A plugin backed by a WebAssembly instance.
pub struct WasmPlugin {
    type_name: String,
    store: Store<GuestState>,
    init_fn: TypedFunc<(), i32>,
    step_fn: TypedFunc<(), i32>,
    fuel_per_call: u64,
}

impl WasmPlugin {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    fn call(&mut self, phase: &str, func: TypedFunc<(), i32>) -> Result<(), SimbridgeError> {
        self.store
            .set_fuel(self.fuel_per_call)
            .map_err(|e| SimbridgeError::Internal(format!("failed to set fuel: {e}")))?;

        match func.call(&mut self.store, ()) {
            Ok(0) => Ok(()),
            Ok(code) => Err(SimbridgeError::plugin(
                &self.type_name,
                format!("{phase} returned {code}"),
            )),
            Err(e) => {
                // {e:#} keeps the trap cause chain.
                let message = format!("{e:#}");
                let message = if message.contains("all fuel consumed") {
                    format!("{phase} exceeded fuel limit ({} units): {message}", self.fuel_per_call)
                } else {
                    format!("{phase} trapped: {message}")
                };
                Err(SimbridgeError::plugin(&self.type_name, message))
            }
        }
    }
}

impl Plugin for WasmPlugin {
    fn init(
        &mut self,
        context: &PluginContext,
        properties: &PropertyMap,
    ) -> Result<(), SimbridgeError> {
        let state = self.store.data_mut();
        state.properties = properties.clone();
        state.context = Some(context.clone());
        let init = self.init_fn.clone();
        self.call("init", init)
    }

    fn step(&mut self) -> Result<(), SimbridgeError> {
        let step = self.step_fn.clone();
        self.call("step", step)
    }
}

fn memory_of(caller: &mut Caller<'_, GuestState>) -> Result<Memory, wasmtime::Error> {
    match caller.get_export("memory") {
        Some(wasmtime::Extern::Memory(mem)) => Ok(mem),
        _ => Err(anyhow!("WASM module has no exported memory").into()),
    }
}

/// Defines the `simbridge` host functions in the linker.
fn define_host_functions(linker: &mut Linker<GuestState>) -> Result<(), SimbridgeError> {
    linker
        .func_wrap(
            HOST_MODULE,
            "log",
            |mut caller: Caller<'_, GuestState>, level: i32, ptr: i32, len: i32| {
                let Ok(memory) = memory_of(&mut caller) else {
                    return;
                };
                let Some(msg) = read_string_from_memory(&memory, &caller, ptr, len) else {
                    return;
                };
                let plugin = caller.data().type_name.as_str();
                match level {
                    0 => trace!(plugin, "{msg}"),
                    1 => debug!(plugin, "{msg}"),
                    3 => warn!(plugin, "{msg}"),
                    4 => error!(plugin, "{msg}"),
                    _ => info!(plugin, "{msg}"),
                }
            },
        )
        .map_err(linker_err)?;

    linker
        .func_wrap(
            HOST_MODULE,
            "property_len",
            |mut caller: Caller<'_, GuestState>,
             key_ptr: i32,
             key_len: i32|
             -> Result<i32, wasmtime::Error> {
                let memory = memory_of(&mut caller)?;
                let key = read_string_from_memory(&memory, &caller, key_ptr, key_len)
                    .ok_or_else(|| anyhow!("failed to read property key from WASM memory"))?;
                Ok(caller
                    .data()
                    .properties
                    .get(&key)
                    .map_or(-1, |v| v.len() as i32))
            },
        )
        .map_err(linker_err)?;

    linker
        .func_wrap(
            HOST_MODULE,
            "property",
            |mut caller: Caller<'_, GuestState>,
             key_ptr: i32,
             key_len: i32,
             out_ptr: i32|
             -> Result<i32, wasmtime::Error> {
                let memory = memory_of(&mut caller)?;
                let key = read_string_from_memory(&memory, &caller, key_ptr, key_len)
                    .ok_or_else(|| anyhow!("failed to read property key from WASM memory"))?;
                let Some(value) = caller.data().properties.get(&key).map(str::to_string) else {
                    return Ok(-1);
                };
                if !write_bytes_to_memory(&memory, &mut caller, out_ptr, value.as_bytes()) {
                    return Err(anyhow!("property buffer out of bounds").into());
                }
                Ok(value.len() as i32)
            },
        )
        .map_err(linker_err)?;

    linker
        .func_wrap(
            HOST_MODULE,
            "publish",
            |mut caller: Caller<'_, GuestState>,
             topic_ptr: i32,
             topic_len: i32,
             data_ptr: i32,
             data_len: i32|
             -> Result<i32, wasmtime::Error> {
                let memory = memory_of(&mut caller)?;
                let topic = read_string_from_memory(&memory, &caller, topic_ptr, topic_len)
                    .ok_or_else(|| anyhow!("failed to read topic from WASM memory"))?;
                let data = read_string_from_memory(&memory, &caller, data_ptr, data_len)
                    .ok_or_else(|| anyhow!("failed to read payload from WASM memory"))?;

                let state = caller.data();
                let context = state
                    .context
                    .as_ref()
                    .ok_or_else(|| anyhow!("publish called before init"))?;
                match context.publish(&topic, Message::Text(data)) {
                    Ok(()) => Ok(0),
                    Err(e) => {
                        warn!(plugin = %state.type_name, topic = %topic, error = %e, "WASM publish failed");
                        Ok(-1)
                    }
                }
            },
        )
        .map_err(linker_err)?;

    linker
        .func_wrap(
            HOST_MODULE,
            "sim_time",
            |caller: Caller<'_, GuestState>| -> Result<f64, wasmtime::Error> {
                let context = caller
                    .data()
                    .context
                    .as_ref()
                    .ok_or_else(|| anyhow!("sim_time called before init"))?;
                context
                    .with_engine(|engine| engine.time())
                    .map_err(|e| anyhow!("{e}").into())
            },
        )
        .map_err(linker_err)?;

    Ok(())
}

/// Helper: read a UTF-8 string from WASM memory.
fn read_string_from_memory(
    memory: &Memory,
    caller: &Caller<'_, GuestState>,
    ptr: i32,
    len: i32,
) -> Option<String> {
    let ptr = usize::try_from(ptr).ok()?;
    let len = usize::try_from(len).ok()?;
    let data = memory.data(caller);
    let bytes = data.get(ptr..ptr.checked_add(len)?)?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Helper: write bytes into WASM memory. Returns false when out of bounds.
fn write_bytes_to_memory(
    memory: &Memory,
    caller: &mut Caller<'_, GuestState>,
    ptr: i32,
    bytes: &[u8],
) -> bool {
    let Ok(ptr) = usize::try_from(ptr) else {
        return false;
    };
    let data = memory.data_mut(caller);
    match data.get_mut(ptr..ptr + bytes.len()) {
        Some(target) => {
            target.copy_from_slice(bytes);
            true
        }
        None => false,
    }
}

/// Helper: convert linker errors to SimbridgeError.
fn linker_err(e: wasmtime::Error) -> SimbridgeError {
    SimbridgeError::Internal(format!("failed to define host function: {e}"))
}
