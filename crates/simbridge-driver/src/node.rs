// SPDX-FileCopyrightText: 2026 Simbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Driver node initialization and the main loop.
//!
//! Initialization order:
//! 1. optionally push the engine's URDF export to the robot state publisher;
//! 2. one built-in plugin per enabled engine device with a supported
//!    category, in engine enumeration order;
//! 3. every `<plugin>` declared in the robot description, in document order.

use std::time::Duration;

use simbridge_config::model::PluginsConfig;
use simbridge_core::{
    DeviceDescriptor, PluginContext, PropertyMap, STEP_TERMINATED, SimbridgeError,
};
use simbridge_description::{ConfigDocument, DeviceConfigResolver};
use simbridge_plugin::{
    BuiltinVariant, NativeRegistry, PluginLoader, PluginOrigin, PluginRegistry,
    WasmPluginFactory,
};
use tracing::{debug, info, warn};

use crate::coordinator::StepCoordinator;
use crate::shutdown::ShutdownSignal;

/// Peer receiving the robot description.
pub const ROBOT_STATE_PUBLISHER: &str = "robot_state_publisher";

/// Parameter of [`ROBOT_STATE_PUBLISHER`] set to the URDF export.
pub const ROBOT_DESCRIPTION_PARAMETER: &str = "robot_description";

/// How long to wait for the robot state publisher to become reachable.
pub const REMOTE_PARAMETER_WAIT: Duration = Duration::from_secs(1);

/// Startup switches of a [`DriverNode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverOptions {
    /// Push the engine URDF export to the robot state publisher.
    pub set_robot_state_publisher: bool,
}

/// A fully initialized driver: every plugin is live and ready to step.
#[derive(Debug)]
pub struct DriverNode {
    coordinator: StepCoordinator,
}

impl DriverNode {
    /// Discover, load and initialize every plugin.
    ///
    /// Any plugin failing to load or initialize aborts startup.
    pub fn init(
        context: PluginContext,
        description: &ConfigDocument,
        loader: &PluginLoader,
        shutdown: ShutdownSignal,
        options: DriverOptions,
    ) -> Result<Self, SimbridgeError> {
        if options.set_robot_state_publisher {
            push_robot_description(&context)?;
        }

        let resolver = DeviceConfigResolver::new(description);
        let mut registry = PluginRegistry::new();

        for device in discover_devices(&context, &resolver)? {
            let Some(variant) = BuiltinVariant::for_category(device.category) else {
                debug!(
                    device = %device.name,
                    category = %device.category,
                    "no built-in plugin for device category, skipping"
                );
                continue;
            };
            let origin = PluginOrigin::Builtin {
                device: device.name,
                variant,
            };
            registry.initialize(origin, variant.instantiate(), &context, &device.properties)?;
        }

        for declaration in resolver.declarations() {
            let declaration = declaration?;
            let plugin = loader.load(&declaration.type_name)?;
            info!(
                plugin = %declaration.type_name,
                ecosystem = %plugin.ecosystem(),
                line = declaration.line,
                "plugin loaded"
            );
            let origin = PluginOrigin::Declared {
                type_name: declaration.type_name,
                ecosystem: plugin.ecosystem(),
            };
            registry.initialize(origin, plugin.into_inner(), &context, &declaration.properties)?;
        }

        info!(
            node = context.node_name(),
            plugins = registry.len(),
            "driver initialized"
        );

        Ok(Self {
            coordinator: StepCoordinator::new(context, registry, shutdown)?,
        })
    }

    /// Run one tick. See [`StepCoordinator::step`].
    pub fn step(&mut self) -> Result<i32, SimbridgeError> {
        self.coordinator.step()
    }

    /// Step until the engine terminates and return the number of completed ticks.
    pub fn run(&mut self) -> Result<u64, SimbridgeError> {
        let mut ticks = 0;
        while self.step()? != STEP_TERMINATED {
            ticks += 1;
        }
        info!(ticks, "driver loop finished");
        Ok(ticks)
    }

    pub fn coordinator(&self) -> &StepCoordinator {
        &self.coordinator
    }

    pub fn registry(&self) -> &PluginRegistry {
        self.coordinator.registry()
    }
}

/// Enabled engine devices with their resolved properties, in engine order.
///
/// The engine lock is released before returning so that plugins can take
/// it during `init`.
fn discover_devices(
    context: &PluginContext,
    resolver: &DeviceConfigResolver<'_>,
) -> Result<Vec<DeviceDescriptor>, SimbridgeError> {
    let devices = context.with_engine(|engine| {
        (0..engine.device_count())
            .filter_map(|index| engine.device_by_index(index))
            .map(|tag| (tag, engine.device_name(tag), engine.device_category(tag)))
            .collect::<Vec<_>>()
    })?;

    let mut descriptors = Vec::with_capacity(devices.len());
    for (tag, name, category) in devices {
        let mut properties = resolver.resolve_device_properties(&name);
        if properties.is_disabled() {
            debug!(device = %name, "device disabled in robot description, skipping");
            continue;
        }
        properties.insert(PropertyMap::NAME, name.clone());
        descriptors.push(DeviceDescriptor {
            tag,
            category,
            name,
            properties,
        });
    }
    Ok(descriptors)
}

/// Push the engine URDF export to the robot state publisher.
///
/// Only an engine failure is an error; an unreachable peer is logged.
fn push_robot_description(context: &PluginContext) -> Result<(), SimbridgeError> {
    let urdf = context.with_engine(|engine| engine.urdf(""))?;
    match context.messenger().set_remote_parameter(
        ROBOT_STATE_PUBLISHER,
        ROBOT_DESCRIPTION_PARAMETER,
        &urdf,
        REMOTE_PARAMETER_WAIT,
    ) {
        Ok(()) => debug!(peer = ROBOT_STATE_PUBLISHER, bytes = urdf.len(), "robot description sent"),
        Err(e) => warn!(
            peer = ROBOT_STATE_PUBLISHER,
            error = %e,
            "failed to set robot description, continuing"
        ),
    }
    Ok(())
}

/// Build the two-ecosystem plugin loader from the `[plugins]` configuration.
///
/// Native manifests are discovered eagerly; WebAssembly modules are looked
/// up by type name on demand.
pub fn plugin_loader(config: &PluginsConfig) -> Result<PluginLoader, SimbridgeError> {
    let mut native = NativeRegistry::new();
    for path in &config.native_paths {
        native.add_search_path(path);
    }
    let manifests = native.discover();
    debug!(count = manifests.len(), "native plugin manifests discovered");

    let mut interpreted = WasmPluginFactory::new(config.wasm_fuel_per_call)?;
    for path in &config.wasm_paths {
        interpreted.add_search_path(path);
    }

    Ok(PluginLoader::new(native, interpreted))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use simbridge_core::{DeviceCategory, Message, REMOVE_URDF_ROBOT_TOPIC};
    use simbridge_test_utils::{MockEngine, RecordingMessenger, plugin_context};
    use tracing_test::traced_test;

    use super::*;

    fn empty_loader() -> PluginLoader {
        let config = PluginsConfig {
            native_paths: Vec::new(),
            wasm_paths: Vec::new(),
            wasm_fuel_per_call: 1_000,
        };
        plugin_loader(&config).unwrap()
    }

    #[test]
    fn robot_description_is_pushed_when_enabled() {
        let engine = MockEngine::new(32).with_urdf("<robot name=\"rover\"/>").into_shared();
        let messenger = Arc::new(RecordingMessenger::new());
        let context = plugin_context(engine, Arc::clone(&messenger));

        DriverNode::init(
            context,
            &ConfigDocument::empty(),
            &empty_loader(),
            ShutdownSignal::manual(),
            DriverOptions {
                set_robot_state_publisher: true,
            },
        )
        .unwrap();

        let requests = messenger.remote_parameters();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].peer, ROBOT_STATE_PUBLISHER);
        assert_eq!(requests[0].name, ROBOT_DESCRIPTION_PARAMETER);
        assert_eq!(requests[0].value, "<robot name=\"rover\"/>");
        assert_eq!(requests[0].wait, Duration::from_secs(1));
    }

    #[test]
    fn robot_description_is_not_pushed_by_default() {
        let messenger = Arc::new(RecordingMessenger::new());
        let context = plugin_context(MockEngine::new(32).into_shared(), Arc::clone(&messenger));
        DriverNode::init(
            context,
            &ConfigDocument::empty(),
            &empty_loader(),
            ShutdownSignal::manual(),
            DriverOptions::default(),
        )
        .unwrap();
        assert!(messenger.remote_parameters().is_empty());
    }

    #[traced_test]
    #[test]
    fn unreachable_state_publisher_is_not_fatal() {
        let messenger = Arc::new(RecordingMessenger::new().failing_remote());
        let engine = MockEngine::new(32)
            .with_device("lidar", DeviceCategory::Lidar)
            .into_shared();
        let context = plugin_context(engine, Arc::clone(&messenger));

        let node = DriverNode::init(
            context,
            &ConfigDocument::empty(),
            &empty_loader(),
            ShutdownSignal::manual(),
            DriverOptions {
                set_robot_state_publisher: true,
            },
        )
        .unwrap();

        assert_eq!(node.registry().len(), 1);
        assert!(logs_contain("failed to set robot description"));
    }

    #[traced_test]
    #[test]
    fn unsupported_devices_are_skipped_with_a_debug_log() {
        let engine = MockEngine::new(32)
            .with_device("left wheel motor", DeviceCategory::Motor)
            .into_shared();
        let context = plugin_context(engine, Arc::new(RecordingMessenger::new()));
        let node = DriverNode::init(
            context,
            &ConfigDocument::empty(),
            &empty_loader(),
            ShutdownSignal::manual(),
            DriverOptions::default(),
        )
        .unwrap();
        assert!(node.registry().is_empty());
        assert!(logs_contain("no built-in plugin for device category"));
    }

    #[test]
    fn run_counts_completed_ticks() {
        let engine = MockEngine::new(32).terminate_after(5).into_shared();
        let messenger = Arc::new(RecordingMessenger::new());
        let context = plugin_context(engine, Arc::clone(&messenger));
        let shutdown = ShutdownSignal::manual();
        let mut node = DriverNode::init(
            context,
            &ConfigDocument::empty(),
            &empty_loader(),
            shutdown.clone(),
            DriverOptions::default(),
        )
        .unwrap();

        shutdown.request();
        assert_eq!(node.run().unwrap(), 5);
        assert!(node.coordinator().is_terminated());
        assert_eq!(
            messenger.published_on(REMOVE_URDF_ROBOT_TOPIC),
            vec![Message::Text("rover_driver".to_string())]
        );
    }
}
