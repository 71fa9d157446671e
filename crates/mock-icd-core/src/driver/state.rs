use std::path::Path;

use ash::vk;
use ash::vk::Handle;

use crate::abi::{DispatchArena, DispatchableKind, HandleSet, NonDispatchableKind};
use crate::contract;
use crate::dispatch;
use crate::driver::debug_utils::PendingMessage;
use crate::driver::physical_device::{PhysicalDeviceDescriptor, PhysicalDeviceGroup};
use crate::driver::records::*;
use crate::negotiate::InterfaceNegotiator;
use crate::registry::{ExtensionCatalogue, ExtensionRecord, LayerRecord};
use crate::version::ApiVersion;

/// Where an extension query is asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionScope {
    Instance(vk::Instance),
    PhysicalDevice(vk::PhysicalDevice),
    Device(vk::Device),
}

/// The emulated driver: every piece of state a loader test can observe or configure.
///
/// Tests either own one directly or reach the process-wide one behind the C entry points through
/// [`crate::driver::context`]. [`DriverState::reset`] puts it back to its initial fixture.
#[derive(Debug)]
pub struct DriverState {
    pub negotiator: InterfaceNegotiator,
    /// API version the driver implements.
    pub api_version: ApiVersion,
    pub instance_extensions: ExtensionCatalogue,
    /// Adds every instance extension the resolver knows to the catalogue on first use.
    pub expose_builtin_extensions: bool,
    pub instance_layers: Vec<LayerRecord>,

    /// Driver-side surface entry points are offered when set and the minimum interface version
    /// is at least 3.
    pub enable_icd_wsi: bool,
    pub is_using_icd_wsi: UsingIcdProvidedWsi,
    pub supports_tooling_info: bool,
    pub tooling_properties: Vec<ToolRecord>,
    pub supports_adapter_enumeration: bool,
    /// Report physical devices in reverse from the adapter enumeration path.
    pub reverse_adapter_order: bool,
    pub called_enumerate_adapter_physical_devices: CalledEnumerateAdapterPhysicalDevices,

    pub custom_instance_functions: Vec<VulkanFunction>,
    pub custom_physical_device_functions: Vec<VulkanFunction>,

    pub(crate) physical_devices: DispatchArena<PhysicalDeviceDescriptor>,
    pub physical_device_groups: Vec<PhysicalDeviceGroup>,

    pub(crate) instances: DispatchArena<InstanceRecord>,
    pub(crate) devices: DispatchArena<DeviceRecord>,
    pub(crate) queues: DispatchArena<QueueRecord>,
    pub(crate) command_buffers: DispatchArena<CommandBufferRecord>,
    pub(crate) command_pools: HandleSet<CommandPoolRecord>,
    pub(crate) surfaces: HandleSet<SurfaceRecord>,
    pub(crate) swapchains: HandleSet<SwapchainRecord>,
    pub(crate) messengers: HandleSet<MessengerRecord>,
    pub(crate) displays: HandleSet<vk::PhysicalDevice>,

    pub(crate) pending_messages: Vec<PendingMessage>,
}

/// Names a fixture file the driver starts from, on first use and on every reset.
pub const FIXTURE_ENV: &str = "MOCK_ICD_FIXTURE";

// SAFETY: the only non-`Send` fields are the application's debug-utils `user_data` pointers, which
// the driver never dereferences and only hands back to the callback they were registered with.
unsafe impl Send for DriverState {}

impl Default for DriverState {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverState {
    pub fn new() -> Self {
        Self {
            negotiator: InterfaceNegotiator::default(),
            api_version: ApiVersion::V1_0,
            instance_extensions: ExtensionCatalogue::new(),
            expose_builtin_extensions: false,
            instance_layers: Vec::new(),
            enable_icd_wsi: false,
            is_using_icd_wsi: UsingIcdProvidedWsi::NotUsing,
            supports_tooling_info: false,
            tooling_properties: Vec::new(),
            supports_adapter_enumeration: true,
            reverse_adapter_order: false,
            called_enumerate_adapter_physical_devices: CalledEnumerateAdapterPhysicalDevices::NotCalled,
            custom_instance_functions: Vec::new(),
            custom_physical_device_functions: Vec::new(),
            physical_devices: DispatchArena::new(DispatchableKind::PhysicalDevice),
            physical_device_groups: Vec::new(),
            instances: DispatchArena::new(DispatchableKind::Instance),
            devices: DispatchArena::new(DispatchableKind::Device),
            queues: DispatchArena::new(DispatchableKind::Queue),
            command_buffers: DispatchArena::new(DispatchableKind::CommandBuffer),
            command_pools: HandleSet::new(NonDispatchableKind::CommandPool),
            surfaces: HandleSet::new(NonDispatchableKind::Surface),
            swapchains: HandleSet::new(NonDispatchableKind::Swapchain),
            messengers: HandleSet::new(NonDispatchableKind::DebugMessenger),
            displays: HandleSet::new(NonDispatchableKind::Display),
            pending_messages: Vec::new(),
        }
    }

    /// The defaults, or the fixture named by `MOCK_ICD_FIXTURE`. A fixture that fails to load is
    /// reported and the defaults are used instead.
    pub fn initial() -> Self {
        let Some(path) = std::env::var_os(FIXTURE_ENV) else {
            return Self::new();
        };
        match Self::load_fixture(Path::new(&path)) {
            Ok(state) => state,
            Err(e) => {
                log::error!("Ignoring {}: {}", FIXTURE_ENV, e);
                Self::new()
            }
        }
    }

    /// Destroys every object and restores the initial fixture in place.
    pub fn reset(&mut self) {
        log::info!("Resetting mock ICD state");
        *self = Self::initial();
    }

    pub fn with_interface_versions(mut self, min: u32, max: u32) -> Self {
        self.negotiator = InterfaceNegotiator::new(min, max);
        self
    }

    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    pub fn add_instance_extension(&mut self, extension: ExtensionRecord) {
        self.instance_extensions.add(extension);
    }

    pub fn add_instance_layer(&mut self, layer: LayerRecord) {
        self.instance_layers.push(layer);
    }

    /// Registers a physical device and hands out its dispatchable handle. Display handles are
    /// assigned here.
    pub fn add_physical_device(&mut self, descriptor: PhysicalDeviceDescriptor) -> vk::PhysicalDevice {
        log::debug!("Registering physical device '{}'", descriptor.name);
        let raw = self.physical_devices.insert(descriptor);
        let handle = vk::PhysicalDevice::from_raw(raw);
        if let Some(descriptor) = self.physical_devices.get_mut(raw) {
            for display in &mut descriptor.displays {
                display.handle = vk::DisplayKHR::from_raw(self.displays.insert(handle));
            }
            let first_display = descriptor.displays.first().map(|display| display.handle);
            for plane in &mut descriptor.display_planes {
                if plane.current_display == vk::DisplayKHR::null() {
                    plane.current_display = first_display.unwrap_or_default();
                }
            }
        }
        handle
    }

    /// Adds a group of at most `VK_MAX_DEVICE_GROUP_SIZE` members, every one already registered.
    pub fn add_physical_device_group(&mut self, group: PhysicalDeviceGroup) {
        if group.physical_devices.len() > vk::MAX_DEVICE_GROUP_SIZE {
            contract::violation(format_args!(
                "physical device group of {} devices exceeds VK_MAX_DEVICE_GROUP_SIZE ({})",
                group.physical_devices.len(),
                vk::MAX_DEVICE_GROUP_SIZE
            ));
        }
        for member in &group.physical_devices {
            if !self.physical_devices.contains(member.as_raw()) {
                contract::violation(format_args!(
                    "physical device group references unregistered physical device {:#x}",
                    member.as_raw()
                ));
            }
        }
        self.physical_device_groups.push(group);
    }

    /// Looks up a physical device the loader got from this driver. Anything else is misuse.
    #[track_caller]
    pub fn physical_device(&self, handle: vk::PhysicalDevice) -> &PhysicalDeviceDescriptor {
        match self.physical_devices.get(handle.as_raw()) {
            Some(descriptor) => descriptor,
            None => contract::violation(format_args!(
                "unknown physical device {:#x}",
                handle.as_raw()
            )),
        }
    }

    /// Contract check only.
    #[track_caller]
    pub fn expect_physical_device(&self, handle: vk::PhysicalDevice) {
        self.physical_device(handle);
    }

    #[track_caller]
    pub fn physical_device_mut(&mut self, handle: vk::PhysicalDevice) -> &mut PhysicalDeviceDescriptor {
        match self.physical_devices.get_mut(handle.as_raw()) {
            Some(descriptor) => descriptor,
            None => contract::violation(format_args!(
                "unknown physical device {:#x}",
                handle.as_raw()
            )),
        }
    }

    /// Physical devices in registration order.
    pub fn physical_device_handles(&self) -> Vec<vk::PhysicalDevice> {
        self.physical_devices
            .handles()
            .into_iter()
            .map(vk::PhysicalDevice::from_raw)
            .collect()
    }

    pub fn physical_devices(&self) -> impl Iterator<Item = (vk::PhysicalDevice, &PhysicalDeviceDescriptor)> {
        self.physical_devices
            .iter()
            .map(|(raw, descriptor)| (vk::PhysicalDevice::from_raw(raw), descriptor))
    }

    pub fn instance(&self, handle: vk::Instance) -> Option<&InstanceRecord> {
        self.instances.get(handle.as_raw())
    }

    pub fn device(&self, handle: vk::Device) -> Option<&DeviceRecord> {
        self.devices.get(handle.as_raw())
    }

    pub fn queue(&self, handle: vk::Queue) -> Option<&QueueRecord> {
        self.queues.get(handle.as_raw())
    }

    pub fn command_buffer(&self, handle: vk::CommandBuffer) -> Option<&CommandBufferRecord> {
        self.command_buffers.get(handle.as_raw())
    }

    pub fn surface(&self, handle: vk::SurfaceKHR) -> Option<&SurfaceRecord> {
        self.surfaces.get(handle.as_raw())
    }

    pub fn swapchain(&self, handle: vk::SwapchainKHR) -> Option<&SwapchainRecord> {
        self.swapchains.get(handle.as_raw())
    }

    pub fn messenger(&self, handle: vk::DebugUtilsMessengerEXT) -> Option<&MessengerRecord> {
        self.messengers.get(handle.as_raw())
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    pub fn command_buffer_count(&self) -> usize {
        self.command_buffers.len()
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn swapchain_count(&self) -> usize {
        self.swapchains.len()
    }

    pub fn messenger_count(&self) -> usize {
        self.messengers.len()
    }

    /// Populates the instance catalogue from the built-in table the first time it is needed.
    pub fn ensure_instance_catalogue(&mut self) {
        if self.expose_builtin_extensions
            && self.instance_extensions.populate_once(dispatch::builtin_instance_extensions())
        {
            log::debug!(
                "Instance catalogue populated with {} extensions",
                self.instance_extensions.available().len()
            );
        }
    }

    pub fn is_available(&self, scope: ExtensionScope, name: &str) -> bool {
        match scope {
            ExtensionScope::Instance(_) => self.instance_extensions.is_available(name),
            ExtensionScope::PhysicalDevice(handle) => {
                self.physical_device(handle).extensions.is_available(name)
            }
            ExtensionScope::Device(handle) => self
                .device(handle)
                .is_some_and(|device| self.physical_device(device.physical_device).extensions.is_available(name)),
        }
    }

    /// Physical devices have no enabled set; they expose what they advertise.
    pub fn is_enabled(&self, scope: ExtensionScope, name: &str) -> bool {
        match scope {
            ExtensionScope::Instance(handle) => self
                .instance(handle)
                .is_some_and(|instance| instance.enabled_extensions.is_enabled(name)),
            ExtensionScope::PhysicalDevice(_) => self.is_available(scope, name),
            ExtensionScope::Device(handle) => self
                .device(handle)
                .is_some_and(|device| device.enabled_extensions.is_enabled(name)),
        }
    }

    /// Driver-side WSI needs interface version 3 and the fixture's opt-in.
    pub fn provides_icd_wsi(&self) -> bool {
        self.enable_icd_wsi && self.negotiator.min_supported >= 3
    }
}
