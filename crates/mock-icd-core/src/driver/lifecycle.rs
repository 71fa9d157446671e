use std::ffi::c_void;

use ash::prelude::VkResult;
use ash::vk;
use ash::vk::Handle;

use crate::contract;
use crate::driver::records::*;
use crate::driver::state::DriverState;
use crate::version::ApiVersion;

/// What `vkCreateInstance` received, decoded from the create info.
#[derive(Debug, Clone, Default)]
pub struct InstanceCreateRequest {
    /// `apiVersion` of the application info, or `None` when the application info is missing.
    pub application_api_version: Option<u32>,
    pub enabled_layers: Vec<String>,
    pub enabled_extensions: Vec<String>,
    /// Messengers chained onto the create info; they hear about the instance's own creation.
    pub debug_messengers: Vec<ChainedMessenger>,
}

/// A `VkDebugUtilsMessengerCreateInfoEXT` found in the `vkCreateInstance` `pNext` chain.
#[derive(Debug, Clone, Copy)]
pub struct ChainedMessenger {
    pub severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    pub types: vk::DebugUtilsMessageTypeFlagsEXT,
    pub callback: vk::PFN_vkDebugUtilsMessengerCallbackEXT,
    pub user_data: *mut c_void,
}

impl InstanceCreateRequest {
    pub fn new(api_version: u32) -> Self {
        Self {
            application_api_version: Some(api_version),
            ..Self::default()
        }
    }

    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.enabled_extensions.push(name.into());
        self
    }

    pub fn with_debug_messenger(mut self, messenger: ChainedMessenger) -> Self {
        self.debug_messengers.push(messenger);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueRequest {
    pub family_index: u32,
    pub queue_count: u32,
}

/// What `vkCreateDevice` received, decoded from the create info.
#[derive(Debug, Clone, Default)]
pub struct DeviceCreateRequest {
    pub queues: Vec<QueueRequest>,
    pub enabled_extensions: Vec<String>,
}

impl DeviceCreateRequest {
    pub fn with_queue(mut self, family_index: u32, queue_count: u32) -> Self {
        self.queues.push(QueueRequest {
            family_index,
            queue_count,
        });
        self
    }

    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.enabled_extensions.push(name.into());
        self
    }
}

impl DriverState {
    pub fn create_instance(&mut self, request: Option<&InstanceCreateRequest>) -> VkResult<vk::Instance> {
        let Some(request) = request else {
            return Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        };
        let Some(requested) = request.application_api_version else {
            return Err(vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        };
        let requested_version = ApiVersion::from_requested(requested);

        // Drivers older than 1.1 may refuse anything newer than 1.0.
        if !self.api_version.at_least(ApiVersion::V1_1) && requested_version.at_least(ApiVersion::V1_1) {
            log::warn!(
                "Driver API {} rejects application API {}",
                self.api_version,
                requested_version
            );
            return Err(vk::Result::ERROR_INCOMPATIBLE_DRIVER);
        }

        self.ensure_instance_catalogue();
        let enabled_extensions = self
            .instance_extensions
            .admit(request.enabled_extensions.iter().map(String::as_str));
        let record = InstanceRecord {
            api_version: requested_version.min(self.api_version),
            requested_api_version: requested,
            enabled_extensions,
            enabled_layers: request.enabled_layers.clone(),
        };
        let api_version = record.api_version;
        let instance = vk::Instance::from_raw(self.instances.insert(record));
        for chained in &request.debug_messengers {
            self.create_debug_messenger(
                instance,
                chained.severity,
                chained.types,
                chained.callback,
                chained.user_data,
            );
        }
        self.log_driver_message(
            instance,
            &format!("vkCreateInstance: instance {:#x} at API {}", instance.as_raw(), api_version),
        );
        Ok(instance)
    }

    /// Removes the instance and the surfaces and messengers it owns. Devices are left alone.
    pub fn destroy_instance(&mut self, instance: vk::Instance) {
        if instance == vk::Instance::null() {
            return;
        }
        if self.instances.remove(instance.as_raw()).is_none() {
            contract::violation(format_args!("destroying unknown instance {:#x}", instance.as_raw()));
        }
        let surfaces = self.surfaces.remove_where(|surface| surface.instance == instance);
        let messengers = self.messengers.remove_where(|messenger| messenger.instance == instance);
        log::info!(
            "Destroyed instance {:#x} ({} surfaces, {} messengers)",
            instance.as_raw(),
            surfaces.len(),
            messengers.len()
        );
    }

    #[track_caller]
    pub(crate) fn expect_instance(&self, instance: vk::Instance, operation: &str) {
        if !self.instances.contains(instance.as_raw()) {
            contract::violation(format_args!("{} on unknown instance {:#x}", operation, instance.as_raw()));
        }
    }

    pub fn enumerate_physical_devices(&mut self, instance: vk::Instance) -> Vec<vk::PhysicalDevice> {
        self.expect_instance(instance, "vkEnumeratePhysicalDevices");
        let handles = self.physical_device_handles();
        self.log_driver_message(
            instance,
            &format!("vkEnumeratePhysicalDevices: {} physical devices", handles.len()),
        );
        handles
    }

    /// Adapter-filtered enumeration. When any physical device carries `luid` only those are
    /// reported; otherwise all of them are.
    pub fn enumerate_adapter_physical_devices(
        &mut self,
        instance: vk::Instance,
        luid: AdapterLuid,
    ) -> VkResult<Vec<vk::PhysicalDevice>> {
        if !self.supports_adapter_enumeration {
            self.called_enumerate_adapter_physical_devices =
                CalledEnumerateAdapterPhysicalDevices::CalledButNotSupported;
            return Err(vk::Result::ERROR_INCOMPATIBLE_DRIVER);
        }
        self.called_enumerate_adapter_physical_devices = CalledEnumerateAdapterPhysicalDevices::Called;

        let matching: Vec<vk::PhysicalDevice> = self
            .physical_devices()
            .filter(|(_, descriptor)| descriptor.adapter_luid == Some(luid))
            .map(|(handle, _)| handle)
            .collect();
        let mut handles = if matching.is_empty() {
            self.enumerate_physical_devices(instance)
        } else {
            self.expect_instance(instance, "vk_icdEnumerateAdapterPhysicalDevices");
            matching
        };
        if self.reverse_adapter_order {
            handles.reverse();
        }
        Ok(handles)
    }

    /// Configured groups, or one single-device group per physical device when none are set.
    pub fn physical_device_group_list(&self) -> Vec<crate::driver::PhysicalDeviceGroup> {
        if !self.physical_device_groups.is_empty() {
            return self.physical_device_groups.clone();
        }
        self.physical_device_handles()
            .into_iter()
            .map(|handle| crate::driver::PhysicalDeviceGroup::new(vec![handle]))
            .collect()
    }

    pub fn create_device(
        &mut self,
        physical_device: vk::PhysicalDevice,
        request: &DeviceCreateRequest,
    ) -> VkResult<vk::Device> {
        let Some(descriptor) = self.physical_devices.get(physical_device.as_raw()) else {
            log::warn!("vkCreateDevice on unknown physical device {:#x}", physical_device.as_raw());
            return Err(vk::Result::ERROR_INITIALIZATION_FAILED);
        };
        let enabled_extensions = descriptor
            .extensions
            .admit(request.enabled_extensions.iter().map(String::as_str));
        let api_version = descriptor.api_version().min(self.api_version);

        let device_raw = self.devices.insert(DeviceRecord {
            physical_device,
            api_version,
            enabled_extensions,
            queues: Vec::new(),
        });
        let device = vk::Device::from_raw(device_raw);

        let queues: Vec<vk::Queue> = request
            .queues
            .iter()
            .map(|queue| {
                vk::Queue::from_raw(self.queues.insert(QueueRecord {
                    device,
                    family_index: queue.family_index,
                    queue_count: queue.queue_count,
                }))
            })
            .collect();
        if let Some(record) = self.devices.get_mut(device_raw) {
            record.queues = queues;
        }
        self.physical_device_mut(physical_device).device_handles.push(device);

        self.log_driver_message(
            vk::Instance::null(),
            &format!("vkCreateDevice: device {:#x} with {} queues", device_raw, request.queues.len()),
        );
        Ok(device)
    }

    /// Removes the device with its queues, command pools, command buffers and swapchains.
    pub fn destroy_device(&mut self, device: vk::Device) {
        if device == vk::Device::null() {
            return;
        }
        let Some(record) = self.devices.remove(device.as_raw()) else {
            contract::violation(format_args!("destroying unknown device {:#x}", device.as_raw()));
        };
        if let Some(descriptor) = self.physical_devices.get_mut(record.physical_device.as_raw()) {
            descriptor.device_handles.retain(|handle| *handle != device);
        }
        self.queues.remove_where(|queue| queue.device == device);
        self.command_buffers.remove_where(|buffer| buffer.device == device);
        self.command_pools.remove_where(|pool| pool.device == device);
        self.swapchains.remove_where(|swapchain| swapchain.device == device);
        log::info!("Destroyed device {:#x}", device.as_raw());
    }

    #[track_caller]
    pub(crate) fn expect_device(&self, device: vk::Device, operation: &str) -> &DeviceRecord {
        match self.devices.get(device.as_raw()) {
            Some(record) => record,
            None => contract::violation(format_args!("{} on unknown device {:#x}", operation, device.as_raw())),
        }
    }

    /// All queues of one create entry share a handle, so `queue_index` only has to be in range.
    pub fn get_device_queue(&self, device: vk::Device, family_index: u32, queue_index: u32) -> vk::Queue {
        let record = self.expect_device(device, "vkGetDeviceQueue");
        let found = record.queues.iter().copied().find(|queue| {
            self.queues
                .get(queue.as_raw())
                .is_some_and(|q| q.family_index == family_index && queue_index < q.queue_count)
        });
        match found {
            Some(queue) => queue,
            None => contract::violation(format_args!(
                "vkGetDeviceQueue: device {:#x} has no queue {} in family {}",
                device.as_raw(),
                queue_index,
                family_index
            )),
        }
    }

    pub fn create_command_pool(&mut self, device: vk::Device, queue_family_index: u32) -> vk::CommandPool {
        self.expect_device(device, "vkCreateCommandPool");
        vk::CommandPool::from_raw(self.command_pools.insert(CommandPoolRecord {
            device,
            queue_family_index,
        }))
    }

    pub fn destroy_command_pool(&mut self, device: vk::Device, pool: vk::CommandPool) {
        if pool == vk::CommandPool::null() {
            return;
        }
        if self.command_pools.remove(pool.as_raw()).is_none() {
            contract::violation(format_args!("destroying unknown command pool {:#x}", pool.as_raw()));
        }
        self.command_buffers
            .remove_where(|buffer| buffer.device == device && buffer.pool == pool);
    }

    pub fn allocate_command_buffers(
        &mut self,
        device: vk::Device,
        pool: vk::CommandPool,
        count: u32,
    ) -> Vec<vk::CommandBuffer> {
        self.expect_device(device, "vkAllocateCommandBuffers");
        if !self.command_pools.contains(pool.as_raw()) {
            contract::violation(format_args!("allocating from unknown command pool {:#x}", pool.as_raw()));
        }
        (0..count)
            .map(|_| vk::CommandBuffer::from_raw(self.command_buffers.insert(CommandBufferRecord { device, pool })))
            .collect()
    }

    pub fn free_command_buffers(&mut self, buffers: &[vk::CommandBuffer]) {
        for buffer in buffers {
            if *buffer == vk::CommandBuffer::null() {
                continue;
            }
            if self.command_buffers.remove(buffer.as_raw()).is_none() {
                contract::violation(format_args!("freeing unknown command buffer {:#x}", buffer.as_raw()));
            }
        }
    }

    pub fn create_surface(&mut self, instance: vk::Instance, created_by: &'static str) -> vk::SurfaceKHR {
        self.expect_instance(instance, created_by);
        vk::SurfaceKHR::from_raw(self.surfaces.insert(SurfaceRecord { instance, created_by }))
    }

    pub fn destroy_surface(&mut self, surface: vk::SurfaceKHR) {
        if surface == vk::SurfaceKHR::null() {
            return;
        }
        if self.surfaces.remove(surface.as_raw()).is_none() {
            contract::violation(format_args!("destroying unknown surface {:#x}", surface.as_raw()));
        }
    }

    pub fn create_swapchain(&mut self, device: vk::Device, surface: vk::SurfaceKHR) -> vk::SwapchainKHR {
        self.expect_device(device, "vkCreateSwapchainKHR");
        vk::SwapchainKHR::from_raw(self.swapchains.insert(SwapchainRecord { device, surface }))
    }

    pub fn destroy_swapchain(&mut self, swapchain: vk::SwapchainKHR) {
        if swapchain == vk::SwapchainKHR::null() {
            return;
        }
        if self.swapchains.remove(swapchain.as_raw()).is_none() {
            contract::violation(format_args!("destroying unknown swapchain {:#x}", swapchain.as_raw()));
        }
    }
}
