use std::ffi::c_void;

use ash::vk;
use serde::{Deserialize, Serialize};

use crate::dispatch::VoidFunction;
use crate::registry::EnabledExtensions;
use crate::version::ApiVersion;

/// A function a test registers under a symbol name the resolver does not know.
#[derive(Debug, Clone)]
pub struct VulkanFunction {
    pub name: String,
    pub function: VoidFunction,
}

impl VulkanFunction {
    pub fn new(name: impl Into<String>, function: VoidFunction) -> Self {
        Self {
            name: name.into(),
            function,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InstanceRecord {
    /// `min(application apiVersion, driver apiVersion)`.
    pub api_version: ApiVersion,
    /// Raw `apiVersion` from the application info.
    pub requested_api_version: u32,
    pub enabled_extensions: EnabledExtensions,
    pub enabled_layers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DeviceRecord {
    pub physical_device: vk::PhysicalDevice,
    pub api_version: ApiVersion,
    pub enabled_extensions: EnabledExtensions,
    pub queues: Vec<vk::Queue>,
}

#[derive(Debug, Clone, Copy)]
pub struct QueueRecord {
    pub device: vk::Device,
    pub family_index: u32,
    /// Number of queues the create entry asked for; all of them share this handle.
    pub queue_count: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct CommandPoolRecord {
    pub device: vk::Device,
    pub queue_family_index: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct CommandBufferRecord {
    pub device: vk::Device,
    pub pool: vk::CommandPool,
}

#[derive(Debug, Clone, Copy)]
pub struct SurfaceRecord {
    pub instance: vk::Instance,
    /// Entry point that created the surface, e.g. `vkCreateHeadlessSurfaceEXT`.
    pub created_by: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct SwapchainRecord {
    pub device: vk::Device,
    pub surface: vk::SurfaceKHR,
}

#[derive(Debug, Clone, Copy)]
pub struct MessengerRecord {
    pub instance: vk::Instance,
    pub severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    pub types: vk::DebugUtilsMessageTypeFlagsEXT,
    pub callback: vk::PFN_vkDebugUtilsMessengerCallbackEXT,
    pub user_data: *mut c_void,
}

/// Whether the loader routed surface calls to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UsingIcdProvidedWsi {
    #[default]
    NotUsing,
    IsUsing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalledEnumerateAdapterPhysicalDevices {
    #[default]
    NotCalled,
    Called,
    CalledButNotSupported,
}

/// One tool reported by `vkGetPhysicalDeviceToolProperties`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRecord {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub layer: String,
    /// Raw `VkToolPurposeFlags`.
    #[serde(default)]
    pub purposes: u32,
}

impl ToolRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            layer: String::new(),
            purposes: vk::ToolPurposeFlags::VALIDATION.as_raw(),
        }
    }
}

/// Windows adapter LUID, laid out like the platform `LUID` struct.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdapterLuid {
    pub low_part: u32,
    pub high_part: i32,
}

impl AdapterLuid {
    pub fn to_bytes(self) -> [u8; vk::LUID_SIZE] {
        let mut bytes = [0u8; vk::LUID_SIZE];
        bytes[..4].copy_from_slice(&self.low_part.to_le_bytes());
        bytes[4..].copy_from_slice(&self.high_part.to_le_bytes());
        bytes
    }
}
