use std::ffi::CString;

use ash::vk;

use crate::driver::records::{AdapterLuid, VulkanFunction};
use crate::registry::{write_fixed_str, ExtensionCatalogue, ExtensionRecord};
use crate::version::ApiVersion;

#[derive(Debug, Clone, Copy, Default)]
pub struct QueueFamily {
    pub properties: vk::QueueFamilyProperties,
    pub supports_present: bool,
}

impl QueueFamily {
    pub fn new(flags: vk::QueueFlags, queue_count: u32) -> Self {
        Self {
            properties: vk::QueueFamilyProperties {
                queue_flags: flags,
                queue_count,
                ..Default::default()
            },
            supports_present: false,
        }
    }

    pub fn with_present(mut self, supports_present: bool) -> Self {
        self.supports_present = supports_present;
        self
    }
}

/// A display attached to a physical device. `handle` is assigned when the device is registered.
#[derive(Debug, Clone)]
pub struct DisplayDescriptor {
    pub name: CString,
    pub physical_resolution: vk::Extent2D,
    pub handle: vk::DisplayKHR,
}

impl DisplayDescriptor {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: CString::new(name.replace('\0', "")).unwrap_or_default(),
            physical_resolution: vk::Extent2D { width, height },
            handle: vk::DisplayKHR::null(),
        }
    }
}

/// Everything the driver reports about one emulated GPU.
#[derive(Debug, Clone)]
pub struct PhysicalDeviceDescriptor {
    pub name: String,
    pub properties: vk::PhysicalDeviceProperties,
    pub features: vk::PhysicalDeviceFeatures,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub queue_families: Vec<QueueFamily>,
    pub extensions: ExtensionCatalogue,
    pub surface_capabilities: vk::SurfaceCapabilitiesKHR,
    pub surface_formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub displays: Vec<DisplayDescriptor>,
    pub display_planes: Vec<vk::DisplayPlanePropertiesKHR>,
    /// Device-level functions the test supplies itself.
    pub custom_functions: Vec<VulkanFunction>,
    /// Device-level symbols resolved to a do-nothing stub.
    pub known_device_functions: Vec<String>,
    pub adapter_luid: Option<AdapterLuid>,
    pub device_uuid: [u8; vk::UUID_SIZE],
    pub driver_name: String,
    pub driver_info: String,
    /// Devices created from this physical device, in creation order.
    pub device_handles: Vec<vk::Device>,
}

impl PhysicalDeviceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut properties = vk::PhysicalDeviceProperties {
            api_version: ApiVersion::V1_0.to_packed(),
            device_type: vk::PhysicalDeviceType::OTHER,
            ..Default::default()
        };
        write_fixed_str(&mut properties.device_name, &name);
        Self {
            name,
            properties,
            features: vk::PhysicalDeviceFeatures::default(),
            memory_properties: vk::PhysicalDeviceMemoryProperties::default(),
            queue_families: Vec::new(),
            extensions: ExtensionCatalogue::new(),
            surface_capabilities: vk::SurfaceCapabilitiesKHR::default(),
            surface_formats: Vec::new(),
            present_modes: Vec::new(),
            displays: Vec::new(),
            display_planes: Vec::new(),
            custom_functions: Vec::new(),
            known_device_functions: Vec::new(),
            adapter_luid: None,
            device_uuid: [0; vk::UUID_SIZE],
            driver_name: "Mock ICD".to_string(),
            driver_info: env!("CARGO_PKG_VERSION").to_string(),
            device_handles: Vec::new(),
        }
    }

    pub fn with_api_version(mut self, version: ApiVersion) -> Self {
        self.properties.api_version = version.to_packed();
        self
    }

    pub fn with_ids(mut self, vendor_id: u32, device_id: u32) -> Self {
        self.properties.vendor_id = vendor_id;
        self.properties.device_id = device_id;
        self
    }

    pub fn with_device_type(mut self, device_type: vk::PhysicalDeviceType) -> Self {
        self.properties.device_type = device_type;
        self
    }

    pub fn with_queue_family(mut self, family: QueueFamily) -> Self {
        self.queue_families.push(family);
        self
    }

    pub fn with_extension(mut self, extension: ExtensionRecord) -> Self {
        self.extensions.add(extension);
        self
    }

    pub fn with_surface_format(mut self, format: vk::SurfaceFormatKHR) -> Self {
        self.surface_formats.push(format);
        self
    }

    pub fn with_present_mode(mut self, mode: vk::PresentModeKHR) -> Self {
        self.present_modes.push(mode);
        self
    }

    pub fn with_display(mut self, display: DisplayDescriptor) -> Self {
        self.displays.push(display);
        self
    }

    pub fn with_custom_function(mut self, function: VulkanFunction) -> Self {
        self.custom_functions.push(function);
        self
    }

    pub fn with_known_device_function(mut self, name: impl Into<String>) -> Self {
        self.known_device_functions.push(name.into());
        self
    }

    pub fn with_adapter_luid(mut self, luid: AdapterLuid) -> Self {
        self.adapter_luid = Some(luid);
        self
    }

    /// API version from the properties snapshot; zero reads as 1.0.
    pub fn api_version(&self) -> ApiVersion {
        ApiVersion::from_requested(self.properties.api_version)
    }

    pub fn supports_present(&self, family_index: u32) -> Option<bool> {
        self.queue_families
            .get(family_index as usize)
            .map(|family| family.supports_present)
    }

    pub fn display_properties(&self) -> Vec<vk::DisplayPropertiesKHR<'_>> {
        self.displays
            .iter()
            .map(|display| vk::DisplayPropertiesKHR {
                display: display.handle,
                display_name: display.name.as_ptr(),
                physical_resolution: display.physical_resolution,
                ..Default::default()
            })
            .collect()
    }
}

/// Physical devices presented together by `vkEnumeratePhysicalDeviceGroups`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhysicalDeviceGroup {
    pub physical_devices: Vec<vk::PhysicalDevice>,
    pub subset_allocation: bool,
}

impl PhysicalDeviceGroup {
    pub fn new(physical_devices: Vec<vk::PhysicalDevice>) -> Self {
        Self {
            physical_devices,
            subset_allocation: false,
        }
    }

    pub fn with_subset_allocation(mut self, subset_allocation: bool) -> Self {
        self.subset_allocation = subset_allocation;
        self
    }
}
