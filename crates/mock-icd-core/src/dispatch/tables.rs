//! The resolver tables.

use crate::dispatch::table::{EntryLevel, Gate, ProcEntry, ProcTable, ResolverTables, Scope};
use crate::dispatch::VoidFunction;
use crate::driver::DriverState;
use crate::icd::{debug_utils, device, global, instance, physical_device, stubs, wsi};
use crate::version::ApiVersion;

fn as_void(function: *const ()) -> VoidFunction {
    // SAFETY: only entry-point function pointers reach here; the loader casts them back to the
    // signature of the symbol it asked for.
    unsafe { std::mem::transmute::<*const (), VoidFunction>(function) }
}

macro_rules! entry {
    (wsi $level:ident, $name:literal, $function:path) => {
        ProcEntry {
            icd_wsi: true,
            ..entry!($level, $name, $function)
        }
    };
    ($level:ident, $name:literal, $function:path) => {
        ProcEntry {
            name: $name,
            level: EntryLevel::$level,
            function: as_void($function as *const ()),
            icd_wsi: false,
        }
    };
}

fn global_tables() -> Vec<ProcTable> {
    vec![ProcTable::new(
        "global",
        Gate::Always,
        vec![
            entry!(Global, "vkGetInstanceProcAddr", global::get_instance_proc_addr),
            entry!(Global, "vkCreateInstance", global::create_instance),
            entry!(Global, "vkEnumerateInstanceExtensionProperties", global::enumerate_instance_extension_properties),
            entry!(Global, "vkEnumerateInstanceLayerProperties", global::enumerate_instance_layer_properties),
            entry!(Global, "vkEnumerateInstanceVersion", global::enumerate_instance_version),
        ],
    )]
}

fn supports_tooling_info(state: &DriverState) -> bool {
    state.supports_tooling_info
}

fn instance_tables() -> Vec<ProcTable> {
    let mut tables = vec![
        ProcTable::new(
            "instance core 1.0",
            Gate::Core(ApiVersion::V1_0),
            vec![
                entry!(Instance, "vkDestroyInstance", instance::destroy_instance),
                entry!(Instance, "vkEnumeratePhysicalDevices", instance::enumerate_physical_devices),
                entry!(Device, "vkGetDeviceProcAddr", device::get_device_proc_addr),
                entry!(PhysicalDevice, "vkGetPhysicalDeviceFeatures", physical_device::get_physical_device_features),
                entry!(PhysicalDevice, "vkGetPhysicalDeviceProperties", physical_device::get_physical_device_properties),
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceMemoryProperties",
                    physical_device::get_physical_device_memory_properties
                ),
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceQueueFamilyProperties",
                    physical_device::get_physical_device_queue_family_properties
                ),
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceFormatProperties",
                    physical_device::get_physical_device_format_properties
                ),
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceImageFormatProperties",
                    physical_device::get_physical_device_image_format_properties
                ),
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceSparseImageFormatProperties",
                    physical_device::get_physical_device_sparse_image_format_properties
                ),
                entry!(
                    PhysicalDevice,
                    "vkEnumerateDeviceExtensionProperties",
                    physical_device::enumerate_device_extension_properties
                ),
                entry!(
                    PhysicalDevice,
                    "vkEnumerateDeviceLayerProperties",
                    physical_device::enumerate_device_layer_properties
                ),
                entry!(PhysicalDevice, "vkCreateDevice", physical_device::create_device),
            ],
        ),
        ProcTable::new(
            "instance core 1.1",
            Gate::Core(ApiVersion::V1_1),
            vec![
                entry!(Instance, "vkEnumeratePhysicalDeviceGroups", instance::enumerate_physical_device_groups),
                entry!(PhysicalDevice, "vkGetPhysicalDeviceFeatures2", physical_device::get_physical_device_features2),
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceProperties2",
                    physical_device::get_physical_device_properties2
                ),
            ],
        ),
        ProcTable::new(
            "instance core 1.3",
            Gate::Core(ApiVersion::V1_3),
            vec![entry!(
                PhysicalDevice,
                "vkGetPhysicalDeviceToolProperties",
                physical_device::get_physical_device_tool_properties
            )],
        ),
        ProcTable::new(
            "VK_KHR_surface",
            Gate::InstanceExtension("VK_KHR_surface"),
            vec![
                entry!(wsi Instance, "vkDestroySurfaceKHR", wsi::destroy_surface),
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceSurfaceSupportKHR",
                    wsi::get_physical_device_surface_support
                ),
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceSurfaceCapabilitiesKHR",
                    wsi::get_physical_device_surface_capabilities
                ),
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceSurfaceFormatsKHR",
                    wsi::get_physical_device_surface_formats
                ),
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceSurfacePresentModesKHR",
                    wsi::get_physical_device_surface_present_modes
                ),
            ],
        ),
        ProcTable::new(
            "VK_EXT_headless_surface",
            Gate::InstanceExtension("VK_EXT_headless_surface"),
            vec![entry!(wsi Instance, "vkCreateHeadlessSurfaceEXT", wsi::create_headless_surface)],
        ),
    ];
    tables.extend(platform_surface_tables());
    tables.extend([
        ProcTable::new(
            "VK_KHR_display",
            Gate::InstanceExtension("VK_KHR_display"),
            vec![
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceDisplayPropertiesKHR",
                    wsi::get_physical_device_display_properties
                ),
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceDisplayPlanePropertiesKHR",
                    wsi::get_physical_device_display_plane_properties
                ),
            ],
        ),
        ProcTable::new(
            "VK_EXT_debug_utils",
            Gate::InstanceExtension("VK_EXT_debug_utils"),
            vec![
                entry!(Instance, "vkCreateDebugUtilsMessengerEXT", debug_utils::create_debug_utils_messenger),
                entry!(Instance, "vkDestroyDebugUtilsMessengerEXT", debug_utils::destroy_debug_utils_messenger),
                entry!(Instance, "vkSubmitDebugUtilsMessageEXT", debug_utils::submit_debug_utils_message),
            ],
        ),
        ProcTable::new(
            "VK_KHR_get_physical_device_properties2",
            Gate::InstanceExtension("VK_KHR_get_physical_device_properties2"),
            vec![
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceFeatures2KHR",
                    physical_device::get_physical_device_features2
                ),
                entry!(
                    PhysicalDevice,
                    "vkGetPhysicalDeviceProperties2KHR",
                    physical_device::get_physical_device_properties2
                ),
            ],
        ),
        ProcTable::new(
            "VK_KHR_device_group_creation",
            Gate::InstanceExtension("VK_KHR_device_group_creation"),
            vec![entry!(
                Instance,
                "vkEnumeratePhysicalDeviceGroupsKHR",
                instance::enumerate_physical_device_groups
            )],
        ),
        ProcTable::new(
            "VK_EXT_tooling_info",
            Gate::Fixture(supports_tooling_info),
            vec![entry!(
                PhysicalDevice,
                "vkGetPhysicalDeviceToolPropertiesEXT",
                physical_device::get_physical_device_tool_properties
            )],
        ),
    ]);
    tables
}

/// Window-system surfaces this target can have.
fn platform_surface_tables() -> Vec<ProcTable> {
    #[allow(unused_mut)]
    let mut tables = Vec::new();
    #[cfg(all(unix, not(target_os = "android"), not(target_vendor = "apple")))]
    tables.extend([
        ProcTable::new(
            "VK_KHR_xcb_surface",
            Gate::InstanceExtension("VK_KHR_xcb_surface"),
            vec![entry!(wsi Instance, "vkCreateXcbSurfaceKHR", wsi::create_xcb_surface)],
        ),
        ProcTable::new(
            "VK_KHR_xlib_surface",
            Gate::InstanceExtension("VK_KHR_xlib_surface"),
            vec![entry!(wsi Instance, "vkCreateXlibSurfaceKHR", wsi::create_xlib_surface)],
        ),
        ProcTable::new(
            "VK_KHR_wayland_surface",
            Gate::InstanceExtension("VK_KHR_wayland_surface"),
            vec![entry!(wsi Instance, "vkCreateWaylandSurfaceKHR", wsi::create_wayland_surface)],
        ),
    ]);
    #[cfg(windows)]
    tables.push(ProcTable::new(
        "VK_KHR_win32_surface",
        Gate::InstanceExtension("VK_KHR_win32_surface"),
        vec![entry!(wsi Instance, "vkCreateWin32SurfaceKHR", wsi::create_win32_surface)],
    ));
    #[cfg(target_vendor = "apple")]
    tables.push(ProcTable::new(
        "VK_EXT_metal_surface",
        Gate::InstanceExtension("VK_EXT_metal_surface"),
        vec![entry!(wsi Instance, "vkCreateMetalSurfaceEXT", wsi::create_metal_surface)],
    ));
    #[cfg(target_os = "android")]
    tables.push(ProcTable::new(
        "VK_KHR_android_surface",
        Gate::InstanceExtension("VK_KHR_android_surface"),
        vec![entry!(wsi Instance, "vkCreateAndroidSurfaceKHR", wsi::create_android_surface)],
    ));
    tables
}

fn device_tables() -> Vec<ProcTable> {
    vec![
        ProcTable::new(
            "device core 1.0",
            Gate::Core(ApiVersion::V1_0),
            vec![
                entry!(Device, "vkGetDeviceProcAddr", device::get_device_proc_addr),
                entry!(Device, "vkDestroyDevice", device::destroy_device),
                entry!(Device, "vkGetDeviceQueue", device::get_device_queue),
                entry!(Device, "vkDeviceWaitIdle", stubs::stub_with_result),
                entry!(Device, "vkQueueSubmit", stubs::stub_with_result),
                entry!(Device, "vkQueueWaitIdle", stubs::stub_with_result),
                entry!(Device, "vkCreateCommandPool", device::create_command_pool),
                entry!(Device, "vkDestroyCommandPool", device::destroy_command_pool),
                entry!(Device, "vkAllocateCommandBuffers", device::allocate_command_buffers),
                entry!(Device, "vkFreeCommandBuffers", device::free_command_buffers),
            ],
        ),
        ProcTable::new(
            "device core 1.1",
            Gate::Core(ApiVersion::V1_1),
            vec![
                entry!(Device, "vkGetDeviceQueue2", device::get_device_queue2),
                entry!(Device, "vkTrimCommandPool", stubs::stub_no_result),
            ],
        ),
        ProcTable::new(
            "device core 1.2",
            Gate::Core(ApiVersion::V1_2),
            vec![entry!(Device, "vkResetQueryPool", stubs::stub_no_result)],
        ),
        ProcTable::new(
            "device core 1.3",
            Gate::Core(ApiVersion::V1_3),
            vec![entry!(Device, "vkGetDeviceBufferMemoryRequirements", stubs::stub_no_result)],
        ),
        ProcTable::new(
            "VK_KHR_swapchain",
            Gate::DeviceExtension("VK_KHR_swapchain"),
            vec![
                entry!(Device, "vkCreateSwapchainKHR", wsi::create_swapchain),
                entry!(Device, "vkDestroySwapchainKHR", wsi::destroy_swapchain),
                entry!(Device, "vkGetSwapchainImagesKHR", wsi::get_swapchain_images),
                entry!(Device, "vkAcquireNextImageKHR", wsi::acquire_next_image),
                entry!(Device, "vkQueuePresentKHR", wsi::queue_present),
            ],
        ),
        ProcTable::new(
            "VK_KHR_maintenance1",
            Gate::DeviceExtension("VK_KHR_maintenance1"),
            vec![entry!(Device, "vkTrimCommandPoolKHR", stubs::stub_no_result)],
        ),
        ProcTable::new(
            "VK_EXT_host_query_reset",
            Gate::DeviceExtension("VK_EXT_host_query_reset"),
            vec![entry!(Device, "vkResetQueryPoolEXT", stubs::stub_no_result)],
        ),
    ]
}

pub(crate) fn build() -> ResolverTables {
    let tables = ResolverTables {
        global: Scope::new(global_tables()),
        instance: Scope::new(instance_tables()),
        device: Scope::new(device_tables()),
    };
    log::debug!(
        "Resolver tables built: {} instance tables, {} device tables",
        tables.instance.tables().len(),
        tables.device.tables().len()
    );
    tables
}
