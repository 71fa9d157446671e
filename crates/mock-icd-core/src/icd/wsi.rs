//! Surface, display and swapchain entry points.

use std::ffi::c_void;

use ash::vk;
use ash::vk::Handle;

use crate::abi::fill_raw_copied;
use crate::driver::with_driver;
use crate::icd::write_out;

/// Every platform create-surface call has the same shape apart from its create info.
unsafe fn create_surface_as(symbol: &'static str, instance: vk::Instance, p_surface: *mut vk::SurfaceKHR) -> vk::Result {
    log::trace!("{}({:#x})", symbol, instance.as_raw());
    let surface = with_driver(|state| state.create_surface(instance, symbol));
    unsafe { write_out(p_surface, surface) };
    vk::Result::SUCCESS
}

macro_rules! surface_creator {
    ($(#[$attr:meta])* $name:ident, $symbol:literal) => {
        $(#[$attr])*
        pub unsafe extern "system" fn $name(
            instance: vk::Instance,
            _p_create_info: *const c_void,
            _p_allocator: *const vk::AllocationCallbacks<'_>,
            p_surface: *mut vk::SurfaceKHR,
        ) -> vk::Result {
            unsafe { create_surface_as($symbol, instance, p_surface) }
        }
    };
}

surface_creator!(create_headless_surface, "vkCreateHeadlessSurfaceEXT");
surface_creator!(
    #[cfg(all(unix, not(target_os = "android"), not(target_vendor = "apple")))]
    create_xcb_surface,
    "vkCreateXcbSurfaceKHR"
);
surface_creator!(
    #[cfg(all(unix, not(target_os = "android"), not(target_vendor = "apple")))]
    create_xlib_surface,
    "vkCreateXlibSurfaceKHR"
);
surface_creator!(
    #[cfg(all(unix, not(target_os = "android"), not(target_vendor = "apple")))]
    create_wayland_surface,
    "vkCreateWaylandSurfaceKHR"
);
surface_creator!(#[cfg(windows)] create_win32_surface, "vkCreateWin32SurfaceKHR");
surface_creator!(#[cfg(target_vendor = "apple")] create_metal_surface, "vkCreateMetalSurfaceEXT");
surface_creator!(#[cfg(target_os = "android")] create_android_surface, "vkCreateAndroidSurfaceKHR");

pub unsafe extern "system" fn destroy_surface(
    instance: vk::Instance,
    surface: vk::SurfaceKHR,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    log::trace!("vkDestroySurfaceKHR({:#x}, {:#x})", instance.as_raw(), surface.as_raw());
    with_driver(|state| state.destroy_surface(surface));
}

pub unsafe extern "system" fn get_physical_device_surface_support(
    physical_device: vk::PhysicalDevice,
    queue_family_index: u32,
    _surface: vk::SurfaceKHR,
    p_supported: *mut vk::Bool32,
) -> vk::Result {
    let supported = with_driver(|state| state.physical_device(physical_device).supports_present(queue_family_index));
    unsafe { write_out(p_supported, vk::Bool32::from(supported.unwrap_or(false))) };
    vk::Result::SUCCESS
}

pub unsafe extern "system" fn get_physical_device_surface_capabilities(
    physical_device: vk::PhysicalDevice,
    _surface: vk::SurfaceKHR,
    p_surface_capabilities: *mut vk::SurfaceCapabilitiesKHR,
) -> vk::Result {
    let capabilities = with_driver(|state| state.physical_device(physical_device).surface_capabilities);
    unsafe { write_out(p_surface_capabilities, capabilities) };
    vk::Result::SUCCESS
}

pub unsafe extern "system" fn get_physical_device_surface_formats(
    physical_device: vk::PhysicalDevice,
    _surface: vk::SurfaceKHR,
    p_surface_format_count: *mut u32,
    p_surface_formats: *mut vk::SurfaceFormatKHR,
) -> vk::Result {
    with_driver(|state| unsafe {
        fill_raw_copied(
            &state.physical_device(physical_device).surface_formats,
            p_surface_format_count,
            p_surface_formats,
        )
    })
}

pub unsafe extern "system" fn get_physical_device_surface_present_modes(
    physical_device: vk::PhysicalDevice,
    _surface: vk::SurfaceKHR,
    p_present_mode_count: *mut u32,
    p_present_modes: *mut vk::PresentModeKHR,
) -> vk::Result {
    with_driver(|state| unsafe {
        fill_raw_copied(
            &state.physical_device(physical_device).present_modes,
            p_present_mode_count,
            p_present_modes,
        )
    })
}

pub unsafe extern "system" fn get_physical_device_display_properties(
    physical_device: vk::PhysicalDevice,
    p_property_count: *mut u32,
    p_properties: *mut vk::DisplayPropertiesKHR<'_>,
) -> vk::Result {
    with_driver(|state| {
        let descriptor = state.physical_device(physical_device);
        let properties = descriptor.display_properties();
        // Name pointers stay valid: they borrow the descriptor, which outlives the call.
        unsafe { fill_raw_copied(&properties, p_property_count, p_properties.cast()) }
    })
}

pub unsafe extern "system" fn get_physical_device_display_plane_properties(
    physical_device: vk::PhysicalDevice,
    p_property_count: *mut u32,
    p_properties: *mut vk::DisplayPlanePropertiesKHR,
) -> vk::Result {
    with_driver(|state| unsafe {
        fill_raw_copied(
            &state.physical_device(physical_device).display_planes,
            p_property_count,
            p_properties,
        )
    })
}

pub unsafe extern "system" fn create_swapchain(
    device: vk::Device,
    p_create_info: *const vk::SwapchainCreateInfoKHR<'_>,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_swapchain: *mut vk::SwapchainKHR,
) -> vk::Result {
    let surface = unsafe { p_create_info.as_ref() }.map_or(vk::SurfaceKHR::null(), |info| info.surface);
    let swapchain = with_driver(|state| state.create_swapchain(device, surface));
    unsafe { write_out(p_swapchain, swapchain) };
    vk::Result::SUCCESS
}

pub unsafe extern "system" fn destroy_swapchain(
    _device: vk::Device,
    swapchain: vk::SwapchainKHR,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    with_driver(|state| state.destroy_swapchain(swapchain));
}

/// Swapchains own no images.
pub unsafe extern "system" fn get_swapchain_images(
    _device: vk::Device,
    _swapchain: vk::SwapchainKHR,
    p_swapchain_image_count: *mut u32,
    p_swapchain_images: *mut vk::Image,
) -> vk::Result {
    let none: [vk::Image; 0] = [];
    unsafe { fill_raw_copied(&none, p_swapchain_image_count, p_swapchain_images) }
}

pub unsafe extern "system" fn acquire_next_image(
    _device: vk::Device,
    _swapchain: vk::SwapchainKHR,
    _timeout: u64,
    _semaphore: vk::Semaphore,
    _fence: vk::Fence,
    p_image_index: *mut u32,
) -> vk::Result {
    unsafe { write_out(p_image_index, 0) };
    vk::Result::SUCCESS
}

pub unsafe extern "system" fn queue_present(
    _queue: vk::Queue,
    _p_present_info: *const vk::PresentInfoKHR<'_>,
) -> vk::Result {
    vk::Result::SUCCESS
}
