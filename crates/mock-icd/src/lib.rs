//! # Mock ICD
//!
//! The loadable driver library. Point a loader manifest at the built `cdylib` and the loader finds
//! the exports below by name; everything behind them lives in `mock-icd-core`.
//!
//! Which exports exist depends on the crate features, so one source tree can stand in for drivers
//! built against different loader interface versions:
//!
//! - `negotiate`: `vk_icdNegotiateLoaderICDInterfaceVersion`
//! - `gpdpa`: `vk_icdGetPhysicalDeviceProcAddr`
//! - `adapter-enumeration`: `vk_icdEnumerateAdapterPhysicalDevices` (Windows only)
//! - `legacy-gipa`: un-prefixed `vkGetInstanceProcAddr`, `vkCreateInstance` and
//!   `vkEnumerateInstanceExtensionProperties`
//!
//! `get_test_icd_func` and `reset_icd_func` are always exported so a test can reach the driver's
//! one [`DriverState`] directly. Set `RUST_LOG` to see the driver's log output and
//! `MOCK_ICD_FIXTURE` to start from a fixture file.

#![allow(non_snake_case)]

use std::ffi::c_char;
use std::sync::Once;

use ash::vk;
use mock_icd_core::icd::exports;
#[cfg(feature = "legacy-gipa")]
use mock_icd_core::icd::global;
use mock_icd_core::DriverState;

static LOGGER: Once = Once::new();

/// Installs `env_logger` the first time the loader talks to the driver. A host that already
/// installed a logger keeps it.
fn init_logging() {
    LOGGER.call_once(|| {
        if env_logger::try_init().is_ok() {
            log::debug!("mock ICD logging initialised");
        }
    });
}

/// # Safety
/// `p_supported_version` must be null or valid for reads and writes.
#[cfg(feature = "negotiate")]
#[unsafe(no_mangle)]
pub unsafe extern "system" fn vk_icdNegotiateLoaderICDInterfaceVersion(p_supported_version: *mut u32) -> vk::Result {
    init_logging();
    unsafe { exports::negotiate_loader_icd_interface_version(p_supported_version) }
}

/// # Safety
/// `p_name` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "system" fn vk_icdGetInstanceProcAddr(
    instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    init_logging();
    unsafe { exports::icd_get_instance_proc_addr(instance, p_name) }
}

/// # Safety
/// `p_name` must be null or a NUL-terminated string.
#[cfg(feature = "gpdpa")]
#[unsafe(no_mangle)]
pub unsafe extern "system" fn vk_icdGetPhysicalDeviceProcAddr(
    instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    unsafe { exports::icd_get_physical_device_proc_addr(instance, p_name) }
}

/// # Safety
/// Count and array pointers follow the usual two-call rules.
#[cfg(all(windows, feature = "adapter-enumeration"))]
#[unsafe(no_mangle)]
pub unsafe extern "system" fn vk_icdEnumerateAdapterPhysicalDevices(
    instance: vk::Instance,
    adapter_luid: mock_icd_core::driver::AdapterLuid,
    p_physical_device_count: *mut u32,
    p_physical_devices: *mut vk::PhysicalDevice,
) -> vk::Result {
    unsafe {
        exports::icd_enumerate_adapter_physical_devices(
            instance,
            adapter_luid,
            p_physical_device_count,
            p_physical_devices,
        )
    }
}

/// # Safety
/// `p_name` must be null or a NUL-terminated string.
#[cfg(feature = "legacy-gipa")]
#[unsafe(no_mangle)]
pub unsafe extern "system" fn vkGetInstanceProcAddr(
    instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    init_logging();
    unsafe { exports::legacy_get_instance_proc_addr(instance, p_name) }
}

/// # Safety
/// Same contract as `vkCreateInstance`.
#[cfg(feature = "legacy-gipa")]
#[unsafe(no_mangle)]
pub unsafe extern "system" fn vkCreateInstance(
    p_create_info: *const vk::InstanceCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_instance: *mut vk::Instance,
) -> vk::Result {
    unsafe { global::create_instance(p_create_info, p_allocator, p_instance) }
}

/// # Safety
/// Same contract as `vkEnumerateInstanceExtensionProperties`.
#[cfg(feature = "legacy-gipa")]
#[unsafe(no_mangle)]
pub unsafe extern "system" fn vkEnumerateInstanceExtensionProperties(
    p_layer_name: *const c_char,
    p_property_count: *mut u32,
    p_properties: *mut vk::ExtensionProperties,
) -> vk::Result {
    unsafe { global::enumerate_instance_extension_properties(p_layer_name, p_property_count, p_properties) }
}

/// The driver's fixture, shared by every thread. Stays valid, and keeps pointing at the same object, across
/// [`reset_icd_func`].
#[unsafe(no_mangle)]
pub extern "system" fn get_test_icd_func() -> *mut DriverState {
    mock_icd_core::current_driver_ptr()
}

/// Restores the driver to its initial fixture.
#[unsafe(no_mangle)]
pub extern "system" fn reset_icd_func() -> *mut DriverState {
    mock_icd_core::reset_current_driver()
}
