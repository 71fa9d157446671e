//! Bodies of the symbols the driver library exports by name.
//!
//! The cdylib re-exports these under their loader-visible names; keeping the bodies here lets the
//! engine's own tests drive them.

use std::ffi::c_char;

use ash::vk;
use ash::vk::Handle;

use crate::abi::fill_raw_copied;
use crate::driver::{with_driver, AdapterLuid};
use crate::icd::{global, read_name};
use crate::negotiate::CalledIcdGipa;

/// `vk_icdNegotiateLoaderICDInterfaceVersion`.
pub unsafe extern "system" fn negotiate_loader_icd_interface_version(p_supported_version: *mut u32) -> vk::Result {
    let Some(requested) = (unsafe { p_supported_version.as_mut() }) else {
        log::warn!("Interface negotiation called without a version pointer");
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    };
    log::trace!("vk_icdNegotiateLoaderICDInterfaceVersion({})", *requested);
    with_driver(|state| state.negotiator.negotiate(requested))
}

/// `vk_icdGetInstanceProcAddr`.
pub unsafe extern "system" fn icd_get_instance_proc_addr(
    instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    with_driver(|state| state.negotiator.record_gipa(CalledIcdGipa::VkIcdGipa));
    unsafe { global::get_instance_proc_addr(instance, p_name) }
}

/// Plain `vkGetInstanceProcAddr` exported by drivers that predate the `vk_icd` prefix.
pub unsafe extern "system" fn legacy_get_instance_proc_addr(
    instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    with_driver(|state| state.negotiator.record_gipa(CalledIcdGipa::VkGipa));
    unsafe { global::get_instance_proc_addr(instance, p_name) }
}

/// `vk_icdGetPhysicalDeviceProcAddr`.
pub unsafe extern "system" fn icd_get_physical_device_proc_addr(
    instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    let name = unsafe { read_name(p_name) }?;
    log::trace!("vk_icdGetPhysicalDeviceProcAddr({:#x}, {})", instance.as_raw(), name);
    with_driver(|state| state.resolve_physical_device_proc(instance, &name))
}

/// `vk_icdEnumerateAdapterPhysicalDevices`.
pub unsafe extern "system" fn icd_enumerate_adapter_physical_devices(
    instance: vk::Instance,
    adapter_luid: AdapterLuid,
    p_physical_device_count: *mut u32,
    p_physical_devices: *mut vk::PhysicalDevice,
) -> vk::Result {
    log::trace!("vk_icdEnumerateAdapterPhysicalDevices({:#x}, {:?})", instance.as_raw(), adapter_luid);
    match with_driver(|state| state.enumerate_adapter_physical_devices(instance, adapter_luid)) {
        Ok(handles) => unsafe { fill_raw_copied(&handles, p_physical_device_count, p_physical_devices) },
        Err(result) => result,
    }
}
