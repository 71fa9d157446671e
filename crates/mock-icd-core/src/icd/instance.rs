//! Instance-level entry points.

use ash::vk;
use ash::vk::Handle;

use crate::abi::{fill_raw_copied, fill_raw_in_place};
use crate::driver::{with_driver, PhysicalDeviceGroup};

pub unsafe extern "system" fn destroy_instance(
    instance: vk::Instance,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    log::trace!("vkDestroyInstance({:#x})", instance.as_raw());
    with_driver(|state| state.destroy_instance(instance));
}

pub unsafe extern "system" fn enumerate_physical_devices(
    instance: vk::Instance,
    p_physical_device_count: *mut u32,
    p_physical_devices: *mut vk::PhysicalDevice,
) -> vk::Result {
    log::trace!("vkEnumeratePhysicalDevices({:#x})", instance.as_raw());
    let handles = with_driver(|state| state.enumerate_physical_devices(instance));
    unsafe { fill_raw_copied(&handles, p_physical_device_count, p_physical_devices) }
}

fn write_group(group: &PhysicalDeviceGroup, out: &mut vk::PhysicalDeviceGroupProperties<'_>) {
    // Groups are capped at MAX_DEVICE_GROUP_SIZE when they are added.
    let count = group.physical_devices.len();
    out.physical_devices = [vk::PhysicalDevice::null(); vk::MAX_DEVICE_GROUP_SIZE];
    out.physical_devices[..count].copy_from_slice(&group.physical_devices[..count]);
    out.physical_device_count = count as u32;
    out.subset_allocation = vk::Bool32::from(group.subset_allocation);
}

/// Writes each group into the caller's structure, keeping its `s_type` and `p_next`.
pub unsafe extern "system" fn enumerate_physical_device_groups(
    instance: vk::Instance,
    p_group_count: *mut u32,
    p_groups: *mut vk::PhysicalDeviceGroupProperties<'_>,
) -> vk::Result {
    log::trace!("vkEnumeratePhysicalDeviceGroups({:#x})", instance.as_raw());
    let groups = with_driver(|state| {
        state.expect_instance(instance, "vkEnumeratePhysicalDeviceGroups");
        state.physical_device_group_list()
    });
    unsafe { fill_raw_in_place(&groups, p_group_count, p_groups, write_group) }
}
