//! Physical-device-level queries and device creation.

use std::ffi::c_char;

use ash::vk;
use ash::vk::Handle;

use crate::abi::{fill_raw, fill_raw_copied, fill_raw_in_place};
use crate::contract;
use crate::driver::extension_chain::fill_properties_chain;
use crate::driver::{with_driver, DeviceCreateRequest, QueueRequest, ToolRecord};
use crate::icd::{read_name, read_name_list, write_out};
use crate::registry::{write_fixed_str, ExtensionRecord};

pub unsafe extern "system" fn get_physical_device_features(
    physical_device: vk::PhysicalDevice,
    p_features: *mut vk::PhysicalDeviceFeatures,
) {
    let features = with_driver(|state| state.physical_device(physical_device).features);
    unsafe { write_out(p_features, features) };
}

pub unsafe extern "system" fn get_physical_device_properties(
    physical_device: vk::PhysicalDevice,
    p_properties: *mut vk::PhysicalDeviceProperties,
) {
    let properties = with_driver(|state| state.physical_device(physical_device).properties);
    unsafe { write_out(p_properties, properties) };
}

pub unsafe extern "system" fn get_physical_device_memory_properties(
    physical_device: vk::PhysicalDevice,
    p_memory_properties: *mut vk::PhysicalDeviceMemoryProperties,
) {
    let memory = with_driver(|state| state.physical_device(physical_device).memory_properties);
    unsafe { write_out(p_memory_properties, memory) };
}

pub unsafe extern "system" fn get_physical_device_queue_family_properties(
    physical_device: vk::PhysicalDevice,
    p_queue_family_property_count: *mut u32,
    p_queue_family_properties: *mut vk::QueueFamilyProperties,
) {
    let _ = with_driver(|state| unsafe {
        fill_raw(
            &state.physical_device(physical_device).queue_families,
            p_queue_family_property_count,
            p_queue_family_properties,
            |family| family.properties,
        )
    });
}

pub unsafe extern "system" fn get_physical_device_format_properties(
    physical_device: vk::PhysicalDevice,
    _format: vk::Format,
    p_format_properties: *mut vk::FormatProperties,
) {
    with_driver(|state| state.expect_physical_device(physical_device));
    unsafe { write_out(p_format_properties, vk::FormatProperties::default()) };
}

pub unsafe extern "system" fn get_physical_device_image_format_properties(
    physical_device: vk::PhysicalDevice,
    _format: vk::Format,
    _image_type: vk::ImageType,
    _tiling: vk::ImageTiling,
    _usage: vk::ImageUsageFlags,
    _flags: vk::ImageCreateFlags,
    p_image_format_properties: *mut vk::ImageFormatProperties,
) -> vk::Result {
    with_driver(|state| state.expect_physical_device(physical_device));
    unsafe { write_out(p_image_format_properties, vk::ImageFormatProperties::default()) };
    vk::Result::SUCCESS
}

pub unsafe extern "system" fn get_physical_device_sparse_image_format_properties(
    physical_device: vk::PhysicalDevice,
    _format: vk::Format,
    _image_type: vk::ImageType,
    _samples: vk::SampleCountFlags,
    _usage: vk::ImageUsageFlags,
    _tiling: vk::ImageTiling,
    p_property_count: *mut u32,
    p_properties: *mut vk::SparseImageFormatProperties,
) {
    with_driver(|state| state.expect_physical_device(physical_device));
    let none: [vk::SparseImageFormatProperties; 0] = [];
    let _ = unsafe { fill_raw_copied(&none, p_property_count, p_properties) };
}

pub unsafe extern "system" fn enumerate_device_extension_properties(
    physical_device: vk::PhysicalDevice,
    p_layer_name: *const c_char,
    p_property_count: *mut u32,
    p_properties: *mut vk::ExtensionProperties,
) -> vk::Result {
    if let Some(layer) = unsafe { read_name(p_layer_name) } {
        contract::violation(format_args!("device extensions requested for layer '{}'", layer));
    }
    log::trace!("vkEnumerateDeviceExtensionProperties({:#x})", physical_device.as_raw());
    with_driver(|state| unsafe {
        fill_raw(
            state.physical_device(physical_device).extensions.available(),
            p_property_count,
            p_properties,
            ExtensionRecord::to_properties,
        )
    })
}

/// Device layers are a loader concern; a driver is never asked for them.
pub unsafe extern "system" fn enumerate_device_layer_properties(
    physical_device: vk::PhysicalDevice,
    _p_property_count: *mut u32,
    _p_properties: *mut vk::LayerProperties,
) -> vk::Result {
    contract::violation(format_args!(
        "vkEnumerateDeviceLayerProperties called on physical device {:#x}",
        physical_device.as_raw()
    ))
}

pub unsafe extern "system" fn create_device(
    physical_device: vk::PhysicalDevice,
    p_create_info: *const vk::DeviceCreateInfo<'_>,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_device: *mut vk::Device,
) -> vk::Result {
    log::trace!("vkCreateDevice({:#x})", physical_device.as_raw());
    let mut request = DeviceCreateRequest::default();
    if let Some(info) = unsafe { p_create_info.as_ref() } {
        if !info.p_queue_create_infos.is_null() {
            // SAFETY: the create info promises queue_create_info_count entries.
            let queues = unsafe {
                std::slice::from_raw_parts(info.p_queue_create_infos, info.queue_create_info_count as usize)
            };
            request.queues = queues
                .iter()
                .map(|queue| QueueRequest {
                    family_index: queue.queue_family_index,
                    queue_count: queue.queue_count,
                })
                .collect();
        }
        request.enabled_extensions =
            unsafe { read_name_list(info.pp_enabled_extension_names, info.enabled_extension_count) };
    }
    match with_driver(|state| state.create_device(physical_device, &request)) {
        Ok(device) => {
            unsafe { write_out(p_device, device) };
            vk::Result::SUCCESS
        }
        Err(result) => result,
    }
}

pub unsafe extern "system" fn get_physical_device_features2(
    physical_device: vk::PhysicalDevice,
    p_features: *mut vk::PhysicalDeviceFeatures2<'_>,
) {
    let features = with_driver(|state| state.physical_device(physical_device).features);
    if let Some(out) = unsafe { p_features.as_mut() } {
        out.features = features;
    }
}

/// Fills the core block and the chain nodes the driver knows. Other nodes are left alone.
pub unsafe extern "system" fn get_physical_device_properties2(
    physical_device: vk::PhysicalDevice,
    p_properties: *mut vk::PhysicalDeviceProperties2<'_>,
) {
    with_driver(|state| {
        let descriptor = state.physical_device(physical_device);
        if let Some(out) = unsafe { p_properties.as_mut() } {
            out.properties = descriptor.properties;
            unsafe { fill_properties_chain(out.p_next, descriptor) };
        }
    });
}

fn write_tool(tool: &ToolRecord, out: &mut vk::PhysicalDeviceToolProperties<'_>) {
    write_fixed_str(&mut out.name, &tool.name);
    write_fixed_str(&mut out.version, &tool.version);
    write_fixed_str(&mut out.description, &tool.description);
    write_fixed_str(&mut out.layer, &tool.layer);
    out.purposes = vk::ToolPurposeFlags::from_raw(tool.purposes);
}

pub unsafe extern "system" fn get_physical_device_tool_properties(
    physical_device: vk::PhysicalDevice,
    p_tool_count: *mut u32,
    p_tool_properties: *mut vk::PhysicalDeviceToolProperties<'_>,
) -> vk::Result {
    log::trace!("vkGetPhysicalDeviceToolProperties({:#x})", physical_device.as_raw());
    let tools = with_driver(|state| {
        state.expect_physical_device(physical_device);
        state.tooling_properties.clone()
    });
    unsafe { fill_raw_in_place(&tools, p_tool_count, p_tool_properties, write_tool) }
}
