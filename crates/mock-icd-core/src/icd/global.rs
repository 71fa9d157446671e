//! Entry points usable without an instance.

use std::ffi::c_char;

use ash::vk;
use ash::vk::Handle;

use crate::abi::fill_raw;
use crate::driver::extension_chain::chained_messengers;
use crate::driver::{with_driver, InstanceCreateRequest};
use crate::icd::{read_name, read_name_list, write_out};
use crate::registry::{ExtensionRecord, LayerRecord};

pub unsafe extern "system" fn get_instance_proc_addr(
    instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    let name = unsafe { read_name(p_name) }?;
    log::trace!("vkGetInstanceProcAddr({:#x}, {})", instance.as_raw(), name);
    with_driver(|state| state.resolve_instance_proc(instance, &name))
}

pub unsafe extern "system" fn create_instance(
    p_create_info: *const vk::InstanceCreateInfo<'_>,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_instance: *mut vk::Instance,
) -> vk::Result {
    log::trace!("vkCreateInstance");
    let request = unsafe { p_create_info.as_ref() }.map(|info| InstanceCreateRequest {
        application_api_version: unsafe { info.p_application_info.as_ref() }.map(|app| app.api_version),
        enabled_layers: unsafe { read_name_list(info.pp_enabled_layer_names, info.enabled_layer_count) },
        enabled_extensions: unsafe {
            read_name_list(info.pp_enabled_extension_names, info.enabled_extension_count)
        },
        debug_messengers: unsafe { chained_messengers(info.p_next) },
    });
    match with_driver(|state| state.create_instance(request.as_ref())) {
        Ok(instance) => {
            unsafe { write_out(p_instance, instance) };
            vk::Result::SUCCESS
        }
        Err(result) => result,
    }
}

pub unsafe extern "system" fn enumerate_instance_extension_properties(
    p_layer_name: *const c_char,
    p_property_count: *mut u32,
    p_properties: *mut vk::ExtensionProperties,
) -> vk::Result {
    let layer_name = unsafe { read_name(p_layer_name) };
    log::trace!("vkEnumerateInstanceExtensionProperties({:?})", layer_name);
    with_driver(|state| match layer_name {
        None => {
            state.ensure_instance_catalogue();
            unsafe {
                fill_raw(
                    state.instance_extensions.available(),
                    p_property_count,
                    p_properties,
                    ExtensionRecord::to_properties,
                )
            }
        }
        Some(layer_name) => match state.instance_layers.iter().find(|layer| layer.name == layer_name) {
            Some(layer) => unsafe {
                fill_raw(&layer.extensions, p_property_count, p_properties, ExtensionRecord::to_properties)
            },
            None => vk::Result::ERROR_LAYER_NOT_PRESENT,
        },
    })
}

pub unsafe extern "system" fn enumerate_instance_layer_properties(
    p_property_count: *mut u32,
    p_properties: *mut vk::LayerProperties,
) -> vk::Result {
    log::trace!("vkEnumerateInstanceLayerProperties");
    with_driver(|state| unsafe {
        fill_raw(&state.instance_layers, p_property_count, p_properties, LayerRecord::to_properties)
    })
}

pub unsafe extern "system" fn enumerate_instance_version(p_api_version: *mut u32) -> vk::Result {
    let version = with_driver(|state| state.api_version);
    log::trace!("vkEnumerateInstanceVersion -> {}", version);
    unsafe { write_out(p_api_version, version.to_packed()) };
    vk::Result::SUCCESS
}
