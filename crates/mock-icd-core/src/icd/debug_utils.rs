//! `VK_EXT_debug_utils` entry points.

use ash::vk;

use crate::driver::with_driver;
use crate::icd::{read_name, write_out};

pub unsafe extern "system" fn create_debug_utils_messenger(
    instance: vk::Instance,
    p_create_info: *const vk::DebugUtilsMessengerCreateInfoEXT<'_>,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_messenger: *mut vk::DebugUtilsMessengerEXT,
) -> vk::Result {
    let Some(info) = (unsafe { p_create_info.as_ref() }) else {
        return vk::Result::ERROR_OUT_OF_HOST_MEMORY;
    };
    let messenger = with_driver(|state| {
        state.create_debug_messenger(
            instance,
            info.message_severity,
            info.message_type,
            info.pfn_user_callback,
            info.p_user_data,
        )
    });
    unsafe { write_out(p_messenger, messenger) };
    vk::Result::SUCCESS
}

pub unsafe extern "system" fn destroy_debug_utils_messenger(
    _instance: vk::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    with_driver(|state| state.destroy_debug_messenger(messenger));
}

/// Forwards an application message to the instance's matching messengers.
pub unsafe extern "system" fn submit_debug_utils_message(
    instance: vk::Instance,
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_types: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
) {
    let Some(data) = (unsafe { p_callback_data.as_ref() }) else {
        return;
    };
    let message_id_name = unsafe { read_name(data.p_message_id_name) }.unwrap_or_default();
    let message = unsafe { read_name(data.p_message) }.unwrap_or_default();
    with_driver(|state| {
        state.queue_debug_message(instance, message_severity, message_types, &message_id_name, &message)
    });
}
