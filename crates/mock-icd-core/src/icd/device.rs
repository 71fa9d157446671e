//! Device-level entry points.

use std::ffi::c_char;

use ash::vk;
use ash::vk::Handle;

use crate::driver::with_driver;
use crate::icd::{read_name, write_out};

pub unsafe extern "system" fn get_device_proc_addr(
    device: vk::Device,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    let name = unsafe { read_name(p_name) }?;
    log::trace!("vkGetDeviceProcAddr({:#x}, {})", device.as_raw(), name);
    with_driver(|state| state.resolve_device_proc(device, &name))
}

pub unsafe extern "system" fn destroy_device(device: vk::Device, _p_allocator: *const vk::AllocationCallbacks<'_>) {
    log::trace!("vkDestroyDevice({:#x})", device.as_raw());
    with_driver(|state| state.destroy_device(device));
}

pub unsafe extern "system" fn get_device_queue(
    device: vk::Device,
    queue_family_index: u32,
    queue_index: u32,
    p_queue: *mut vk::Queue,
) {
    let queue = with_driver(|state| state.get_device_queue(device, queue_family_index, queue_index));
    unsafe { write_out(p_queue, queue) };
}

pub unsafe extern "system" fn get_device_queue2(
    device: vk::Device,
    p_queue_info: *const vk::DeviceQueueInfo2<'_>,
    p_queue: *mut vk::Queue,
) {
    let Some(info) = (unsafe { p_queue_info.as_ref() }) else {
        return;
    };
    let queue = with_driver(|state| state.get_device_queue(device, info.queue_family_index, info.queue_index));
    unsafe { write_out(p_queue, queue) };
}

pub unsafe extern "system" fn create_command_pool(
    device: vk::Device,
    p_create_info: *const vk::CommandPoolCreateInfo<'_>,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_command_pool: *mut vk::CommandPool,
) -> vk::Result {
    let family = unsafe { p_create_info.as_ref() }.map_or(0, |info| info.queue_family_index);
    let pool = with_driver(|state| state.create_command_pool(device, family));
    unsafe { write_out(p_command_pool, pool) };
    vk::Result::SUCCESS
}

pub unsafe extern "system" fn destroy_command_pool(
    device: vk::Device,
    command_pool: vk::CommandPool,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    with_driver(|state| state.destroy_command_pool(device, command_pool));
}

pub unsafe extern "system" fn allocate_command_buffers(
    device: vk::Device,
    p_allocate_info: *const vk::CommandBufferAllocateInfo<'_>,
    p_command_buffers: *mut vk::CommandBuffer,
) -> vk::Result {
    let Some(info) = (unsafe { p_allocate_info.as_ref() }) else {
        return vk::Result::ERROR_OUT_OF_HOST_MEMORY;
    };
    let buffers =
        with_driver(|state| state.allocate_command_buffers(device, info.command_pool, info.command_buffer_count));
    if !p_command_buffers.is_null() {
        for (i, buffer) in buffers.into_iter().enumerate() {
            // SAFETY: the caller provides command_buffer_count slots.
            unsafe { p_command_buffers.add(i).write(buffer) };
        }
    }
    vk::Result::SUCCESS
}

pub unsafe extern "system" fn free_command_buffers(
    _device: vk::Device,
    _command_pool: vk::CommandPool,
    command_buffer_count: u32,
    p_command_buffers: *const vk::CommandBuffer,
) {
    if p_command_buffers.is_null() {
        return;
    }
    // SAFETY: the caller passes command_buffer_count handles.
    let buffers = unsafe { std::slice::from_raw_parts(p_command_buffers, command_buffer_count as usize) };
    with_driver(|state| state.free_command_buffers(buffers));
}
