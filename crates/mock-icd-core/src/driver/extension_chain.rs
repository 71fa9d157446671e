//! Typed views of a caller's `p_next` chains: output chains the driver fills, and input chains
//! it reads from create infos.
//!
//! Only a handful of structure types are recognised. Everything else is reported as
//! [`ExtensionChainNode::Unknown`] (or [`InputChainNode::Unknown`]) and left untouched, as are all
//! `p_next` links, so a loader that forwards vendor structures unmodified can be checked for
//! exactly that.

use std::ffi::c_void;

use ash::vk;

use crate::driver::lifecycle::ChainedMessenger;
use crate::driver::physical_device::PhysicalDeviceDescriptor;
use crate::registry::write_fixed_str;

pub enum ExtensionChainNode<'a> {
    DriverProperties(&'a mut vk::PhysicalDeviceDriverProperties<'static>),
    IdProperties(&'a mut vk::PhysicalDeviceIDProperties<'static>),
    Unknown(vk::StructureType),
}

/// Visits every node of an output chain.
///
/// # Safety
/// `p_next` must be null or the head of a well-formed chain of Vulkan output structures.
pub unsafe fn walk_output_chain(p_next: *mut c_void, mut visit: impl FnMut(ExtensionChainNode<'_>)) {
    let mut node = p_next as *mut vk::BaseOutStructure<'static>;
    while !node.is_null() {
        // SAFETY: every chain element starts with the BaseOutStructure header.
        let (s_type, next) = unsafe { ((*node).s_type, (*node).p_next) };
        let typed = match s_type {
            vk::StructureType::PHYSICAL_DEVICE_DRIVER_PROPERTIES => {
                // SAFETY: the structure type identifies the layout.
                ExtensionChainNode::DriverProperties(unsafe {
                    &mut *(node as *mut vk::PhysicalDeviceDriverProperties<'static>)
                })
            }
            vk::StructureType::PHYSICAL_DEVICE_ID_PROPERTIES => {
                ExtensionChainNode::IdProperties(unsafe {
                    &mut *(node as *mut vk::PhysicalDeviceIDProperties<'static>)
                })
            }
            other => ExtensionChainNode::Unknown(other),
        };
        visit(typed);
        node = next;
    }
}

/// Fills the recognised nodes of a properties chain from `descriptor`.
///
/// # Safety
/// Same as [`walk_output_chain`].
pub unsafe fn fill_properties_chain(p_next: *mut c_void, descriptor: &PhysicalDeviceDescriptor) {
    unsafe {
        walk_output_chain(p_next, |node| match node {
            ExtensionChainNode::DriverProperties(props) => {
                props.driver_id = vk::DriverId::MESA_LLVMPIPE;
                write_fixed_str(&mut props.driver_name, &descriptor.driver_name);
                write_fixed_str(&mut props.driver_info, &descriptor.driver_info);
            }
            ExtensionChainNode::IdProperties(props) => {
                props.device_uuid = descriptor.device_uuid;
                if let Some(luid) = descriptor.adapter_luid {
                    props.device_luid = luid.to_bytes();
                    props.device_luid_valid = vk::TRUE;
                    props.device_node_mask = 1;
                }
            }
            ExtensionChainNode::Unknown(s_type) => {
                log::trace!("Leaving unknown chain structure {:?} untouched", s_type);
            }
        });
    }
}

pub enum InputChainNode<'a> {
    DebugUtilsMessenger(&'a vk::DebugUtilsMessengerCreateInfoEXT<'static>),
    Unknown(vk::StructureType),
}

/// Visits every node of an input chain.
///
/// # Safety
/// `p_next` must be null or the head of a well-formed chain of Vulkan input structures.
pub unsafe fn walk_input_chain(p_next: *const c_void, mut visit: impl FnMut(InputChainNode<'_>)) {
    let mut node = p_next as *const vk::BaseInStructure<'static>;
    while !node.is_null() {
        let (s_type, next) = unsafe { ((*node).s_type, (*node).p_next) };
        let typed = match s_type {
            vk::StructureType::DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT => {
                // SAFETY: the structure type identifies the layout.
                InputChainNode::DebugUtilsMessenger(unsafe {
                    &*(node as *const vk::DebugUtilsMessengerCreateInfoEXT<'static>)
                })
            }
            other => InputChainNode::Unknown(other),
        };
        visit(typed);
        node = next;
    }
}

/// Messengers chained onto a `vkCreateInstance` create info.
///
/// # Safety
/// Same as [`walk_input_chain`].
pub unsafe fn chained_messengers(p_next: *const c_void) -> Vec<ChainedMessenger> {
    let mut messengers = Vec::new();
    unsafe {
        walk_input_chain(p_next, |node| match node {
            InputChainNode::DebugUtilsMessenger(info) => messengers.push(ChainedMessenger {
                severity: info.message_severity,
                types: info.message_type,
                callback: info.pfn_user_callback,
                user_data: info.p_user_data,
            }),
            InputChainNode::Unknown(s_type) => {
                log::trace!("Ignoring chained create-info structure {:?}", s_type);
            }
        });
    }
    messengers
}
