use std::ffi::{c_char, c_void, CString};
use std::ptr;

use ash::vk;
use ash::vk::Handle;
use serial_test::serial;

use crate::driver::*;
use crate::icd::{debug_utils, device, exports, global, instance, physical_device};
use crate::negotiate::{CalledIcdGipa, CalledNegotiateInterface, InterfaceNegotiator, InterfaceVersionCheck};
use crate::registry::{read_fixed_str, ExtensionRecord};
use crate::version::ApiVersion;

fn fresh_driver() {
    reset_current_driver();
}

fn resolve_global(name: &str) -> vk::PFN_vkVoidFunction {
    let name = CString::new(name).unwrap();
    unsafe { exports::icd_get_instance_proc_addr(vk::Instance::null(), name.as_ptr()) }
}

/// Creates an instance through the raw entry point.
fn create_raw_instance(api_version: u32, extensions: &[&str]) -> (vk::Result, vk::Instance) {
    let names: Vec<CString> = extensions.iter().map(|name| CString::new(*name).unwrap()).collect();
    let pointers: Vec<*const c_char> = names.iter().map(|name| name.as_ptr()).collect();
    let app = vk::ApplicationInfo::default().api_version(api_version);
    let info = vk::InstanceCreateInfo::default()
        .application_info(&app)
        .enabled_extension_names(&pointers);
    let mut handle = vk::Instance::null();
    let result = unsafe { global::create_instance(&info, ptr::null(), &mut handle) };
    (result, handle)
}

#[test]
#[serial]
fn test_negotiate_without_pointer_fails() {
    fresh_driver();
    let result = unsafe { exports::negotiate_loader_icd_interface_version(ptr::null_mut()) };
    assert_eq!(result, vk::Result::ERROR_INITIALIZATION_FAILED);
    with_driver(|state| assert_eq!(state.negotiator.called_negotiate, CalledNegotiateInterface::NotCalled));
}

#[test]
#[serial]
fn test_negotiate_against_supported_range() {
    fresh_driver();
    with_driver(|state| state.negotiator = InterfaceNegotiator::new(2, 6));

    let mut requested = 1;
    let result = unsafe { exports::negotiate_loader_icd_interface_version(&mut requested) };
    assert_eq!(result, vk::Result::ERROR_INCOMPATIBLE_DRIVER);
    assert_eq!(requested, 2);

    let mut requested = 7;
    let result = unsafe { exports::negotiate_loader_icd_interface_version(&mut requested) };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(requested, 6);
    with_driver(|state| {
        assert_eq!(state.negotiator.check, InterfaceVersionCheck::LoaderVersionTooNew);
        assert_eq!(state.negotiator.called_negotiate, CalledNegotiateInterface::VkIcdNegotiate);
    });
}

#[test]
#[serial]
fn test_gipa_before_negotiate_is_recorded() {
    fresh_driver();
    assert!(resolve_global("vkCreateInstance").is_some());
    let mut requested = 6;
    let result = unsafe { exports::negotiate_loader_icd_interface_version(&mut requested) };
    assert_eq!(result, vk::Result::SUCCESS);
    with_driver(|state| {
        assert_eq!(state.negotiator.called_gipa, CalledIcdGipa::VkIcdGipa);
        assert_eq!(state.negotiator.called_negotiate, CalledNegotiateInterface::VkIcdGipaFirst);
    });
}

#[test]
#[serial]
fn test_legacy_gipa_is_told_apart() {
    fresh_driver();
    let name = CString::new("vkEnumerateInstanceVersion").unwrap();
    let function = unsafe { exports::legacy_get_instance_proc_addr(vk::Instance::null(), name.as_ptr()) };
    assert!(function.is_some());
    assert!(resolve_global("vkEnumerateInstanceVersion").is_some());
    with_driver(|state| assert_eq!(state.negotiator.called_gipa, CalledIcdGipa::VkGipa));
}

#[test]
#[serial]
fn test_resolved_function_calls_back_into_driver() {
    fresh_driver();
    with_driver(|state| state.api_version = ApiVersion::V1_2);
    let function = resolve_global("vkEnumerateInstanceVersion").unwrap();
    let enumerate_version: vk::PFN_vkEnumerateInstanceVersion = unsafe { std::mem::transmute(function) };
    let mut version = 0;
    assert_eq!(unsafe { enumerate_version(&mut version) }, vk::Result::SUCCESS);
    assert_eq!(version, ApiVersion::V1_2.to_packed());
}

#[test]
#[serial]
fn test_extension_enumeration_two_call() {
    fresh_driver();
    with_driver(|state| {
        state.add_instance_extension(ExtensionRecord::new("VK_KHR_surface", 25));
        state.add_instance_extension(ExtensionRecord::new("VK_EXT_debug_utils", 2));
    });

    let mut count = 0;
    let result =
        unsafe { global::enumerate_instance_extension_properties(ptr::null(), &mut count, ptr::null_mut()) };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(count, 2);

    let mut properties = [vk::ExtensionProperties::default(); 2];
    let mut short = 1;
    let result = unsafe {
        global::enumerate_instance_extension_properties(ptr::null(), &mut short, properties.as_mut_ptr())
    };
    assert_eq!(result, vk::Result::INCOMPLETE);
    assert_eq!(short, 1);
    assert_eq!(read_fixed_str(&properties[0].extension_name), "VK_KHR_surface");

    let result = unsafe {
        global::enumerate_instance_extension_properties(ptr::null(), &mut count, properties.as_mut_ptr())
    };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(read_fixed_str(&properties[1].extension_name), "VK_EXT_debug_utils");
    assert_eq!(properties[1].spec_version, 2);
}

#[test]
#[serial]
fn test_unknown_layer_extensions() {
    fresh_driver();
    let layer = CString::new("VK_LAYER_missing").unwrap();
    let mut count = 0;
    let result =
        unsafe { global::enumerate_instance_extension_properties(layer.as_ptr(), &mut count, ptr::null_mut()) };
    assert_eq!(result, vk::Result::ERROR_LAYER_NOT_PRESENT);
}

#[test]
#[serial]
fn test_create_instance_from_raw_info() {
    fresh_driver();
    with_driver(|state| {
        state.api_version = ApiVersion::V1_3;
        state.add_instance_extension(ExtensionRecord::new("VK_KHR_surface", 25));
    });
    let (result, handle) = create_raw_instance(vk::API_VERSION_1_1, &["VK_KHR_surface", "VK_KHR_unknown"]);
    assert_eq!(result, vk::Result::SUCCESS);
    assert_ne!(handle, vk::Instance::null());
    with_driver(|state| {
        let record = state.instance(handle).unwrap();
        assert_eq!(record.api_version, ApiVersion::V1_1);
        assert_eq!(record.enabled_extensions.names(), ["VK_KHR_surface".to_string()]);
    });

    let mut ignored = vk::Instance::null();
    let result = unsafe { global::create_instance(ptr::null(), ptr::null(), &mut ignored) };
    assert_eq!(result, vk::Result::ERROR_OUT_OF_HOST_MEMORY);
    assert_eq!(ignored, vk::Instance::null());
}

#[test]
#[serial]
fn test_group_enumeration_keeps_caller_chain() {
    fresh_driver();
    with_driver(|state| {
        state.add_physical_device(PhysicalDeviceDescriptor::new("First"));
        state.add_physical_device(PhysicalDeviceDescriptor::new("Second"));
    });
    let (_, handle) = create_raw_instance(vk::API_VERSION_1_1, &[]);

    let marker = 0x5eed_usize as *mut c_void;
    let mut groups = [vk::PhysicalDeviceGroupProperties::default(); 2];
    for group in &mut groups {
        group.p_next = marker;
    }
    let mut count = 0;
    let result = unsafe { instance::enumerate_physical_device_groups(handle, &mut count, ptr::null_mut()) };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(count, 2);

    let result = unsafe { instance::enumerate_physical_device_groups(handle, &mut count, groups.as_mut_ptr()) };
    assert_eq!(result, vk::Result::SUCCESS);
    for group in &groups {
        assert_eq!(group.s_type, vk::StructureType::PHYSICAL_DEVICE_GROUP_PROPERTIES);
        assert_eq!(group.p_next, marker);
        assert_eq!(group.physical_device_count, 1);
        assert_ne!(group.physical_devices[0], vk::PhysicalDevice::null());
    }
}

unsafe extern "system" fn count_live_instances(
    _severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _types: vk::DebugUtilsMessageTypeFlagsEXT,
    _p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    p_user_data: *mut c_void,
) -> vk::Bool32 {
    let seen = unsafe { &mut *(p_user_data as *mut Vec<usize>) };
    seen.push(with_driver(|state| state.instance_count()));
    vk::FALSE
}

#[test]
#[serial]
fn test_debug_callback_may_reenter_driver() {
    fresh_driver();
    with_driver(|state| {
        state.add_instance_extension(ExtensionRecord::new("VK_EXT_debug_utils", 2));
        state.add_physical_device(PhysicalDeviceDescriptor::new("Mock GPU"));
    });
    let (_, handle) = create_raw_instance(vk::API_VERSION_1_0, &["VK_EXT_debug_utils"]);

    let mut seen: Vec<usize> = Vec::new();
    let info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(vk::DebugUtilsMessageSeverityFlagsEXT::INFO)
        .message_type(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL)
        .pfn_user_callback(Some(count_live_instances))
        .user_data(&mut seen as *mut Vec<usize> as *mut c_void);
    let mut messenger = vk::DebugUtilsMessengerEXT::null();
    let result =
        unsafe { debug_utils::create_debug_utils_messenger(handle, &info, ptr::null(), &mut messenger) };
    assert_eq!(result, vk::Result::SUCCESS);

    let mut count = 0;
    let result = unsafe { instance::enumerate_physical_devices(handle, &mut count, ptr::null_mut()) };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(count, 1);
    assert_eq!(seen, vec![1]);

    unsafe { debug_utils::destroy_debug_utils_messenger(handle, messenger, ptr::null()) };
    unsafe { instance::destroy_instance(handle, ptr::null()) };
    with_driver(|state| {
        assert_eq!(state.messenger_count(), 0);
        assert_eq!(state.instance_count(), 0);
    });
}

unsafe extern "system" fn collect_text(
    _severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _types: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    p_user_data: *mut c_void,
) -> vk::Bool32 {
    let seen = unsafe { &mut *(p_user_data as *mut Vec<String>) };
    let data = unsafe { &*p_callback_data };
    seen.push(unsafe { std::ffi::CStr::from_ptr(data.p_message) }.to_string_lossy().into_owned());
    vk::FALSE
}

#[test]
#[serial]
fn test_create_info_chain_messenger_receives_creation_message() {
    fresh_driver();
    with_driver(|state| state.add_instance_extension(ExtensionRecord::new("VK_EXT_debug_utils", 2)));

    let mut seen: Vec<String> = Vec::new();
    let mut messenger_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(vk::DebugUtilsMessageSeverityFlagsEXT::INFO)
        .message_type(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL)
        .pfn_user_callback(Some(collect_text))
        .user_data(&mut seen as *mut Vec<String> as *mut c_void);
    let extension = CString::new("VK_EXT_debug_utils").unwrap();
    let extensions = [extension.as_ptr()];
    let app = vk::ApplicationInfo::default().api_version(vk::API_VERSION_1_0);
    let info = vk::InstanceCreateInfo::default()
        .application_info(&app)
        .enabled_extension_names(&extensions)
        .push_next(&mut messenger_info);

    let mut handle = vk::Instance::null();
    let result = unsafe { global::create_instance(&info, ptr::null(), &mut handle) };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(seen.len(), 1);
    assert!(seen[0].starts_with("vkCreateInstance"));

    unsafe { instance::destroy_instance(handle, ptr::null()) };
    with_driver(|state| assert_eq!(state.messenger_count(), 0));
}

#[test]
#[serial]
fn test_reset_keeps_driver_address() {
    let before = current_driver_ptr();
    with_driver(|state| {
        state.api_version = ApiVersion::V1_3;
        state.add_physical_device(PhysicalDeviceDescriptor::new("Doomed"));
    });
    let after = reset_current_driver();
    assert_eq!(before, after);
    with_driver(|state| {
        assert_eq!(state.api_version, ApiVersion::V1_0);
        assert!(state.physical_device_handles().is_empty());
    });
}

#[test]
#[serial]
fn test_reset_paths_agree_on_fixture_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.json");
    std::fs::write(&path, r#"{ "api_version": "1.2", "physical_devices": [ { "name": "From file" } ] }"#).unwrap();
    // SAFETY: serialised with every other test that reads the environment through the driver.
    unsafe { std::env::set_var(FIXTURE_ENV, &path) };

    reset_current_driver();
    let mut owned = DriverState::new();
    owned.reset();
    unsafe { std::env::remove_var(FIXTURE_ENV) };

    with_driver(|state| {
        assert_eq!(state.api_version, ApiVersion::V1_2);
        assert_eq!(state.physical_device_handles().len(), 1);
        assert_eq!(owned.api_version, state.api_version);
        assert_eq!(owned.physical_device_handles().len(), 1);
    });

    reset_current_driver();
    with_driver(|state| assert_eq!(state.api_version, ApiVersion::V1_0));
}

#[test]
#[serial]
fn test_adapter_enumeration_export() {
    fresh_driver();
    let luid = AdapterLuid {
        low_part: 7,
        high_part: 0,
    };
    with_driver(|state| {
        state.add_physical_device(PhysicalDeviceDescriptor::new("Other"));
        state.add_physical_device(PhysicalDeviceDescriptor::new("Matching").with_adapter_luid(luid));
    });
    let (_, handle) = create_raw_instance(vk::API_VERSION_1_0, &[]);

    let mut count = 0;
    let result = unsafe {
        exports::icd_enumerate_adapter_physical_devices(handle, luid, &mut count, ptr::null_mut())
    };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(count, 1);

    with_driver(|state| state.supports_adapter_enumeration = false);
    let result = unsafe {
        exports::icd_enumerate_adapter_physical_devices(handle, luid, &mut count, ptr::null_mut())
    };
    assert_eq!(result, vk::Result::ERROR_INCOMPATIBLE_DRIVER);
    with_driver(|state| {
        assert_eq!(
            state.called_enumerate_adapter_physical_devices,
            CalledEnumerateAdapterPhysicalDevices::CalledButNotSupported
        );
    });
}

#[test]
#[serial]
fn test_physical_device_proc_needs_live_instance() {
    fresh_driver();
    let name = CString::new("vkGetPhysicalDeviceFeatures").unwrap();
    let bogus = vk::Instance::from_raw(0x77);
    assert!(unsafe { exports::icd_get_physical_device_proc_addr(bogus, name.as_ptr()) }.is_none());
    let (_, handle) = create_raw_instance(vk::API_VERSION_1_0, &[]);
    assert!(unsafe { exports::icd_get_physical_device_proc_addr(handle, name.as_ptr()) }.is_some());
    assert!(unsafe { exports::icd_get_physical_device_proc_addr(handle, ptr::null()) }.is_none());
}

#[test]
#[serial]
fn test_worker_thread_sees_fixture_configured_on_test_thread() {
    fresh_driver();
    let gpu = with_driver(|state| state.add_physical_device(PhysicalDeviceDescriptor::new("Shared GPU")));
    let main_driver = current_driver_ptr() as usize;

    let worker = std::thread::spawn(move || {
        let info = vk::DeviceCreateInfo::default();
        let mut handle = vk::Device::null();
        let result = unsafe { physical_device::create_device(gpu, &info, ptr::null(), &mut handle) };
        let name = CString::new("vkCreateCommandPool").unwrap();
        let function = unsafe { device::get_device_proc_addr(handle, name.as_ptr()) };
        (result, handle, function.is_some(), current_driver_ptr() as usize)
    });
    let (result, handle, resolved, worker_driver) = worker.join().unwrap();

    assert_eq!(result, vk::Result::SUCCESS);
    assert_ne!(handle, vk::Device::null());
    assert!(resolved);
    assert_eq!(worker_driver, main_driver);
    with_driver(|state| assert!(state.device(handle).is_some()));
}
