use std::ffi::CString;
use std::ptr;

use ash::vk;
use mock_icd::*;
use mock_icd_core::{ApiVersion, CalledIcdGipa, CalledNegotiateInterface, InterfaceVersionCheck};
use serial_test::serial;

fn driver() -> &'static mut mock_icd_core::DriverState {
    // Tests run serially against the one driver; the pointer lives as long as the process.
    unsafe { &mut *reset_icd_func() }
}

#[test]
#[serial]
fn test_test_control_exports_share_one_driver() {
    let reset = reset_icd_func();
    assert_eq!(get_test_icd_func(), reset);
    assert_eq!(reset_icd_func(), reset);
}

#[test]
#[serial]
#[cfg(feature = "negotiate")]
fn test_negotiate_export() {
    let state = driver();
    state.negotiator = mock_icd_core::InterfaceNegotiator::new(2, 6);

    let mut version = 4;
    let result = unsafe { vk_icdNegotiateLoaderICDInterfaceVersion(&mut version) };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(version, 4);

    let state = unsafe { &*get_test_icd_func() };
    assert_eq!(state.negotiator.check, InterfaceVersionCheck::DriverVersionTooNew);
    assert_eq!(state.negotiator.called_negotiate, CalledNegotiateInterface::VkIcdNegotiate);
}

#[test]
#[serial]
fn test_gipa_export_resolves_global_commands() {
    let state = driver();
    state.api_version = ApiVersion::V1_1;
    let name = CString::new("vkEnumerateInstanceVersion").unwrap();
    let function = unsafe { vk_icdGetInstanceProcAddr(vk::Instance::null(), name.as_ptr()) }.unwrap();
    let enumerate_version: vk::PFN_vkEnumerateInstanceVersion = unsafe { std::mem::transmute(function) };

    let mut version = 0;
    assert_eq!(unsafe { enumerate_version(&mut version) }, vk::Result::SUCCESS);
    assert_eq!(version, vk::API_VERSION_1_1);
    assert_eq!(
        unsafe { &*get_test_icd_func() }.negotiator.called_gipa,
        CalledIcdGipa::VkIcdGipa
    );
}

#[test]
#[serial]
fn test_gipa_export_refuses_unknown_names() {
    driver();
    let name = CString::new("vkNotARealCommand").unwrap();
    assert!(unsafe { vk_icdGetInstanceProcAddr(vk::Instance::null(), name.as_ptr()) }.is_none());
    assert!(unsafe { vk_icdGetInstanceProcAddr(vk::Instance::null(), ptr::null()) }.is_none());
}

#[test]
#[serial]
#[cfg(feature = "gpdpa")]
fn test_gpdpa_export_needs_an_instance() {
    driver();
    let name = CString::new("vkGetPhysicalDeviceProperties").unwrap();
    assert!(unsafe { vk_icdGetPhysicalDeviceProcAddr(vk::Instance::null(), name.as_ptr()) }.is_none());
}

#[test]
#[serial]
#[cfg(feature = "legacy-gipa")]
fn test_legacy_exports() {
    driver();
    let name = CString::new("vkCreateInstance").unwrap();
    assert!(unsafe { vkGetInstanceProcAddr(vk::Instance::null(), name.as_ptr()) }.is_some());
    assert_eq!(
        unsafe { &*get_test_icd_func() }.negotiator.called_gipa,
        CalledIcdGipa::VkGipa
    );

    let mut count = u32::MAX;
    let result = unsafe { vkEnumerateInstanceExtensionProperties(ptr::null(), &mut count, ptr::null_mut()) };
    assert_eq!(result, vk::Result::SUCCESS);
    assert_eq!(count, 0);

    let app = vk::ApplicationInfo::default().api_version(vk::API_VERSION_1_0);
    let info = vk::InstanceCreateInfo::default().application_info(&app);
    let mut instance = vk::Instance::null();
    assert_eq!(
        unsafe { vkCreateInstance(&info, ptr::null(), &mut instance) },
        vk::Result::SUCCESS
    );
    assert_ne!(instance, vk::Instance::null());
}

#[test]
#[serial]
fn test_worker_thread_sees_fixture_configured_on_test_thread() {
    let state = driver();
    state.api_version = ApiVersion::V1_1;
    let main_driver = get_test_icd_func() as usize;

    let worker = std::thread::spawn(|| {
        let name = CString::new("vkEnumerateInstanceVersion").unwrap();
        let function = unsafe { vk_icdGetInstanceProcAddr(vk::Instance::null(), name.as_ptr()) }.unwrap();
        let enumerate_version: vk::PFN_vkEnumerateInstanceVersion = unsafe { std::mem::transmute(function) };
        let mut version = 0;
        assert_eq!(unsafe { enumerate_version(&mut version) }, vk::Result::SUCCESS);
        (version, get_test_icd_func() as usize)
    });
    let (version, worker_driver) = worker.join().unwrap();

    assert_eq!(version, vk::API_VERSION_1_1);
    assert_eq!(worker_driver, main_driver);
}
