use std::fs;
use std::path::Path;

use ash::vk;
use tempfile::tempdir;

use crate::driver::*;
use crate::error::FixtureError;
use crate::version::ApiVersion;

const TOML_FIXTURE: &str = r#"
min_interface_version = 3
max_interface_version = 5
api_version = "1.2"
enable_icd_wsi = true
supports_tooling_info = true

[[instance_extensions]]
name = "VK_KHR_surface"
spec_version = 25

[[layers]]
name = "VK_LAYER_mock_validation"
description = "Pretend validation"

[[tools]]
name = "Mock Profiler"
version = "0.3"

[[physical_devices]]
name = "Discrete GPU"
api_version = "1.3.250"
vendor_id = 4318
device_id = 8705
device_type = "discrete"
known_functions = ["vkCmdDrawMeshTasksEXT"]

[[physical_devices.extensions]]
name = "VK_KHR_swapchain"
spec_version = 70

[[physical_devices.queue_families]]
count = 4
graphics = true
compute = true
present = true

[[physical_devices]]
name = "Integrated GPU"
device_type = "integrated"

[[groups]]
devices = ["Discrete GPU", "Integrated GPU"]
subset_allocation = true
"#;

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
#[cfg(feature = "toml-config")]
fn test_toml_fixture_builds_driver() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "fixture.toml", TOML_FIXTURE);
    let state = DriverState::load_fixture(&path).unwrap();

    assert_eq!(state.negotiator.min_supported, 3);
    assert_eq!(state.negotiator.max_supported, 5);
    assert_eq!(state.api_version, ApiVersion::V1_2);
    assert!(state.provides_icd_wsi());
    assert!(state.supports_tooling_info);
    assert!(state.instance_extensions.is_available("VK_KHR_surface"));
    assert_eq!(state.instance_layers[0].description, "Pretend validation");
    assert_eq!(state.tooling_properties[0].name, "Mock Profiler");

    let handles = state.physical_device_handles();
    assert_eq!(handles.len(), 2);
    let discrete = state.physical_device(handles[0]);
    assert_eq!(discrete.api_version(), ApiVersion::new(1, 3, 250));
    assert_eq!(discrete.properties.vendor_id, 4318);
    assert_eq!(discrete.properties.device_type, vk::PhysicalDeviceType::DISCRETE_GPU);
    assert_eq!(discrete.queue_families[0].properties.queue_count, 4);
    assert_eq!(
        discrete.queue_families[0].properties.queue_flags,
        vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE
    );
    assert_eq!(discrete.supports_present(0), Some(true));
    assert!(discrete.extensions.is_available("VK_KHR_swapchain"));
    assert_eq!(discrete.known_device_functions, vec!["vkCmdDrawMeshTasksEXT".to_string()]);

    assert_eq!(state.physical_device_groups.len(), 1);
    assert_eq!(state.physical_device_groups[0].physical_devices, handles);
    assert!(state.physical_device_groups[0].subset_allocation);
}

#[test]
fn test_json_fixture_and_defaults() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "fixture.json",
        r#"{ "physical_devices": [ { "name": "Only GPU", "adapter_luid": { "low_part": 9, "high_part": 0 } } ] }"#,
    );
    let state = DriverState::load_fixture(&path).unwrap();
    assert_eq!(state.api_version, ApiVersion::V1_0);
    assert_eq!(state.negotiator.max_supported, 6);
    assert!(state.supports_adapter_enumeration);
    let handle = state.physical_device_handles()[0];
    assert_eq!(
        state.physical_device(handle).adapter_luid,
        Some(AdapterLuid {
            low_part: 9,
            high_part: 0
        })
    );
}

#[test]
fn test_round_trip_through_serialize() {
    let config = FixtureConfig {
        api_version: Some("1.1".to_string()),
        physical_devices: vec![PhysicalDeviceConfig {
            name: "GPU".to_string(),
            queue_families: vec![QueueFamilyConfig {
                count: 1,
                graphics: true,
                ..QueueFamilyConfig::default()
            }],
            ..PhysicalDeviceConfig::default()
        }],
        ..FixtureConfig::default()
    };
    let text = config.serialize(ConfigFormat::Json).unwrap();
    assert_eq!(FixtureConfig::parse(&text, ConfigFormat::Json).unwrap(), config);
}

#[test]
fn test_unknown_group_member_is_reported() {
    let config = FixtureConfig {
        physical_devices: vec![PhysicalDeviceConfig {
            name: "GPU".to_string(),
            ..PhysicalDeviceConfig::default()
        }],
        groups: vec![GroupConfig {
            devices: vec!["GPU".to_string(), "Missing".to_string()],
            subset_allocation: false,
        }],
        ..FixtureConfig::default()
    };
    match DriverState::from_config(&config) {
        Err(FixtureError::UnknownGroupMember { group, name }) => {
            assert_eq!(group, 0);
            assert_eq!(name, "Missing");
        }
        other => panic!("expected UnknownGroupMember, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_oversized_group_is_reported() {
    let names: Vec<String> = (0..=vk::MAX_DEVICE_GROUP_SIZE).map(|i| format!("GPU {}", i)).collect();
    let config = FixtureConfig {
        physical_devices: names
            .iter()
            .map(|name| PhysicalDeviceConfig {
                name: name.clone(),
                ..PhysicalDeviceConfig::default()
            })
            .collect(),
        groups: vec![GroupConfig {
            devices: names,
            subset_allocation: false,
        }],
        ..FixtureConfig::default()
    };
    match DriverState::from_config(&config) {
        Err(FixtureError::GroupTooLarge { group, size }) => {
            assert_eq!(group, 0);
            assert_eq!(size, vk::MAX_DEVICE_GROUP_SIZE + 1);
        }
        other => panic!("expected GroupTooLarge, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_bad_version_is_reported() {
    let config = FixtureConfig {
        api_version: Some("one.two".to_string()),
        ..FixtureConfig::default()
    };
    assert!(matches!(
        DriverState::from_config(&config),
        Err(FixtureError::Version { ref value, .. }) if value == "one.two"
    ));
}

#[test]
fn test_file_errors() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    assert!(matches!(FixtureConfig::load(&missing), Err(FixtureError::Io { .. })));

    let yaml = write(dir.path(), "fixture.yaml", "api_version: 1.0");
    assert!(matches!(FixtureConfig::load(&yaml), Err(FixtureError::UnsupportedFormat { .. })));

    let broken = write(dir.path(), "fixture.json", "{ not json");
    assert!(matches!(FixtureConfig::load(&broken), Err(FixtureError::Parse { .. })));
}

#[test]
fn test_apply_config_replaces_state_in_place() {
    let mut state = DriverState::new();
    let before = &state as *const DriverState;
    state
        .apply_config(&FixtureConfig {
            api_version: Some("1.3".to_string()),
            ..FixtureConfig::default()
        })
        .unwrap();
    assert_eq!(&state as *const DriverState, before);
    assert_eq!(state.api_version, ApiVersion::V1_3);
}
