//! Fixture files: a serialisable description of the emulated driver.
//!
//! A fixture is written in TOML (with the `toml-config` feature) or JSON. The format follows the
//! file extension. Versions are strings such as `"1.2"` or `"1.3.250"`.

use std::path::Path;

use ash::vk;
use serde::{Deserialize, Serialize};

use crate::driver::physical_device::{DisplayDescriptor, PhysicalDeviceDescriptor, PhysicalDeviceGroup, QueueFamily};
use crate::driver::records::{AdapterLuid, ToolRecord};
use crate::driver::state::DriverState;
use crate::error::{FixtureError, Result};
use crate::negotiate::{DEFAULT_MAX_INTERFACE_VERSION, DEFAULT_MIN_INTERFACE_VERSION};
use crate::registry::{ExtensionRecord, LayerRecord};
use crate::version::ApiVersion;

/// Supported fixture file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceTypeConfig {
    #[default]
    Other,
    Integrated,
    Discrete,
    Virtual,
    Cpu,
}

impl From<DeviceTypeConfig> for vk::PhysicalDeviceType {
    fn from(value: DeviceTypeConfig) -> Self {
        match value {
            DeviceTypeConfig::Other => vk::PhysicalDeviceType::OTHER,
            DeviceTypeConfig::Integrated => vk::PhysicalDeviceType::INTEGRATED_GPU,
            DeviceTypeConfig::Discrete => vk::PhysicalDeviceType::DISCRETE_GPU,
            DeviceTypeConfig::Virtual => vk::PhysicalDeviceType::VIRTUAL_GPU,
            DeviceTypeConfig::Cpu => vk::PhysicalDeviceType::CPU,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueFamilyConfig {
    pub count: u32,
    pub graphics: bool,
    pub compute: bool,
    pub transfer: bool,
    pub present: bool,
}

impl QueueFamilyConfig {
    fn to_family(&self) -> QueueFamily {
        let mut flags = vk::QueueFlags::empty();
        if self.graphics {
            flags |= vk::QueueFlags::GRAPHICS;
        }
        if self.compute {
            flags |= vk::QueueFlags::COMPUTE;
        }
        if self.transfer {
            flags |= vk::QueueFlags::TRANSFER;
        }
        QueueFamily::new(flags, self.count).with_present(self.present)
    }
}

/// Raw `VkFormat` / `VkColorSpaceKHR` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurfaceFormatConfig {
    pub format: i32,
    #[serde(default)]
    pub color_space: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalDeviceConfig {
    pub name: String,
    pub api_version: Option<String>,
    pub vendor_id: u32,
    pub device_id: u32,
    pub device_type: DeviceTypeConfig,
    pub extensions: Vec<ExtensionRecord>,
    pub queue_families: Vec<QueueFamilyConfig>,
    pub surface_formats: Vec<SurfaceFormatConfig>,
    /// Raw `VkPresentModeKHR` values.
    pub present_modes: Vec<i32>,
    pub displays: Vec<DisplayConfig>,
    pub known_functions: Vec<String>,
    pub adapter_luid: Option<AdapterLuid>,
}

impl PhysicalDeviceConfig {
    fn to_descriptor(&self) -> Result<PhysicalDeviceDescriptor> {
        let mut descriptor = PhysicalDeviceDescriptor::new(self.name.clone())
            .with_ids(self.vendor_id, self.device_id)
            .with_device_type(self.device_type.into());
        if let Some(version) = &self.api_version {
            descriptor = descriptor.with_api_version(parse_version(version)?);
        }
        for extension in &self.extensions {
            descriptor = descriptor.with_extension(extension.clone());
        }
        for family in &self.queue_families {
            descriptor = descriptor.with_queue_family(family.to_family());
        }
        for format in &self.surface_formats {
            descriptor = descriptor.with_surface_format(vk::SurfaceFormatKHR {
                format: vk::Format::from_raw(format.format),
                color_space: vk::ColorSpaceKHR::from_raw(format.color_space),
            });
        }
        for mode in &self.present_modes {
            descriptor = descriptor.with_present_mode(vk::PresentModeKHR::from_raw(*mode));
        }
        for display in &self.displays {
            descriptor = descriptor.with_display(DisplayDescriptor::new(&display.name, display.width, display.height));
        }
        for name in &self.known_functions {
            descriptor = descriptor.with_known_device_function(name.clone());
        }
        if let Some(luid) = self.adapter_luid {
            descriptor = descriptor.with_adapter_luid(luid);
        }
        Ok(descriptor)
    }
}

/// Members are physical device names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    pub devices: Vec<String>,
    pub subset_allocation: bool,
}

/// Everything a fixture file can say about the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub min_interface_version: u32,
    pub max_interface_version: u32,
    pub api_version: Option<String>,
    pub expose_builtin_extensions: bool,
    pub enable_icd_wsi: bool,
    pub supports_tooling_info: bool,
    pub supports_adapter_enumeration: bool,
    pub reverse_adapter_order: bool,
    pub instance_extensions: Vec<ExtensionRecord>,
    pub layers: Vec<LayerRecord>,
    pub tools: Vec<ToolRecord>,
    pub physical_devices: Vec<PhysicalDeviceConfig>,
    pub groups: Vec<GroupConfig>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            min_interface_version: DEFAULT_MIN_INTERFACE_VERSION,
            max_interface_version: DEFAULT_MAX_INTERFACE_VERSION,
            api_version: None,
            expose_builtin_extensions: false,
            enable_icd_wsi: false,
            supports_tooling_info: false,
            supports_adapter_enumeration: true,
            reverse_adapter_order: false,
            instance_extensions: Vec::new(),
            layers: Vec::new(),
            tools: Vec::new(),
            physical_devices: Vec::new(),
            groups: Vec::new(),
        }
    }
}

fn parse_version(value: &str) -> Result<ApiVersion> {
    ApiVersion::parse(value).map_err(|source| FixtureError::Version {
        value: value.to_string(),
        source,
    })
}

impl FixtureConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| FixtureError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loading fixture from {}", path.display());
        Self::parse(&text, format).map_err(|message| FixtureError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parses fixture text. The error is the parser's message.
    pub fn parse(text: &str, format: ConfigFormat) -> std::result::Result<Self, String> {
        match format {
            ConfigFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        }
    }

    pub fn serialize(&self, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(|e| FixtureError::Serialize {
                message: format!("JSON: {}", e),
            }),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| FixtureError::Serialize {
                message: format!("TOML: {}", e),
            }),
        }
    }
}

impl DriverState {
    /// Builds a fixture from a config. Nothing is half-applied on error.
    pub fn from_config(config: &FixtureConfig) -> Result<Self> {
        let mut state = DriverState::new()
            .with_interface_versions(config.min_interface_version, config.max_interface_version);
        if let Some(version) = &config.api_version {
            state.api_version = parse_version(version)?;
        }
        state.expose_builtin_extensions = config.expose_builtin_extensions;
        state.enable_icd_wsi = config.enable_icd_wsi;
        state.supports_tooling_info = config.supports_tooling_info;
        state.supports_adapter_enumeration = config.supports_adapter_enumeration;
        state.reverse_adapter_order = config.reverse_adapter_order;
        state.tooling_properties = config.tools.clone();
        for extension in &config.instance_extensions {
            state.add_instance_extension(extension.clone());
        }
        for layer in &config.layers {
            state.add_instance_layer(layer.clone());
        }

        let mut registered = Vec::with_capacity(config.physical_devices.len());
        for device in &config.physical_devices {
            let handle = state.add_physical_device(device.to_descriptor()?);
            registered.push((device.name.as_str(), handle));
        }

        for (index, group) in config.groups.iter().enumerate() {
            if group.devices.len() > vk::MAX_DEVICE_GROUP_SIZE {
                return Err(FixtureError::GroupTooLarge {
                    group: index,
                    size: group.devices.len(),
                });
            }
            let members = group
                .devices
                .iter()
                .map(|name| {
                    registered
                        .iter()
                        .find(|(registered_name, _)| registered_name == name)
                        .map(|(_, handle)| *handle)
                        .ok_or_else(|| FixtureError::UnknownGroupMember {
                            group: index,
                            name: name.clone(),
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            state.add_physical_device_group(
                PhysicalDeviceGroup::new(members).with_subset_allocation(group.subset_allocation),
            );
        }

        log::info!(
            "Fixture built: API {}, {} physical devices, {} groups",
            state.api_version,
            config.physical_devices.len(),
            config.groups.len()
        );
        Ok(state)
    }

    /// Replaces this fixture with one built from `config`, in place.
    pub fn apply_config(&mut self, config: &FixtureConfig) -> Result<()> {
        *self = Self::from_config(config)?;
        Ok(())
    }

    pub fn load_fixture(path: &Path) -> Result<Self> {
        Self::from_config(&FixtureConfig::load(path)?)
    }
}
