//! # Driver State
//!
//! The object model behind every entry point. [`DriverState`] is the fixture: the interface and
//! API versions the driver claims, its extension and layer catalogues, the emulated physical
//! devices and every object the application created through it.
//!
//! ## Submodules
//!
//! - `state`: the fixture itself and its lookups.
//! - `lifecycle`: create/destroy for instances, devices and their dependent objects.
//! - `physical_device`: builder-style descriptors for emulated GPUs and groups.
//! - `debug_utils`: messengers and the driver's own messages.
//! - `extension_chain`: typed view over caller `p_next` output chains.
//! - `config`: fixture files (TOML/JSON).
//! - `context`: the process-wide fixture used by the C entry points.

pub mod config;
pub mod context;
pub mod debug_utils;
pub mod extension_chain;
pub mod lifecycle;
pub mod physical_device;
pub mod records;
pub mod state;

pub use config::{ConfigFormat, FixtureConfig, GroupConfig, PhysicalDeviceConfig, QueueFamilyConfig};
pub use context::{current_driver_ptr, reset_current_driver, with_driver};
pub use debug_utils::DRIVER_MESSAGE_ID;
pub use lifecycle::{ChainedMessenger, DeviceCreateRequest, InstanceCreateRequest, QueueRequest};
pub use physical_device::{DisplayDescriptor, PhysicalDeviceDescriptor, PhysicalDeviceGroup, QueueFamily};
pub use records::*;
pub use state::{DriverState, ExtensionScope, FIXTURE_ENV};

#[cfg(test)]
mod tests;
