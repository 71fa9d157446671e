//! # Mock ICD Core
//!
//! The engine of a mock Vulkan installable client driver: a conformance double a loader can
//! discover, negotiate with and resolve entry points from, whose every observable decision is
//! recorded for the test that drives it.
//!
//! ## Modules
//!
//! - `abi`: dispatchable handle storage, non-dispatchable handle values and the two-call
//!   enumeration idiom.
//! - `registry`: extension and layer catalogues, and the enabled subsets.
//! - `negotiate`: the loader/driver interface-version handshake.
//! - `dispatch`: declarative entry-point tables and the scope-aware resolver.
//! - `driver`: the [`DriverState`] fixture, object lifecycle, debug utils and fixture files.
//! - `icd`: the `extern "system"` entry points handed to the loader.
//! - `contract`: fixture-misuse panics.

pub mod abi;
pub mod contract;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod icd;
pub mod negotiate;
pub mod registry;
pub mod version;

pub use driver::{
    current_driver_ptr, reset_current_driver, with_driver, DeviceCreateRequest, DriverState, FixtureConfig,
    InstanceCreateRequest, PhysicalDeviceDescriptor, PhysicalDeviceGroup, QueueFamily,
};
pub use error::{FixtureError, Result};
pub use negotiate::{CalledIcdGipa, CalledNegotiateInterface, InterfaceNegotiator, InterfaceVersionCheck};
pub use registry::{ExtensionRecord, LayerRecord};
pub use version::ApiVersion;
