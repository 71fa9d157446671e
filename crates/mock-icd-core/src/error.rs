//! # Mock ICD Core Errors
//!
//! Recoverable failures of the fixture's outer surfaces: reading and parsing fixture files and
//! turning them into a [`DriverState`](crate::driver::DriverState).
//!
//! Protocol results handed back through the Vulkan ABI are plain [`ash::vk::Result`] values and
//! never pass through this type. Fixture misuse is reported by [`crate::contract::violation`].
use std::path::PathBuf;

use crate::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read fixture file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse fixture file '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported fixture format for '{path}' (expected .toml or .json)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Invalid API version '{value}': {source}")]
    Version {
        value: String,
        #[source]
        source: VersionError,
    },

    #[error("Physical device group {group} references unknown device '{name}'")]
    UnknownGroupMember { group: usize, name: String },

    #[error("Physical device group {group} has {size} devices; at most {max} fit", max = ash::vk::MAX_DEVICE_GROUP_SIZE)]
    GroupTooLarge { group: usize, size: usize },

    #[error("Failed to serialize fixture: {message}")]
    Serialize { message: String },
}

/// Result type for fixture configuration.
pub type Result<T> = std::result::Result<T, FixtureError>;
