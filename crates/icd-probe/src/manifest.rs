//! Loader manifest for the built driver.
//!
//! The loader finds a driver through a JSON file naming the library and the API version it
//! claims. `VK_DRIVER_FILES` (or the older `VK_ICD_FILENAMES`) pointed at the written file makes
//! the loader pick up the mock driver and nothing else.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mock_icd_core::ApiVersion;

use crate::error::{ProbeError, Result};

pub const FILE_FORMAT_VERSION: &str = "1.0.1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcdManifest {
    pub file_format_version: String,
    #[serde(rename = "ICD")]
    pub icd: IcdEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IcdEntry {
    pub library_path: PathBuf,
    pub api_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_portability_driver: Option<bool>,
    /// "32" or "64"; lets a loader skip a library of the wrong width without opening it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_arch: Option<String>,
}

impl IcdManifest {
    pub fn new(library_path: impl Into<PathBuf>, api_version: ApiVersion) -> Self {
        Self {
            file_format_version: FILE_FORMAT_VERSION.to_string(),
            icd: IcdEntry {
                library_path: library_path.into(),
                api_version: api_version.to_string(),
                is_portability_driver: None,
                library_arch: None,
            },
        }
    }

    pub fn with_portability(mut self, is_portability_driver: bool) -> Self {
        self.icd.is_portability_driver = Some(is_portability_driver);
        self
    }

    /// Records the pointer width of the running harness.
    pub fn with_host_arch(mut self) -> Self {
        self.icd.library_arch = Some((usize::BITS).to_string());
        self
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| ProbeError::ManifestFormat { source })
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ProbeError::ManifestWrite {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Wrote driver manifest to {}", path.display());
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ProbeError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ProbeError::ManifestFormat { source })
    }
}
