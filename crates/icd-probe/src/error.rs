//! Failures of the harness itself. What the driver returns through the ABI is reported as data,
//! not as an error.
use std::path::PathBuf;

use mock_icd_core::FixtureError;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Failed to load driver library '{path}'")]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("Driver library '{path}' does not export '{symbol}'")]
    MissingSymbol {
        path: PathBuf,
        symbol: String,
        #[source]
        source: libloading::Error,
    },

    #[error("Symbol name '{name}' contains a NUL byte")]
    InvalidName { name: String },

    #[error("Failed to write manifest '{path}'")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read manifest '{path}'")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to (de)serialize manifest")]
    ManifestFormat {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
