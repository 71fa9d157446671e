//! # ICD Probe
//!
//! Tooling around the mock driver: writes the loader manifest, opens the built library and
//! calls its exports the way a loader would, and reports on resolver tables and fixture files.

pub mod error;
pub mod library;
pub mod logging;
pub mod manifest;
pub mod report;

pub use error::{ProbeError, Result};
pub use library::{DriverLibrary, Negotiation};
pub use manifest::IcdManifest;
