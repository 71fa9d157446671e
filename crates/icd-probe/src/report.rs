//! Human-readable reports that need no driver library: the resolver tables and fixture files.

use std::fmt::Write as _;
use std::path::Path;

use clap::ValueEnum;

use mock_icd_core::dispatch::{Scope, TABLES};
use mock_icd_core::{DriverState, FixtureConfig};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeName {
    Global,
    Instance,
    Device,
}

impl ScopeName {
    fn scope(self) -> &'static Scope {
        match self {
            ScopeName::Global => &TABLES.global,
            ScopeName::Instance => &TABLES.instance,
            ScopeName::Device => &TABLES.device,
        }
    }
}

/// One line per table entry: name, dispatch level, owning table and its gate.
pub fn symbol_listing(scope: ScopeName) -> String {
    let mut out = String::new();
    for (table, entry) in scope.scope().entries() {
        let _ = writeln!(
            out,
            "{:<48} {:<15} {:<32} {:?}{}",
            entry.name,
            format!("{:?}", entry.level),
            table.label,
            table.gate,
            if entry.icd_wsi { " [icd-wsi]" } else { "" }
        );
    }
    out
}

/// Loads a fixture file, builds a driver from it and describes the result.
pub fn config_summary(path: &Path) -> Result<String> {
    let config = FixtureConfig::load(path)?;
    let state = DriverState::from_config(&config)?;

    let mut out = String::new();
    let _ = writeln!(out, "fixture: {}", path.display());
    let _ = writeln!(
        out,
        "interface versions: {}-{}",
        state.negotiator.min_supported, state.negotiator.max_supported
    );
    let _ = writeln!(out, "api version: {}", state.api_version);
    let _ = writeln!(out, "instance extensions: {}", state.instance_extensions.available().len());
    let _ = writeln!(out, "layers: {}", state.instance_layers.len());
    let _ = writeln!(out, "physical devices: {}", state.physical_device_handles().len());
    for (_, device) in state.physical_devices() {
        let _ = writeln!(
            out,
            "  {} (api {}, {} queue families, {} extensions)",
            device.name,
            device.api_version(),
            device.queue_families.len(),
            device.extensions.available().len()
        );
    }
    let _ = writeln!(out, "groups: {}", state.physical_device_group_list().len());
    let _ = writeln!(out, "driver-provided WSI: {}", if state.provides_icd_wsi() { "yes" } else { "no" });
    Ok(out)
}
