//! # Entry-Point Resolution
//!
//! Maps a symbol name to a function pointer for one of four scopes: global (null instance),
//! instance, physical device and device.
//!
//! Every entry point lives in a declarative [`ProcTable`] guarded by a [`Gate`]: always open, a
//! core API version, an instance or device extension, or a fixture predicate. The resolver walks
//! a scope's tables in order and returns the first entry whose table is open. The tables are
//! built once per process into [`TABLES`].
//!
//! Resolution rules per scope are implemented on [`DriverState`](crate::driver::DriverState) in
//! the `resolver` submodule.

pub mod resolver;
pub mod table;
pub mod tables;

use once_cell::sync::Lazy;

use crate::registry::ExtensionRecord;

pub use table::{EntryLevel, Gate, GateContext, ProcEntry, ProcTable, ResolverTables, Scope};

/// `PFN_vkVoidFunction` without the `Option`.
pub type VoidFunction = unsafe extern "system" fn();

pub static TABLES: Lazy<ResolverTables> = Lazy::new(tables::build);

/// One record per instance extension that owns a table, in table order.
pub fn builtin_instance_extensions() -> Vec<ExtensionRecord> {
    let mut records: Vec<ExtensionRecord> = Vec::new();
    for table in TABLES.instance.tables() {
        if let Gate::InstanceExtension(name) = table.gate {
            let record = ExtensionRecord::new(name, 1);
            if !records.contains(&record) {
                records.push(record);
            }
        }
    }
    records
}
