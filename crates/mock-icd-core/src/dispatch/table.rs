use std::collections::HashMap;

use crate::dispatch::VoidFunction;
use crate::driver::DriverState;
use crate::registry::EnabledExtensions;
use crate::version::ApiVersion;

/// The dispatchable object an entry point's first parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryLevel {
    Global,
    Instance,
    PhysicalDevice,
    Device,
}

/// When a table's entries may be handed out.
#[derive(Clone, Copy)]
pub enum Gate {
    Always,
    /// Scope API version is at least this.
    Core(ApiVersion),
    InstanceExtension(&'static str),
    DeviceExtension(&'static str),
    /// Decided by the fixture, e.g. tooling-info support.
    Fixture(fn(&DriverState) -> bool),
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gate::Always => write!(f, "Always"),
            Gate::Core(version) => write!(f, "Core({})", version),
            Gate::InstanceExtension(name) => write!(f, "InstanceExtension({})", name),
            Gate::DeviceExtension(name) => write!(f, "DeviceExtension({})", name),
            Gate::Fixture(_) => write!(f, "Fixture"),
        }
    }
}

/// What a gate is evaluated against.
pub struct GateContext<'a> {
    pub state: &'a DriverState,
    pub api_version: ApiVersion,
    /// `None` outside instance scope.
    pub instance_extensions: Option<&'a EnabledExtensions>,
    /// `None` outside device scope.
    pub device_extensions: Option<&'a EnabledExtensions>,
}

impl Gate {
    pub fn is_open(&self, context: &GateContext<'_>) -> bool {
        match self {
            Gate::Always => true,
            Gate::Core(version) => context.api_version.at_least(*version),
            Gate::InstanceExtension(name) => context
                .instance_extensions
                .is_some_and(|enabled| enabled.is_enabled(name)),
            Gate::DeviceExtension(name) => context
                .device_extensions
                .is_some_and(|enabled| enabled.is_enabled(name)),
            Gate::Fixture(predicate) => predicate(context.state),
        }
    }

    /// The extension that owns the table, if any.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Gate::InstanceExtension(name) | Gate::DeviceExtension(name) => Some(*name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProcEntry {
    pub name: &'static str,
    pub level: EntryLevel,
    pub function: VoidFunction,
    /// Driver-provided surface create/destroy.
    pub icd_wsi: bool,
}

#[derive(Debug, Clone)]
pub struct ProcTable {
    pub label: &'static str,
    pub gate: Gate,
    pub entries: Vec<ProcEntry>,
}

impl ProcTable {
    pub fn new(label: &'static str, gate: Gate, entries: Vec<ProcEntry>) -> Self {
        Self { label, gate, entries }
    }
}

/// Tables searched in order for one scope, with a name index over all of them.
#[derive(Debug)]
pub struct Scope {
    tables: Vec<ProcTable>,
    index: HashMap<&'static str, Vec<(usize, usize)>>,
}

impl Scope {
    pub fn new(tables: Vec<ProcTable>) -> Self {
        let mut index: HashMap<&'static str, Vec<(usize, usize)>> = HashMap::new();
        for (table_index, table) in tables.iter().enumerate() {
            for (entry_index, entry) in table.entries.iter().enumerate() {
                index.entry(entry.name).or_default().push((table_index, entry_index));
            }
        }
        Self { tables, index }
    }

    pub fn tables(&self) -> &[ProcTable] {
        &self.tables
    }

    /// Every table entry named `name`, in table order, with the table that holds it.
    pub fn candidates<'s>(&'s self, name: &str) -> impl Iterator<Item = (&'s ProcTable, &'s ProcEntry)> + use<'s> {
        self.index
            .get(name)
            .into_iter()
            .flatten()
            .map(|(table, entry)| (&self.tables[*table], &self.tables[*table].entries[*entry]))
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ProcTable, &ProcEntry)> {
        self.tables
            .iter()
            .flat_map(|table| table.entries.iter().map(move |entry| (table, entry)))
    }
}

/// Every resolver table, built once per process.
#[derive(Debug)]
pub struct ResolverTables {
    pub global: Scope,
    pub instance: Scope,
    pub device: Scope,
}
