use std::ffi::c_char;

use ash::vk;
use serde::{Deserialize, Serialize};

use crate::version::ApiVersion;

/// Longest name that fits the ABI field, excluding the terminator.
pub const MAX_NAME_LEN: usize = vk::MAX_EXTENSION_NAME_SIZE - 1;

/// Compares two names the way the fixed-size ABI field would see them.
pub fn bounded_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    a[..a.len().min(MAX_NAME_LEN)] == b[..b.len().min(MAX_NAME_LEN)]
}

/// Copies `name` into a NUL-terminated fixed-size field, truncating if needed.
pub fn write_fixed_str<const N: usize>(dst: &mut [c_char; N], name: &str) {
    let bytes = name.as_bytes();
    let len = bytes.len().min(N.saturating_sub(1));
    for (d, s) in dst.iter_mut().zip(&bytes[..len]) {
        *d = *s as c_char;
    }
    for d in dst.iter_mut().skip(len) {
        *d = 0;
    }
}

/// Reads a NUL-terminated fixed-size field back into a `String`.
pub fn read_fixed_str(src: &[c_char]) -> String {
    let bytes: Vec<u8> = src.iter().take_while(|c| **c != 0).map(|c| *c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// One extension the driver advertises.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionRecord {
    pub name: String,
    #[serde(default)]
    pub spec_version: u32,
}

impl ExtensionRecord {
    pub fn new(name: impl Into<String>, spec_version: u32) -> Self {
        Self {
            name: name.into(),
            spec_version,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, 0)
    }

    pub fn matches(&self, name: &str) -> bool {
        bounded_eq(&self.name, name)
    }

    pub fn to_properties(&self) -> vk::ExtensionProperties {
        let mut props = vk::ExtensionProperties::default();
        write_fixed_str(&mut props.extension_name, &self.name);
        props.spec_version = self.spec_version;
        props
    }
}

impl PartialEq for ExtensionRecord {
    fn eq(&self, other: &Self) -> bool {
        bounded_eq(&self.name, &other.name)
    }
}

impl Eq for ExtensionRecord {}

/// One layer reported by `vkEnumerateInstanceLayerProperties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub name: String,
    #[serde(default)]
    pub spec_version: ApiVersion,
    #[serde(default)]
    pub implementation_version: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub extensions: Vec<ExtensionRecord>,
}

impl LayerRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec_version: ApiVersion::default(),
            implementation_version: 1,
            description: String::new(),
            extensions: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_extension(mut self, extension: ExtensionRecord) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn to_properties(&self) -> vk::LayerProperties {
        let mut props = vk::LayerProperties::default();
        write_fixed_str(&mut props.layer_name, &self.name);
        write_fixed_str(&mut props.description, &self.description);
        props.spec_version = self.spec_version.to_packed();
        props.implementation_version = self.implementation_version;
        props
    }
}

/// The extensions one scope (the instance level, or one physical device) claims to support.
#[derive(Debug, Clone, Default)]
pub struct ExtensionCatalogue {
    available: Vec<ExtensionRecord>,
    populated: bool,
}

impl ExtensionCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = ExtensionRecord>) -> Self {
        let mut catalogue = Self::new();
        for record in records {
            catalogue.add(record);
        }
        catalogue
    }

    /// Adds `record`, replacing an entry with the same name.
    pub fn add(&mut self, record: ExtensionRecord) {
        match self.available.iter_mut().find(|existing| **existing == record) {
            Some(existing) => *existing = record,
            None => self.available.push(record),
        }
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.available.iter().any(|record| record.matches(name))
    }

    pub fn available(&self) -> &[ExtensionRecord] {
        &self.available
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Appends a static table once. Returns true only on the call that did the work; records
    /// already present keep their configured spec version.
    pub fn populate_once(&mut self, table: impl IntoIterator<Item = ExtensionRecord>) -> bool {
        if self.populated {
            return false;
        }
        self.populated = true;
        for record in table {
            if !self.is_available(&record.name) {
                self.available.push(record);
            }
        }
        true
    }

    /// Intersects the requested names with this catalogue. Unknown names are dropped.
    pub fn admit<'a>(&self, requested: impl IntoIterator<Item = &'a str>) -> EnabledExtensions {
        let mut enabled = EnabledExtensions::default();
        for name in requested {
            if !self.is_available(name) {
                log::debug!("Ignoring unsupported extension '{}'", name);
                continue;
            }
            if !enabled.is_enabled(name) {
                enabled.names.push(name.to_string());
            }
        }
        enabled
    }
}

/// The subset of a catalogue an application enabled at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledExtensions {
    names: Vec<String>,
}

impl EnabledExtensions {
    pub fn is_enabled(&self, name: &str) -> bool {
        self.names.iter().any(|enabled| bounded_eq(enabled, name))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
