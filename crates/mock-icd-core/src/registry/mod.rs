//! # Extension and Layer Registry
//!
//! Decides which extensions a scope may use. Every scope owns an [`ExtensionCatalogue`] of what
//! the driver advertises; creating an instance or device intersects the application's request
//! with that catalogue into an [`EnabledExtensions`] set. Unknown requests are ignored the way a
//! real driver ignores them.

pub mod extension;

pub use extension::{
    bounded_eq, read_fixed_str, write_fixed_str, EnabledExtensions, ExtensionCatalogue,
    ExtensionRecord, LayerRecord, MAX_NAME_LEN,
};
