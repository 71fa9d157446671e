//! # ABI Building Blocks
//!
//! Pieces shared by every entry point that crosses the Vulkan ABI:
//!
//! - **Handles**: [`DispatchArena`] backs dispatchable handles (instances, physical devices,
//!   devices, queues, command buffers) with a `#[repr(C)]` [`DispatchHeader`] whose first word
//!   carries [`ICD_LOADER_MAGIC`]. [`HandleSet`] hands out opaque non-dispatchable values.
//! - **Enumeration**: [`fill_slice`] and [`fill_raw`] implement the two-call idiom with its
//!   truncation rules.

pub mod enumerate;
pub mod handle;

pub use enumerate::{fill_raw, fill_raw_copied, fill_raw_in_place, fill_slice};
pub use handle::{
    DispatchArena, DispatchHeader, DispatchableKind, HandleSet, NonDispatchableKind,
    ICD_LOADER_MAGIC, NON_DISPATCHABLE_STRIDE,
};

#[cfg(test)]
mod tests;
