//! # Entry Points
//!
//! The `extern "system"` functions the resolver hands to the loader. Each one decodes its raw
//! arguments, runs the matching [`DriverState`](crate::driver::DriverState) operation on the
//! process-wide fixture and encodes the result back into caller memory.
//!
//! A panic inside any of them (a contract violation) aborts the process, which is the intended
//! outcome for a misbehaving loader.

pub mod debug_utils;
pub mod device;
pub mod exports;
pub mod global;
pub mod instance;
pub mod physical_device;
pub mod stubs;
pub mod wsi;

use std::ffi::{c_char, CStr};

/// Reads a NUL-terminated name. `None` for a null pointer.
///
/// # Safety
/// `name` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn read_name(name: *const c_char) -> Option<String> {
    if name.is_null() {
        return None;
    }
    // SAFETY: guaranteed by the caller.
    Some(unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
}

/// Reads `count` names from a `ppEnabled*Names` array. Null entries are skipped.
///
/// # Safety
/// `names` must be null or valid for `count` reads of NUL-terminated string pointers.
pub(crate) unsafe fn read_name_list(names: *const *const c_char, count: u32) -> Vec<String> {
    if names.is_null() {
        return Vec::new();
    }
    (0..count as usize)
        .filter_map(|i| unsafe { read_name(*names.add(i)) })
        .collect()
}

/// Stores `value` if the caller gave somewhere to put it.
///
/// # Safety
/// `out` must be null or valid for a write of `T`.
pub(crate) unsafe fn write_out<T>(out: *mut T, value: T) {
    if let Some(slot) = unsafe { out.as_mut() } {
        *slot = value;
    }
}

#[cfg(test)]
mod tests;
