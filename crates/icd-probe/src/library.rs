//! Opens a built driver library and calls its exports the way a loader does.

use std::ffi::{c_char, CString};
use std::path::{Path, PathBuf};

use ash::vk;
use libloading::{Library, Symbol};

use mock_icd_core::DriverState;

use crate::error::{ProbeError, Result};

type NegotiateFn = unsafe extern "system" fn(*mut u32) -> vk::Result;
type ProcAddrFn = unsafe extern "system" fn(vk::Instance, *const c_char) -> vk::PFN_vkVoidFunction;
type DriverStateFn = extern "system" fn() -> *mut DriverState;

pub const NEGOTIATE_SYMBOL: &str = "vk_icdNegotiateLoaderICDInterfaceVersion";
pub const GIPA_SYMBOL: &str = "vk_icdGetInstanceProcAddr";
pub const GPDPA_SYMBOL: &str = "vk_icdGetPhysicalDeviceProcAddr";
pub const GET_STATE_SYMBOL: &str = "get_test_icd_func";
pub const RESET_STATE_SYMBOL: &str = "reset_icd_func";

/// Outcome of one negotiation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiation {
    pub result: vk::Result,
    /// The in/out version after the call.
    pub version: u32,
}

pub struct DriverLibrary {
    library: Library,
    path: PathBuf,
}

impl DriverLibrary {
    /// Opens the library at `path`.
    ///
    /// # Safety
    /// Runs the library's initialisers; `path` must name a driver built from this workspace.
    pub unsafe fn open(path: &Path) -> Result<Self> {
        let library = unsafe { Library::new(path) }.map_err(|source| ProbeError::LibraryLoad {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened driver library");
        Ok(Self {
            library,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn symbol<T>(&self, name: &str) -> Result<Symbol<'_, T>> {
        // SAFETY: every caller names an export whose signature matches `T`.
        unsafe { self.library.get::<T>(name.as_bytes()) }.map_err(|source| ProbeError::MissingSymbol {
            path: self.path.clone(),
            symbol: name.to_string(),
            source,
        })
    }

    pub fn exports(&self, name: &str) -> bool {
        self.symbol::<unsafe extern "system" fn()>(name).is_ok()
    }

    /// One `vk_icdNegotiateLoaderICDInterfaceVersion` round starting from `version`.
    pub fn negotiate(&self, version: u32) -> Result<Negotiation> {
        let negotiate = self.symbol::<NegotiateFn>(NEGOTIATE_SYMBOL)?;
        let mut version = version;
        let result = unsafe { negotiate(&mut version) };
        tracing::info!(?result, version, "negotiated interface version");
        Ok(Negotiation { result, version })
    }

    /// `vk_icdGetInstanceProcAddr(instance, name)`.
    pub fn instance_proc_addr(&self, instance: vk::Instance, name: &str) -> Result<vk::PFN_vkVoidFunction> {
        let gipa = self.symbol::<ProcAddrFn>(GIPA_SYMBOL)?;
        let name = c_name(name)?;
        Ok(unsafe { gipa(instance, name.as_ptr()) })
    }

    /// `vk_icdGetPhysicalDeviceProcAddr(instance, name)`.
    pub fn physical_device_proc_addr(&self, instance: vk::Instance, name: &str) -> Result<vk::PFN_vkVoidFunction> {
        let gpdpa = self.symbol::<ProcAddrFn>(GPDPA_SYMBOL)?;
        let name = c_name(name)?;
        Ok(unsafe { gpdpa(instance, name.as_ptr()) })
    }

    /// The driver's process-wide fixture.
    ///
    /// # Safety
    /// The library must have been built from the same `mock-icd-core` source and compiler as this
    /// harness. The pointer is only valid while the library stays open, and must not be used while
    /// another thread is inside an entry point.
    pub unsafe fn driver_state(&self) -> Result<*mut DriverState> {
        let get = self.symbol::<DriverStateFn>(GET_STATE_SYMBOL)?;
        Ok(get())
    }

    /// Resets the fixture. Same caveats as [`driver_state`](Self::driver_state).
    ///
    /// # Safety
    /// See [`driver_state`](Self::driver_state).
    pub unsafe fn reset_driver_state(&self) -> Result<*mut DriverState> {
        let reset = self.symbol::<DriverStateFn>(RESET_STATE_SYMBOL)?;
        Ok(reset())
    }
}

fn c_name(name: &str) -> Result<CString> {
    CString::new(name).map_err(|_| ProbeError::InvalidName { name: name.to_string() })
}

/// Platform file name of the driver library built from the `mock-icd` crate.
pub fn driver_file_name() -> std::ffi::OsString {
    libloading::library_filename("mock_icd")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_library() {
        let missing = Path::new("/nonexistent/libmock_icd.so");
        match unsafe { DriverLibrary::open(missing) } {
            Err(ProbeError::LibraryLoad { path, .. }) => assert_eq!(path, missing),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("a missing library opened"),
        }
    }

    #[test]
    fn test_interior_nul_is_rejected() {
        assert!(matches!(c_name("vkCreate\0Instance"), Err(ProbeError::InvalidName { .. })));
    }

    #[test]
    fn test_driver_file_name_mentions_crate() {
        assert!(driver_file_name().to_string_lossy().contains("mock_icd"));
    }
}
