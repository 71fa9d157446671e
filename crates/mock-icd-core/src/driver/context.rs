//! The process-wide driver the C entry points operate on.
//!
//! Entry points cannot carry a context argument, so they reach the fixture through one global
//! slot shared by every thread, the way a loaded driver library has one set of globals. The
//! fixture is boxed and reset in place, which keeps the pointer handed out by
//! [`current_driver_ptr`] valid for the life of the process.

use std::cell::Cell;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;

use crate::contract;
use crate::driver::state::DriverState;

static DRIVER: Lazy<Mutex<Box<DriverState>>> = Lazy::new(|| Mutex::new(Box::new(DriverState::initial())));

thread_local! {
    static INSIDE_DRIVER: Cell<bool> = const { Cell::new(false) };
}

/// Clears the re-entry flag when an entry point returns or unwinds.
struct EntryGuard;

impl EntryGuard {
    fn enter() -> Self {
        if INSIDE_DRIVER.with(|inside| inside.replace(true)) {
            contract::violation("driver entered again while an entry point is still running");
        }
        EntryGuard
    }
}

impl Drop for EntryGuard {
    fn drop(&mut self) {
        INSIDE_DRIVER.with(|inside| inside.set(false));
    }
}

/// Runs `f` against the driver, then delivers any debug-utils callbacks it queued.
///
/// Callbacks run after the lock is released, so they may call back into the driver. Other
/// threads wait for the running entry point to finish.
pub fn with_driver<R>(f: impl FnOnce(&mut DriverState) -> R) -> R {
    let (result, pending) = {
        let _entry = EntryGuard::enter();
        // A contract violation unwinds with the lock held; the fixture is still usable afterwards.
        let mut state = DRIVER.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut **state);
        (result, state.take_pending_messages())
    };
    for message in pending {
        message.deliver();
    }
    result
}

/// Address of the fixture, for harnesses that poke at it directly.
pub fn current_driver_ptr() -> *mut DriverState {
    with_driver(|state| state as *mut DriverState)
}

/// Reconstructs the fixture in place and returns its (unchanged) address.
pub fn reset_current_driver() -> *mut DriverState {
    with_driver(|state| {
        state.reset();
        state as *mut DriverState
    })
}
