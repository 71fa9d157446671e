//! Contract violations.
//!
//! The fixture is stricter than a production driver. Misuse by the code under test (destroying a
//! handle the driver never created, querying a physical device that was never enumerated) is not
//! answered with a result code: it stops the test with a message naming the broken rule. Inside
//! an `extern "system"` entry point the panic cannot unwind and aborts the process.

use std::fmt::Display;

/// Prefix of every contract-violation panic message.
pub const VIOLATION_PREFIX: &str = "mock ICD contract violation";

/// Logs and panics with a message identifying the violated rule.
#[track_caller]
pub fn violation(what: impl Display) -> ! {
    log::error!("{}: {}", VIOLATION_PREFIX, what);
    panic!("{}: {}", VIOLATION_PREFIX, what);
}
