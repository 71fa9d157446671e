//! # Interface Version Negotiation
//!
//! The loader calls `vk_icdNegotiateLoaderICDInterfaceVersion` with the newest loader/driver
//! interface version it understands. [`InterfaceNegotiator`] compares that against the driver's
//! supported range, writes the agreed version back and remembers the outcome so tests can assert
//! on it. It also records the order in which the loader used the negotiation and proc-address
//! entry points, since a loader may probe either first.

use ash::vk;
use serde::{Deserialize, Serialize};

/// Lowest interface version the driver accepts unless configured otherwise.
pub const DEFAULT_MIN_INTERFACE_VERSION: u32 = 0;
/// Highest interface version the driver speaks unless configured otherwise.
pub const DEFAULT_MAX_INTERFACE_VERSION: u32 = 6;

/// Outcome of the last negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterfaceVersionCheck {
    #[default]
    NotCalled,
    /// The loader's version is below the driver's minimum.
    LoaderVersionTooOld,
    /// The loader's version is above the driver's maximum; the driver clamped it.
    LoaderVersionTooNew,
    /// The driver's maximum is above the loader's version; the loader's version stands.
    DriverVersionTooNew,
    VersionIsSupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalledNegotiateInterface {
    #[default]
    NotCalled,
    /// Negotiation happened before any proc-address call.
    VkIcdNegotiate,
    /// A proc-address entry point ran before negotiation.
    VkIcdGipaFirst,
}

/// Which root proc-address export the loader used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalledIcdGipa {
    #[default]
    NotCalled,
    VkIcdGipa,
    VkGipa,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceNegotiator {
    pub min_supported: u32,
    pub max_supported: u32,
    pub check: InterfaceVersionCheck,
    pub called_negotiate: CalledNegotiateInterface,
    pub called_gipa: CalledIcdGipa,
    /// Version written back by the last successful negotiation.
    pub negotiated: Option<u32>,
}

impl Default for InterfaceNegotiator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERFACE_VERSION, DEFAULT_MAX_INTERFACE_VERSION)
    }
}

impl InterfaceNegotiator {
    pub fn new(min_supported: u32, max_supported: u32) -> Self {
        Self {
            min_supported,
            max_supported,
            check: InterfaceVersionCheck::NotCalled,
            called_negotiate: CalledNegotiateInterface::NotCalled,
            called_gipa: CalledIcdGipa::NotCalled,
            negotiated: None,
        }
    }

    /// Runs one negotiation round against the loader's in/out `requested` version.
    pub fn negotiate(&mut self, requested: &mut u32) -> vk::Result {
        self.record_negotiate_order();

        if self.min_supported > *requested {
            self.check = InterfaceVersionCheck::LoaderVersionTooOld;
            *requested = self.min_supported;
            self.negotiated = None;
            log::warn!(
                "Loader interface version too old, driver requires at least {}",
                self.min_supported
            );
            return vk::Result::ERROR_INCOMPATIBLE_DRIVER;
        }

        if self.max_supported < *requested {
            self.check = InterfaceVersionCheck::LoaderVersionTooNew;
            *requested = self.max_supported;
        } else if self.max_supported > *requested {
            self.check = InterfaceVersionCheck::DriverVersionTooNew;
        } else {
            self.check = InterfaceVersionCheck::VersionIsSupported;
            *requested = self.max_supported;
        }
        self.negotiated = Some(*requested);
        log::debug!("Negotiated interface version {} ({:?})", *requested, self.check);
        vk::Result::SUCCESS
    }

    fn record_negotiate_order(&mut self) {
        if self.called_gipa != CalledIcdGipa::NotCalled {
            self.called_negotiate = CalledNegotiateInterface::VkIcdGipaFirst;
        } else if self.called_negotiate == CalledNegotiateInterface::NotCalled {
            self.called_negotiate = CalledNegotiateInterface::VkIcdNegotiate;
        }
    }

    /// Records the first root proc-address call. Later calls leave the flag alone.
    pub fn record_gipa(&mut self, via: CalledIcdGipa) {
        if self.called_gipa == CalledIcdGipa::NotCalled {
            self.called_gipa = via;
        }
    }

    /// Interface version in effect: the negotiated one, or the driver minimum for loaders that
    /// never negotiate.
    pub fn effective_version(&self) -> u32 {
        self.negotiated.unwrap_or(self.min_supported)
    }
}

#[cfg(test)]
mod tests;
