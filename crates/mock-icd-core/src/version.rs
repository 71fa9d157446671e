use std::fmt;
use std::str::FromStr;

use ash::vk;
use serde::{Deserialize, Serialize};

/// Error type for version parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid version format, expected 'major.minor' or 'major.minor.patch'")]
    InvalidFormat,
    #[error("Version parse error: {0}")]
    ParseError(String),
    #[error("Version component {component} = {value} does not fit the packed encoding")]
    OutOfRange { component: &'static str, value: u32 },
}

/// A Vulkan API version without the variant bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ApiVersion {
    pub const V1_0: ApiVersion = ApiVersion::new(1, 0, 0);
    pub const V1_1: ApiVersion = ApiVersion::new(1, 1, 0);
    pub const V1_2: ApiVersion = ApiVersion::new(1, 2, 0);
    pub const V1_3: ApiVersion = ApiVersion::new(1, 3, 0);

    /// Creates a new API version
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Decodes a packed `VK_MAKE_API_VERSION` value, dropping the variant.
    pub fn from_packed(raw: u32) -> Self {
        Self::new(
            vk::api_version_major(raw),
            vk::api_version_minor(raw),
            vk::api_version_patch(raw),
        )
    }

    /// Decodes the version an application asked for. Zero means "1.0".
    pub fn from_requested(raw: u32) -> Self {
        if raw == 0 {
            Self::V1_0
        } else {
            Self::from_packed(raw)
        }
    }

    pub fn to_packed(self) -> u32 {
        vk::make_api_version(0, self.major, self.minor, self.patch)
    }

    /// Compares major and minor only; patch levels never gate anything.
    pub fn at_least(self, other: ApiVersion) -> bool {
        (self.major, self.minor) >= (other.major, other.minor)
    }

    /// Parses "1.2" or "1.2.3".
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        let parts: Vec<&str> = version.trim().split('.').collect();
        if parts.len() != 2 && parts.len() != 3 {
            return Err(VersionError::InvalidFormat);
        }

        let parse_part = |part: &str| -> Result<u32, VersionError> {
            part.parse::<u32>()
                .map_err(|e| VersionError::ParseError(format!("'{}': {}", part, e)))
        };

        let major = parse_part(parts[0])?;
        let minor = parse_part(parts[1])?;
        let patch = match parts.get(2) {
            Some(part) => parse_part(part)?,
            None => 0,
        };

        // 7/10/12 bits once packed
        if major > 0x7f {
            return Err(VersionError::OutOfRange { component: "major", value: major });
        }
        if minor > 0x3ff {
            return Err(VersionError::OutOfRange { component: "minor", value: minor });
        }
        if patch > 0xfff {
            return Err(VersionError::OutOfRange { component: "patch", value: patch });
        }

        Ok(Self::new(major, minor, patch))
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::V1_0
    }
}

impl FromStr for ApiVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiVersion::parse(s)
    }
}

impl TryFrom<String> for ApiVersion {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ApiVersion::parse(&value)
    }
}

impl From<ApiVersion> for String {
    fn from(version: ApiVersion) -> Self {
        version.to_string()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
