//! Index format and feature versions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Highest `indexFeatureVersion` this build understands. Definitions declaring a higher
/// version are accepted but clamped to this value.
pub const CURRENT_FEATURE_VERSION: i32 = 4;

/// Generation of the on-disk index format a resolver answers for.
///
/// Some field types are only indexed dynamically from a given format onward; see
/// `FieldTypeKind::min_format_version` in `strata-schema`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct IndexFormatVersion(u32);

impl IndexFormatVersion {
    pub const FOUR: Self = Self(4);
    pub const FIVE: Self = Self(5);
    pub const SIX: Self = Self(6);

    pub const MIN_SUPPORTED: Self = Self::FOUR;
    pub const CURRENT: Self = Self::SIX;

    pub fn new(number: u32) -> Result<Self> {
        if !(Self::MIN_SUPPORTED.0..=Self::CURRENT.0).contains(&number) {
            return Err(Error::InvalidDefinition(format!(
                "unsupported index format version {number}, supported versions are {}..={}",
                Self::MIN_SUPPORTED.0,
                Self::CURRENT.0
            )));
        }
        Ok(Self(number))
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// Every supported version, oldest first.
    pub fn supported() -> impl Iterator<Item = IndexFormatVersion> {
        (Self::MIN_SUPPORTED.0..=Self::CURRENT.0).map(Self)
    }
}

impl Default for IndexFormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for IndexFormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl TryFrom<u32> for IndexFormatVersion {
    type Error = Error;

    fn try_from(number: u32) -> Result<Self> {
        Self::new(number)
    }
}

impl From<IndexFormatVersion> for u32 {
    fn from(version: IndexFormatVersion) -> Self {
        version.0
    }
}
