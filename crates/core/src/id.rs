//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Surrogate identity of a stock record.
///
/// Assigned when the record is first created and never derived from the
/// `(color, cottonPart)` key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockId(Uuid);

impl StockId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered), so identifiers sort by creation order.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for StockId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for StockId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for StockId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<StockId> for Uuid {
    fn from(value: StockId) -> Self {
        value.0
    }
}

impl FromStr for StockId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Self)
    }
}
