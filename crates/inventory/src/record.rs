use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sockstock_core::{StockError, StockId, StockResult};

/// Lowest accepted cotton content, in percent.
pub const MIN_COTTON_PART: i32 = 0;
/// Highest accepted cotton content, in percent.
pub const MAX_COTTON_PART: i32 = 100;

/// Canonical color form: surrounding whitespace removed, lower-cased.
pub fn normalize_color(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Logical key of a stock-keeping unit.
///
/// Income and outcome keep at most one `StockRecord` per key. The color is always stored in its
/// normalized form, so `"  Red "` and `"red"` produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockKey {
    color: String,
    cotton_part: i32,
}

impl StockKey {
    pub fn new(color: &str, cotton_part: i32) -> Self {
        Self {
            color: normalize_color(color),
            cotton_part,
        }
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn cotton_part(&self) -> i32 {
        self.cotton_part
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}%)", self.color, self.cotton_part)
    }
}

/// Caller-supplied mutation input, as received from the transport.
///
/// Every field is optional. The ledger does not reject missing values; it
/// defaults them through [`StockInput::normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInput {
    pub color: Option<String>,
    pub cotton_part: Option<i32>,
    pub quantity: Option<i64>,
}

impl StockInput {
    pub fn new(color: impl Into<String>, cotton_part: i32, quantity: i64) -> Self {
        Self {
            color: Some(color.into()),
            cotton_part: Some(cotton_part),
            quantity: Some(quantity),
        }
    }

    /// Lenient defaulting: missing color becomes `""`, missing numbers become `0`.
    pub fn normalize(&self) -> NormalizedInput {
        let color = self.color.as_deref().unwrap_or_default();
        NormalizedInput {
            key: StockKey::new(color, self.cotton_part.unwrap_or(0)),
            quantity: self.quantity.unwrap_or(0),
        }
    }
}

/// Input after normalization: a key plus a quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedInput {
    pub key: StockKey,
    pub quantity: i64,
}

/// Persistent stock of one sock variety.
///
/// Quantity is only changed through [`receive`](Self::receive),
/// [`issue`](Self::issue) and [`replace`](Self::replace), all of which refuse
/// to leave it negative. A failed call leaves the record untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    id: StockId,
    color: String,
    cotton_part: i32,
    quantity: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StockRecord {
    /// Fresh zero-quantity record for a previously unseen key (find-or-create).
    pub fn create(key: &StockKey, now: DateTime<Utc>) -> Self {
        Self {
            id: StockId::new(),
            color: key.color.clone(),
            cotton_part: key.cotton_part,
            quantity: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a record from stored fields (used by store adapters).
    pub fn from_parts(
        id: StockId,
        color: String,
        cotton_part: i32,
        quantity: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            color,
            cotton_part,
            quantity,
            created_at,
            updated_at,
        }
    }

    pub fn id_typed(&self) -> StockId {
        self.id
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn cotton_part(&self) -> i32 {
        self.cotton_part
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn key(&self) -> StockKey {
        StockKey {
            color: self.color.clone(),
            cotton_part: self.cotton_part,
        }
    }

    /// Store-managed timestamp bump.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Income: add `delta` to the current quantity.
    pub fn receive(&mut self, delta: i64) -> StockResult<()> {
        let next = self
            .quantity
            .checked_add(delta)
            .ok_or_else(|| StockError::invalid_quantity("quantity overflow"))?;
        if next < 0 {
            return Err(StockError::invalid_quantity(format!(
                "income of {delta} would leave {next} in stock"
            )));
        }
        self.quantity = next;
        Ok(())
    }

    /// Outcome: subtract `delta`, refusing to go below zero.
    pub fn issue(&mut self, delta: i64) -> StockResult<()> {
        if self.quantity < delta {
            return Err(StockError::insufficient(self.quantity, delta));
        }
        let next = self
            .quantity
            .checked_sub(delta)
            .ok_or_else(|| StockError::invalid_quantity("quantity overflow"))?;
        self.quantity = next;
        Ok(())
    }

    /// Update: replace color, cotton content and quantity wholesale.
    ///
    /// The new key is not checked against other records; two records may end
    /// up sharing a key after this call.
    pub fn replace(&mut self, input: &NormalizedInput) -> StockResult<()> {
        if input.quantity < 0 {
            return Err(StockError::invalid_quantity(format!(
                "quantity cannot be negative, got {}",
                input.quantity
            )));
        }
        self.color = input.key.color.clone();
        self.cotton_part = input.key.cotton_part;
        self.quantity = input.quantity;
        Ok(())
    }
}
