//! Request/response DTOs and transport-level validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sockstock_core::StockId;
use sockstock_inventory::{MAX_COTTON_PART, MIN_COTTON_PART, StockInput, StockRecord};

/// Wire shape of a stock record, used for both requests and responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocksDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StockId>,
    pub color: Option<String>,
    pub cotton_part: Option<i32>,
    pub quantity: Option<i64>,
}

/// Field name → message, returned as the body of a 400.
pub type FieldErrors = BTreeMap<&'static str, String>;

impl SocksDto {
    pub fn from_record(record: &StockRecord) -> Self {
        Self {
            id: Some(record.id_typed()),
            color: Some(record.color().to_string()),
            cotton_part: Some(record.cotton_part()),
            quantity: Some(record.quantity()),
        }
    }

    pub fn to_input(&self) -> StockInput {
        StockInput {
            color: self.color.clone(),
            cotton_part: self.cotton_part,
            quantity: self.quantity,
        }
    }

    /// Color is required; cotton part and quantity are range-checked when present.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.color.is_none() {
            errors.insert("color", "color is required".to_string());
        }
        if let Some(cotton_part) = self.cotton_part {
            if cotton_part < MIN_COTTON_PART {
                errors.insert("cottonPart", "cotton part must not be negative".to_string());
            } else if cotton_part > MAX_COTTON_PART {
                errors.insert("cottonPart", "cotton part must not exceed 100".to_string());
            }
        }
        if let Some(quantity) = self.quantity {
            if quantity <= 0 {
                errors.insert("quantity", "quantity must be positive".to_string());
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
