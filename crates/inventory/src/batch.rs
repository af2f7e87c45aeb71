//! Delimited batch rows: parsing and per-row validation.
//!
//! Format: comma-separated, first line is a header, then `color,cottonPart,quantity`
//! per line. Quoting and escaped delimiters are not supported.

use thiserror::Error;

use crate::record::{MAX_COTTON_PART, MIN_COTTON_PART, StockKey, normalize_color};

pub const FIELD_DELIMITER: char = ',';
pub const EXPECTED_EXTENSION: &str = ".csv";
pub const EXPECTED_FIELDS: usize = 3;

/// An accepted batch line, ready to be applied as an income.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    /// 1-based line number in the uploaded file (the header is line 1).
    pub line: usize,
    pub key: StockKey,
    pub quantity: i64,
}

/// Why a single batch line was skipped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("line is not valid UTF-8")]
    InvalidEncoding,

    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),

    #[error("{field} is not an integer: {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("color is empty")]
    EmptyColor,

    #[error("cotton part {0} is outside [0, 100]")]
    CottonPartOutOfRange(i32),

    #[error("quantity must be positive, found {0}")]
    NonPositiveQuantity(i64),

    /// Raised while applying the row, not while parsing it.
    #[error("row quantity would overflow the stored stock")]
    QuantityOverflow,
}

/// Batch files are identified by name only; content sniffing is not attempted.
pub fn has_expected_extension(filename: &str) -> bool {
    filename.ends_with(EXPECTED_EXTENSION)
}

/// Parse and validate one data line.
pub fn parse_row(line: usize, raw: &str) -> Result<BatchRow, RowError> {
    let fields: Vec<&str> = raw.split(FIELD_DELIMITER).collect();
    if fields.len() != EXPECTED_FIELDS {
        return Err(RowError::FieldCount(fields.len()));
    }

    let color = normalize_color(fields[0]);
    let cotton_part = parse_int::<i32>("cottonPart", fields[1])?;
    let quantity = parse_int::<i64>("quantity", fields[2])?;

    if color.is_empty() {
        return Err(RowError::EmptyColor);
    }
    if !(MIN_COTTON_PART..=MAX_COTTON_PART).contains(&cotton_part) {
        return Err(RowError::CottonPartOutOfRange(cotton_part));
    }
    if quantity <= 0 {
        return Err(RowError::NonPositiveQuantity(quantity));
    }

    Ok(BatchRow {
        line,
        key: StockKey::new(&color, cotton_part),
        quantity,
    })
}

fn parse_int<T: core::str::FromStr>(field: &'static str, raw: &str) -> Result<T, RowError> {
    let trimmed = raw.trim();
    trimmed.parse::<T>().map_err(|_| RowError::NotANumber {
        field,
        value: trimmed.to_string(),
    })
}
