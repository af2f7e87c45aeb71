//! Composable stock predicates for quantity aggregation.
//!
//! Request criteria are turned into a flat list of tagged predicates that are
//! combined by logical AND. Store adapters either evaluate them in memory
//! ([`StockQuery::matches`]) or translate them into their own query language.

use core::cmp::Ordering;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use sockstock_core::{StockError, StockResult};

use crate::record::{StockRecord, normalize_color};

/// Request-scoped filter criteria. Every part is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub color: Option<String>,
    pub operator: Option<String>,
    pub cotton_part: Option<i32>,
    pub min_cotton_part: Option<i32>,
    pub max_cotton_part: Option<i32>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

/// Cotton-content comparison operator (closed set).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CottonOperator {
    Equal,
    GreaterThan,
    LessThan,
}

impl CottonOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            CottonOperator::Equal => "equal",
            CottonOperator::GreaterThan => "greaterThan",
            CottonOperator::LessThan => "lessThan",
        }
    }

    pub fn sql_symbol(self) -> &'static str {
        match self {
            CottonOperator::Equal => "=",
            CottonOperator::GreaterThan => ">",
            CottonOperator::LessThan => "<",
        }
    }

    pub fn holds(self, actual: i32, value: i32) -> bool {
        match self {
            CottonOperator::Equal => actual == value,
            CottonOperator::GreaterThan => actual > value,
            CottonOperator::LessThan => actual < value,
        }
    }
}

impl FromStr for CottonOperator {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equal" => Ok(CottonOperator::Equal),
            "greaterThan" => Ok(CottonOperator::GreaterThan),
            "lessThan" => Ok(CottonOperator::LessThan),
            other => Err(StockError::invalid_operator(other)),
        }
    }
}

/// A single sub-condition over a stock record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every record.
    All,
    /// Normalized color equality.
    ColorEquals(String),
    /// `cottonPart <op> value`.
    CottonPart(CottonOperator, i32),
    /// Inclusive cotton-content range; a missing bound is unbounded on that side.
    CottonPartRange { min: Option<i32>, max: Option<i32> },
}

impl Predicate {
    /// Range predicate, collapsing to [`Predicate::All`] when both bounds are absent.
    pub fn range(min: Option<i32>, max: Option<i32>) -> Self {
        match (min, max) {
            (None, None) => Predicate::All,
            (min, max) => Predicate::CottonPartRange { min, max },
        }
    }

    pub fn matches(&self, record: &StockRecord) -> bool {
        match self {
            Predicate::All => true,
            Predicate::ColorEquals(color) => record.color() == color,
            Predicate::CottonPart(op, value) => op.holds(record.cotton_part(), *value),
            Predicate::CottonPartRange { min, max } => {
                let c = record.cotton_part();
                min.is_none_or(|m| c >= m) && max.is_none_or(|m| c <= m)
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    Color,
    CottonPart,
    Quantity,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Accepts the wire (camelCase) and column (snake_case) spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "id" => Some(SortField::Id),
            "color" => Some(SortField::Color),
            "cottonPart" | "cotton_part" => Some(SortField::CottonPart),
            "quantity" => Some(SortField::Quantity),
            "createdTime" | "createdAt" | "created_at" => Some(SortField::CreatedAt),
            "updatedTime" | "updatedAt" | "updated_at" => Some(SortField::UpdatedAt),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Color => "color",
            SortField::CottonPart => "cotton_part",
            SortField::Quantity => "quantity",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `"desc"` (any case) is descending, anything else ascending.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some(d) if d.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn sql_keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    fn compare(&self, a: &StockRecord, b: &StockRecord) -> Ordering {
        let ord = match self.field {
            SortField::Id => a.id_typed().cmp(&b.id_typed()),
            SortField::Color => a.color().cmp(b.color()),
            SortField::CottonPart => a.cotton_part().cmp(&b.cotton_part()),
            SortField::Quantity => a.quantity().cmp(&b.quantity()),
            SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
            SortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
        };
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// AND-composition of predicates plus an optional ordering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockQuery {
    predicates: Vec<Predicate>,
    sort: Option<SortOrder>,
}

impl StockQuery {
    /// Query matching every record, unsorted.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a query from request criteria.
    ///
    /// The cotton comparison applies only when both operator and value are
    /// set; an operator without a value is ignored unparsed. A sort field that names no known column leaves the query unsorted.
    pub fn from_criteria(criteria: &FilterCriteria) -> StockResult<Self> {
        let mut query = Self::all();

        if let Some(color) = &criteria.color {
            query = query.and(Predicate::ColorEquals(normalize_color(color)));
        }

        if let (Some(op), Some(value)) = (criteria.operator.as_deref(), criteria.cotton_part) {
            let op = CottonOperator::from_str(op)?;
            query = query.and(Predicate::CottonPart(op, value));
        }

        query = query.and(Predicate::range(
            criteria.min_cotton_part,
            criteria.max_cotton_part,
        ));

        if let Some(field) = criteria.sort_by.as_deref().and_then(SortField::parse) {
            query.sort = Some(SortOrder {
                field,
                direction: SortDirection::parse(criteria.sort_direction.as_deref()),
            });
        }

        Ok(query)
    }

    /// Add a sub-condition; [`Predicate::All`] is absorbed.
    pub fn and(mut self, predicate: Predicate) -> Self {
        if predicate != Predicate::All {
            self.predicates.push(predicate);
        }
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn sort(&self) -> Option<SortOrder> {
        self.sort
    }

    pub fn matches(&self, record: &StockRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    /// Stable in-place ordering by the query's sort, if any.
    pub fn order(&self, records: &mut [StockRecord]) {
        if let Some(sort) = self.sort {
            records.sort_by(|a, b| sort.compare(a, b));
        }
    }
}
