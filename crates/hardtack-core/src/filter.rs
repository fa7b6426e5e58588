//! Rating filter predicates.
//!
//! A `(value, operator)` pair from the query spec becomes a single
//! [`RatingPredicate`] that is handed unchanged to every dimension query of a
//! request. Predicates render to the SQL filter dialect understood by LanceDB
//! and can also be evaluated in memory.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::query::RatingFilter;

/// Name of the scalar attribute every predicate applies to.
pub const RATING_COLUMN: &str = "rating";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equal,
    #[serde(alias = "no_equal")]
    NotEqual,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    IsNull,
}

impl FilterOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Equal => "equal",
            FilterOperator::NotEqual => "not_equal",
            FilterOperator::GreaterThan => "greater_than",
            FilterOperator::GreaterOrEqual => "greater_or_equal",
            FilterOperator::LessThan => "less_than",
            FilterOperator::LessOrEqual => "less_or_equal",
            FilterOperator::IsNull => "is_null",
        }
    }

    /// Parses an operator name. `no_equal` is accepted for `not_equal`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "equal" => Some(FilterOperator::Equal),
            "not_equal" | "no_equal" => Some(FilterOperator::NotEqual),
            "greater_than" => Some(FilterOperator::GreaterThan),
            "greater_or_equal" => Some(FilterOperator::GreaterOrEqual),
            "less_than" => Some(FilterOperator::LessThan),
            "less_or_equal" => Some(FilterOperator::LessOrEqual),
            "is_null" => Some(FilterOperator::IsNull),
            _ => None,
        }
    }

    fn sql_symbol(self) -> &'static str {
        match self {
            FilterOperator::Equal => "=",
            FilterOperator::NotEqual => "!=",
            FilterOperator::GreaterThan => ">",
            FilterOperator::GreaterOrEqual => ">=",
            FilterOperator::LessThan => "<",
            FilterOperator::LessOrEqual => "<=",
            FilterOperator::IsNull => "IS NULL",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled filter on the rating attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatingPredicate {
    Compare { operator: FilterOperator, value: f32 },
    IsNull,
}

impl RatingPredicate {
    /// Builds the predicate for `filter`.
    ///
    /// Returns `None` (no filtering) for an unknown operator name or for a
    /// comparison without a value. Callers are expected to validate operator
    /// names upstream; here the request fails open and a warning is logged.
    pub fn from_filter(filter: &RatingFilter) -> Option<Self> {
        let Some(operator) = FilterOperator::from_name(&filter.operator) else {
            warn!(operator = %filter.operator, "unknown rating filter operator, no filter applied");
            return None;
        };
        match (operator, filter.value) {
            (FilterOperator::IsNull, _) => Some(RatingPredicate::IsNull),
            (operator, Some(value)) if value.is_finite() => Some(RatingPredicate::Compare { operator, value }),
            (operator, value) => {
                warn!(%operator, ?value, "rating comparison without a usable value, no filter applied");
                None
            }
        }
    }

    pub fn operator(&self) -> FilterOperator {
        match self {
            RatingPredicate::Compare { operator, .. } => *operator,
            RatingPredicate::IsNull => FilterOperator::IsNull,
        }
    }

    /// SQL filter text, e.g. `rating >= 3` or `rating IS NULL`.
    pub fn to_sql(&self) -> String {
        match self {
            RatingPredicate::Compare { operator, value } => {
                format!("{RATING_COLUMN} {} {value}", operator.sql_symbol())
            }
            RatingPredicate::IsNull => format!("{RATING_COLUMN} IS NULL"),
        }
    }

    /// In-memory evaluation with SQL null semantics: comparisons against a
    /// missing rating never match.
    pub fn matches(&self, rating: Option<f32>) -> bool {
        match (self, rating) {
            (RatingPredicate::IsNull, r) => r.is_none(),
            (RatingPredicate::Compare { .. }, None) => false,
            (RatingPredicate::Compare { operator, value }, Some(r)) => match operator {
                FilterOperator::Equal => r == *value,
                FilterOperator::NotEqual => r != *value,
                FilterOperator::GreaterThan => r > *value,
                FilterOperator::GreaterOrEqual => r >= *value,
                FilterOperator::LessThan => r < *value,
                FilterOperator::LessOrEqual => r <= *value,
                FilterOperator::IsNull => false,
            },
        }
    }
}

impl fmt::Display for RatingPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
