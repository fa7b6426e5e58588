//! Structured multi-dimension query specification.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::types::Dimension;

/// `(value, operator)` filter on the rating attribute.
///
/// The operator is kept as the raw name so that an unknown operator can be
/// reported and ignored when the predicate is built rather than rejected here.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingFilter {
    pub value: Option<f32>,
    pub operator: String,
}

impl RatingFilter {
    pub fn new(value: Option<f32>, operator: impl Into<String>) -> Self {
        Self { value, operator: operator.into() }
    }

    pub fn is_null() -> Self {
        Self::new(None, "is_null")
    }
}

/// Query terms per dimension plus an optional rating filter.
///
/// A dimension is active iff its term list is non-empty. The filter applies to
/// every active dimension alike.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawQuerySpec")]
pub struct QuerySpec {
    terms: BTreeMap<Dimension, Vec<String>>,
    pub rating: Option<RatingFilter>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terms<I, S>(mut self, dimension: Dimension, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terms.insert(dimension, terms.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_rating(mut self, filter: RatingFilter) -> Self {
        self.rating = Some(filter);
        self
    }

    pub fn terms(&self, dimension: Dimension) -> &[String] {
        self.terms.get(&dimension).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Active dimensions in canonical order, with their terms.
    pub fn active(&self) -> impl Iterator<Item = (Dimension, &[String])> {
        self.terms
            .iter()
            .filter(|(_, terms)| !terms.is_empty())
            .map(|(d, terms)| (*d, terms.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidQuery(e.to_string()))
    }
}

/// Wire form: `{"tags": ["soup"], "rating": [3.0, "greater_or_equal"], ...}`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawQuerySpec {
    #[serde(default)]
    dish_name: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    shopping_list: Vec<String>,
    #[serde(default)]
    source_author: Vec<String>,
    #[serde(default)]
    rating: Vec<Value>,
}

impl TryFrom<RawQuerySpec> for QuerySpec {
    type Error = Error;

    fn try_from(raw: RawQuerySpec) -> Result<Self> {
        let rating = match raw.rating.as_slice() {
            [] => None,
            [value, operator] => {
                let value = match value {
                    Value::Null => None,
                    Value::Number(n) => n.as_f64().map(|v| v as f32),
                    other => {
                        return Err(Error::InvalidQuery(format!("rating value must be a number or null, got {other}")))
                    }
                };
                let operator = operator
                    .as_str()
                    .ok_or_else(|| Error::InvalidQuery(format!("rating operator must be a string, got {operator}")))?;
                Some(RatingFilter::new(value, operator))
            }
            other => {
                return Err(Error::InvalidQuery(format!(
                    "rating must be [] or [value, operator], got {} elements",
                    other.len()
                )))
            }
        };
        let mut spec = QuerySpec::new()
            .with_terms(Dimension::DishName, raw.dish_name)
            .with_terms(Dimension::Tags, raw.tags)
            .with_terms(Dimension::ShoppingList, raw.shopping_list)
            .with_terms(Dimension::SourceAuthor, raw.source_author);
        spec.rating = rating;
        Ok(spec)
    }
}
