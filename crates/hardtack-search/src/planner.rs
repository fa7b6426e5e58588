use hardtack_core::filter::RatingPredicate;
use hardtack_core::query::QuerySpec;
use hardtack_core::types::Dimension;

/// Joins the terms of one dimension into its single query string.
pub const TERM_SEPARATOR: &str = ",";

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDimension {
    pub dimension: Dimension,
    pub query_text: String,
}

/// The adapter calls one retrieval issues: one per active dimension, all
/// sharing the same rating predicate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPlan {
    pub dimensions: Vec<PlannedDimension>,
    pub predicate: Option<RatingPredicate>,
}

impl QueryPlan {
    pub fn from_spec(spec: &QuerySpec) -> Self {
        let dimensions = spec
            .active()
            .map(|(dimension, terms)| PlannedDimension { dimension, query_text: terms.join(TERM_SEPARATOR) })
            .collect();
        let predicate = spec.rating.as_ref().and_then(RatingPredicate::from_filter);
        Self { dimensions, predicate }
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn active_dimensions(&self) -> Vec<Dimension> {
        self.dimensions.iter().map(|p| p.dimension).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hardtack_core::filter::FilterOperator;
    use hardtack_core::query::RatingFilter;

    #[test]
    fn only_non_empty_dimensions_are_planned() {
        let spec = QuerySpec::new()
            .with_terms(Dimension::ShoppingList, ["chicken", "leeks"])
            .with_terms(Dimension::Tags, ["soup", "spicy"])
            .with_terms(Dimension::DishName, Vec::<String>::new());
        let plan = QueryPlan::from_spec(&spec);
        assert_eq!(plan.active_dimensions(), [Dimension::Tags, Dimension::ShoppingList]);
        assert_eq!(plan.dimensions[0].query_text, "soup,spicy");
        assert_eq!(plan.dimensions[1].query_text, "chicken,leeks");
        assert!(plan.predicate.is_none());
    }

    #[test]
    fn empty_spec_plans_nothing() {
        let plan = QueryPlan::from_spec(&QuerySpec::new().with_rating(RatingFilter::is_null()));
        assert!(plan.is_empty());
        assert_eq!(plan.predicate, Some(RatingPredicate::IsNull));
    }

    #[test]
    fn predicate_is_shared_and_unknown_operator_fails_open() {
        let spec = QuerySpec::new()
            .with_terms(Dimension::Tags, ["dessert"])
            .with_rating(RatingFilter::new(Some(3.0), "greater_or_equal"));
        let plan = QueryPlan::from_spec(&spec);
        assert_eq!(plan.predicate.map(|p| p.operator()), Some(FilterOperator::GreaterOrEqual));

        let spec = spec.with_rating(RatingFilter::new(Some(3.0), "roughly"));
        assert!(QueryPlan::from_spec(&spec).predicate.is_none());
    }
}
