//! Filter facet.

use super::{FacetKind, FacetValue};
use crate::state::{Filter, QueryProps};

/// The filter set of a query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filters(pub Vec<Filter>);

impl FacetValue for Filters {
    const KIND: FacetKind = FacetKind::Filters;

    fn extract(props: &QueryProps) -> Self {
        Self(props.filters.clone())
    }

    fn store(&self, props: &mut QueryProps) {
        props.filters.clone_from(&self.0);
    }

    fn requires_reload(&self, _previous: &Self) -> bool {
        true
    }

    fn validate(&self) -> Result<(), String> {
        for filter in &self.0 {
            if filter.name.trim().is_empty() {
                return Err("filter name must not be empty".to_string());
            }
            if filter.operator.trim().is_empty() {
                return Err(format!("filter '{}' has no operator", filter.name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Any filter change needs a reload; blank names and operators are invalid.
    fn filters_always_reload_and_validate_parts() {
        let next = Filters(vec![Filter::new("status", "=", &["1"])]);
        assert!(next.requires_reload(&Filters::default()));
        assert!(next.validate().is_ok());
        assert!(Filters(vec![Filter::new(" ", "=", &[])]).validate().is_err());
        assert!(Filters(vec![Filter::new("status", "", &[])]).validate().is_err());
    }
}
