//! Sort and group-by facets.

use super::{FacetKind, FacetValue, validate_names};
use crate::state::{QueryProps, SortCriterion};

/// The sort order of a query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortBy(pub Vec<SortCriterion>);

impl FacetValue for SortBy {
    const KIND: FacetKind = FacetKind::SortBy;

    fn extract(props: &QueryProps) -> Self {
        Self(props.sort_by.clone())
    }

    fn store(&self, props: &mut QueryProps) {
        props.sort_by.clone_from(&self.0);
    }

    fn requires_reload(&self, _previous: &Self) -> bool {
        true
    }

    fn validate(&self) -> Result<(), String> {
        validate_names("sort column", self.0.iter().map(|c| c.column.as_str()))
    }
}

/// The group-by column of a query; `None` disables grouping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupBy(pub Option<String>);

impl FacetValue for GroupBy {
    const KIND: FacetKind = FacetKind::GroupBy;

    fn extract(props: &QueryProps) -> Self {
        Self(props.group_by.clone())
    }

    fn store(&self, props: &mut QueryProps) {
        props.group_by.clone_from(&self.0);
    }

    fn requires_reload(&self, _previous: &Self) -> bool {
        true
    }

    fn validate(&self) -> Result<(), String> {
        match self.0.as_deref() {
            Some(column) if column.trim().is_empty() => {
                Err("group-by column must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}
