//! Column facets.

use super::{FacetKind, FacetValue, validate_names};
use crate::state::QueryProps;

/// Visible columns in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Columns(pub Vec<String>);

impl FacetValue for Columns {
    const KIND: FacetKind = FacetKind::Columns;

    fn extract(props: &QueryProps) -> Self {
        Self(props.columns.clone())
    }

    fn store(&self, props: &mut QueryProps) {
        props.columns.clone_from(&self.0);
    }

    /// Removing or reordering columns is local; a column not shown before
    /// needs its values fetched.
    fn requires_reload(&self, previous: &Self) -> bool {
        self.0.iter().any(|column| !previous.0.contains(column))
    }

    fn validate(&self) -> Result<(), String> {
        validate_names("column", self.0.iter().map(String::as_str))
    }
}

/// Relation columns currently expanded in the table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelationColumns(pub Vec<String>);

impl FacetValue for RelationColumns {
    const KIND: FacetKind = FacetKind::RelationColumns;

    fn extract(props: &QueryProps) -> Self {
        Self(props.relation_columns.clone())
    }

    fn store(&self, props: &mut QueryProps) {
        props.relation_columns.clone_from(&self.0);
    }

    fn requires_reload(&self, _previous: &Self) -> bool {
        false
    }

    fn validate(&self) -> Result<(), String> {
        validate_names("relation column", self.0.iter().map(String::as_str))
    }
}
