//! Facet state holders.
//!
//! A facet is one orthogonal aspect of a table query (filters, sorting,
//! grouping, columns, ...). Each facet has a holder that owns its current
//! value, can tell whether a query encodes a different value, and can write
//! its value into a query snapshot.

use std::fmt;

use crate::error::FacetError;
use crate::state::{Query, QueryProps, State, Subscription};

mod columns;
mod display;
mod filters;
mod ordering;
mod pagination;

pub use columns::{Columns, RelationColumns};
pub use display::{Hierarchies, Sums, Timeline};
pub use filters::Filters;
pub use ordering::{GroupBy, SortBy};
pub use pagination::PaginationState;

/// Facet identity.
///
/// The declaration order is the order in which facets changed in the same
/// batch are applied to the query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FacetKind {
    /// Filter set.
    Filters,
    /// Group-by column.
    GroupBy,
    /// Sort order.
    SortBy,
    /// Sum display.
    Sums,
    /// Timeline visibility and zoom.
    Timeline,
    /// Hierarchy display.
    Hierarchies,
    /// Visible columns.
    Columns,
    /// Expanded relation columns.
    RelationColumns,
}

impl FacetKind {
    /// Every facet in application order.
    pub const ALL: [Self; 8] = [
        Self::Filters,
        Self::GroupBy,
        Self::SortBy,
        Self::Sums,
        Self::Timeline,
        Self::Hierarchies,
        Self::Columns,
        Self::RelationColumns,
    ];

    /// What: Stable lowercase name used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Filters => "filters",
            Self::GroupBy => "group_by",
            Self::SortBy => "sort_by",
            Self::Sums => "sums",
            Self::Timeline => "timeline",
            Self::Hierarchies => "hierarchies",
            Self::Columns => "columns",
            Self::RelationColumns => "relation_columns",
        }
    }

    /// What: Whether a reload caused by this facet starts over at page one.
    #[must_use]
    pub const fn resets_to_first_page(self) -> bool {
        matches!(self, Self::Filters)
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What: Value type of one facet and how it maps onto [`QueryProps`].
pub trait FacetValue: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Facet this value belongs to.
    const KIND: FacetKind;

    /// What: Read the value currently encoded in `props`.
    fn extract(props: &QueryProps) -> Self;

    /// What: Write this value into `props`.
    fn store(&self, props: &mut QueryProps);

    /// What: Whether replacing `previous` with `self` needs a server round trip.
    fn requires_reload(&self, previous: &Self) -> bool;

    /// What: Reject values that must never reach a query.
    ///
    /// # Errors
    /// - Returns a human readable reason for invalid values.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// What: Object-safe view of a facet holder, used by the controller.
pub trait QueryFacet: Send + Sync {
    /// Facet identity.
    fn kind(&self) -> FacetKind;

    /// What: Whether the held value differs from the one encoded in `query`.
    ///
    /// Details:
    /// - Pure; a holder without a value never reports a change.
    fn has_changed(&self, query: &Query) -> bool;

    /// What: Write the held value into `query`.
    ///
    /// Output:
    /// - `true` when the change is reload-significant.
    fn apply_to_query(&self, query: &mut Query) -> bool;

    /// What: Quietly adopt the value encoded in a freshly loaded `query`.
    fn initialize(&self, query: &Query);

    /// What: Register `callback` for every notifying change of the held value.
    fn on_change(&self, callback: Box<dyn Fn() + Send + Sync>) -> Subscription;
}

/// What: Generic holder for one facet value.
#[derive(Clone, Debug)]
pub struct FacetState<V> {
    /// Current value; empty until initialized or set.
    state: State<V>,
}

impl<V> Default for FacetState<V> {
    fn default() -> Self {
        Self {
            state: State::default(),
        }
    }
}

impl<V: FacetValue> FacetState<V> {
    /// What: Create an empty holder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::new(),
        }
    }

    /// What: Current value, if any.
    #[must_use]
    pub fn value(&self) -> Option<V> {
        self.state.value()
    }

    /// What: Set a new value and notify observers.
    ///
    /// # Errors
    /// - `FacetError::Invalid` when the value fails validation; the held value
    ///   is left untouched.
    pub fn set(&self, value: V) -> Result<(), FacetError> {
        value.validate().map_err(|reason| FacetError::Invalid {
            facet: V::KIND,
            reason,
        })?;
        tracing::debug!(facet = %V::KIND, value = ?value, "[Facet] value set");
        self.state.put(value);
        Ok(())
    }
}

impl<V: FacetValue> QueryFacet for FacetState<V> {
    fn kind(&self) -> FacetKind {
        V::KIND
    }

    fn has_changed(&self, query: &Query) -> bool {
        self.state
            .value()
            .is_some_and(|value| value != V::extract(&query.props))
    }

    fn apply_to_query(&self, query: &mut Query) -> bool {
        let Some(value) = self.state.value() else {
            return false;
        };
        let previous = V::extract(&query.props);
        value.store(&mut query.props);
        value.requires_reload(&previous)
    }

    fn initialize(&self, query: &Query) {
        self.state.put_quiet(V::extract(&query.props));
    }

    fn on_change(&self, callback: Box<dyn Fn() + Send + Sync>) -> Subscription {
        self.state.subscribe(move |_| callback())
    }
}

/// What: Every facet holder of one table view.
#[derive(Clone, Debug, Default)]
pub struct TableFacets {
    /// Filter set.
    pub filters: FacetState<Filters>,
    /// Group-by column.
    pub group_by: FacetState<GroupBy>,
    /// Sort order.
    pub sort_by: FacetState<SortBy>,
    /// Sum display.
    pub sums: FacetState<Sums>,
    /// Timeline settings.
    pub timeline: FacetState<Timeline>,
    /// Hierarchy display.
    pub hierarchies: FacetState<Hierarchies>,
    /// Visible columns.
    pub columns: FacetState<Columns>,
    /// Expanded relation columns.
    pub relation_columns: FacetState<RelationColumns>,
}

impl TableFacets {
    /// What: Holder for `kind` as a trait object.
    #[must_use]
    pub fn get(&self, kind: FacetKind) -> &dyn QueryFacet {
        match kind {
            FacetKind::Filters => &self.filters,
            FacetKind::GroupBy => &self.group_by,
            FacetKind::SortBy => &self.sort_by,
            FacetKind::Sums => &self.sums,
            FacetKind::Timeline => &self.timeline,
            FacetKind::Hierarchies => &self.hierarchies,
            FacetKind::Columns => &self.columns,
            FacetKind::RelationColumns => &self.relation_columns,
        }
    }

    /// What: Quietly initialize every holder from a loaded query.
    pub fn initialize(&self, query: &Query) {
        for kind in FacetKind::ALL {
            self.get(kind).initialize(query);
        }
    }
}

/// What: Shared validation for lists of column-like names.
///
/// # Errors
/// - Reason string when a name is blank or appears twice.
fn validate_names<'a, I>(what: &str, names: I) -> Result<(), String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(format!("{what} name must not be empty"));
        }
        if !seen.insert(name) {
            return Err(format!("{what} '{name}' appears twice"));
        }
    }
    Ok(())
}
