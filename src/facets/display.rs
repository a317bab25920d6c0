//! Display facets: sums, timeline and hierarchies.

use super::{FacetKind, FacetValue};
use crate::state::{QueryProps, TimelineSettings};

/// Whether column sums are shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sums(pub bool);

impl FacetValue for Sums {
    const KIND: FacetKind = FacetKind::Sums;

    fn extract(props: &QueryProps) -> Self {
        Self(props.sums)
    }

    fn store(&self, props: &mut QueryProps) {
        props.sums = self.0;
    }

    // Sums are computed by the backend; hiding them needs no new data.
    fn requires_reload(&self, _previous: &Self) -> bool {
        self.0
    }
}

/// Timeline visibility and zoom.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timeline(pub TimelineSettings);

impl FacetValue for Timeline {
    const KIND: FacetKind = FacetKind::Timeline;

    fn extract(props: &QueryProps) -> Self {
        Self(props.timeline())
    }

    fn store(&self, props: &mut QueryProps) {
        props.set_timeline(self.0);
    }

    fn requires_reload(&self, _previous: &Self) -> bool {
        false
    }
}

/// Whether work packages are displayed as a hierarchy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hierarchies(pub bool);

impl FacetValue for Hierarchies {
    const KIND: FacetKind = FacetKind::Hierarchies;

    fn extract(props: &QueryProps) -> Self {
        Self(props.hierarchies)
    }

    fn store(&self, props: &mut QueryProps) {
        props.hierarchies = self.0;
    }

    fn requires_reload(&self, _previous: &Self) -> bool {
        true
    }
}
