//! Query data model and its canonical encoding.

use serde::{Deserialize, Serialize};

/// Default number of rows per page when nothing else is configured.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// A single filter entry of a table query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Filtered attribute, e.g. `status`.
    #[serde(rename = "n", alias = "name")]
    pub name: String,
    /// Operator symbol, e.g. `=` or `!*`.
    #[serde(rename = "o", alias = "operator")]
    pub operator: String,
    /// Operand values; empty for unary operators.
    #[serde(rename = "v", alias = "values", default)]
    pub values: Vec<String>,
}

impl Filter {
    /// What: Build a filter from borrowed parts.
    #[must_use]
    pub fn new(name: &str, operator: &str, values: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            operator: operator.to_string(),
            values: values.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Direction of a sort criterion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// One column of the sort order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    /// Sorted column.
    pub column: String,
    /// Sort direction.
    pub direction: SortDirection,
}

impl SortCriterion {
    /// What: Build a criterion for `column` in `direction`.
    #[must_use]
    pub fn new(column: &str, direction: SortDirection) -> Self {
        Self {
            column: column.to_string(),
            direction,
        }
    }
}

/// Zoom level of the timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomLevel {
    /// One cell per day.
    #[default]
    Days,
    /// One cell per week.
    Weeks,
    /// One cell per month.
    Months,
    /// One cell per quarter.
    Quarters,
    /// One cell per year.
    Years,
}

/// Timeline display settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSettings {
    /// Whether the timeline is shown next to the table.
    pub visible: bool,
    /// Current zoom level.
    pub zoom: ZoomLevel,
}

/// Every facet setting of a query in canonical, serializable form.
///
/// Field order is the encoding order; keep it stable, the fingerprint of a
/// query depends on it. The long field names are accepted when decoding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryProps {
    /// Visible columns in display order.
    #[serde(rename = "c", alias = "columns", default)]
    pub columns: Vec<String>,
    /// Whether hierarchies are shown.
    #[serde(rename = "hi", alias = "hierarchies", default)]
    pub hierarchies: bool,
    /// Group-by column.
    #[serde(rename = "g", alias = "group_by", default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    /// Sort order.
    #[serde(rename = "t", alias = "sort_by", default)]
    pub sort_by: Vec<SortCriterion>,
    /// Filters.
    #[serde(rename = "f", alias = "filters", default)]
    pub filters: Vec<Filter>,
    /// Whether sums are displayed.
    #[serde(rename = "s", alias = "sums", default)]
    pub sums: bool,
    /// Timeline visibility.
    #[serde(rename = "tv", alias = "timeline_visible", default)]
    pub timeline_visible: bool,
    /// Timeline zoom level.
    #[serde(rename = "tzl", alias = "timeline_zoom", default)]
    pub timeline_zoom: ZoomLevel,
    /// Expanded relation columns.
    #[serde(
        rename = "rc",
        alias = "relation_columns",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub relation_columns: Vec<String>,
}

impl QueryProps {
    /// What: Timeline settings as one value.
    #[must_use]
    pub const fn timeline(&self) -> TimelineSettings {
        TimelineSettings {
            visible: self.timeline_visible,
            zoom: self.timeline_zoom,
        }
    }

    /// What: Overwrite both timeline fields.
    pub const fn set_timeline(&mut self, timeline: TimelineSettings) {
        self.timeline_visible = timeline.visible;
        self.timeline_zoom = timeline.zoom;
    }
}

/// A table query: identity, display name and encoded facet settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Saved-query id; `None` for the unsaved default query.
    pub id: Option<u64>,
    /// Human readable name.
    pub name: String,
    /// Facet settings.
    pub props: QueryProps,
}

impl Query {
    /// What: Build the unsaved default query.
    #[must_use]
    pub fn unsaved(name: &str, props: QueryProps) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            props,
        }
    }

    /// What: Build a saved query.
    #[must_use]
    pub fn saved(id: u64, name: &str, props: QueryProps) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            props,
        }
    }
}

/// Page offset and size of the current result list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number.
    #[serde(rename = "pa")]
    pub page: u32,
    /// Rows per page.
    #[serde(rename = "pp")]
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Pagination {
    /// What: Same page size, first page.
    #[must_use]
    pub const fn first_page(self) -> Self {
        Self {
            page: 1,
            per_page: self.per_page,
        }
    }
}

/// Wire shape of the encoded properties: facet settings followed by paging.
#[derive(Serialize)]
struct EncodedRef<'a> {
    /// Facet settings.
    #[serde(flatten)]
    props: &'a QueryProps,
    /// Paging.
    #[serde(flatten)]
    pagination: &'a Pagination,
}

/// Owned counterpart of [`EncodedRef`] for decoding navigation parameters.
#[derive(Deserialize)]
struct EncodedOwned {
    /// Facet settings.
    #[serde(flatten)]
    props: QueryProps,
    /// Page number, absent when the parameters carry no paging.
    #[serde(default)]
    pa: Option<u32>,
    /// Page size, absent when the parameters carry no paging.
    #[serde(default)]
    pp: Option<u32>,
}

/// What: Encode facet settings and paging into the canonical string.
///
/// Inputs:
/// - `props`: Facet settings of the query.
/// - `pagination`: Current paging.
///
/// Output:
/// - Compact JSON string; equal inputs always produce equal strings.
#[must_use]
pub fn encode_query_props(props: &QueryProps, pagination: &Pagination) -> String {
    serde_json::to_string(&EncodedRef { props, pagination }).unwrap_or_default()
}

/// What: Decode an encoded-properties string from navigation parameters.
///
/// Inputs:
/// - `raw`: String previously produced by [`encode_query_props`] or typed by hand.
///
/// Output:
/// - Facet settings plus paging when both `pa` and `pp` were present.
///
/// # Errors
/// - Returns the JSON error when `raw` is not a valid encoding.
pub fn decode_query_props(
    raw: &str,
) -> Result<(QueryProps, Option<Pagination>), serde_json::Error> {
    let decoded: EncodedOwned = serde_json::from_str(raw)?;
    let pagination = match (decoded.pa, decoded.pp) {
        (Some(page), Some(per_page)) => Some(Pagination { page, per_page }),
        _ => None,
    };
    Ok((decoded.props, pagination))
}

/// One fetched page of results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResults {
    /// Query as the backend resolved it.
    pub query: Query,
    /// Paging the page was fetched with.
    pub pagination: Pagination,
    /// Total number of matching rows.
    pub total: u64,
    /// Ids of the rows on this page.
    pub work_package_ids: Vec<u64>,
}
