//! Sort, page and page-size handling for list endpoints.
//!
//! Sort keys are interpolated into SQL as structural fragments, so they are
//! never bound as parameters. A key is only usable once it has been checked
//! against the caller's safelist by [`validate_filters`]; [`Filters::sort_column`]
//! treats anything else as a programming error and panics.

use serde::Serialize;

use crate::validator::{permitted_value, Validator};

/// Largest page number a caller may request.
pub const MAX_PAGE: i64 = 10_000_000;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Prefix marking a descending sort key (`-year`).
const DESCENDING_PREFIX: char = '-';

/// Sort direction derived from the sort key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// SQL keyword for this direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Requested sort/page parameters together with the safelist they are
/// checked against.
#[derive(Debug, Clone)]
pub struct Filters {
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
    pub page: i64,
    pub page_size: i64,
}

impl Filters {
    /// Column name for the `ORDER BY` clause, with any `-` prefix removed.
    ///
    /// # Panics
    ///
    /// Panics if `sort` is not in `sort_safelist`. Callers must run
    /// [`validate_filters`] first.
    pub fn sort_column(&self) -> &str {
        assert!(
            self.sort_safelist.iter().any(|safe| *safe == self.sort),
            "unsafe sort parameter: {}",
            self.sort
        );
        self.sort
            .strip_prefix(DESCENDING_PREFIX)
            .unwrap_or(self.sort.as_str())
    }

    pub fn sort_direction(&self) -> SortDirection {
        if self.sort.starts_with(DESCENDING_PREFIX) {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Record a field-keyed failure for each out-of-range parameter.
pub fn validate_filters(v: &mut Validator, f: &Filters) {
    v.check(f.page > 0, "page", "must be greater than zero");
    v.check(f.page <= MAX_PAGE, "page", "must be a maximum of 10 million");
    v.check(f.page_size > 0, "page_size", "must be greater than zero");
    v.check(
        f.page_size <= MAX_PAGE_SIZE,
        "page_size",
        "must be a maximum of 100",
    );
    v.check(
        permitted_value(&f.sort.as_str(), f.sort_safelist),
        "sort",
        "invalid sort value",
    );
}

/// Pagination summary returned alongside a page of results.
///
/// The default (all zero) value means "no results"; zero fields are omitted
/// when serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// Build [`Metadata`] from the total number of matching rows.
pub fn calculate_metadata(total_records: i64, page: i64, page_size: i64) -> Metadata {
    if total_records == 0 {
        return Metadata::default();
    }

    Metadata {
        current_page: page,
        page_size,
        first_page: 1,
        last_page: (total_records + page_size - 1) / page_size,
        total_records,
    }
}
