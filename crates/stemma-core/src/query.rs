//! Query-parameter types shared by table-view projections.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Rows per page unless a call site overrides it.
pub const PAGE_SIZE: usize = 10;

/// The index window for a 1-based page number. Page 0 is treated as page 1.
pub fn page_range(page: usize) -> Range<usize> {
  let start = page.saturating_sub(1) * PAGE_SIZE;
  start..start + PAGE_SIZE
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  Asc,
  Desc,
}

impl SortDirection {
  /// Comparison multiplier: flips an ascending ordering when descending.
  pub fn apply(self, ord: std::cmp::Ordering) -> std::cmp::Ordering {
    match self {
      Self::Asc => ord,
      Self::Desc => ord.reverse(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig<F> {
  pub field:     F,
  pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndividualSortField {
  FirstName,
  LastName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilySortField {
  HusbandFirstName,
  HusbandLastName,
  WifeFirstName,
  WifeLastName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSortField {
  Date,
  Place,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceSortField {
  Name,
  Kind,
}

// ─── Requests and envelopes ──────────────────────────────────────────────────

/// A table-view request: 1-based page, free-text search, optional sort.
/// Each entity's table projection supplies its own default sort when `sort`
/// is `None`.
#[derive(Debug, Clone)]
pub struct TableQuery<F> {
  pub page:   usize,
  pub search: Option<String>,
  pub sort:   Option<SortConfig<F>>,
}

impl<F> Default for TableQuery<F> {
  fn default() -> Self {
    Self { page: 1, search: None, sort: None }
  }
}

/// One page of results plus the size of the full matching set, so callers
/// can compute page counts without a second query.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
  pub data:  Vec<T>,
  pub total: usize,
}

impl<T> Paged<T> {
  /// Slice `rows` down to `page`, keeping the pre-slice count as `total`.
  pub fn slice(rows: Vec<T>, page: usize) -> Self {
    let total = rows.len();
    let range = page_range(page);
    let data = rows
      .into_iter()
      .skip(range.start)
      .take(PAGE_SIZE)
      .collect();
    Self { data, total }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_range_is_one_based() {
    assert_eq!(page_range(1), 0..10);
    assert_eq!(page_range(3), 20..30);
    // Page 0 is tolerated as page 1.
    assert_eq!(page_range(0), 0..10);
  }

  #[test]
  fn slice_keeps_full_total() {
    let paged = Paged::slice((0..25).collect(), 3);
    assert_eq!(paged.data, vec![20, 21, 22, 23, 24]);
    assert_eq!(paged.total, 25);
  }

  #[test]
  fn slice_past_the_end_is_empty() {
    let paged = Paged::slice(vec![1, 2, 3], 2);
    assert!(paged.data.is_empty());
    assert_eq!(paged.total, 3);
  }
}
