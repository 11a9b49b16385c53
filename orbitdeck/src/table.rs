//! Filtering, sorting, and pagination of chain records.
//!
//! [`apply`] is a pure function of `(records, view)`: the same inputs always
//! produce the same [`TablePage`], and nothing is cached between calls. The
//! view itself is a [`TableViewState`] whose fields can only be changed through
//! its methods, so the "back to the first page" rules are enforced in one
//! place:
//!
//! - changing the filter text or status filter resets to the first page
//! - changing the sort field or direction resets to the first page
//! - changing the page size resets to the first page
//!
//! Page navigation never touches the other settings.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::{ChainRecord, ChainStatus};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Column a table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Numeric chain id.
    ChainId,
    /// Rollup display name.
    ChainName,
    /// Deploying wallet address.
    OwnerAddress,
    /// Status label.
    Status,
    /// RPC endpoint.
    RpcUrl,
    /// Creation time.
    CreatedAt,
    /// Last update time.
    UpdatedAt,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Status tab selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Every record.
    #[default]
    All,
    /// Only [`ChainStatus::Active`].
    Active,
    /// Only [`ChainStatus::Paused`].
    Paused,
    /// Only [`ChainStatus::Deploying`].
    Deploying,
}

impl StatusFilter {
    /// Returns `true` if a record with `status` belongs in this tab.
    #[must_use]
    pub const fn matches(self, status: ChainStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => matches!(status, ChainStatus::Active),
            Self::Paused => matches!(status, ChainStatus::Paused),
            Self::Deploying => matches!(status, ChainStatus::Deploying),
        }
    }
}

/// View configuration for the chain table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableViewState {
    filter_text: String,
    status_filter: StatusFilter,
    sort_field: Option<SortField>,
    sort_direction: SortDirection,
    page_index: usize,
    page_size: usize,
}

impl Default for TableViewState {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl TableViewState {
    /// Creates an unfiltered, unsorted view on the first page.
    ///
    /// A `page_size` of zero is treated as one.
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            filter_text: String::new(),
            status_filter: StatusFilter::All,
            sort_field: None,
            sort_direction: SortDirection::Ascending,
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    /// Current filter text.
    #[must_use]
    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    /// Current status tab.
    #[must_use]
    pub const fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    /// Current sort column, if any.
    #[must_use]
    pub const fn sort_field(&self) -> Option<SortField> {
        self.sort_field
    }

    /// Current sort direction.
    #[must_use]
    pub const fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// Zero-based requested page.
    #[must_use]
    pub const fn page_index(&self) -> usize {
        self.page_index
    }

    /// Rows per page.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replaces the filter text and returns to the first page.
    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
        self.page_index = 0;
    }

    /// Selects a status tab and returns to the first page.
    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
        self.page_index = 0;
    }

    /// Sorts by `field` in `direction` and returns to the first page.
    pub fn set_sort(&mut self, field: SortField, direction: SortDirection) {
        self.sort_field = Some(field);
        self.sort_direction = direction;
        self.page_index = 0;
    }

    /// Column-header behavior: clicking the active column flips direction,
    /// clicking another column sorts it ascending.
    pub fn toggle_sort(&mut self, field: SortField) {
        let direction = if self.sort_field == Some(field) {
            self.sort_direction.flipped()
        } else {
            SortDirection::Ascending
        };
        self.set_sort(field, direction);
    }

    /// Removes sorting, restoring registry order, and returns to the first page.
    pub fn clear_sort(&mut self) {
        self.sort_field = None;
        self.sort_direction = SortDirection::Ascending;
        self.page_index = 0;
    }

    /// Changes the page size and returns to the first page.
    ///
    /// A size of zero is treated as one.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page_index = 0;
    }

    /// Jumps to a zero-based page. Out-of-range pages are clamped by [`apply`].
    pub fn go_to_page(&mut self, page_index: usize) {
        self.page_index = page_index;
    }

    /// Advances one page.
    pub fn next_page(&mut self) {
        self.page_index = self.page_index.saturating_add(1);
    }

    /// Goes back one page, stopping at the first.
    pub fn previous_page(&mut self) {
        self.page_index = self.page_index.saturating_sub(1);
    }
}

/// One rendered page of the chain table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TablePage {
    /// Records on this page, in display order.
    pub rows: Vec<ChainRecord>,
    /// Records that passed the filters, across all pages.
    pub total_items: usize,
    /// Always at least one, even when nothing matched.
    pub total_pages: usize,
    /// Zero-based page actually shown, after clamping.
    pub page_index: usize,
}

impl TablePage {
    /// Returns `true` if a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page_index + 1 < self.total_pages
    }

    /// Returns `true` if an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page_index > 0
    }
}

/// Returns `true` if `record` passes the text filter.
///
/// Matches when the display name or the displayed chain id contains `needle`,
/// case-insensitively. An empty needle matches everything.
#[must_use]
pub fn matches_filter(record: &ChainRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    record.chain_name.to_lowercase().contains(&needle)
        || record.display_chain_id().to_lowercase().contains(&needle)
}

/// Case-folded text comparison; on a case-only tie lowercase sorts first.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Missing values on either side compare equal.
fn compare_present<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => Ordering::Equal,
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

fn compare_by(field: SortField, a: &ChainRecord, b: &ChainRecord) -> Ordering {
    match field {
        SortField::ChainId => compare_present(a.chain_id, b.chain_id, |x, y| x.cmp(&y)),
        SortField::ChainName => {
            compare_present(non_empty(&a.chain_name), non_empty(&b.chain_name), collate)
        }
        SortField::OwnerAddress => compare_present(
            non_empty(&a.owner_address),
            non_empty(&b.owner_address),
            collate,
        ),
        SortField::Status => collate(a.status.as_str(), b.status.as_str()),
        SortField::RpcUrl => compare_present(a.rpc_url.as_deref(), b.rpc_url.as_deref(), collate),
        SortField::CreatedAt => compare_present(a.created_at, b.created_at, |x, y| x.cmp(&y)),
        SortField::UpdatedAt => compare_present(a.updated_at, b.updated_at, |x, y| x.cmp(&y)),
    }
}

/// Stable merge sort.
///
/// `slice::sort_by` may panic when the comparator is not a total order, and
/// "missing compares equal to everything" is not one.
fn stable_sort_by<T: Copy>(items: &mut Vec<T>, cmp: &impl Fn(T, T) -> Ordering) {
    if items.len() <= 1 {
        return;
    }
    let mut right = items.split_off(items.len() / 2);
    let mut left = std::mem::take(items);
    stable_sort_by(&mut left, cmp);
    stable_sort_by(&mut right, cmp);

    items.reserve(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if cmp(right[j], left[i]) == Ordering::Less {
            items.push(right[j]);
            j += 1;
        } else {
            items.push(left[i]);
            i += 1;
        }
    }
    items.extend_from_slice(&left[i..]);
    items.extend_from_slice(&right[j..]);
}

/// Computes the visible page for `records` under `view`.
///
/// Filters by status tab and text, sorts when a sort field is set, then slices
/// out the requested page. A page index past the end is clamped to the last
/// page.
#[must_use]
pub fn apply(records: &[ChainRecord], view: &TableViewState) -> TablePage {
    let mut visible: Vec<&ChainRecord> = records
        .iter()
        .filter(|r| view.status_filter.matches(r.status))
        .filter(|r| matches_filter(r, &view.filter_text))
        .collect();

    if let Some(field) = view.sort_field {
        let direction = view.sort_direction;
        stable_sort_by(&mut visible, &|a: &ChainRecord, b: &ChainRecord| {
            let ord = compare_by(field, a, b);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }

    let page_size = view.page_size.max(1);
    let total_items = visible.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page_index = view.page_index.min(total_pages - 1);

    let rows = visible
        .into_iter()
        .skip(page_index * page_size)
        .take(page_size)
        .cloned()
        .collect();

    TablePage {
        rows,
        total_items,
        total_pages,
        page_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fallback_records;
    use crate::timestamp::RecordTimestamp;

    fn numbered(count: u64) -> Vec<ChainRecord> {
        (1..=count)
            .map(|i| ChainRecord::new(i, format!("Chain {i}"), format!("0x{i:02}"), ChainStatus::Active))
            .collect()
    }

    fn names(page: &TablePage) -> Vec<&str> {
        page.rows.iter().map(|r| r.chain_name.as_str()).collect()
    }

    #[test]
    fn test_page_size_change_resets_to_first_page() {
        let records = numbered(12);
        let mut view = TableViewState::with_page_size(10);
        view.go_to_page(1);
        let page = apply(&records, &view);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.total_pages, 2);

        view.set_page_size(5);
        assert_eq!(view.page_index(), 0);
        let page = apply(&records, &view);
        assert_eq!(page.page_index, 0);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 12);
        assert_eq!(page.rows.len(), 5);
    }

    #[test]
    fn test_filter_and_sort_changes_reset_page() {
        let mut view = TableViewState::with_page_size(2);
        view.go_to_page(3);
        view.set_filter_text("chain");
        assert_eq!(view.page_index(), 0);

        view.go_to_page(3);
        view.set_sort(SortField::ChainId, SortDirection::Descending);
        assert_eq!(view.page_index(), 0);

        view.go_to_page(3);
        view.toggle_sort(SortField::ChainId);
        assert_eq!(view.page_index(), 0);
        assert_eq!(view.sort_direction(), SortDirection::Ascending);

        view.go_to_page(3);
        view.set_status_filter(StatusFilter::Paused);
        assert_eq!(view.page_index(), 0);
    }

    #[test]
    fn test_page_navigation_keeps_other_settings() {
        let records = numbered(12);
        let mut view = TableViewState::with_page_size(5);
        view.set_sort(SortField::ChainId, SortDirection::Descending);

        view.next_page();
        view.next_page();
        assert_eq!(view.page_index(), 2);
        assert_eq!(names(&apply(&records, &view)), ["Chain 2", "Chain 1"]);

        view.previous_page();
        assert_eq!(view.page_index(), 1);
        view.previous_page();
        view.previous_page();
        assert_eq!(view.page_index(), 0);
        assert_eq!(view.sort_field(), Some(SortField::ChainId));
        assert_eq!(view.sort_direction(), SortDirection::Descending);
        assert_eq!(view.page_size(), 5);
    }

    #[test]
    fn test_clear_sort_restores_input_order() {
        let records = numbered(3);
        let mut view = TableViewState::with_page_size(2);
        view.set_sort(SortField::ChainId, SortDirection::Descending);
        assert_eq!(names(&apply(&records, &view)), ["Chain 3", "Chain 2"]);

        view.next_page();
        view.clear_sort();
        assert_eq!(view.page_index(), 0);
        assert_eq!(view.sort_field(), None);
        assert_eq!(view.sort_direction(), SortDirection::Ascending);
        assert_eq!(names(&apply(&records, &view)), ["Chain 1", "Chain 2"]);
    }

    #[test]
    fn test_filter_output_contains_needle() {
        let records = numbered(25);
        for needle in ["", "1", "CHAIN 2", "chain 1", "zzz", "0"] {
            let mut view = TableViewState::with_page_size(100);
            view.set_filter_text(needle);
            let page = apply(&records, &view);
            assert!(page.total_items <= records.len());
            let lowered = needle.to_lowercase();
            for row in &page.rows {
                assert!(
                    row.chain_name.to_lowercase().contains(&lowered)
                        || row.display_chain_id().contains(&lowered)
                );
            }
        }
    }

    #[test]
    fn test_filter_matches_chain_id_string() {
        let records = fallback_records();
        let mut view = TableViewState::default();
        view.set_filter_text("397");
        let page = apply(&records, &view);
        assert_eq!(names(&page), vec!["Zora Network"]);
    }

    #[test]
    fn test_empty_result_still_has_one_page() {
        let mut view = TableViewState::default();
        view.set_filter_text("no such chain");
        let page = apply(&fallback_records(), &view);
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 1);
        assert!(page.rows.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_numeric_sort_is_not_lexical() {
        let records = vec![
            ChainRecord::new(100, "a", "", ChainStatus::Active),
            ChainRecord::new(9, "b", "", ChainStatus::Active),
            ChainRecord::new(20, "c", "", ChainStatus::Active),
        ];
        let mut view = TableViewState::default();
        view.set_sort(SortField::ChainId, SortDirection::Ascending);
        assert_eq!(names(&apply(&records, &view)), vec!["b", "c", "a"]);
        view.set_sort(SortField::ChainId, SortDirection::Descending);
        assert_eq!(names(&apply(&records, &view)), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_string_sort_ignores_case() {
        let records = vec![
            ChainRecord::new(1, "beta", "", ChainStatus::Active),
            ChainRecord::new(2, "Alpha", "", ChainStatus::Active),
            ChainRecord::new(3, "Gamma", "", ChainStatus::Active),
        ];
        let mut view = TableViewState::default();
        view.set_sort(SortField::ChainName, SortDirection::Ascending);
        assert_eq!(names(&apply(&records, &view)), vec!["Alpha", "beta", "Gamma"]);
    }

    #[test]
    fn test_sorting_is_idempotent() {
        let records = fallback_records();
        for field in [
            SortField::ChainId,
            SortField::ChainName,
            SortField::Status,
            SortField::CreatedAt,
        ] {
            let mut view = TableViewState::default();
            view.set_sort(field, SortDirection::Descending);
            let once = apply(&records, &view);
            let twice = apply(&once.rows, &view);
            assert_eq!(once.rows, twice.rows);
        }
    }

    #[test]
    fn test_missing_values_keep_input_order() {
        let mut with_date = ChainRecord::new(1, "dated", "", ChainStatus::Active);
        with_date.created_at = RecordTimestamp::parse_str("2024-01-01");
        let records = vec![
            ChainRecord::new(2, "undated-a", "", ChainStatus::Active),
            with_date,
            ChainRecord::new(3, "undated-b", "", ChainStatus::Active),
        ];
        let mut view = TableViewState::default();
        view.set_sort(SortField::CreatedAt, SortDirection::Descending);
        assert_eq!(
            names(&apply(&records, &view)),
            vec!["undated-a", "dated", "undated-b"]
        );
    }

    #[test]
    fn test_status_tab_filter() {
        let mut records = fallback_records();
        records.push(ChainRecord::new(5, "Pending", "", ChainStatus::Deploying));
        let mut view = TableViewState::default();
        view.set_status_filter(StatusFilter::Active);
        assert_eq!(apply(&records, &view).total_items, 2);
        view.set_status_filter(StatusFilter::Paused);
        assert_eq!(names(&apply(&records, &view)), vec!["DeFi Protocol"]);
        view.set_status_filter(StatusFilter::Deploying);
        view.set_filter_text("pend");
        assert_eq!(names(&apply(&records, &view)), vec!["Pending"]);
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let mut view = TableViewState::with_page_size(5);
        view.go_to_page(40);
        let page = apply(&numbered(12), &view);
        assert_eq!(page.page_index, 2);
        assert_eq!(page.rows.len(), 2);
        assert!(page.has_previous());
        assert!(!page.has_next());
    }

    #[test]
    fn test_zero_page_size_treated_as_one() {
        let mut view = TableViewState::default();
        view.set_page_size(0);
        assert_eq!(view.page_size(), 1);
        assert_eq!(apply(&numbered(3), &view).total_pages, 3);
    }

    #[test]
    fn test_identical_inputs_identical_output() {
        let records = numbered(12);
        let mut view = TableViewState::with_page_size(4);
        view.set_sort(SortField::OwnerAddress, SortDirection::Descending);
        view.next_page();
        assert_eq!(apply(&records, &view), apply(&records, &view));
    }
}
