//! View pipeline: filter -> search -> sort -> paginate.
//!
//! Recomputed from scratch on every call. Nothing here mutates the record
//! set; the only state that flows back to the caller is the normalized page
//! number carried in [`ViewOutput`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::alias::ManagedField;
use crate::record::{AssetRecord, PavStatus};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Rows per page.
pub const PAGE_SIZE: usize = 50;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Facet filters. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub asset_type: Option<String>,
    pub model: Option<String>,
    pub pav_status: Option<PavStatus>,
}

impl FilterState {
    /// Select an asset type. The model selection is reset because the model
    /// options depend on the asset type.
    pub fn select_asset_type(&mut self, asset_type: Option<String>) {
        self.asset_type = asset_type;
        self.model = None;
    }

    pub fn is_all(&self) -> bool {
        self.asset_type.is_none() && self.model.is_none() && self.pav_status.is_none()
    }
}

/// Which field the search term is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchCriteria {
    #[default]
    SerialNumber,
    AssetCode,
}

impl SearchCriteria {
    pub fn field(self) -> ManagedField {
        match self {
            Self::SerialNumber => ManagedField::SerialNumber,
            Self::AssetCode => ManagedField::AssetCode,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchState {
    pub term: String,
    pub criteria: SearchCriteria,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// The single active sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: ManagedField,
    pub direction: SortDirection,
}

/// Next sort after the user selects `field`.
///
/// Re-selecting the key that is currently ascending flips it to descending;
/// every other selection (a new key, or the same key while descending)
/// sorts ascending. There is no way back to "unsorted".
pub fn toggle_sort(current: Option<SortSpec>, field: ManagedField) -> SortSpec {
    let direction = match current {
        Some(SortSpec {
            field: active,
            direction: SortDirection::Ascending,
        }) if active == field => SortDirection::Descending,
        _ => SortDirection::Ascending,
    };
    SortSpec { field, direction }
}

/// Everything the pipeline needs besides the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub filters: FilterState,
    pub search: SearchState,
    pub sort: Option<SortSpec>,
    /// 1-based page number.
    pub page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            filters: FilterState::default(),
            search: SearchState::default(),
            sort: None,
            page: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Filtered and sorted view over a record slice.
#[derive(Debug, Clone)]
pub struct ViewOutput<'a> {
    /// Every matching record in display order.
    pub matched: Vec<&'a AssetRecord>,
    /// Page actually shown, after clamping.
    pub page: usize,
    pub total_pages: usize,
}

impl<'a> ViewOutput<'a> {
    /// Records on the current page.
    pub fn page_rows(&self) -> &[&'a AssetRecord] {
        let start = (self.page - 1) * PAGE_SIZE;
        if start >= self.matched.len() {
            return &[];
        }
        let end = (start + PAGE_SIZE).min(self.matched.len());
        &self.matched[start..end]
    }

    pub fn total_matched(&self) -> usize {
        self.matched.len()
    }
}

/// Distinct option lists for the filter controls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub asset_types: Vec<String>,
    pub models: Vec<String>,
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// Stages 1-4: facet filters then search, preserving input order.
pub fn filter_records<'a>(
    records: &'a [AssetRecord],
    filters: &FilterState,
    search: &SearchState,
) -> Vec<&'a AssetRecord> {
    let needle = search.term.to_lowercase();
    let search_field = search.criteria.field();

    records
        .iter()
        .filter(|r| {
            filters
                .asset_type
                .as_deref()
                .is_none_or(|t| r.asset_type == t)
        })
        .filter(|r| filters.model.as_deref().is_none_or(|m| r.model == m))
        .filter(|r| filters.pav_status.is_none_or(|s| r.pav_status == s))
        .filter(|r| {
            needle.is_empty()
                || r.field_value(search_field)
                    .to_lowercase()
                    .contains(&needle)
        })
        .collect()
}

/// Stage 5: stable sort on the stringified field value.
pub fn sort_records(rows: &mut [&AssetRecord], sort: SortSpec) {
    rows.sort_by(|a, b| {
        let ord = a.field_value(sort.field).cmp(b.field_value(sort.field));
        match sort.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// Number of pages for `count` rows (0 when empty).
pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE)
}

/// Clamp a requested page: out of range or empty result -> page 1.
pub fn normalize_page(page: usize, count: usize) -> usize {
    if count == 0 || page == 0 || page > total_pages(count) {
        1
    } else {
        page
    }
}

/// Run the whole pipeline.
pub fn compute_view<'a>(records: &'a [AssetRecord], state: &ViewState) -> ViewOutput<'a> {
    let mut matched = filter_records(records, &state.filters, &state.search);
    if let Some(sort) = state.sort {
        sort_records(&mut matched, sort);
    }
    let page = normalize_page(state.page, matched.len());
    let total_pages = total_pages(matched.len());

    ViewOutput {
        matched,
        page,
        total_pages,
    }
}

// ---------------------------------------------------------------------------
// Facets
// ---------------------------------------------------------------------------

/// Distinct, non-empty, sorted asset types across all records.
pub fn asset_type_options(records: &[AssetRecord]) -> Vec<String> {
    distinct_sorted(records.iter().map(|r| r.asset_type.as_str()))
}

/// Distinct, non-empty, sorted models among records of `asset_type`
/// (all records when `None`).
pub fn model_options(records: &[AssetRecord], asset_type: Option<&str>) -> Vec<String> {
    distinct_sorted(
        records
            .iter()
            .filter(|r| asset_type.is_none_or(|t| r.asset_type == t))
            .map(|r| r.model.as_str()),
    )
}

pub fn facets(records: &[AssetRecord], filters: &FilterState) -> Facets {
    Facets {
        asset_types: asset_type_options(records),
        models: model_options(records, filters.asset_type.as_deref()),
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
