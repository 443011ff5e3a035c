//! The audit session: everything one auditor works on between imports.
//!
//! Records are published as immutable revisions (`Arc<Vec<_>>`); an edit
//! builds the next revision instead of mutating the one a reader may hold.
//! The view is recomputed from scratch on request and never cached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use pav_codec::CodecError;
use pav_core::alias::{AliasResolver, ManagedField};
use pav_core::dashboard::{self, PavSummary};
use pav_core::edit::{self, AuditContext, EditDraft};
use pav_core::export::{self, ExportRow};
use pav_core::naming::{self, ExportScope};
use pav_core::normalize;
use pav_core::record::{AssetId, AssetRecord, PavStatus};
use pav_core::sheet::DecodedSheet;
use pav_core::view::{self, Facets, SearchCriteria, SearchState, SortSpec, ViewState};
use pav_db::models::snapshot::Snapshot;

use crate::error::SessionError;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Counts reported after a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub records: usize,
    pub headers: usize,
}

/// One page of the current view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewPage {
    pub rows: Vec<AssetRecord>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matched: usize,
}

/// Everything needed to encode and name an export file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportBundle {
    pub file_name: String,
    pub rows: Vec<ExportRow>,
    pub headers: Vec<String>,
}

/// Busy-flag holder for one running import. Clears the flag on drop.
#[derive(Debug)]
#[must_use = "dropping the guard ends the import"]
pub struct ImportGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ImportGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AuditSession {
    records: Arc<Vec<AssetRecord>>,
    headers: Arc<Vec<String>>,
    view: ViewState,
    audit: AuditContext,
    importing: Arc<AtomicBool>,
    revision: u64,
}

impl AuditSession {
    pub fn new(audit: AuditContext) -> Self {
        Self {
            audit,
            ..Default::default()
        }
    }

    // -- accessors --

    pub fn records(&self) -> &Arc<Vec<AssetRecord>> {
        &self.records
    }

    pub fn headers(&self) -> &Arc<Vec<String>> {
        &self.headers
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn audit(&self) -> &AuditContext {
        &self.audit
    }

    /// Bumped on every change to records or headers.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_loaded(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn is_importing(&self) -> bool {
        self.importing.load(Ordering::Acquire)
    }

    // -- import --

    /// Replacing loaded work needs the user's confirmation first.
    pub fn requires_replace_confirmation(&self) -> bool {
        self.is_loaded()
    }

    /// Mark an import as running. Fails while another one is.
    ///
    /// The flag stays set for as long as the returned guard lives; dropping
    /// it on any path (completion, error, a cancelled future) clears it.
    pub fn begin_import(&mut self) -> Result<ImportGuard, SessionError> {
        if self
            .importing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::ImportInProgress);
        }
        Ok(ImportGuard {
            flag: Arc::clone(&self.importing),
        })
    }

    /// Finish the running import with the decoder's outcome.
    ///
    /// On success the record set and headers are replaced and the whole
    /// view (filters, search, sort, page) goes back to its defaults. On
    /// failure the previous state is left untouched.
    pub fn complete_import(
        &mut self,
        guard: ImportGuard,
        outcome: Result<DecodedSheet, CodecError>,
    ) -> Result<ImportSummary, SessionError> {
        drop(guard);

        let sheet = outcome.map_err(|e| {
            tracing::warn!(error = %e, "Import failed to decode");
            SessionError::Decode(e)
        })?;

        let imported = normalize::normalize_sheet(sheet, AliasResolver::standard());
        let summary = ImportSummary {
            records: imported.records.len(),
            headers: imported.headers.len(),
        };

        self.records = Arc::new(imported.records);
        self.headers = Arc::new(imported.headers);
        self.view = ViewState::default();
        self.revision += 1;

        tracing::info!(
            records = summary.records,
            headers = summary.headers,
            "Imported asset register"
        );
        Ok(summary)
    }

    // -- view --

    /// Run the view pipeline and keep the page it settled on.
    pub fn view(&mut self) -> ViewPage {
        let output = view::compute_view(&self.records, &self.view);
        self.view.page = output.page;

        ViewPage {
            rows: output.page_rows().iter().map(|r| (*r).clone()).collect(),
            page: output.page,
            total_pages: output.total_pages,
            total_matched: output.total_matched(),
        }
    }

    pub fn facets(&self) -> Facets {
        view::facets(&self.records, &self.view.filters)
    }

    /// Select an asset type; also clears the model filter.
    pub fn set_asset_type_filter(&mut self, asset_type: Option<String>) {
        self.view.filters.select_asset_type(asset_type);
        self.view.page = 1;
    }

    pub fn set_model_filter(&mut self, model: Option<String>) {
        self.view.filters.model = model;
        self.view.page = 1;
    }

    pub fn set_pav_status_filter(&mut self, status: Option<PavStatus>) {
        self.view.filters.pav_status = status;
        self.view.page = 1;
    }

    pub fn set_search(&mut self, term: impl Into<String>, criteria: SearchCriteria) {
        self.view.search = SearchState {
            term: term.into(),
            criteria,
        };
        self.view.page = 1;
    }

    /// Sort by `field`, flipping direction when it is already ascending.
    pub fn toggle_sort(&mut self, field: ManagedField) -> SortSpec {
        let sort = view::toggle_sort(self.view.sort, field);
        self.view.sort = Some(sort);
        sort
    }

    /// Request a page. Out-of-range pages fall back to 1 on the next view.
    pub fn set_page(&mut self, page: usize) {
        self.view.page = page;
    }

    // -- audit context --

    pub fn set_auditor(&mut self, name: impl Into<String>) {
        self.audit.auditor_name = name.into();
    }

    pub fn set_verification_date(&mut self, date: Option<NaiveDate>) {
        self.audit.verification_date = date;
    }

    // -- edit --

    pub fn draft_for(&self, id: &AssetId) -> Result<EditDraft, SessionError> {
        self.records
            .iter()
            .find(|r| &r.id == id)
            .map(EditDraft::from_record)
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    /// Validate and apply an edit, publishing a new record revision.
    pub fn apply_edit(
        &mut self,
        id: &AssetId,
        draft: &EditDraft,
    ) -> Result<AssetRecord, SessionError> {
        let (index, updated) = edit::edit_record(&self.records, id, draft, &self.audit)?;

        let mut next = Vec::clone(&self.records);
        next[index] = updated.clone();
        self.records = Arc::new(next);
        self.revision += 1;

        tracing::debug!(asset_id = %id, revision = self.revision, "Asset updated");
        Ok(updated)
    }

    // -- export --

    /// Project the records in `scope` onto the original headers.
    ///
    /// `Filtered` exports every page of the current view in view order.
    pub fn export(&self, scope: ExportScope, today: NaiveDate) -> ExportBundle {
        let resolver = AliasResolver::standard();
        let rows = match scope {
            ExportScope::All => export::project_records(self.records.iter(), &self.headers, resolver),
            ExportScope::Filtered => {
                let output = view::compute_view(&self.records, &self.view);
                export::project_records(output.matched.iter().copied(), &self.headers, resolver)
            }
        };

        let file_name = naming::export_file_name(
            scope,
            &self.audit.auditor_name,
            self.audit.verification_date,
            today,
        );

        ExportBundle {
            file_name,
            rows,
            headers: Vec::clone(&self.headers),
        }
    }

    // -- persistence --

    /// Current revision of records and headers, cheap to hand to a writer.
    pub fn snapshot(&self) -> (Arc<Vec<AssetRecord>>, Arc<Vec<String>>) {
        (Arc::clone(&self.records), Arc::clone(&self.headers))
    }

    /// Replace the session contents with saved progress.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.records = Arc::new(snapshot.records);
        self.headers = Arc::new(snapshot.headers);
        self.view = ViewState::default();
        self.revision += 1;
    }

    pub fn summary(&self) -> PavSummary {
        dashboard::summarize(&self.records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
