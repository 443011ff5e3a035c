//! Async front of the audit session.
//!
//! Holds the session behind a tokio mutex, runs decode and encode on
//! blocking workers, persists through the snapshot store, and schedules a
//! view recompute after every state change.

use std::path::Path;
use std::time::Duration;

use tokio::sync::{watch, Mutex, MutexGuard};

use pav_core::dashboard::PavSummary;
use pav_core::edit::{AuditContext, EditDraft};
use pav_core::naming::ExportScope;
use pav_core::record::{AssetId, AssetRecord};
use pav_db::repositories::SnapshotRepo;
use pav_db::DbPool;

use crate::error::SessionError;
use crate::recompute::RecomputeScheduler;
use crate::session::{AuditSession, ExportBundle, ImportSummary, ViewPage};

/// An encoded export ready to be written or downloaded.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct AuditService {
    session: Mutex<AuditSession>,
    pool: DbPool,
    recompute: RecomputeScheduler,
}

impl AuditService {
    pub fn new(pool: DbPool, audit: AuditContext, recompute_delay: Duration) -> Self {
        Self {
            session: Mutex::new(AuditSession::new(audit)),
            pool,
            recompute: RecomputeScheduler::new(recompute_delay),
        }
    }

    /// Run `f` against the session and schedule a recompute afterwards.
    /// Use for filter, search, sort, page, and audit context changes.
    pub async fn update<R>(&self, f: impl FnOnce(&mut AuditSession) -> R) -> R {
        let result = f(&mut *self.session.lock().await);
        self.recompute.schedule();
        result
    }

    /// Direct read access to the session.
    pub async fn session(&self) -> MutexGuard<'_, AuditSession> {
        self.session.lock().await
    }

    /// Watch channel bumped each time a debounced recompute is due.
    pub fn subscribe_recompute(&self) -> watch::Receiver<u64> {
        self.recompute.subscribe()
    }

    pub async fn view(&self) -> ViewPage {
        self.session.lock().await.view()
    }

    pub async fn summary(&self) -> PavSummary {
        self.session.lock().await.summary()
    }

    // -- import --

    /// Decode and import a spreadsheet.
    ///
    /// The session is not locked while decoding; a second import started
    /// in the meantime is rejected. Dropping this future mid-decode releases
    /// the busy flag and leaves the loaded records as they were.
    pub async fn import_bytes(&self, bytes: Vec<u8>) -> Result<ImportSummary, SessionError> {
        let guard = self.session.lock().await.begin_import()?;
        tracing::info!(bytes = bytes.len(), "Import started");

        let decoded = tokio::task::spawn_blocking(move || pav_codec::decode(&bytes)).await?;

        let summary = self.session.lock().await.complete_import(guard, decoded)?;
        self.recompute.schedule();
        Ok(summary)
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportSummary, SessionError> {
        let bytes = tokio::fs::read(path).await?;
        tracing::info!(path = %path.display(), "Reading asset register");
        self.import_bytes(bytes).await
    }

    // -- edit --

    pub async fn apply_edit(
        &self,
        id: &AssetId,
        draft: &EditDraft,
    ) -> Result<AssetRecord, SessionError> {
        let updated = self.session.lock().await.apply_edit(id, draft)?;
        self.recompute.schedule();
        Ok(updated)
    }

    // -- export --

    /// Encode the records in `scope` as an xlsx workbook.
    pub async fn export(&self, scope: ExportScope) -> Result<ExportFile, SessionError> {
        let today = chrono::Local::now().date_naive();
        let ExportBundle {
            file_name,
            rows,
            headers,
        } = self.session.lock().await.export(scope, today);
        let row_count = rows.len();

        let bytes = tokio::task::spawn_blocking(move || pav_codec::encode(&rows, &headers))
            .await?
            .map_err(SessionError::Export)?;

        tracing::info!(file_name = %file_name, rows = row_count, "Export ready");
        Ok(ExportFile { file_name, bytes })
    }

    // -- persistence --

    /// Persist the current records and headers as one unit.
    pub async fn save_progress(&self) -> Result<(), SessionError> {
        let (records, headers) = self.session.lock().await.snapshot();
        SnapshotRepo::save(&self.pool, &records, &headers).await?;
        Ok(())
    }

    /// Load saved progress into the session, if there is any.
    ///
    /// Corrupt saved progress is discarded by the store and reported as a
    /// persistence error; the session stays empty.
    pub async fn restore_saved(&self) -> Result<Option<PavSummary>, SessionError> {
        let Some(snapshot) = SnapshotRepo::load(&self.pool).await? else {
            return Ok(None);
        };

        let summary = {
            let mut session = self.session.lock().await;
            session.restore(snapshot);
            session.summary()
        };
        self.recompute.schedule();
        Ok(Some(summary))
    }

    pub async fn clear_saved(&self) -> Result<(), SessionError> {
        SnapshotRepo::clear(&self.pool).await?;
        Ok(())
    }
}
