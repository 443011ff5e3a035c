//! Saved audit progress on top of [`KvRepo`].
//!
//! Records and headers live under two keys that are only ever written,
//! read, and deleted together.

use sqlx::SqlitePool;

use pav_core::record::AssetRecord;

use crate::error::StoreError;
use crate::models::snapshot::Snapshot;
use crate::repositories::kv_repo::KvRepo;

/// Key holding the JSON array of asset records.
pub const ASSETS_KEY: &str = "pav_assets";

/// Key holding the JSON array of original header strings.
pub const HEADERS_KEY: &str = "pav_headers";

pub struct SnapshotRepo;

impl SnapshotRepo {
    /// Write records and headers in one transaction.
    pub async fn save(
        pool: &SqlitePool,
        records: &[AssetRecord],
        headers: &[String],
    ) -> Result<(), StoreError> {
        let assets_json = serde_json::to_string(records)?;
        let headers_json = serde_json::to_string(headers)?;

        KvRepo::put_many(
            pool,
            &[(ASSETS_KEY, assets_json), (HEADERS_KEY, headers_json)],
        )
        .await?;

        tracing::info!(
            records = records.len(),
            headers = headers.len(),
            "Saved audit progress"
        );
        Ok(())
    }

    /// Load saved progress.
    ///
    /// Both keys are read in one statement. Returns `None` unless both are
    /// present. A snapshot that fails
    /// to parse is deleted and reported as [`StoreError::Corrupt`].
    pub async fn load(pool: &SqlitePool) -> Result<Option<Snapshot>, StoreError> {
        let entries = KvRepo::get_many(pool, &[ASSETS_KEY, HEADERS_KEY]).await?;
        let mut assets = None;
        let mut headers = None;
        for entry in entries {
            match entry.key.as_str() {
                ASSETS_KEY => assets = Some(entry),
                HEADERS_KEY => headers = Some(entry),
                _ => {}
            }
        }

        let (Some(assets), Some(headers)) = (assets, headers) else {
            return Ok(None);
        };

        let parsed = serde_json::from_str::<Vec<AssetRecord>>(&assets.value).and_then(|records| {
            serde_json::from_str::<Vec<String>>(&headers.value).map(|headers| (records, headers))
        });

        match parsed {
            Ok((records, headers)) => {
                tracing::info!(
                    records = records.len(),
                    headers = headers.len(),
                    "Loaded audit progress"
                );
                Ok(Some(Snapshot {
                    records,
                    headers,
                    saved_at: assets.updated_at,
                }))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable saved progress");
                Self::clear(pool).await?;
                Err(StoreError::Corrupt(e.to_string()))
            }
        }
    }

    /// Delete saved progress.
    pub async fn clear(pool: &SqlitePool) -> Result<(), StoreError> {
        KvRepo::delete_many(pool, &[ASSETS_KEY, HEADERS_KEY]).await?;
        Ok(())
    }
}
