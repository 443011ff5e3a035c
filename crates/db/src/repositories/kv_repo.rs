//! Repository for the `kv_store` table.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::kv_entry::KvEntry;

/// Column list for `kv_store` queries.
const COLUMNS: &str = "key, value, updated_at";

/// Key/value access with multi-key writes in a single transaction.
pub struct KvRepo;

impl KvRepo {
    /// Find the entry stored under `key`.
    pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<KvEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM kv_store WHERE key = ?1");
        sqlx::query_as::<_, KvEntry>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Read every listed key in a single statement, so the entries come from
    /// one consistent state of the table. Missing keys are skipped.
    pub async fn get_many(pool: &SqlitePool, keys: &[&str]) -> Result<Vec<KvEntry>, sqlx::Error> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=keys.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!("SELECT {COLUMNS} FROM kv_store WHERE key IN ({placeholders})");

        let mut q = sqlx::query_as::<_, KvEntry>(&query);
        for key in keys {
            q = q.bind(*key);
        }
        q.fetch_all(pool).await
    }

    /// Upsert every `(key, value)` pair atomically; all entries share one
    /// `updated_at`.
    pub async fn put_many(pool: &SqlitePool, entries: &[(&str, String)]) -> Result<(), sqlx::Error> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        for (key, value) in entries {
            sqlx::query(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT (key) DO UPDATE SET \
                    value = excluded.value, \
                    updated_at = excluded.updated_at",
            )
            .bind(*key)
            .bind(value.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    /// Delete every listed key atomically. Returns the number of rows removed.
    pub async fn delete_many(pool: &SqlitePool, keys: &[&str]) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut removed = 0;

        for key in keys {
            let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
                .bind(*key)
                .execute(&mut *tx)
                .await?;
            removed += result.rows_affected();
        }

        tx.commit().await?;
        Ok(removed)
    }
}
