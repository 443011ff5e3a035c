use assert_matches::assert_matches;
use pav_core::record::{AssetId, AssetRecord, PavStatus};
use pav_core::sheet::CellValue;
use pav_db::models::kv_entry::KvEntry;
use pav_db::repositories::{KvRepo, SnapshotRepo, ASSETS_KEY, HEADERS_KEY};
use pav_db::{DbPool, StoreError};

async fn test_pool() -> DbPool {
    let pool = pav_db::create_pool("sqlite::memory:").await.unwrap();
    pav_db::run_migrations(&pool).await.unwrap();
    pool
}

fn sample_records() -> Vec<AssetRecord> {
    let mut a = AssetRecord::new(AssetId::new("A1-0-1-aaaaaaa"));
    a.asset_code = "A1".into();
    a.pav_status = PavStatus::Available;
    a.passthrough.insert("Cost".into(), CellValue::Number(1299.5));
    a.passthrough.insert("Notes".into(), CellValue::Empty);

    let mut b = AssetRecord::new(AssetId::new("S2-1-1-bbbbbbb"));
    b.serial_number = "S2".into();
    b.edited = true;

    vec![a, b]
}

fn sample_headers() -> Vec<String> {
    vec!["Asset Code".into(), "Serial Number".into(), "Cost".into(), "Notes".into()]
}

#[tokio::test]
async fn test_bootstrap_and_health_check() {
    let pool = test_pool().await;
    pav_db::health_check(&pool).await.unwrap();

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM kv_store")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn test_load_without_save_is_none() {
    let pool = test_pool().await;
    assert!(SnapshotRepo::load(&pool).await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_then_load() {
    let pool = test_pool().await;
    let records = sample_records();
    let headers = sample_headers();

    SnapshotRepo::save(&pool, &records, &headers).await.unwrap();
    let snapshot = SnapshotRepo::load(&pool).await.unwrap().unwrap();

    assert_eq!(snapshot.records, records);
    assert_eq!(snapshot.headers, headers);
    assert_eq!(
        snapshot.records[0].passthrough.get("Notes"),
        Some(&CellValue::Empty)
    );
}

#[tokio::test]
async fn test_save_overwrites_both_keys() {
    let pool = test_pool().await;
    SnapshotRepo::save(&pool, &sample_records(), &sample_headers())
        .await
        .unwrap();

    let headers = vec!["Model".to_string()];
    SnapshotRepo::save(&pool, &[], &headers).await.unwrap();

    let snapshot = SnapshotRepo::load(&pool).await.unwrap().unwrap();
    assert!(snapshot.records.is_empty());
    assert_eq!(snapshot.headers, headers);

    let assets: KvEntry = KvRepo::get(&pool, ASSETS_KEY).await.unwrap().unwrap();
    let hdrs: KvEntry = KvRepo::get(&pool, HEADERS_KEY).await.unwrap().unwrap();
    assert_eq!(assets.updated_at, hdrs.updated_at);
}

#[tokio::test]
async fn test_half_snapshot_is_absent() {
    let pool = test_pool().await;
    KvRepo::put_many(&pool, &[(HEADERS_KEY, "[\"Model\"]".to_string())])
        .await
        .unwrap();
    assert!(SnapshotRepo::load(&pool).await.unwrap().is_none());
}

#[tokio::test]
async fn test_corrupt_snapshot_is_cleared() {
    let pool = test_pool().await;
    KvRepo::put_many(
        &pool,
        &[
            (ASSETS_KEY, "{not json".to_string()),
            (HEADERS_KEY, "[\"Model\"]".to_string()),
        ],
    )
    .await
    .unwrap();

    assert_matches!(SnapshotRepo::load(&pool).await, Err(StoreError::Corrupt(_)));
    assert!(KvRepo::get(&pool, ASSETS_KEY).await.unwrap().is_none());
    assert!(KvRepo::get(&pool, HEADERS_KEY).await.unwrap().is_none());
    assert!(SnapshotRepo::load(&pool).await.unwrap().is_none());
}

#[tokio::test]
async fn test_clear_removes_snapshot() {
    let pool = test_pool().await;
    SnapshotRepo::save(&pool, &sample_records(), &sample_headers())
        .await
        .unwrap();
    SnapshotRepo::clear(&pool).await.unwrap();
    assert!(SnapshotRepo::load(&pool).await.unwrap().is_none());

    let removed = KvRepo::delete_many(&pool, &[ASSETS_KEY, HEADERS_KEY])
        .await
        .unwrap();
    assert_eq!(removed, 0);
}

#[tokio::test]
async fn test_get_many_reads_keys_together() {
    let pool = test_pool().await;
    SnapshotRepo::save(&pool, &sample_records(), &sample_headers())
        .await
        .unwrap();
    KvRepo::put_many(&pool, &[("unrelated", "1".to_string())])
        .await
        .unwrap();

    let mut entries = KvRepo::get_many(&pool, &[HEADERS_KEY, ASSETS_KEY, "missing"])
        .await
        .unwrap();
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec![ASSETS_KEY, HEADERS_KEY]);
    assert_eq!(entries[0].updated_at, entries[1].updated_at);
    assert!(KvRepo::get_many(&pool, &[]).await.unwrap().is_empty());
}
