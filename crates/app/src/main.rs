//! `pav-app` -- physical asset verification from the command line.
//!
//! Restores saved progress, and when given a spreadsheet path imports it,
//! saves the new progress, and writes the full export next to it.
//!
//! # Environment variables
//!
//! | Variable                 | Default           | Description                      |
//! |--------------------------|-------------------|----------------------------------|
//! | `PAV_DATABASE_URL`       | `sqlite://pav.db` | SQLite store for saved progress  |
//! | `PAV_AUDITOR_NAME`       | --                | Auditor stamped on edits         |
//! | `PAV_DATE`               | today             | Verification date (`YYYY-MM-DD`) |
//! | `PAV_RECOMPUTE_DELAY_MS` | `50`              | View recompute debounce          |
//! | `PAV_EXPORT_DIR`         | `.`               | Where export files are written   |

use std::path::PathBuf;

use anyhow::Context;
use pav_app::config::AppConfig;
use pav_app::service::AuditService;
use pav_core::naming::ExportScope;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pav_app=info,pav_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        database_url = %config.database_url,
        auditor = %config.auditor_name,
        "Starting pav-app",
    );

    let pool = pav_db::create_pool(&config.database_url)
        .await
        .context("Failed to open progress database")?;
    pav_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    pav_db::health_check(&pool).await?;

    let service = AuditService::new(pool, config.audit_context(), config.recompute_delay);

    match service.restore_saved().await {
        Ok(Some(summary)) => tracing::info!(
            total = summary.total,
            available = summary.available,
            not_available = summary.not_available,
            not_done = summary.not_done,
            "Restored saved progress",
        ),
        Ok(None) => tracing::info!("No saved progress"),
        Err(e) => tracing::warn!(error = %e, "Could not restore saved progress"),
    }

    let Some(input) = std::env::args_os().nth(1).map(PathBuf::from) else {
        return Ok(());
    };

    if service.session().await.requires_replace_confirmation() {
        tracing::warn!("Replacing previously saved progress with a new import");
    }

    let imported = service
        .import_file(&input)
        .await
        .with_context(|| format!("Failed to import {}", input.display()))?;
    service.save_progress().await?;

    let export = service.export(ExportScope::All).await?;
    let out_path = config.export_dir.join(&export.file_name);
    tokio::fs::write(&out_path, &export.bytes)
        .await
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    tracing::info!(
        records = imported.records,
        export = %out_path.display(),
        "Import complete",
    );
    Ok(())
}
