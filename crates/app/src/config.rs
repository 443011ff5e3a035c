use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use pav_core::edit::AuditContext;

use crate::recompute::DEFAULT_RECOMPUTE_DELAY;

#[derive(Debug, thiserror::Error)]
#[error("{var} has an invalid value {value:?}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite URL for saved progress.
    pub database_url: String,
    /// Auditor stamped on every edit; blank blocks edits until set.
    pub auditor_name: String,
    /// Verification date stamped on first verification. `None` disables
    /// date stamping.
    pub verification_date: Option<NaiveDate>,
    pub recompute_delay: Duration,
    /// Directory export files are written to.
    pub export_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default           |
    /// |--------------------------|-------------------|
    /// | `PAV_DATABASE_URL`       | `sqlite://pav.db` |
    /// | `PAV_AUDITOR_NAME`       | empty             |
    /// | `PAV_DATE`               | today             |
    /// | `PAV_RECOMPUTE_DELAY_MS` | `50`              |
    /// | `PAV_EXPORT_DIR`         | `.`               |
    ///
    /// `PAV_DATE` set to an empty string turns date stamping off.
    pub fn from_env() -> Result<Self, ConfigError> {
        let today = chrono::Local::now().date_naive();
        Self::from_lookup(|var| std::env::var(var).ok(), today)
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        today: NaiveDate,
    ) -> Result<Self, ConfigError> {
        let database_url = lookup("PAV_DATABASE_URL").unwrap_or_else(|| "sqlite://pav.db".into());

        let auditor_name = lookup("PAV_AUDITOR_NAME").unwrap_or_default();

        let verification_date = match lookup("PAV_DATE") {
            None => Some(today),
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| ConfigError {
                    var: "PAV_DATE",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            ),
        };

        let recompute_delay = match lookup("PAV_RECOMPUTE_DELAY_MS") {
            None => DEFAULT_RECOMPUTE_DELAY,
            Some(raw) => {
                let ms: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| ConfigError {
                    var: "PAV_RECOMPUTE_DELAY_MS",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
                Duration::from_millis(ms)
            }
        };

        let export_dir = lookup("PAV_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            database_url,
            auditor_name,
            verification_date,
            recompute_delay,
            export_dir,
        })
    }

    pub fn audit_context(&self) -> AuditContext {
        AuditContext::new(self.auditor_name.clone(), self.verification_date)
    }
}
