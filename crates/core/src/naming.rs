//! Export file naming.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Name used when no auditor is configured.
pub const DEFAULT_AUDITOR_SEGMENT: &str = "auditor";

/// Which records an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportScope {
    /// Every record, ignoring filters and search.
    All,
    /// The current filtered and sorted view, all pages.
    Filtered,
}

impl ExportScope {
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::All => "verified_assets",
            Self::Filtered => "filtered_verified_assets",
        }
    }
}

/// `{prefix}_{auditor}_{YYYY-MM-DD}.xlsx`.
///
/// The auditor is trimmed with internal whitespace runs collapsed to `_`;
/// `today` is used when no verification date is set.
pub fn export_file_name(
    scope: ExportScope,
    auditor_name: &str,
    verification_date: Option<NaiveDate>,
    today: NaiveDate,
) -> String {
    let auditor = auditor_segment(auditor_name);
    let date = verification_date.unwrap_or(today).format("%Y-%m-%d");
    format!("{}_{auditor}_{date}.xlsx", scope.file_prefix())
}

fn auditor_segment(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.is_empty() {
        DEFAULT_AUDITOR_SEGMENT.to_string()
    } else {
        parts.join("_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn all_scope_with_auditor_and_date() {
        let name = export_file_name(
            ExportScope::All,
            "  Jane   Q Doe ",
            Some(day(2024, 3, 15)),
            day(2030, 1, 1),
        );
        assert_eq!(name, "verified_assets_Jane_Q_Doe_2024-03-15.xlsx");
    }

    #[test]
    fn filtered_scope_defaults() {
        let name = export_file_name(ExportScope::Filtered, "   ", None, day(2025, 12, 1));
        assert_eq!(name, "filtered_verified_assets_auditor_2025-12-01.xlsx");
    }
}
