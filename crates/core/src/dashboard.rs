//! Verification progress summary over the whole record set.

use serde::Serialize;

use crate::record::{AssetRecord, PavStatus};

/// Counts and percentages per verification outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PavSummary {
    pub total: usize,
    pub available: usize,
    pub not_available: usize,
    pub not_done: usize,
    pub available_pct: f64,
    pub not_available_pct: f64,
    pub not_done_pct: f64,
}

impl PavSummary {
    /// Records with a verified outcome (available or not).
    pub fn verified(&self) -> usize {
        self.available + self.not_available
    }
}

pub fn summarize(records: &[AssetRecord]) -> PavSummary {
    let mut summary = PavSummary {
        total: records.len(),
        ..Default::default()
    };
    for record in records {
        match record.pav_status {
            PavStatus::Available => summary.available += 1,
            PavStatus::NotAvailable => summary.not_available += 1,
            PavStatus::NotDone => summary.not_done += 1,
        }
    }
    summary.available_pct = percentage(summary.available, summary.total);
    summary.not_available_pct = percentage(summary.not_available, summary.total);
    summary.not_done_pct = percentage(summary.not_done, summary.total);
    summary
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AssetId;

    fn with_status(status: PavStatus) -> AssetRecord {
        let mut r = AssetRecord::new(AssetId::new("x"));
        r.pav_status = status;
        r
    }

    #[test]
    fn empty_set_has_zero_percentages() {
        let s = summarize(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.available_pct, 0.0);
        assert_eq!(s.not_done_pct, 0.0);
    }

    #[test]
    fn counts_and_percentages() {
        let records = vec![
            with_status(PavStatus::Available),
            with_status(PavStatus::Available),
            with_status(PavStatus::NotAvailable),
            with_status(PavStatus::NotDone),
        ];
        let s = summarize(&records);
        assert_eq!((s.available, s.not_available, s.not_done), (2, 1, 1));
        assert_eq!(s.verified(), 3);
        assert_eq!(s.available_pct, 50.0);
        assert_eq!(s.not_available_pct, 25.0);
        assert_eq!(s.not_done_pct, 25.0);
    }
}
