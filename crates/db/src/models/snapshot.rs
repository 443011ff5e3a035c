use chrono::{DateTime, Utc};
use serde::Serialize;

use pav_core::record::AssetRecord;

/// Saved audit progress: the record set and the header row it was
/// imported with. The two always travel together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub records: Vec<AssetRecord>,
    pub headers: Vec<String>,
    pub saved_at: DateTime<Utc>,
}
