//! Record normalizer: decoded spreadsheet rows -> [`AssetRecord`]s.
//!
//! Managed fields are located on each row through the [`AliasResolver`]
//! (case-insensitive, per-row key matching), enum fields are interpreted
//! leniently, and every other column is carried verbatim as passthrough.

use rand::Rng;

use crate::alias::{AliasResolver, ManagedField};
use crate::record::{AssetId, AssetRecord, AssetStatus, AvailabilityRemarks, PavStatus};
use crate::sheet::{CellValue, DecodedSheet, RawRow};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prefix used for identifiers of rows with neither asset code nor serial.
pub const ANONYMOUS_ID_PREFIX: &str = "asset";

/// Length of the random base-36 suffix appended to every identifier.
pub const ID_SUFFIX_LEN: usize = 7;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Result of normalizing one decoded sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImport {
    /// Records in input row order.
    pub records: Vec<AssetRecord>,
    /// Original header row, authoritative for export.
    pub headers: Vec<String>,
}

// ---------------------------------------------------------------------------
// Pure Functions
// ---------------------------------------------------------------------------

/// Normalize a decoded sheet, stamping identifiers with the current time.
pub fn normalize_sheet(sheet: DecodedSheet, resolver: &AliasResolver) -> NormalizedImport {
    let timestamp_ms = chrono::Utc::now().timestamp_millis();
    normalize_sheet_at(sheet, resolver, timestamp_ms)
}

/// Normalize a decoded sheet using a fixed import timestamp.
///
/// The timestamp is shared by every row of the import; identifiers differ by
/// row index and a random suffix.
pub fn normalize_sheet_at(
    sheet: DecodedSheet,
    resolver: &AliasResolver,
    timestamp_ms: i64,
) -> NormalizedImport {
    let DecodedSheet { rows, headers } = sheet;
    let mut rng = rand::rng();

    let records = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let suffix = random_suffix(&mut rng);
            normalize_row(row, index, &headers, resolver, timestamp_ms, &suffix)
        })
        .collect();

    NormalizedImport { records, headers }
}

/// Build one record from a raw row.
pub fn normalize_row(
    row: &RawRow,
    index: usize,
    headers: &[String],
    resolver: &AliasResolver,
    timestamp_ms: i64,
    suffix: &str,
) -> AssetRecord {
    let text_of = |field: ManagedField| {
        resolver
            .find_in_row(row, field)
            .map(CellValue::to_text)
            .unwrap_or_default()
    };

    let asset_code = text_of(ManagedField::AssetCode);
    let serial_number = text_of(ManagedField::SerialNumber);
    let id = build_asset_id(&asset_code, &serial_number, index, timestamp_ms, suffix);

    let mut record = AssetRecord::new(id);

    // Passthrough first; managed fields own every aliased key.
    for (key, value) in row {
        if resolver.resolve(key).is_none() {
            record.passthrough.insert(key.clone(), value.clone());
        }
    }
    for header in headers {
        if resolver.resolve(header).is_none() && !record.passthrough.contains_key(header) {
            record.passthrough.insert(header.clone(), CellValue::Empty);
        }
    }

    for field in ManagedField::ALL {
        if let Some(slot) = record.text_field_mut(field) {
            *slot = text_of(field);
        }
    }
    record.pav_status = PavStatus::from_import(&text_of(ManagedField::PavStatus));
    record.asset_status = AssetStatus::from_import(&text_of(ManagedField::AssetStatus));
    record.remarks =
        AvailabilityRemarks::from_import(&text_of(ManagedField::AssetAvailabilityRemarks));

    record
}

/// Compose an identifier: `{code|serial|"asset"}-{index}-{timestamp}-{suffix}`.
pub fn build_asset_id(
    asset_code: &str,
    serial_number: &str,
    index: usize,
    timestamp_ms: i64,
    suffix: &str,
) -> AssetId {
    let stem = if !asset_code.is_empty() {
        asset_code
    } else if !serial_number.is_empty() {
        serial_number
    } else {
        ANONYMOUS_ID_PREFIX
    };
    AssetId::new(format!("{stem}-{index}-{timestamp_ms}-{suffix}"))
}

// ── Private helpers ──────────────────────────────────────────────────

fn random_suffix(rng: &mut impl Rng) -> String {
    (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────
