//! Export projector: records back into rows shaped by the original header.

use crate::alias::AliasResolver;
use crate::record::AssetRecord;
use crate::sheet::CellValue;

/// One output row: `(header, value)` pairs in header order.
///
/// A vector rather than a map so duplicate header texts each keep their own
/// column.
pub type ExportRow = Vec<(String, CellValue)>;

/// Project one record onto `headers`.
///
/// Aliased headers take the managed field's current value as text; every
/// other header takes the passthrough cell stored under that exact text.
/// The identifier and edited marker never appear.
pub fn project_record(
    record: &AssetRecord,
    headers: &[String],
    resolver: &AliasResolver,
) -> ExportRow {
    headers
        .iter()
        .map(|header| {
            let value = match resolver.resolve(header) {
                Some(field) => CellValue::Text(record.field_value(field).to_string()),
                None => record
                    .passthrough_value(header)
                    .cloned()
                    .unwrap_or_default(),
            };
            (header.clone(), value)
        })
        .collect()
}

pub fn project_records<'a>(
    records: impl IntoIterator<Item = &'a AssetRecord>,
    headers: &[String],
    resolver: &AliasResolver,
) -> Vec<ExportRow> {
    records
        .into_iter()
        .map(|r| project_record(r, headers, resolver))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_sheet_at;
    use crate::record::{AssetId, AvailabilityRemarks, PavStatus};
    use crate::sheet::{DecodedSheet, RawRow};

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::from(s)
    }

    #[test]
    fn unedited_import_round_trips() {
        let hdrs = headers(&["Asset Code", "Serial Number", "Model"]);
        let row: RawRow = [
            ("Asset Code".to_string(), text("A1")),
            ("Serial Number".to_string(), text("S1")),
            ("Model".to_string(), text("X")),
        ]
        .into_iter()
        .collect();
        let sheet = DecodedSheet {
            rows: vec![row],
            headers: hdrs.clone(),
        };
        let import = normalize_sheet_at(sheet, AliasResolver::standard(), 1);

        let rows = project_records(&import.records, &import.headers, AliasResolver::standard());
        assert_eq!(
            rows,
            vec![vec![
                ("Asset Code".to_string(), text("A1")),
                ("Serial Number".to_string(), text("S1")),
                ("Model".to_string(), text("X")),
            ]]
        );
    }

    #[test]
    fn passthrough_values_keep_their_type() {
        let hdrs = headers(&["Location", "Cost", "Asset Code"]);
        let mut record = AssetRecord::new(AssetId::new("x"));
        record.asset_code = "A1".into();
        record
            .passthrough
            .insert("Cost".into(), CellValue::Number(1299.5));

        let row = project_record(&record, &hdrs, AliasResolver::standard());
        assert_eq!(
            row,
            vec![
                ("Location".to_string(), CellValue::Empty),
                ("Cost".to_string(), CellValue::Number(1299.5)),
                ("Asset Code".to_string(), text("A1")),
            ]
        );
    }

    #[test]
    fn enums_export_display_strings() {
        let hdrs = headers(&["PAV Status", "Asset Status", "Asset Availability Remarks"]);
        let mut record = AssetRecord::new(AssetId::new("x"));
        record.pav_status = PavStatus::NotAvailable;
        record.remarks = Some(AvailabilityRemarks::SameBranch);

        let row = project_record(&record, &hdrs, AliasResolver::standard());
        assert_eq!(row[0].1, text("Not Available"));
        assert_eq!(row[1].1, text(""));
        assert_eq!(row[2].1, text("Available in same branch"));
    }

    #[test]
    fn duplicate_headers_each_get_a_column() {
        let hdrs = headers(&["Model", "Notes", "Model"]);
        let mut record = AssetRecord::new(AssetId::new("x"));
        record.model = "T14".into();

        let row = project_record(&record, &hdrs, AliasResolver::standard());
        assert_eq!(row.len(), 3);
        assert_eq!(row[0], ("Model".to_string(), text("T14")));
        assert_eq!(row[2], ("Model".to_string(), text("T14")));
    }

    #[test]
    fn identifier_and_edited_marker_never_leak() {
        let hdrs = headers(&["Asset Code"]);
        let mut record = AssetRecord::new(AssetId::new("A1-0-1-abc"));
        record.edited = true;
        let row = project_record(&record, &hdrs, AliasResolver::standard());
        assert_eq!(row.len(), 1);
        assert!(row.iter().all(|(_, v)| v != &text("A1-0-1-abc")));
    }
}
