//! Export encoding: one xlsx worksheet, header row first.

use rust_xlsxwriter::{Workbook, Worksheet};

use pav_core::export::ExportRow;
use pav_core::sheet::CellValue;

use crate::error::CodecError;

pub const EXPORT_SHEET_NAME: &str = "Verified Assets";

/// Write `headers` then every row positionally. Empty cells and empty
/// strings are left blank.
pub fn encode(rows: &[ExportRow], headers: &[String]) -> Result<Vec<u8>, CodecError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    for (col, header) in headers.iter().enumerate() {
        if !header.is_empty() {
            worksheet.write_string(0, col_index(col)?, header)?;
        }
    }

    for (index, row) in rows.iter().enumerate() {
        let row_num = row_index(index + 1)?;
        for (col, (_, value)) in row.iter().enumerate() {
            write_cell(worksheet, row_num, col_index(col)?, value)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(rows = rows.len(), bytes = bytes.len(), "Encoded export workbook");
    Ok(bytes)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
) -> Result<(), CodecError> {
    match value {
        CellValue::Empty => {}
        CellValue::Text(s) if s.is_empty() => {}
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}

fn row_index(index: usize) -> Result<u32, CodecError> {
    u32::try_from(index).map_err(|_| CodecError::Encode(format!("too many rows: {index}")))
}

fn col_index(index: usize) -> Result<u16, CodecError> {
    u16::try_from(index).map_err(|_| CodecError::Encode(format!("too many columns: {index}")))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{open_workbook_auto_from_rs, Data, Reader};

    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::from(s)
    }

    #[test]
    fn writes_single_named_sheet_in_header_order() {
        let headers = vec![
            "Asset Code".to_string(),
            "Cost".to_string(),
            "Notes".to_string(),
            "PAV Status".to_string(),
        ];
        let rows = vec![vec![
            ("Asset Code".to_string(), text("A1")),
            ("Cost".to_string(), CellValue::Number(1299.5)),
            ("Notes".to_string(), CellValue::Empty),
            ("PAV Status".to_string(), text("Available")),
        ]];

        let bytes = encode(&rows, &headers).unwrap();
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec![EXPORT_SHEET_NAME.to_string()]);

        let range = workbook.worksheet_range(EXPORT_SHEET_NAME).unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Asset Code".into())));
        assert_eq!(range.get_value((0, 3)), Some(&Data::String("PAV Status".into())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("A1".into())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Float(1299.5)));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Empty));
        assert_eq!(range.get_value((1, 3)), Some(&Data::String("Available".into())));
    }

    #[test]
    fn header_only_export_is_valid() {
        let headers = vec!["Asset Code".to_string()];
        let bytes = encode(&[], &headers).unwrap();
        let sheet = crate::decode(&bytes).unwrap();
        assert_eq!(sheet.headers, headers);
        assert!(sheet.rows.is_empty());
    }
}
