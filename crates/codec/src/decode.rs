//! Spreadsheet decoding into header-keyed rows.

use std::io::{Cursor, Read, Seek};

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use csv::ReaderBuilder;

use pav_core::sheet::{CellValue, DecodedSheet, RawRow};

use crate::error::CodecError;

/// Decode the first sheet of a workbook (xlsx, xls, xlsb, ods).
///
/// Bytes that are not a workbook but are valid UTF-8 are read as CSV. The
/// first row is the header row; every following row with at least one
/// non-empty cell becomes a [`RawRow`].
pub fn decode(bytes: &[u8]) -> Result<DecodedSheet, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::Decode("file is empty".into()));
    }

    match open_workbook_auto_from_rs(Cursor::new(bytes)) {
        Ok(mut workbook) => decode_workbook(&mut workbook),
        Err(err) => match std::str::from_utf8(bytes) {
            Ok(text) => decode_csv(text),
            Err(_) => Err(err.into()),
        },
    }
}

fn decode_workbook<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<DecodedSheet, CodecError> {
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(CodecError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|cells| cells.iter().map(|c| cell_value(c).to_text()).collect())
        .unwrap_or_default();
    let rows = collect_rows(&headers, rows.map(|cells| cells.iter().map(cell_value)));

    tracing::debug!(
        sheet = %sheet_name,
        rows = rows.len(),
        headers = headers.len(),
        "Decoded workbook sheet",
    );
    Ok(DecodedSheet { rows, headers })
}

fn decode_csv(text: &str) -> Result<DecodedSheet, CodecError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(first) => first?.iter().map(String::from).collect(),
        None => Vec::new(),
    };

    let mut lines = Vec::new();
    for record in records {
        let record = record?;
        lines.push(record.iter().map(CellValue::from).collect::<Vec<_>>());
    }
    let rows = collect_rows(&headers, lines.into_iter().map(Vec::into_iter));

    tracing::debug!(rows = rows.len(), headers = headers.len(), "Decoded CSV");
    Ok(DecodedSheet { rows, headers })
}

/// Key each line by header position, dropping blank cells and blank lines.
/// Cells beyond the header row are ignored; for duplicate header texts the
/// leftmost non-empty cell wins.
fn collect_rows<L, C>(headers: &[String], lines: L) -> Vec<RawRow>
where
    L: Iterator<Item = C>,
    C: Iterator<Item = CellValue>,
{
    lines
        .filter_map(|cells| {
            let mut row = RawRow::new();
            for (header, cell) in headers.iter().zip(cells) {
                if cell.is_blank() {
                    continue;
                }
                row.entry(header.clone()).or_insert(cell);
            }
            (!row.is_empty()).then_some(row)
        })
        .collect()
}

/// Dates keep their serial number; errors keep their display text.
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::Error(e) => CellValue::Text(e.to_string()),
        other => CellValue::Text(other.to_string()),
    }
}
