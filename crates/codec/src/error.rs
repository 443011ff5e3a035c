#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The input is not a readable spreadsheet.
    #[error("Could not read spreadsheet: {0}")]
    Decode(String),

    #[error("Could not write spreadsheet: {0}")]
    Encode(String),

    #[error("Workbook contains no sheets")]
    EmptyWorkbook,
}

impl From<calamine::Error> for CodecError {
    fn from(err: calamine::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<csv::Error> for CodecError {
    fn from(err: csv::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for CodecError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Encode(err.to_string())
    }
}
