//! `pav-codec` -- spreadsheet bytes in, spreadsheet bytes out.
//!
//! Decoding reads the first sheet of any workbook calamine recognises and
//! falls back to CSV for plain text. Encoding always writes a single xlsx
//! sheet. Both directions are synchronous; callers in async code run them on
//! a blocking worker.

pub mod decode;
pub mod encode;
pub mod error;

pub use decode::decode;
pub use encode::{encode, EXPORT_SHEET_NAME};
pub use error::CodecError;
