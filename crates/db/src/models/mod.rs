//! Row structs and stored documents.

pub mod kv_entry;
pub mod snapshot;
