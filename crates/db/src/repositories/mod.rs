//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&SqlitePool` as the first argument.

pub mod kv_repo;
pub mod snapshot_repo;

pub use kv_repo::KvRepo;
pub use snapshot_repo::{SnapshotRepo, ASSETS_KEY, HEADERS_KEY};
