//! `pav-core` -- domain logic for physical asset verification.
//!
//! Everything in this crate is pure and in-memory: no file access, no
//! database, no async. Spreadsheet decoding/encoding lives in `pav-codec`,
//! persistence in `pav-db`, and session orchestration in `pav-app`.

pub mod alias;
pub mod dashboard;
pub mod edit;
pub mod error;
pub mod export;
pub mod naming;
pub mod normalize;
pub mod record;
pub mod sheet;
pub mod view;
