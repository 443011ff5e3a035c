//! `pav-app` -- the audit session and the services around it.
//!
//! [`session::AuditSession`] is the synchronous state machine a UI drives:
//! imported records, header row, view state, and audit context.
//! [`service::AuditService`] wraps it for async callers, moving decode and
//! encode onto blocking workers, persisting through `pav-db`, and debouncing
//! view recomputes.

pub mod config;
pub mod error;
pub mod recompute;
pub mod service;
pub mod session;
