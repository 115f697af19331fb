//! Audit trail module
//!
//! Appends one line per field protection event. Values never reach the trail.

pub mod logger;

pub use logger::AuditLogger;
