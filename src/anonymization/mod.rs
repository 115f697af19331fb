//! De-identification for Veil
//!
//! This module holds the attribute-level de-identification engine and its
//! collaborators.
//!
//! # Architecture
//!
//! - **Usage**: per object class usage tables (`M`, `U`, `C - ...`)
//! - **Pseudonyms**: session-consistent one-way dummies for identifiers
//! - **Store**: optional archive of originals for re-identification
//! - **Events**: field protection notifications for observers such as the audit trail
//! - **Engine**: primitives, sweeps and the confidentiality profile
//!
//! # Usage
//!
//! ```rust,ignore
//! use veil::anonymization::{Anonymizer, InMemoryStore};
//!
//! let mut anonymizer = Anonymizer::with_defaults()?;
//! anonymizer.attach_store(Box::new(InMemoryStore::new()));
//! for record in records {
//!     anonymizer.set_target(record);
//!     anonymizer.run_confidentiality_profile(true)?;
//!     write(anonymizer.take_target().unwrap());
//! }
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod events;
pub mod pseudonym;
pub mod report;
pub mod store;
pub mod usage;

// Re-export main types
pub use config::{AuditConfig, OptionalPolicy, ProfileConfig};
pub use engine::{Anonymizer, ConditionEvaluator};
pub use events::{Action, AnonymizeEvent, ObserverId};
pub use pseudonym::PseudonymGenerator;
pub use report::{ProfileMode, ProfileReport};
pub use store::{InMemoryStore, ReversibleStore, StoreKey};
pub use usage::{Usage, UsageResolver, UsageTable};
