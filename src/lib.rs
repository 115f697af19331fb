// Veil - Attribute-level de-identification for DICOM-style records
// Copyright (c) 2025 Veil Contributors
// Licensed under the MIT License

//! # Veil - de-identification of DICOM-style records
//!
//! Veil removes or masks identifying attributes in tree-shaped clinical data
//! sets before they leave a trusted boundary.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Classifying** every field against a usage table keyed by object class
//! - **Protecting** fields by emptying, removing or replacing them with
//!   deterministic pseudonyms
//! - **Archiving** originals in an optional reversible store and restoring them
//! - **Publishing** every mutation to observers such as the audit trail
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`anonymization`] - The anonymizer, usage tables, pseudonyms, stores and events
//! - [`dictionary`] - Attribute dictionary queries
//! - [`domain`] - Tags, VRs, elements, records and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust
//! use veil::anonymization::Anonymizer;
//! use veil::domain::{Element, Record, Tag, Vr};
//!
//! # fn main() -> veil::domain::Result<()> {
//! let record = Record::new()
//!     .with(Element::text(Tag::new(0x0010, 0x0010), Vr::PN, "DOE^JOHN")?)
//!     .with(Element::text(Tag::new(0x0020, 0x000D), Vr::UI, "1.2.3.4")?);
//!
//! let mut anonymizer = Anonymizer::with_defaults()?;
//! anonymizer.set_target(record);
//! let report = anonymizer.run_confidentiality_profile(true)?;
//! assert_eq!(report.records_visited, 1);
//!
//! let record = anonymizer.take_target().expect("record is bound");
//! let uid = record.get(Tag::new(0x0020, 0x000D)).and_then(|e| e.as_text());
//! assert!(uid.is_some_and(|uid| uid.starts_with("2.25.")));
//! # Ok(())
//! # }
//! ```
//!
//! ## Reversibility
//!
//! Pseudonyms cannot be undone. A reversible store attached before the pass
//! keeps every original, and a later re-identification pass through the same
//! store puts them back:
//!
//! ```rust
//! use veil::anonymization::{Anonymizer, InMemoryStore};
//! use veil::domain::{Element, Record, Tag, Vr};
//!
//! # fn main() -> veil::domain::Result<()> {
//! let name = Tag::new(0x0010, 0x0010);
//! let mut anonymizer = Anonymizer::with_defaults()?;
//! anonymizer.attach_store(Box::new(InMemoryStore::new()));
//! anonymizer.set_target(Record::new().with(Element::text(name, Vr::PN, "DOE^JOHN")?));
//!
//! anonymizer.run_confidentiality_profile(true)?;
//! anonymizer.run_confidentiality_profile(false)?;
//!
//! let restored = anonymizer.target().and_then(|r| r.get(name)).and_then(|e| e.as_text());
//! assert_eq!(restored, Some("DOE^JOHN"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread safety
//!
//! None of the types here are meant to be shared across threads. An
//! [`Anonymizer`](anonymization::Anonymizer) owns the record it works on and
//! every mutating call takes `&mut self`.
//!
//! ## Error Handling
//!
//! Library calls return [`domain::Result`], carrying a [`domain::DeidError`].
//! The command layer wraps these with `anyhow` context.

pub mod anonymization;
pub mod cli;
pub mod config;
pub mod dictionary;
pub mod domain;
pub mod logging;
