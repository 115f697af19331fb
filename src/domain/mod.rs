//! Domain models and types for Veil.
//!
//! The domain layer holds the in-memory data set the engine mutates:
//! - **Tags and VRs** ([`Tag`], [`Vr`], [`VrCategory`])
//! - **The record tree** ([`Record`], [`Element`], [`Value`]) and paths into it
//!   ([`TreePath`])
//! - **Error types** ([`DeidError`]) and the [`Result`] alias
//!
//! # Ownership
//!
//! A record exclusively owns its elements, a sequence element owns its items and
//! each item is a child [`Record`]. There is no shared or cyclic ownership:
//!
//! ```rust
//! use veil::domain::{Element, Record, Tag, Vr};
//!
//! # fn example() -> veil::domain::Result<()> {
//! let item = Record::new()
//!     .with(Element::text(Tag::new(0x0008, 0x1155), Vr::UI, "1.2.3.4")?);
//! let record = Record::new()
//!     .with(Element::text(Tag::new(0x0010, 0x0010), Vr::PN, "DOE^JOHN")?)
//!     .with(Element::sequence(Tag::new(0x0008, 0x1115), vec![item]));
//! assert_eq!(record.total_elements(), 3);
//! # Ok(())
//! # }
//! ```

pub mod element;
pub mod errors;
pub mod path;
pub mod record;
pub mod result;
pub mod tag;
pub mod vr;

// Re-export commonly used types for convenience
pub use element::{Element, ElementBody, Value};
pub use errors::DeidError;
pub use path::{PathStep, TreePath};
pub use record::Record;
pub use result::Result;
pub use tag::Tag;
pub use vr::{Vr, VrCategory};
