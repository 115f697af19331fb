//! Usage classification
//!
//! Decides, per object class and tag, how strongly an attribute is required:
//! [`Usage::Mandatory`], [`Usage::Conditional`] or [`Usage::Optional`]. The
//! classification is what the confidentiality profile uses to choose between
//! emptying, pseudonymising and removing a field.
//!
//! Tables store the raw usage strings found in the standard's module tables
//! (`"M"`, `"U"`, `"C - <condition>"`). Parsing happens at lookup time so a single
//! malformed row is reported against the field that hits it instead of failing
//! the whole table load.

pub mod resolver;

pub use resolver::{UsageResolver, UsageTable};

use crate::domain::{DeidError, Result, Tag};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How strongly an attribute is required for an object class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Usage {
    /// `M`: always present
    Mandatory,
    /// `C - ...`: present when the described condition holds
    Conditional(String),
    /// `U`: user option
    Optional,
    /// Not listed, or the table entry could not be understood
    Unknown,
}

impl Usage {
    /// Parses a usage table entry.
    ///
    /// Returns [`DeidError::UnknownClassification`] for anything that is not
    /// `M`, `U` or contains a `C - ` condition marker.
    ///
    /// # Examples
    ///
    /// ```
    /// use veil::anonymization::usage::Usage;
    /// use veil::domain::Tag;
    ///
    /// let tag = Tag::new(0x0020, 0x0052);
    /// assert_eq!(Usage::parse(tag, "M").unwrap(), Usage::Mandatory);
    /// assert_eq!(
    ///     Usage::parse(tag, "C - Required if spatially related").unwrap(),
    ///     Usage::Conditional("Required if spatially related".to_string())
    /// );
    /// assert!(Usage::parse(tag, "1C").is_err());
    /// ```
    pub fn parse(tag: Tag, value: &str) -> Result<Self> {
        const CONDITION_MARKER: &str = "C - ";

        let trimmed = value.trim();
        match trimmed {
            "M" => Ok(Usage::Mandatory),
            "U" => Ok(Usage::Optional),
            _ => match trimmed.find(CONDITION_MARKER) {
                Some(index) => Ok(Usage::Conditional(
                    trimmed[index + CONDITION_MARKER.len()..].trim().to_string(),
                )),
                None => Err(DeidError::UnknownClassification {
                    tag,
                    value: value.to_string(),
                }),
            },
        }
    }

    /// Whether the field must not be left holding identifying data
    pub fn requires_protection(&self) -> bool {
        matches!(self, Usage::Mandatory | Usage::Conditional(_))
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Usage::Mandatory => write!(f, "M"),
            Usage::Conditional(condition) => write!(f, "C - {condition}"),
            Usage::Optional => write!(f, "U"),
            Usage::Unknown => write!(f, "?"),
        }
    }
}
