//! Domain error types
//!
//! This module defines the error hierarchy for Veil. Every failure the engine can
//! hit is returned to the caller as a value; nothing in the library aborts the
//! process.

use super::tag::Tag;
use super::vr::Vr;
use thiserror::Error;

/// Main Veil error type
///
/// Returned by record primitives, the usage resolver, reversible stores and the
/// anonymizer. A failing call may leave the bound record partially mutated; no
/// rollback is attempted.
#[derive(Debug, Error)]
pub enum DeidError {
    /// Tag is absent from the dictionary, so no default VR can be inferred
    #[error("Unknown attribute {0}: no dictionary entry to infer a VR from")]
    UnknownAttribute(Tag),

    /// Operation is undefined for the element's value representation
    #[error("Cannot {operation} {tag}: not supported for VR {vr}")]
    InvalidOperationForVr {
        tag: Tag,
        vr: Vr,
        operation: &'static str,
    },

    /// Usage table entry is not `M`, `U` or a `C - ` condition
    #[error("Unrecognized usage classification '{value}' for {tag}")]
    UnknownClassification { tag: Tag, value: String },

    /// A reversible store operation was requested but none is attached
    #[error("Reversible store unavailable: no store attached")]
    StoreUnavailable,

    /// Explicit length exceeds the supplied buffer
    #[error("Invalid length for {tag}: requested {requested} bytes, buffer holds {available}")]
    InvalidLength {
        tag: Tag,
        requested: usize,
        available: usize,
    },

    /// No record is bound to the anonymizer
    #[error("No target record bound")]
    NoTarget,

    /// Reversible store backend failure
    #[error("Reversible store error: {0}")]
    Store(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl DeidError {
    /// Whether a profile pass may record this error as a per-field warning and
    /// carry on with the next field
    pub fn is_field_local(&self) -> bool {
        matches!(
            self,
            DeidError::UnknownAttribute(_)
                | DeidError::InvalidOperationForVr { .. }
                | DeidError::UnknownClassification { .. }
                | DeidError::InvalidLength { .. }
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for DeidError {
    fn from(err: std::io::Error) -> Self {
        DeidError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for DeidError {
    fn from(err: serde_json::Error) -> Self {
        DeidError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for DeidError {
    fn from(err: toml::de::Error) -> Self {
        DeidError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_attribute_display() {
        let err = DeidError::UnknownAttribute(Tag::new(0x7777, 0x7777));
        assert_eq!(
            err.to_string(),
            "Unknown attribute (7777,7777): no dictionary entry to infer a VR from"
        );
    }

    #[test]
    fn test_invalid_operation_display() {
        let err = DeidError::InvalidOperationForVr {
            tag: Tag::new(0x0008, 0x1115),
            vr: Vr::SQ,
            operation: "empty",
        };
        assert_eq!(
            err.to_string(),
            "Cannot empty (0008,1115): not supported for VR SQ"
        );
    }

    #[test]
    fn test_field_local_errors() {
        assert!(DeidError::UnknownAttribute(Tag::new(1, 1)).is_field_local());
        assert!(!DeidError::StoreUnavailable.is_field_local());
        assert!(!DeidError::Store("disk full".to_string()).is_field_local());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: DeidError = io_err.into();
        assert!(matches!(err, DeidError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: DeidError = json_err.into();
        assert!(matches!(err, DeidError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: DeidError = toml_err.into();
        assert!(matches!(err, DeidError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_deid_error_implements_std_error() {
        let err = DeidError::StoreUnavailable;
        let _: &dyn std::error::Error = &err;
    }
}
