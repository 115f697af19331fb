//! Data elements
//!
//! An [`Element`] is one field of a record: a tag, a VR and either a byte value or
//! a list of nested records (sequence items). The byte length is authoritative;
//! values may be empty or contain NUL bytes.

use super::errors::DeidError;
use super::record::Record;
use super::result::Result;
use super::tag::Tag;
use super::vr::{Vr, VrCategory};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize, Serializer};

/// Payload of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Raw value bytes with explicit length
    Bytes(Vec<u8>),
    /// Sequence items, each owning exactly one child record
    Sequence(Vec<Record>),
}

/// A single data element
///
/// The VR and the payload always agree: `SQ` elements hold a
/// [`Value::Sequence`], every other VR holds [`Value::Bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: Tag,
    vr: Vr,
    value: Value,
}

impl Element {
    /// Creates a byte-valued element
    ///
    /// Returns [`DeidError::InvalidOperationForVr`] when `vr` is `SQ`.
    pub fn new(tag: Tag, vr: Vr, bytes: impl Into<Vec<u8>>) -> Result<Self> {
        if vr == Vr::SQ {
            return Err(DeidError::InvalidOperationForVr {
                tag,
                vr,
                operation: "assign bytes to",
            });
        }
        Ok(Self {
            tag,
            vr,
            value: Value::Bytes(bytes.into()),
        })
    }

    /// Creates a text element, the common case for names, dates and UIDs
    pub fn text(tag: Tag, vr: Vr, value: &str) -> Result<Self> {
        Self::new(tag, vr, value.as_bytes())
    }

    /// Creates a sequence element from its items
    pub fn sequence(tag: Tag, items: Vec<Record>) -> Self {
        Self {
            tag,
            vr: Vr::SQ,
            value: Value::Sequence(items),
        }
    }

    /// Tag of this element
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Value representation
    pub fn vr(&self) -> Vr {
        self.vr
    }

    /// Payload
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Byte length of the value, or the item count for sequences
    pub fn len(&self) -> usize {
        match &self.value {
            Value::Bytes(bytes) => bytes.len(),
            Value::Sequence(items) => items.len(),
        }
    }

    /// Whether [`len`](Self::len) is zero
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this element holds nested records
    pub fn is_sequence(&self) -> bool {
        matches!(self.value, Value::Sequence(_))
    }

    /// Raw bytes, `None` for sequences
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Bytes(bytes) => Some(bytes),
            Value::Sequence(_) => None,
        }
    }

    /// Text value with trailing NUL and space padding removed.
    ///
    /// `None` for sequences, binary VRs and values that are not UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        if self.vr.category() != VrCategory::Ascii {
            return None;
        }
        let bytes = self.bytes()?;
        std::str::from_utf8(bytes)
            .ok()
            .map(|s| s.trim_end_matches(&['\0', ' '][..]))
    }

    /// Sequence items, `None` for byte values
    pub fn items(&self) -> Option<&[Record]> {
        match &self.value {
            Value::Sequence(items) => Some(items),
            Value::Bytes(_) => None,
        }
    }

    /// Mutable sequence items, `None` for byte values
    pub fn items_mut(&mut self) -> Option<&mut Vec<Record>> {
        match &mut self.value {
            Value::Sequence(items) => Some(items),
            Value::Bytes(_) => None,
        }
    }

    /// Replaces the byte value, keeping tag and VR
    pub(crate) fn set_bytes(&mut self, bytes: Vec<u8>) -> Result<()> {
        match &mut self.value {
            Value::Bytes(current) => {
                *current = bytes;
                Ok(())
            }
            Value::Sequence(_) => Err(DeidError::InvalidOperationForVr {
                tag: self.tag,
                vr: self.vr,
                operation: "assign bytes to",
            }),
        }
    }

    /// Detaches the sequence items, leaving the element with none
    pub(crate) fn take_items(&mut self) -> Vec<Record> {
        match &mut self.value {
            Value::Sequence(items) => std::mem::take(items),
            Value::Bytes(_) => Vec::new(),
        }
    }

    /// Rebuilds an element from its interchange form
    pub fn from_body(tag: Tag, body: ElementBody) -> Result<Self> {
        if body.vr == Vr::SQ {
            if body.value.is_some() || body.inline_binary.is_some() {
                return Err(DeidError::Serialization(format!(
                    "Sequence {tag} cannot carry Value or InlineBinary"
                )));
            }
            return Ok(Self::sequence(tag, body.items.unwrap_or_default()));
        }

        if body.items.is_some() {
            return Err(DeidError::Serialization(format!(
                "Element {tag} with VR {} cannot carry Items",
                body.vr
            )));
        }

        let bytes = match (body.value, body.inline_binary) {
            (Some(_), Some(_)) => {
                return Err(DeidError::Serialization(format!(
                    "Element {tag} carries both Value and InlineBinary"
                )))
            }
            (Some(text), None) => text.into_bytes(),
            (None, Some(encoded)) => BASE64.decode(encoded.as_bytes()).map_err(|e| {
                DeidError::Serialization(format!("Invalid InlineBinary for {tag}: {e}"))
            })?,
            (None, None) => Vec::new(),
        };

        Self::new(tag, body.vr, bytes)
    }
}

impl Serialize for Element {
    /// Serializes the interchange form; the tag is the key of the enclosing record
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let body = match &self.value {
            Value::Sequence(items) => BodyRef {
                vr: self.vr,
                value: None,
                inline_binary: None,
                items: Some(items.as_slice()),
            },
            Value::Bytes(bytes) => {
                let text = if self.vr.category() == VrCategory::Ascii {
                    std::str::from_utf8(bytes).ok()
                } else {
                    None
                };
                BodyRef {
                    vr: self.vr,
                    value: text,
                    inline_binary: text.is_none().then(|| BASE64.encode(bytes)),
                    items: None,
                }
            }
        };
        body.serialize(serializer)
    }
}

#[derive(Serialize)]
struct BodyRef<'a> {
    vr: Vr,
    #[serde(rename = "Value", skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
    #[serde(rename = "InlineBinary", skip_serializing_if = "Option::is_none")]
    inline_binary: Option<String>,
    #[serde(rename = "Items", skip_serializing_if = "Option::is_none")]
    items: Option<&'a [Record]>,
}

/// JSON interchange form of an element
///
/// Text values travel as `Value`, binary values (or text that is not UTF-8) as
/// base64 `InlineBinary`, sequences as `Items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementBody {
    /// Value representation
    pub vr: Vr,

    /// Text value
    #[serde(rename = "Value", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Base64 encoded bytes
    #[serde(
        rename = "InlineBinary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub inline_binary: Option<String>,

    /// Nested records of a sequence
    #[serde(rename = "Items", default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Record>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_vr_rejects_bytes() {
        let result = Element::new(Tag::new(0x0008, 0x1115), Vr::SQ, b"abc".to_vec());
        assert!(matches!(
            result,
            Err(DeidError::InvalidOperationForVr { .. })
        ));
    }

    #[test]
    fn test_length_is_authoritative_with_embedded_nul() {
        let element = Element::new(Tag::new(0x0009, 0x1001), Vr::OB, vec![1, 0, 0, 2]).unwrap();
        assert_eq!(element.len(), 4);
        assert_eq!(element.bytes(), Some(&[1u8, 0, 0, 2][..]));
    }

    #[test]
    fn test_as_text_trims_padding() {
        let element = Element::new(Tag::new(0x0020, 0x000D), Vr::UI, b"1.2.3\0".to_vec()).unwrap();
        assert_eq!(element.as_text(), Some("1.2.3"));
        assert_eq!(element.len(), 6);
    }

    #[test]
    fn test_body_uses_value_for_text_and_base64_for_binary() {
        let name = Element::text(Tag::new(0x0010, 0x0010), Vr::PN, "DOE^JOHN").unwrap();
        let json = serde_json::to_value(&name).unwrap();
        assert_eq!(json, serde_json::json!({"vr": "PN", "Value": "DOE^JOHN"}));

        let blob = Element::new(Tag::new(0x0009, 0x1001), Vr::OB, vec![0xFF, 0x00]).unwrap();
        let json = serde_json::to_value(&blob).unwrap();
        assert_eq!(json, serde_json::json!({"vr": "OB", "InlineBinary": "/wA="}));

        let body: ElementBody = serde_json::from_value(json).unwrap();

        let back = Element::from_body(Tag::new(0x0009, 0x1001), body).unwrap();
        assert_eq!(back, blob);
    }

    #[test]
    fn test_body_rejects_items_on_non_sequence() {
        let body = ElementBody {
            vr: Vr::LO,
            value: None,
            inline_binary: None,
            items: Some(vec![]),
        };
        assert!(Element::from_body(Tag::new(0x0010, 0x0020), body).is_err());
    }
}
