//! Attribute tag
//!
//! A [`Tag`] identifies one field of a record by `(group, element)`. Ordering is
//! lexicographic on the pair, which is also the on-disk order of a data set.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// `(group, element)` key of a data element
///
/// # Examples
///
/// ```
/// use veil::domain::Tag;
///
/// let patient_name: Tag = "(0010,0010)".parse().unwrap();
/// assert_eq!(patient_name, Tag::new(0x0010, 0x0010));
/// assert_eq!(patient_name.to_string(), "(0010,0010)");
/// assert!(Tag::new(0x0009, 0x0010).is_private());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    group: u16,
    element: u16,
}

impl Tag {
    /// SOP Class UID, used to pick the usage table for a record
    pub const SOP_CLASS_UID: Tag = Tag::new(0x0008, 0x0016);

    /// SOP Instance UID, identifies one record
    pub const SOP_INSTANCE_UID: Tag = Tag::new(0x0008, 0x0018);

    /// Creates a tag from its group and element numbers
    pub const fn new(group: u16, element: u16) -> Self {
        Self { group, element }
    }

    /// Group number
    pub const fn group(&self) -> u16 {
        self.group
    }

    /// Element number
    pub const fn element(&self) -> u16 {
        self.element
    }

    /// Private attributes live in odd groups
    pub const fn is_private(&self) -> bool {
        self.group % 2 == 1
    }

    /// Group length attributes have element number 0
    pub const fn is_group_length(&self) -> bool {
        self.element == 0
    }

    /// Private creator slots `(gggg,0010)` to `(gggg,00FF)` in an odd group
    pub const fn is_private_creator(&self) -> bool {
        self.is_private() && self.element >= 0x0010 && self.element <= 0x00FF
    }

    /// Compact `GGGGEEEE` form used as a JSON key
    pub fn to_hex(&self) -> String {
        format!("{:04X}{:04X}", self.group, self.element)
    }
}

impl From<(u16, u16)> for Tag {
    fn from((group, element): (u16, u16)) -> Self {
        Self::new(group, element)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group, self.element)
    }
}

impl FromStr for Tag {
    type Err = String;

    /// Accepts `(GGGG,EEEE)`, `GGGG,EEEE` and `GGGGEEEE`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(trimmed);

        let (group, element) = match inner.split_once(',') {
            Some((g, e)) => (g.trim(), e.trim()),
            None if inner.len() == 8 => inner.split_at(4),
            None => return Err(format!("Invalid tag '{s}': expected (GGGG,EEEE) or GGGGEEEE")),
        };

        if group.len() != 4 || element.len() != 4 {
            return Err(format!("Invalid tag '{s}': group and element need 4 hex digits"));
        }

        let group = u16::from_str_radix(group, 16)
            .map_err(|e| format!("Invalid tag group in '{s}': {e}"))?;
        let element = u16::from_str_radix(element, 16)
            .map_err(|e| format!("Invalid tag element in '{s}': {e}"))?;

        Ok(Self::new(group, element))
    }
}

impl Serialize for Tag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("(0010,0010)", 0x0010, 0x0010 ; "parenthesised")]
    #[test_case("0020,000D", 0x0020, 0x000D ; "comma separated")]
    #[test_case("0020000d", 0x0020, 0x000D ; "compact lowercase")]
    #[test_case(" (7FE0,0010) ", 0x7FE0, 0x0010 ; "surrounding whitespace")]
    fn test_parse(input: &str, group: u16, element: u16) {
        assert_eq!(input.parse::<Tag>().unwrap(), Tag::new(group, element));
    }

    #[test_case("0010" ; "too short")]
    #[test_case("(0010,ZZZZ)" ; "not hex")]
    #[test_case("(10,10)" ; "short fields")]
    fn test_parse_invalid(input: &str) {
        assert!(input.parse::<Tag>().is_err());
    }

    #[test]
    fn test_ordering_is_group_then_element() {
        let mut tags = vec![
            Tag::new(0x0010, 0x0020),
            Tag::new(0x0008, 0xFFFF),
            Tag::new(0x0010, 0x0010),
        ];
        tags.sort();
        assert_eq!(
            tags,
            vec![
                Tag::new(0x0008, 0xFFFF),
                Tag::new(0x0010, 0x0010),
                Tag::new(0x0010, 0x0020),
            ]
        );
    }

    #[test]
    fn test_classification_helpers() {
        assert!(Tag::new(0x0009, 0x0010).is_private());
        assert!(Tag::new(0x0009, 0x0010).is_private_creator());
        assert!(!Tag::new(0x0009, 0x1001).is_private_creator());
        assert!(!Tag::new(0x0010, 0x0010).is_private());
        assert!(Tag::new(0x0008, 0x0000).is_group_length());
    }

    #[test]
    fn test_serde_uses_compact_hex() {
        let json = serde_json::to_string(&Tag::new(0x0020, 0x000D)).unwrap();
        assert_eq!(json, "\"0020000D\"");
        let back: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Tag::new(0x0020, 0x000D));
    }
}
