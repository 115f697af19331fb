//! Attribute dictionary
//!
//! The engine only needs three answers from a data dictionary: the default VR of
//! a tag it is about to create, whether a tag is retired, and a keyword for
//! logging. [`Dictionary`] is that query interface; [`StaticDictionary`] answers it
//! from a compact built-in table plus the structural rules for group length and
//! private creator attributes.

mod entries;

use crate::domain::{Tag, Vr};

/// Query interface over a data dictionary
pub trait Dictionary {
    /// Default VR for `tag`, `None` when the dictionary has no entry
    fn default_vr_for(&self, tag: Tag) -> Option<Vr>;

    /// Whether `tag` is retired from the current standard
    fn is_retired(&self, tag: Tag) -> bool;

    /// Attribute keyword, if known
    fn keyword(&self, tag: Tag) -> Option<&'static str>;
}

/// One row of the built-in table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictEntry {
    /// Attribute tag
    pub tag: Tag,
    /// Default value representation
    pub vr: Vr,
    /// Keyword, e.g. `PatientName`
    pub keyword: &'static str,
    /// Retired from the standard
    pub retired: bool,
}

/// Dictionary backed by the sorted built-in table
///
/// # Examples
///
/// ```
/// use veil::dictionary::{Dictionary, StaticDictionary};
/// use veil::domain::{Tag, Vr};
///
/// let dict = StaticDictionary::new();
/// assert_eq!(dict.default_vr_for(Tag::new(0x0010, 0x0010)), Some(Vr::PN));
/// assert_eq!(dict.default_vr_for(Tag::new(0x0011, 0x0010)), Some(Vr::LO));
/// assert!(dict.is_retired(Tag::new(0x0008, 0x0010)));
/// assert_eq!(dict.default_vr_for(Tag::new(0x7777, 0x7777)), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StaticDictionary {
    entries: &'static [DictEntry],
}

impl StaticDictionary {
    /// Dictionary over the built-in table
    pub fn new() -> Self {
        Self {
            entries: entries::ENTRIES,
        }
    }

    /// Looks up a table row by binary search
    pub fn entry(&self, tag: Tag) -> Option<&'static DictEntry> {
        let entries: &'static [DictEntry] = self.entries;
        entries
            .binary_search_by_key(&tag, |e| e.tag)
            .ok()
            .map(|index| &entries[index])
    }

    /// Number of rows in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for StaticDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary for StaticDictionary {
    fn default_vr_for(&self, tag: Tag) -> Option<Vr> {
        if tag.is_group_length() {
            return Some(Vr::UL);
        }
        if tag.is_private_creator() {
            return Some(Vr::LO);
        }
        self.entry(tag).map(|e| e.vr)
    }

    fn is_retired(&self, tag: Tag) -> bool {
        // Group lengths were retired everywhere except the file meta group
        if tag.is_group_length() {
            return tag.group() != 0x0002;
        }
        self.entry(tag).map(|e| e.retired).unwrap_or(false)
    }

    fn keyword(&self, tag: Tag) -> Option<&'static str> {
        if tag.is_group_length() {
            return Some("GroupLength");
        }
        if tag.is_private_creator() {
            return Some("PrivateCreator");
        }
        self.entry(tag).map(|e| e.keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_unique() {
        let entries = entries::ENTRIES;
        for pair in entries.windows(2) {
            assert!(
                pair[0].tag < pair[1].tag,
                "{} must sort before {}",
                pair[0].tag,
                pair[1].tag
            );
        }
    }

    #[test]
    fn test_lookup() {
        let dict = StaticDictionary::new();
        assert_eq!(dict.default_vr_for(Tag::new(0x0020, 0x000D)), Some(Vr::UI));
        assert_eq!(dict.keyword(Tag::new(0x0010, 0x0020)), Some("PatientID"));
        assert_eq!(dict.default_vr_for(Tag::new(0x0008, 0x1115)), Some(Vr::SQ));
    }

    #[test]
    fn test_structural_rules() {
        let dict = StaticDictionary::new();
        assert_eq!(dict.default_vr_for(Tag::new(0x0010, 0x0000)), Some(Vr::UL));
        assert!(dict.is_retired(Tag::new(0x0010, 0x0000)));
        assert!(!dict.is_retired(Tag::new(0x0002, 0x0000)));
        assert_eq!(dict.keyword(Tag::new(0x0009, 0x0010)), Some("PrivateCreator"));
        // Private data elements are not in any public dictionary
        assert_eq!(dict.default_vr_for(Tag::new(0x0009, 0x1001)), None);
    }

    #[test]
    fn test_retired_flags() {
        let dict = StaticDictionary::new();
        assert!(dict.is_retired(Tag::new(0x0020, 0x0030)));
        assert!(!dict.is_retired(Tag::new(0x0020, 0x0032)));
        assert!(!dict.is_retired(Tag::new(0x0010, 0x0010)));
    }
}
