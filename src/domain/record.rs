//! Records (data sets)
//!
//! A [`Record`] is one level of a nested data set: an ordered map from [`Tag`] to
//! [`Element`]. Sequence elements own their items and every item owns one child
//! record, so a whole data set is a plain ownership tree.
//!
//! Nesting depth comes from the source data and is not bounded here. Traversal
//! ([`Record::walk`], [`Record::walk_mut`]) and drop use explicit work stacks so a
//! deeply nested input cannot exhaust the native call stack. Equality, cloning and
//! JSON serialization still recurse.

use super::element::{Element, ElementBody};
use super::errors::DeidError;
use super::path::TreePath;
use super::result::Result;
use super::tag::Tag;
use super::vr::{Vr, VrCategory};
use crate::dictionary::Dictionary;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Ordered tag to element mapping, unique tags within one level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    elements: BTreeMap<Tag, Element>,
}

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements at this level
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether this level holds no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Looks up an element at this level
    pub fn get(&self, tag: Tag) -> Option<&Element> {
        self.elements.get(&tag)
    }

    /// Looks up an element at this level for mutation
    pub fn get_mut(&mut self, tag: Tag) -> Option<&mut Element> {
        self.elements.get_mut(&tag)
    }

    /// Whether `tag` is present at this level
    pub fn contains(&self, tag: Tag) -> bool {
        self.elements.contains_key(&tag)
    }

    /// Inserts an element, returning the one it replaced
    pub fn insert(&mut self, element: Element) -> Option<Element> {
        self.elements.insert(element.tag(), element)
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, element: Element) -> Self {
        self.insert(element);
        self
    }

    /// Detaches an element from this level
    pub fn take(&mut self, tag: Tag) -> Option<Element> {
        self.elements.remove(&tag)
    }

    /// Elements in tag order
    pub fn iter(&self) -> btree_map::Values<'_, Tag, Element> {
        self.elements.values()
    }

    /// Tags in order
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.elements.keys().copied()
    }

    /// Makes `tag` zero-length, creating it with the dictionary VR when absent.
    ///
    /// Sequences cannot be emptied and yield
    /// [`DeidError::InvalidOperationForVr`]; an absent tag unknown to the
    /// dictionary yields [`DeidError::UnknownAttribute`].
    pub fn empty(&mut self, tag: Tag, dictionary: &dyn Dictionary) -> Result<()> {
        if let Some(element) = self.elements.get_mut(&tag) {
            if element.is_sequence() {
                return Err(DeidError::InvalidOperationForVr {
                    tag,
                    vr: element.vr(),
                    operation: "empty",
                });
            }
            return element.set_bytes(Vec::new());
        }

        let vr = default_vr(tag, dictionary)?;
        if vr == Vr::SQ {
            return Err(DeidError::InvalidOperationForVr {
                tag,
                vr,
                operation: "empty",
            });
        }
        self.insert(Element::new(tag, vr, Vec::new())?);
        Ok(())
    }

    /// Removes `tag` from this level only (no descent into sequences).
    ///
    /// Returns whether an element was removed. Sequences may always be removed.
    pub fn remove(&mut self, tag: Tag) -> bool {
        self.elements.remove(&tag).is_some()
    }

    /// Sets a text value, creating the element when absent.
    ///
    /// The stored length is the length of `value` up to, not including, the first
    /// NUL character. The element's VR (existing, or the dictionary default) must
    /// be text-like.
    pub fn replace(&mut self, tag: Tag, value: &str, dictionary: &dyn Dictionary) -> Result<()> {
        let value = value.split('\0').next().unwrap_or_default();
        let vr = match self.elements.get(&tag) {
            Some(element) => element.vr(),
            None => default_vr(tag, dictionary)?,
        };
        if vr.category() != VrCategory::Ascii {
            return Err(DeidError::InvalidOperationForVr {
                tag,
                vr,
                operation: "replace text in",
            });
        }
        self.store_bytes(tag, vr, value.as_bytes().to_vec())
    }

    /// Sets exactly `length` bytes of `value`, embedded NULs included.
    ///
    /// Works for any non-sequence VR. `length` larger than `value` is rejected with
    /// [`DeidError::InvalidLength`].
    pub fn replace_bytes(
        &mut self,
        tag: Tag,
        value: &[u8],
        length: usize,
        dictionary: &dyn Dictionary,
    ) -> Result<()> {
        if length > value.len() {
            return Err(DeidError::InvalidLength {
                tag,
                requested: length,
                available: value.len(),
            });
        }
        let vr = match self.elements.get(&tag) {
            Some(element) => element.vr(),
            None => default_vr(tag, dictionary)?,
        };
        if vr == Vr::SQ {
            return Err(DeidError::InvalidOperationForVr {
                tag,
                vr,
                operation: "replace bytes in",
            });
        }
        self.store_bytes(tag, vr, value[..length].to_vec())
    }

    fn store_bytes(&mut self, tag: Tag, vr: Vr, bytes: Vec<u8>) -> Result<()> {
        match self.elements.get_mut(&tag) {
            Some(element) => element.set_bytes(bytes),
            None => {
                self.insert(Element::new(tag, vr, bytes)?);
                Ok(())
            }
        }
    }

    /// Visits this record and every nested record depth-first, parents before
    /// children, items in order.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&TreePath, &Record),
    {
        let mut stack: Vec<(TreePath, &Record)> = vec![(TreePath::root(), self)];
        while let Some((path, record)) = stack.pop() {
            visit(&path, record);
            for element in record.elements.values().rev() {
                if let Some(items) = element.items() {
                    for (index, item) in items.iter().enumerate().rev() {
                        stack.push((path.child(element.tag(), index), item));
                    }
                }
            }
        }
    }

    /// Mutable depth-first traversal.
    ///
    /// `visit` runs on a record before its children are scheduled, so elements it
    /// removes are not descended into. The first error stops the walk; records
    /// already visited stay mutated.
    pub fn walk_mut<F, E>(&mut self, mut visit: F) -> std::result::Result<(), E>
    where
        F: FnMut(&TreePath, &mut Record) -> std::result::Result<(), E>,
    {
        let mut stack: Vec<(TreePath, &mut Record)> = vec![(TreePath::root(), self)];
        while let Some((path, record)) = stack.pop() {
            visit(&path, record)?;
            for element in record.elements.values_mut().rev() {
                let tag = element.tag();
                if let Some(items) = element.items_mut() {
                    for (index, item) in items.iter_mut().enumerate().rev() {
                        stack.push((path.child(tag, index), item));
                    }
                }
            }
        }
        Ok(())
    }

    /// Total number of elements in the whole tree
    pub fn total_elements(&self) -> usize {
        let mut total = 0;
        self.walk(|_, record| total += record.len());
        total
    }
}

fn default_vr(tag: Tag, dictionary: &dyn Dictionary) -> Result<Vr> {
    dictionary
        .default_vr_for(tag)
        .ok_or(DeidError::UnknownAttribute(tag))
}

impl Drop for Record {
    fn drop(&mut self) {
        let mut pending: Vec<Record> = Vec::new();
        for element in self.elements.values_mut() {
            pending.extend(element.take_items());
        }
        while let Some(mut record) = pending.pop() {
            for element in record.elements.values_mut() {
                pending.extend(element.take_items());
            }
        }
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a Element;
    type IntoIter = btree_map::Values<'a, Tag, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.values()
    }
}

impl FromIterator<Element> for Record {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        let mut record = Record::new();
        for element in iter {
            record.insert(element);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.elements.len()))?;
        for (tag, element) in &self.elements {
            map.serialize_entry(tag, element)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bodies = BTreeMap::<Tag, ElementBody>::deserialize(deserializer)?;
        let mut record = Record::new();
        for (tag, body) in bodies {
            let element = Element::from_body(tag, body).map_err(serde::de::Error::custom)?;
            record.insert(element);
        }
        Ok(record)
    }
}
