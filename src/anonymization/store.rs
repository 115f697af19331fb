//! Reversible store interface
//!
//! A reversible store keeps the pre-protection original of every field the
//! profile mutates, keyed by record identity, tree path and tag, so a separate recovery workflow
//! holding the store (and whatever key protects it) can undo the pass. The
//! pseudonyms themselves never allow this.
//!
//! The anonymizer only writes. Encryption and key management belong to the store
//! implementation.

use crate::domain::{Result, Tag, TreePath};
use secrecy::{ExposeSecret, SecretVec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Location of one element anywhere in one record's tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreKey {
    /// Identity of the record the element belongs to
    pub record: String,
    pub tag: Tag,
    pub path: TreePath,
}

impl StoreKey {
    pub fn new(record: impl Into<String>, tag: Tag, path: TreePath) -> Self {
        Self {
            record: record.into(),
            tag,
            path,
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}:{}", self.record, self.tag)
        } else {
            write!(f, "{}:{}/{}", self.record, self.path, self.tag)
        }
    }
}

/// Storage for original values
///
/// Implementations decide how plaintexts are protected at rest.
pub trait ReversibleStore {
    /// Stores `plaintext` under `key`, replacing any previous entry
    fn put(&mut self, key: &StoreKey, plaintext: &[u8]) -> Result<()>;

    /// Reads the plaintext stored under `key`
    fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>>;

    /// Whether `key` holds an entry
    fn contains(&self, key: &StoreKey) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// In-process store holding plaintexts in zeroizing buffers
///
/// No encryption; the buffers are wiped when entries are dropped. Suitable for
/// round trips within one process and for tests.
#[derive(Default)]
pub struct InMemoryStore {
    entries: HashMap<StoreKey, SecretVec<u8>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored keys, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &StoreKey> {
        self.entries.keys()
    }

    /// Number of entries filed under `record`
    pub fn count_for(&self, record: &str) -> usize {
        self.entries.keys().filter(|key| key.record == record).count()
    }
}

impl fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ReversibleStore for InMemoryStore {
    fn put(&mut self, key: &StoreKey, plaintext: &[u8]) -> Result<()> {
        self.entries
            .insert(key.clone(), SecretVec::new(plaintext.to_vec()));
        Ok(())
    }

    fn get(&self, key: &StoreKey) -> Result<Option<Vec<u8>>> {
        Ok(self
            .entries
            .get(key)
            .map(|secret| secret.expose_secret().clone()))
    }

    fn contains(&self, key: &StoreKey) -> Result<bool> {
        Ok(self.entries.contains_key(key))
    }
}
