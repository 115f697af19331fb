//! Usage tables and the resolver that consults them

use super::Usage;
use crate::domain::{DeidError, Result, Tag};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Sorted tag to usage-string table for one object class
///
/// Lookups are binary searches, so a profile pass that inspects `m` fields costs
/// `O(m log n)` against a table of `n` rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageTable {
    entries: Vec<(Tag, String)>,
}

impl UsageTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from unsorted rows; a repeated tag keeps its last value
    pub fn from_entries<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Tag, S)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (tag, usage) in rows {
            table.insert(tag, usage);
        }
        table
    }

    /// Inserts or overwrites a row, keeping the table sorted
    pub fn insert(&mut self, tag: Tag, usage: impl Into<String>) {
        let usage = usage.into();
        match self.entries.binary_search_by_key(&tag, |(t, _)| *t) {
            Ok(index) => self.entries[index].1 = usage,
            Err(index) => self.entries.insert(index, (tag, usage)),
        }
    }

    /// Raw usage string for `tag`
    pub fn get(&self, tag: Tag) -> Option<&str> {
        self.entries
            .binary_search_by_key(&tag, |(t, _)| *t)
            .ok()
            .map(|index| self.entries[index].1.as_str())
    }

    /// Listed tags in order
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.entries.iter().map(|(tag, _)| *tag)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_raw(rows: BTreeMap<String, String>) -> Result<Self> {
        let mut table = Self::new();
        for (key, usage) in rows {
            let tag: Tag = key.parse().map_err(|e| {
                DeidError::Configuration(format!("Invalid tag in usage table: {e}"))
            })?;
            table.insert(tag, usage);
        }
        Ok(table)
    }
}

/// On-disk layout of a usage table file
#[derive(Debug, Deserialize)]
struct UsageTablesFile {
    #[serde(default)]
    fallback: Option<BTreeMap<String, String>>,
    #[serde(default)]
    classes: BTreeMap<String, BTreeMap<String, String>>,
}

/// Resolves the usage of a tag for an object class
///
/// Each object class (SOP Class UID) may have its own table; classes without one
/// use the fallback table when present.
///
/// # Examples
///
/// ```
/// use veil::anonymization::usage::{Usage, UsageResolver, UsageTable};
/// use veil::domain::Tag;
///
/// let table = UsageTable::from_entries([(Tag::new(0x0010, 0x0010), "M")]);
/// let resolver = UsageResolver::new().with_fallback(table);
///
/// assert_eq!(resolver.classify("1.2.3", Tag::new(0x0010, 0x0010)), Usage::Mandatory);
/// assert_eq!(resolver.classify("1.2.3", Tag::new(0x0028, 0x0010)), Usage::Unknown);
/// ```
#[derive(Debug, Clone, Default)]
pub struct UsageResolver {
    classes: HashMap<String, UsageTable>,
    fallback: Option<UsageTable>,
}

impl UsageResolver {
    /// Resolver with no tables; every lookup is [`Usage::Unknown`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver over the built-in confidentiality profile table
    pub fn basic_profile() -> Result<Self> {
        let builtin = include_str!("../../../tables/basic_profile.toml");
        Self::from_toml(builtin)
    }

    /// Loads tables from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DeidError::Configuration(format!(
                "Failed to read usage tables {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Loads tables from TOML content
    ///
    /// ```toml
    /// [fallback]
    /// "(0010,0010)" = "M"
    ///
    /// [classes."1.2.840.10008.5.1.4.1.1.2"]
    /// "(0020,000D)" = "M"
    /// ```
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: UsageTablesFile = toml::from_str(content)?;

        let mut resolver = Self::new();
        if let Some(rows) = file.fallback {
            resolver.fallback = Some(UsageTable::from_raw(rows)?);
        }
        for (class, rows) in file.classes {
            resolver.classes.insert(class, UsageTable::from_raw(rows)?);
        }
        Ok(resolver)
    }

    /// Sets the table used for classes without their own
    pub fn with_fallback(mut self, table: UsageTable) -> Self {
        self.fallback = Some(table);
        self
    }

    /// Registers the table for one object class
    pub fn with_class(mut self, object_class: impl Into<String>, table: UsageTable) -> Self {
        self.classes.insert(object_class.into(), table);
        self
    }

    /// Table that applies to `object_class`
    pub fn table_for(&self, object_class: &str) -> Option<&UsageTable> {
        self.classes
            .get(object_class)
            .or(self.fallback.as_ref())
    }

    /// Whether a dedicated table exists for `object_class`
    pub fn has_class(&self, object_class: &str) -> bool {
        self.classes.contains_key(object_class)
    }

    /// Looks up and parses the usage of `tag`.
    ///
    /// `Ok(None)` when the tag is not listed for the class, an
    /// [`DeidError::UnknownClassification`] error when the listed entry is
    /// malformed.
    pub fn lookup(&self, object_class: &str, tag: Tag) -> Result<Option<Usage>> {
        match self.table_for(object_class).and_then(|t| t.get(tag)) {
            Some(raw) => Usage::parse(tag, raw).map(Some),
            None => Ok(None),
        }
    }

    /// Usage of `tag` for `object_class`.
    ///
    /// Unlisted tags and malformed entries both classify as [`Usage::Unknown`];
    /// malformed entries are reported through `tracing`.
    pub fn classify(&self, object_class: &str, tag: Tag) -> Usage {
        match self.lookup(object_class, tag) {
            Ok(Some(usage)) => usage,
            Ok(None) => Usage::Unknown,
            Err(e) => {
                tracing::warn!(
                    tag = %tag,
                    object_class = object_class,
                    error = %e,
                    "Malformed usage table entry"
                );
                Usage::Unknown
            }
        }
    }
}
