//! The de-identification engine
//!
//! This module provides the [`Anonymizer`], which owns a bound [`Record`] and
//! applies field protection to it: single-field primitives, whole-tree sweeps and
//! the Basic Application Level Confidentiality Profile.
//!
//! # Architecture
//!
//! The anonymizer coordinates:
//! - **Dictionary**: default VRs for created fields and the retired-tag list
//! - **UsageResolver**: per object class usage of every tag
//! - **PseudonymGenerator**: session-consistent dummies for identifiers
//! - **ReversibleStore** (optional): originals of every field the profile mutates
//! - **Observers**: notified after each successful mutation
//!
//! # Concurrency
//!
//! Not thread safe. Every operation takes `&mut self` and there is no internal
//! locking. Pseudonym consistency across a file set depends on feeding every
//! record through the same instance, one at a time. Dropping the anonymizer loses
//! the pseudonym cache and the attached store.
//!
//! # Failure model
//!
//! A pass that fails part way leaves the record partially mutated. Nothing is
//! rolled back.
//!
//! # Examples
//!
//! ```
//! use veil::anonymization::Anonymizer;
//! use veil::domain::{Element, Record, Tag, Vr};
//!
//! # fn example() -> veil::domain::Result<()> {
//! let record = Record::new()
//!     .with(Element::text(Tag::new(0x0010, 0x0010), Vr::PN, "DOE^JOHN")?)
//!     .with(Element::text(Tag::new(0x0020, 0x000D), Vr::UI, "1.2.840.99.1")?);
//!
//! let mut anonymizer = Anonymizer::with_defaults()?;
//! anonymizer.set_target(record);
//! let report = anonymizer.run_confidentiality_profile(true)?;
//!
//! let record = anonymizer.take_target().unwrap();
//! assert_eq!(record.get(Tag::new(0x0010, 0x0010)).unwrap().len(), 0);
//! assert_eq!(report.emptied, 1);
//! assert_eq!(report.replaced, 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use crate::anonymization::config::{OptionalPolicy, ProfileConfig};
use crate::anonymization::events::{Action, AnonymizeEvent, ObserverId, Observers};
use crate::anonymization::pseudonym::PseudonymGenerator;
use crate::anonymization::report::{ProfileMode, ProfileReport};
use crate::anonymization::store::{ReversibleStore, StoreKey};
use crate::anonymization::usage::{Usage, UsageResolver};
use crate::dictionary::{Dictionary, StaticDictionary};
use crate::domain::{DeidError, Element, ElementBody, Record, Result, Tag, TreePath};
use crate::{log_profile_complete, log_profile_start};
use std::collections::BTreeSet;
use std::time::Instant;

/// Caller-supplied evaluation of a `C - <condition>` usage.
///
/// Receives the tag, the condition text and the record level holding the tag.
/// Returning `false` treats the field as Optional.
pub type ConditionEvaluator = Box<dyn Fn(Tag, &str, &Record) -> bool>;

/// Attribute-level de-identification engine
///
/// See the [module documentation](self) for the overall model.
pub struct Anonymizer {
    dictionary: Box<dyn Dictionary>,
    resolver: UsageResolver,
    generator: PseudonymGenerator,
    store: Option<Box<dyn ReversibleStore>>,
    observers: Observers,
    condition: Option<ConditionEvaluator>,
    optional_policy: OptionalPolicy,
    object_class: Option<String>,
    target: Option<Record>,
    record_id: Option<String>,
    bindings: u64,
}

impl Anonymizer {
    /// Create an anonymizer over a dictionary and usage tables
    pub fn new<D>(dictionary: D, resolver: UsageResolver) -> Self
    where
        D: Dictionary + 'static,
    {
        Self {
            dictionary: Box::new(dictionary),
            resolver,
            generator: PseudonymGenerator::new(),
            store: None,
            observers: Observers::new(),
            condition: None,
            optional_policy: OptionalPolicy::default(),
            object_class: None,
            target: None,
            record_id: None,
            bindings: 0,
        }
    }

    /// Built-in dictionary and built-in profile table
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(
            StaticDictionary::new(),
            UsageResolver::basic_profile()?,
        ))
    }

    /// Create an anonymizer from profile configuration
    ///
    /// Loads the configured usage table file (or the built-in table), keys the
    /// pseudonym generator with the configured salt and applies the optional
    /// policy and object class override.
    ///
    /// # Errors
    ///
    /// Returns an error if the usage table file cannot be read or parsed.
    pub fn from_config(config: &ProfileConfig) -> Result<Self> {
        let resolver = match config.usage_tables {
            Some(ref path) => UsageResolver::from_file(path)?,
            None => UsageResolver::basic_profile()?,
        };
        let generator = match config.salt {
            Some(ref salt) => PseudonymGenerator::with_salt(salt.clone()),
            None => PseudonymGenerator::new(),
        };

        let mut anonymizer = Self::new(StaticDictionary::new(), resolver)
            .with_generator(generator)
            .with_optional_policy(config.optional_policy);
        anonymizer.object_class = config.object_class.clone();
        Ok(anonymizer)
    }

    /// Replace the pseudonym generator, discarding its cache
    pub fn with_generator(mut self, generator: PseudonymGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Set the handling of Optional fields
    pub fn with_optional_policy(mut self, policy: OptionalPolicy) -> Self {
        self.optional_policy = policy;
        self
    }

    /// Override the object class read from each record's SOP Class UID
    pub fn set_object_class(&mut self, object_class: Option<String>) {
        self.object_class = object_class;
    }

    /// Wire in an evaluator for conditional usages
    pub fn set_condition_evaluator<F>(&mut self, evaluator: F)
    where
        F: Fn(Tag, &str, &Record) -> bool + 'static,
    {
        self.condition = Some(Box::new(evaluator));
    }

    /// Pseudonym generator of this session
    pub fn generator(&self) -> &PseudonymGenerator {
        &self.generator
    }

    /// Dictionary used for created fields
    pub fn dictionary(&self) -> &dyn Dictionary {
        self.dictionary.as_ref()
    }

    // ----- target binding -----

    /// Bind `record`, returning the previously bound one
    ///
    /// Reversible store entries of the record are filed under an identity derived
    /// from its root SOP Instance UID `(0008,0018)`: the session pseudonym of that
    /// UID, which is also what the UID reads after de-identification. Binding the
    /// original or the protected form of a record therefore reaches the same
    /// entries. Records without the UID get an identity unique to this binding.
    pub fn set_target(&mut self, record: Record) -> Option<Record> {
        let id = self.derive_record_id(&record);
        self.bind(record, id)
    }

    /// Bind `record` under an explicit store identity
    pub fn set_target_with_id(&mut self, record: Record, id: impl Into<String>) -> Option<Record> {
        self.bind(record, id.into())
    }

    /// Store identity of the bound record
    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    fn bind(&mut self, record: Record, id: String) -> Option<Record> {
        self.bindings += 1;
        self.record_id = Some(id);
        self.target.replace(record)
    }

    fn derive_record_id(&mut self, record: &Record) -> String {
        let instance_uid = record
            .get(Tag::SOP_INSTANCE_UID)
            .and_then(|element| element.bytes())
            .filter(|bytes| bytes.iter().any(|b| *b != 0 && *b != b' '));
        // An issued dummy maps to itself, so both forms agree
        match instance_uid.map(<[u8]>::to_vec) {
            Some(uid) => String::from_utf8_lossy(&self.generator.dummy_for(&uid)).into_owned(),
            None => format!("binding-{}", self.bindings + 1),
        }
    }

    /// Bound record
    pub fn target(&self) -> Option<&Record> {
        self.target.as_ref()
    }

    /// Bound record, mutable
    pub fn target_mut(&mut self) -> Option<&mut Record> {
        self.target.as_mut()
    }

    /// Unbind and return the record
    pub fn take_target(&mut self) -> Option<Record> {
        self.record_id = None;
        self.target.take()
    }

    // ----- reversible store -----

    /// Attach a reversible store, returning the one it replaces
    pub fn attach_store(
        &mut self,
        store: Box<dyn ReversibleStore>,
    ) -> Option<Box<dyn ReversibleStore>> {
        self.store.replace(store)
    }

    /// Detach the reversible store
    pub fn detach_store(&mut self) -> Option<Box<dyn ReversibleStore>> {
        self.store.take()
    }

    /// Whether a reversible store is attached
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Reads an archived original back from the attached store
    ///
    /// `key.record` selects the record; see [`record_id`](Self::record_id).
    ///
    /// # Errors
    ///
    /// [`DeidError::StoreUnavailable`] without a store; a serialization error if
    /// the stored plaintext is not an archived element.
    pub fn recover(&self, key: &StoreKey) -> Result<Option<Element>> {
        let store = self.store.as_deref().ok_or(DeidError::StoreUnavailable)?;
        match store.get(key)? {
            Some(plaintext) => {
                let body: ElementBody = serde_json::from_slice(&plaintext)?;
                Element::from_body(key.tag, body).map(Some)
            }
            None => Ok(None),
        }
    }

    /// [`recover`](Self::recover) for a field of the bound record
    pub fn recover_field(&self, tag: Tag, path: TreePath) -> Result<Option<Element>> {
        let record = self.record_id.as_deref().ok_or(DeidError::NoTarget)?;
        self.recover(&StoreKey::new(record, tag, path))
    }

    // ----- observers -----

    /// Register an observer for field protection events
    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&AnonymizeEvent) + 'static,
    {
        self.observers.subscribe(observer)
    }

    /// Remove an observer; returns whether it was registered
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn emit(&mut self, tag: Tag, action: Action) {
        self.observers.notify(&AnonymizeEvent::FieldProtected {
            tag,
            path: TreePath::root(),
            action,
        });
    }

    // ----- primitives -----

    /// Empty `tag` at the top level of the bound record
    pub fn empty(&mut self, tag: Tag) -> Result<()> {
        let record = self.target.as_mut().ok_or(DeidError::NoTarget)?;
        record.empty(tag, self.dictionary.as_ref())?;
        self.emit(tag, Action::Emptied);
        Ok(())
    }

    /// Remove `tag` from the top level of the bound record
    ///
    /// Emits an event only when something was removed.
    pub fn remove(&mut self, tag: Tag) -> Result<bool> {
        let record = self.target.as_mut().ok_or(DeidError::NoTarget)?;
        let removed = record.remove(tag);
        if removed {
            self.emit(tag, Action::Removed);
        }
        Ok(removed)
    }

    /// Set a text value on the bound record
    pub fn replace(&mut self, tag: Tag, value: &str) -> Result<()> {
        let record = self.target.as_mut().ok_or(DeidError::NoTarget)?;
        record.replace(tag, value, self.dictionary.as_ref())?;
        self.emit(tag, Action::Replaced);
        Ok(())
    }

    /// Set exactly `length` bytes of `value` on the bound record
    pub fn replace_bytes(&mut self, tag: Tag, value: &[u8], length: usize) -> Result<()> {
        let record = self.target.as_mut().ok_or(DeidError::NoTarget)?;
        record.replace_bytes(tag, value, length, self.dictionary.as_ref())?;
        self.emit(tag, Action::Replaced);
        Ok(())
    }

    // ----- sweeps -----

    /// Remove every private (odd group) element anywhere in the tree
    pub fn remove_private_tags(&mut self) -> Result<usize> {
        self.sweep(|tag, _| tag.is_private())
    }

    /// Remove every group length (element 0000) element anywhere in the tree
    pub fn remove_group_length(&mut self) -> Result<usize> {
        self.sweep(|tag, _| tag.is_group_length())
    }

    /// Remove every element the dictionary lists as retired
    pub fn remove_retired(&mut self) -> Result<usize> {
        self.sweep(|tag, dictionary| dictionary.is_retired(tag))
    }

    /// One depth-first pass: collect matches per level, then remove them.
    /// Removed sequences are not descended into.
    fn sweep<P>(&mut self, matches: P) -> Result<usize>
    where
        P: Fn(Tag, &dyn Dictionary) -> bool,
    {
        let dictionary = self.dictionary.as_ref();
        let observers = &mut self.observers;
        let record = self.target.as_mut().ok_or(DeidError::NoTarget)?;

        let mut count = 0;
        record.walk_mut(|path, level| {
            let doomed: Vec<Tag> = level.tags().filter(|t| matches(*t, dictionary)).collect();
            for tag in doomed {
                if level.remove(tag) {
                    count += 1;
                    observers.notify(&AnonymizeEvent::FieldProtected {
                        tag,
                        path: path.clone(),
                        action: Action::Removed,
                    });
                }
            }
            Ok::<(), DeidError>(())
        })?;

        tracing::debug!(removed = count, "Sweep completed");
        Ok(count)
    }

    // ----- confidentiality profile -----

    /// Object class used for classification of the bound record
    ///
    /// The explicit override wins, then the root SOP Class UID. An empty string
    /// selects the fallback table.
    pub fn object_class(&self) -> String {
        if let Some(ref class) = self.object_class {
            return class.clone();
        }
        self.target
            .as_ref()
            .and_then(|record| record.get(Tag::SOP_CLASS_UID))
            .and_then(Element::as_text)
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Run the Basic Application Level Confidentiality Profile on the bound record
    ///
    /// With `deidentify` set, every record in the tree is walked and each field is
    /// classified against the object class:
    /// - unlisted tags are counted as unclassified, malformed table entries are
    ///   reported as warnings; both are left untouched
    /// - Mandatory and Conditional fields are emptied, or pseudonymised when their
    ///   VR cannot be emptied; sequences are only descended into
    /// - Optional fields follow the configured [`OptionalPolicy`]
    ///
    /// Before each mutation the original is archived in the attached store unless
    /// the store already holds an entry for that record, tag and path. Entries
    /// are filed under [`record_id`](Self::record_id) and a pass only reads or
    /// writes the bound record's entries.
    ///
    /// With `deidentify` unset, originals are restored from the attached store;
    /// without a store this is a no-op reported as skipped.
    ///
    /// # Errors
    ///
    /// [`DeidError::NoTarget`] when no record is bound; store and serialization
    /// failures abort the pass. Field-level problems become report warnings.
    pub fn run_confidentiality_profile(&mut self, deidentify: bool) -> Result<ProfileReport> {
        if self.target.is_none() {
            return Err(DeidError::NoTarget);
        }
        let object_class = self.object_class();
        log_profile_start!(object_class, deidentify);
        let started = Instant::now();

        if !deidentify && self.store.is_none() {
            tracing::info!("No reversible store attached, re-identification skipped");
            return Ok(ProfileReport::skipped());
        }

        let Self {
            dictionary,
            resolver,
            generator,
            store,
            observers,
            condition,
            optional_policy,
            target,
            record_id,
            ..
        } = self;
        let record = target.as_mut().ok_or(DeidError::NoTarget)?;
        let record_id = record_id.as_deref().ok_or(DeidError::NoTarget)?;

        let mode = if deidentify {
            ProfileMode::Deidentify
        } else {
            ProfileMode::Reidentify
        };
        let mut pass = ProfilePass {
            dictionary: dictionary.as_ref(),
            resolver,
            generator,
            store: store.as_deref_mut(),
            observers,
            condition: condition.as_deref(),
            optional_policy: *optional_policy,
            object_class: &object_class,
            record_id,
            report: ProfileReport::new(mode),
        };

        if deidentify {
            record.walk_mut(|path, level| pass.deidentify_level(path, level))?;
        } else {
            record.walk_mut(|path, level| pass.reidentify_level(path, level))?;
        }

        let report = pass.report;
        log_profile_complete!(report, started.elapsed());
        Ok(report)
    }
}

/// State of one profile pass, borrowed from the anonymizer
struct ProfilePass<'a> {
    dictionary: &'a dyn Dictionary,
    resolver: &'a UsageResolver,
    generator: &'a mut PseudonymGenerator,
    store: Option<&'a mut (dyn ReversibleStore + 'static)>,
    observers: &'a mut Observers,
    condition: Option<&'a (dyn Fn(Tag, &str, &Record) -> bool + 'static)>,
    optional_policy: OptionalPolicy,
    object_class: &'a str,
    record_id: &'a str,
    report: ProfileReport,
}

impl ProfilePass<'_> {
    fn deidentify_level(&mut self, path: &TreePath, record: &mut Record) -> Result<()> {
        self.report.records_visited += 1;

        let tags: Vec<Tag> = record.tags().collect();
        for tag in tags {
            let usage = match self.resolver.lookup(self.object_class, tag) {
                Ok(Some(Usage::Unknown)) | Ok(None) => {
                    self.report.unclassified += 1;
                    continue;
                }
                Ok(Some(usage)) => usage,
                Err(e) => {
                    self.warn(path, &e);
                    continue;
                }
            };

            let protect = match &usage {
                Usage::Mandatory => true,
                Usage::Conditional(condition) => self
                    .condition
                    .map_or(true, |evaluate| evaluate(tag, condition.as_str(), &*record)),
                _ => false,
            };

            let outcome = if protect {
                self.protect(path, record, tag)
            } else {
                self.apply_optional(path, record, tag)
            };
            match outcome {
                Ok(()) => {}
                Err(e) if e.is_field_local() => self.warn(path, &e),
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Mandatory and satisfied conditional fields
    fn protect(&mut self, path: &TreePath, record: &mut Record, tag: Tag) -> Result<()> {
        let Some(element) = record.get(tag) else {
            return Ok(());
        };
        // Items are visited as records of their own
        if element.is_sequence() || element.is_empty() {
            return Ok(());
        }

        if element.vr().can_be_emptied() {
            self.archive(path, element)?;
            record.empty(tag, self.dictionary)?;
            self.report.emptied += 1;
            self.emit(path, tag, Action::Emptied);
            return Ok(());
        }

        let current = element.bytes().unwrap_or_default();
        if self.generator.is_issued(current) {
            return Ok(());
        }
        let dummy = self.generator.dummy_for(current);
        self.archive(path, element)?;
        record.replace_bytes(tag, &dummy, dummy.len(), self.dictionary)?;
        self.report.replaced += 1;
        self.emit(path, tag, Action::Replaced);
        Ok(())
    }

    fn apply_optional(&mut self, path: &TreePath, record: &mut Record, tag: Tag) -> Result<()> {
        let Some(element) = record.get(tag) else {
            return Ok(());
        };
        match self.optional_policy {
            OptionalPolicy::Keep => Ok(()),
            OptionalPolicy::Remove => {
                self.archive(path, element)?;
                record.remove(tag);
                self.report.removed += 1;
                self.emit(path, tag, Action::Removed);
                Ok(())
            }
            OptionalPolicy::Empty => {
                if element.is_sequence() {
                    return Err(DeidError::InvalidOperationForVr {
                        tag,
                        vr: element.vr(),
                        operation: "empty",
                    });
                }
                if element.is_empty() {
                    return Ok(());
                }
                self.archive(path, element)?;
                record.empty(tag, self.dictionary)?;
                self.report.emptied += 1;
                self.emit(path, tag, Action::Emptied);
                Ok(())
            }
        }
    }

    fn reidentify_level(&mut self, path: &TreePath, record: &mut Record) -> Result<()> {
        self.report.records_visited += 1;

        let mut candidates: BTreeSet<Tag> = record.tags().collect();
        if let Some(table) = self.resolver.table_for(self.object_class) {
            candidates.extend(table.tags());
        }

        for tag in candidates {
            let key = StoreKey::new(self.record_id, tag, path.clone());
            let plaintext = match self.store.as_deref() {
                Some(store) => store.get(&key)?,
                None => None,
            };
            let Some(plaintext) = plaintext else {
                continue;
            };

            let body: ElementBody = serde_json::from_slice(&plaintext)?;
            record.insert(Element::from_body(tag, body)?);
            self.report.restored += 1;
            self.emit(path, tag, Action::Restored);
        }
        Ok(())
    }

    /// First write wins: an existing entry is never overwritten
    fn archive(&mut self, path: &TreePath, element: &Element) -> Result<()> {
        let Some(store) = self.store.as_deref_mut() else {
            return Ok(());
        };
        let key = StoreKey::new(self.record_id, element.tag(), path.clone());
        if store.contains(&key)? {
            return Ok(());
        }
        let plaintext = serde_json::to_vec(element)?;
        store.put(&key, &plaintext)
    }

    fn emit(&mut self, path: &TreePath, tag: Tag, action: Action) {
        tracing::debug!(
            tag = %tag,
            keyword = self.dictionary.keyword(tag).unwrap_or("unknown"),
            path = %path,
            action = %action,
            "Field protected"
        );
        self.observers.notify(&AnonymizeEvent::FieldProtected {
            tag,
            path: path.clone(),
            action,
        });
    }

    fn warn(&mut self, path: &TreePath, error: &DeidError) {
        tracing::warn!(path = %path, error = %error, "Field skipped");
        let warning = if path.is_root() {
            error.to_string()
        } else {
            format!("{path}: {error}")
        };
        self.report.add_warning(warning);
    }
}
