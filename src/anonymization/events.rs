//! Field protection events
//!
//! Every successful mutation made through the anonymizer is published to the
//! registered observers after it has been applied. Observers are plain closures;
//! they cannot fail the operation that triggered them.

use crate::domain::{Tag, TreePath};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What was done to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Value reduced to zero length
    Emptied,
    /// Element deleted
    Removed,
    /// Value overwritten (pseudonym or caller-supplied)
    Replaced,
    /// Original brought back from the reversible store
    Restored,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Emptied => "emptied",
            Action::Removed => "removed",
            Action::Replaced => "replaced",
            Action::Restored => "restored",
        };
        f.write_str(label)
    }
}

/// Event published to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AnonymizeEvent {
    /// `path` locates the record holding the field; the root for top-level fields
    FieldProtected {
        tag: Tag,
        path: TreePath,
        action: Action,
    },
}

impl AnonymizeEvent {
    /// Tag the event refers to
    pub fn tag(&self) -> Tag {
        match self {
            AnonymizeEvent::FieldProtected { tag, .. } => *tag,
        }
    }

    /// Location of the record holding the field
    pub fn path(&self) -> &TreePath {
        match self {
            AnonymizeEvent::FieldProtected { path, .. } => path,
        }
    }
}

/// Handle returned by [`Observers::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Callback = Box<dyn FnMut(&AnonymizeEvent)>;

/// Ordered list of observers
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    entries: Vec<(ObserverId, Callback)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&AnonymizeEvent) + 'static,
    {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(observer)));
        id
    }

    /// Returns whether `id` was registered
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Delivers `event` to every observer in registration order
    pub fn notify(&mut self, event: &AnonymizeEvent) {
        for (_, observer) in &mut self.entries {
            observer(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}
