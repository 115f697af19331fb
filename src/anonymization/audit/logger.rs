//! Audit logger for field protection events

use crate::anonymization::events::{Action, AnonymizeEvent};
use crate::dictionary::{Dictionary, StaticDictionary};
use crate::domain::Tag;
use anyhow::{Context, Result};
use serde::Serialize;
use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry<'a> {
    timestamp: String,
    source: Option<&'a str>,
    tag: Tag,
    keyword: &'a str,
    path: String,
    action: Action,
}

/// Audit logger for field protection events
///
/// Registered on an anonymizer through [`observer`](Self::observer). Write
/// failures are logged and do not affect the operation that raised the event.
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
    dictionary: StaticDictionary,
    source: RefCell<Option<String>>,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
            dictionary: StaticDictionary::new(),
            source: RefCell::new(None),
        })
    }

    /// Name the record that subsequent events belong to, e.g. its file name
    pub fn set_source(&self, source: Option<String>) {
        *self.source.borrow_mut() = source;
    }

    /// Append one event to the trail
    pub fn log_event(&self, event: &AnonymizeEvent) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let AnonymizeEvent::FieldProtected { tag, path, action } = event;
        let source = self.source.borrow();
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: source.as_deref(),
            tag: *tag,
            keyword: self.dictionary.keyword(*tag).unwrap_or("Unknown"),
            path: path.to_string(),
            action: *action,
        };

        self.write_entry(&entry)
    }

    /// Observer closure feeding this logger
    pub fn observer(self: &Rc<Self>) -> impl FnMut(&AnonymizeEvent) + 'static {
        let logger = Rc::clone(self);
        move |event| {
            if let Err(e) = logger.log_event(event) {
                tracing::warn!(error = %e, "Failed to write audit entry");
            }
        }
    }

    fn write_entry(&self, entry: &AuditLogEntry<'_>) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            writeln!(
                file,
                "[{}] Source: {} | Path: {} | Tag: {} {} | Action: {}",
                entry.timestamp,
                entry.source.unwrap_or("-"),
                entry.path,
                entry.tag,
                entry.keyword,
                entry.action
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}
