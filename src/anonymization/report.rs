//! Confidentiality profile reporting
//!
//! A [`ProfileReport`] summarises one profile pass (or, after
//! [`merge`](ProfileReport::merge), a whole file set): how many fields were
//! emptied, replaced, removed or restored and what could not be classified.

use serde::{Deserialize, Serialize};

/// Direction of a profile pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileMode {
    Deidentify,
    Reidentify,
}

/// Summary of a profile pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileReport {
    /// Direction of the pass
    pub mode: ProfileMode,

    /// Records visited, nested items included
    pub records_visited: usize,

    /// Fields reduced to zero length
    pub emptied: usize,

    /// Fields given a pseudonym
    pub replaced: usize,

    /// Fields deleted
    pub removed: usize,

    /// Fields restored from the reversible store
    pub restored: usize,

    /// Fields whose tag is not listed for the object class
    pub unclassified: usize,

    /// Fields skipped with a reported problem
    pub warnings: Vec<String>,

    /// Re-identification requested without a reversible store
    #[serde(default)]
    pub skipped: bool,
}

impl ProfileReport {
    /// Create an empty report
    pub fn new(mode: ProfileMode) -> Self {
        Self {
            mode,
            records_visited: 0,
            emptied: 0,
            replaced: 0,
            removed: 0,
            restored: 0,
            unclassified: 0,
            warnings: Vec::new(),
            skipped: false,
        }
    }

    /// Report for a re-identification that had no store to read from
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::new(ProfileMode::Reidentify)
        }
    }

    /// Total number of fields mutated
    pub fn fields_changed(&self) -> usize {
        self.emptied + self.replaced + self.removed + self.restored
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Folds another pass into this one
    pub fn merge(&mut self, other: &ProfileReport) {
        self.records_visited += other.records_visited;
        self.emptied += other.emptied;
        self.replaced += other.replaced;
        self.removed += other.removed;
        self.restored += other.restored;
        self.unclassified += other.unclassified;
        self.warnings.extend(other.warnings.iter().cloned());
        self.skipped |= other.skipped;
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("              CONFIDENTIALITY PROFILE REPORT                   \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        let mode = match self.mode {
            ProfileMode::Deidentify => "de-identify",
            ProfileMode::Reidentify => "re-identify",
        };
        output.push_str(&format!("  Mode:              {mode}\n"));
        if self.skipped {
            output.push_str("  Skipped:           no reversible store attached\n");
        }
        output.push_str(&format!("  Records Visited:   {}\n", self.records_visited));
        output.push_str(&format!("  Fields Emptied:    {}\n", self.emptied));
        output.push_str(&format!("  Fields Replaced:   {}\n", self.replaced));
        output.push_str(&format!("  Fields Removed:    {}\n", self.removed));
        output.push_str(&format!("  Fields Restored:   {}\n", self.restored));
        output.push_str(&format!("  Unclassified:      {}\n", self.unclassified));
        output.push('\n');

        if !self.warnings.is_empty() {
            output.push_str("⚠️  WARNINGS\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for warning in &self.warnings {
                output.push_str(&format!("  • {warning}\n"));
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write report to file
    pub fn write_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = self.format_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl Default for ProfileReport {
    fn default() -> Self {
        Self::new(ProfileMode::Deidentify)
    }
}
