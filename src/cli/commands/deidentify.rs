//! Deidentify command implementation
//!
//! Runs the sweeps and the confidentiality profile over a set of JSON records
//! through a single anonymizer, so pseudonyms stay consistent across the set.

use crate::anonymization::audit::AuditLogger;
use crate::anonymization::{Anonymizer, ProfileMode, ProfileReport};
use crate::cli::DEFAULT_CONFIG;
use crate::config::{load_config, load_defaults, VeilConfig};
use crate::domain::Record;
use anyhow::Context;
use clap::Args;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

/// Arguments for the deidentify command
#[derive(Args, Debug)]
pub struct DeidentifyArgs {
    /// Record files to process (JSON interchange form)
    #[arg(short, long, value_name = "FILE", required = true)]
    pub input: Vec<PathBuf>,

    /// Directory the protected records are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Object class (SOP Class UID) overriding the one found in each record
    #[arg(long, value_name = "UID")]
    pub object_class: Option<String>,

    /// Remove private (odd group) elements before the profile runs
    #[arg(long)]
    pub remove_private: bool,

    /// Remove group length elements before the profile runs
    #[arg(long)]
    pub remove_group_length: bool,

    /// Remove retired elements before the profile runs
    #[arg(long)]
    pub remove_retired: bool,

    /// Write the merged report as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl DeidentifyArgs {
    /// Execute the deidentify command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(files = self.input.len(), "Starting deidentify command");

        // Outputs are named after the input's base name
        if let Some(name) = self.duplicate_file_name() {
            let name = name.to_string_lossy();
            tracing::error!(file_name = %name, "Inputs share a file name");
            eprintln!("❌ Several inputs are named {name}; outputs would overwrite each other");
            return Ok(2);
        }

        let mut config = match Self::load(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if let Some(class) = &self.object_class {
            tracing::info!(object_class = %class, "Overriding object class from CLI");
            config.profile.object_class = Some(class.clone());
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let mut anonymizer = match Anonymizer::from_config(&config.profile) {
            Ok(a) => a,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build anonymizer");
                eprintln!("Failed to load usage tables: {e}");
                return Ok(2);
            }
        };

        let audit = if config.audit.enabled {
            let logger = Rc::new(AuditLogger::new(
                config.audit.log_path.clone(),
                config.audit.json_format,
                true,
            )?);
            anonymizer.subscribe(logger.observer());
            Some(logger)
        } else {
            None
        };

        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                self.output_dir.display()
            )
        })?;

        println!("🚀 Protecting {} record file(s)...", self.input.len());

        let start = Instant::now();
        let mut total = ProfileReport::new(ProfileMode::Deidentify);
        let mut failed = 0usize;

        for (index, path) in self.input.iter().enumerate() {
            crate::log_file_progress!(index + 1, self.input.len(), path.display());
            if let Some(logger) = &audit {
                logger.set_source(Some(path.display().to_string()));
            }

            match self.process_file(&mut anonymizer, path) {
                Ok(report) => {
                    tracing::debug!(fields_changed = report.fields_changed(), "Record protected");
                    total.merge(&report);
                }
                Err(e) => {
                    failed += 1;
                    let context = path.display().to_string();
                    crate::log_error_with_context!(&e, context.as_str());
                    eprintln!("❌ {}: {e:#}", path.display());
                }
            }
        }

        print!("{}", total.format_console());
        println!("  Duration: {:.2}s", start.elapsed().as_secs_f64());
        println!();

        if let Some(report_path) = &self.report {
            total.write_to_file(report_path).with_context(|| {
                format!("Failed to write report: {}", report_path.display())
            })?;
            println!("📄 Report written to {}", report_path.display());
        }

        let exit_code = if failed == 0 {
            println!("✅ Deidentification completed successfully!");
            0
        } else {
            println!(
                "⚠️  Deidentification completed with {failed} failed file(s) of {}",
                self.input.len()
            );
            1 // Partial success
        };

        Ok(exit_code)
    }

    fn duplicate_file_name(&self) -> Option<&OsStr> {
        let mut seen = HashSet::new();
        self.input
            .iter()
            .filter_map(|path| path.file_name())
            .find(|name| !seen.insert(*name))
    }

    fn load(config_path: &str) -> crate::domain::Result<VeilConfig> {
        if config_path == DEFAULT_CONFIG && !Path::new(config_path).exists() {
            tracing::debug!("No configuration file found, using defaults");
            return load_defaults();
        }
        load_config(config_path)
    }

    fn process_file(&self, anonymizer: &mut Anonymizer, path: &Path) -> anyhow::Result<ProfileReport> {
        let file_name = path
            .file_name()
            .with_context(|| format!("Input has no file name: {}", path.display()))?;
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read record: {}", path.display()))?;
        let record: Record = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse record: {}", path.display()))?;

        anonymizer.set_target(record);
        let result = self.protect(anonymizer);
        let record = anonymizer.take_target();
        let report = result?;

        let record = record.context("Record was unbound during the pass")?;
        let json = serde_json::to_string_pretty(&record).context("Failed to serialize record")?;
        let output = self.output_dir.join(file_name);
        fs::write(&output, json)
            .with_context(|| format!("Failed to write record: {}", output.display()))?;

        Ok(report)
    }

    fn protect(&self, anonymizer: &mut Anonymizer) -> anyhow::Result<ProfileReport> {
        let mut swept = 0;
        if self.remove_private {
            swept += anonymizer.remove_private_tags()?;
        }
        if self.remove_group_length {
            swept += anonymizer.remove_group_length()?;
        }
        if self.remove_retired {
            swept += anonymizer.remove_retired()?;
        }
        tracing::debug!(swept, "Sweeps finished");

        let mut report = anonymizer.run_confidentiality_profile(true)?;
        report.removed += swept;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{
        "00080016": { "vr": "UI", "Value": "1.2.840.10008.5.1.4.1.1.2" },
        "00090010": { "vr": "LO", "Value": "ACME" },
        "00100010": { "vr": "PN", "Value": "DOE^JOHN" },
        "0020000D": { "vr": "UI", "Value": "1.2.3.4.5" }
    }"#;

    fn args(dir: &Path, inputs: Vec<PathBuf>) -> DeidentifyArgs {
        DeidentifyArgs {
            input: inputs,
            output_dir: dir.join("out"),
            object_class: None,
            remove_private: true,
            remove_group_length: false,
            remove_retired: false,
            report: Some(dir.join("report.json")),
        }
    }

    #[test]
    fn test_execute_writes_protected_records() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ct.json");
        fs::write(&input, RECORD).unwrap();
        let config = dir.path().join("veil.toml");
        fs::write(&config, "[profile]\noptional_policy = \"remove\"\n").unwrap();

        let args = args(dir.path(), vec![input]);
        let code = args.execute(config.to_str().unwrap()).unwrap();
        assert_eq!(code, 0);

        let output = fs::read_to_string(dir.path().join("out/ct.json")).unwrap();
        assert!(!output.contains("DOE^JOHN"));
        assert!(!output.contains("ACME"));
        assert!(!output.contains("1.2.3.4.5\""));

        let report: ProfileReport =
            serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
                .unwrap();
        assert_eq!(report.records_visited, 1);
        assert!(report.replaced >= 1);
    }

    #[test]
    fn test_unparseable_file_is_partial_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        fs::write(&good, RECORD).unwrap();
        fs::write(&bad, "not json").unwrap();
        let config = dir.path().join("veil.toml");
        fs::write(&config, "").unwrap();

        let args = args(dir.path(), vec![good, bad]);
        let code = args.execute(config.to_str().unwrap()).unwrap();
        assert_eq!(code, 1);
        assert!(dir.path().join("out/good.json").exists());
        assert!(!dir.path().join("out/bad.json").exists());
    }

    #[test]
    fn test_inputs_sharing_a_file_name_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for site in ["a", "b"] {
            fs::create_dir_all(dir.path().join(site)).unwrap();
            fs::write(dir.path().join(site).join("ct.json"), RECORD).unwrap();
        }
        let config = dir.path().join("veil.toml");
        fs::write(&config, "").unwrap();

        let args = args(
            dir.path(),
            vec![dir.path().join("a/ct.json"), dir.path().join("b/ct.json")],
        );
        let code = args.execute(config.to_str().unwrap()).unwrap();
        assert_eq!(code, 2);
        assert!(!dir.path().join("out/ct.json").exists());
        assert!(!dir.path().join("report.json").exists());
    }

    #[test]
    fn test_missing_explicit_config_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), vec![dir.path().join("a.json")]);
        let missing = dir.path().join("missing.toml");
        assert_eq!(args.execute(missing.to_str().unwrap()).unwrap(), 2);
    }

    #[test]
    fn test_invalid_object_class_override_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("veil.toml");
        fs::write(&config, "").unwrap();
        let mut args = args(dir.path(), vec![dir.path().join("a.json")]);
        args.object_class = Some("CT Image".to_string());
        assert_eq!(args.execute(config.to_str().unwrap()).unwrap(), 2);
    }
}
