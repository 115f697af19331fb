//! De-identification profile configuration

use crate::config::{secret_string, SecretString};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// What the profile does with fields classified Optional
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalPolicy {
    /// Delete the element
    #[default]
    Remove,
    /// Reduce the value to zero length
    Empty,
    /// Leave the element untouched
    Keep,
}

impl fmt::Display for OptionalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OptionalPolicy::Remove => "remove",
            OptionalPolicy::Empty => "empty",
            OptionalPolicy::Keep => "keep",
        };
        f.write_str(label)
    }
}

impl FromStr for OptionalPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remove" => Ok(OptionalPolicy::Remove),
            "empty" => Ok(OptionalPolicy::Empty),
            "keep" => Ok(OptionalPolicy::Keep),
            other => Err(format!(
                "Invalid optional policy '{other}'. Must be one of: remove, empty, keep"
            )),
        }
    }
}

/// Confidentiality profile settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Handling of Optional fields
    #[serde(default)]
    pub optional_policy: OptionalPolicy,

    /// Object class (SOP Class UID) used instead of the one found in each record
    #[serde(default)]
    pub object_class: Option<String>,

    /// Secret mixed into every pseudonym digest
    #[serde(default)]
    pub salt: Option<SecretString>,

    /// Usage table file replacing the built-in table
    #[serde(default)]
    pub usage_tables: Option<PathBuf>,
}

impl ProfileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(ref path) = self.usage_tables {
            if !path.exists() {
                anyhow::bail!("Usage table file not found: {}", path.display());
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                anyhow::bail!("Usage table file must be a TOML file: {}", path.display());
            }
        }

        if let Some(ref class) = self.object_class {
            if class.is_empty() || !class.chars().all(|c| c.is_ascii_digit() || c == '.') {
                anyhow::bail!("Invalid object class '{}': expected a dotted UID", class);
            }
        }

        if let Some(ref salt) = self.salt {
            use secrecy::ExposeSecret;
            if salt.expose_secret().is_empty() {
                anyhow::bail!("profile.salt is set but empty");
            }
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("VEIL_PROFILE_OPTIONAL_POLICY") {
            self.optional_policy = val
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("Invalid VEIL_PROFILE_OPTIONAL_POLICY value")?;
        }

        if let Ok(val) = std::env::var("VEIL_PROFILE_OBJECT_CLASS") {
            self.object_class = Some(val);
        }

        if let Ok(val) = std::env::var("VEIL_PROFILE_SALT") {
            self.salt = Some(secret_string(val));
        }

        if let Ok(val) = std::env::var("VEIL_PROFILE_USAGE_TABLES") {
            self.usage_tables = Some(PathBuf::from(val));
        }

        Ok(())
    }
}

/// Audit trail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable the audit trail
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON lines instead of plain text
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/deidentification.log")
}

fn default_audit_json_format() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            anyhow::bail!("audit.log_path cannot be empty when the audit trail is enabled");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("VEIL_AUDIT_ENABLED") {
            self.enabled = val.parse().context("Invalid VEIL_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("VEIL_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("VEIL_AUDIT_JSON_FORMAT") {
            self.json_format = val
                .parse()
                .context("Invalid VEIL_AUDIT_JSON_FORMAT value")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_config() {
        let config = ProfileConfig::default();
        assert_eq!(config.optional_policy, OptionalPolicy::Remove);
        assert!(config.object_class.is_none());
        assert!(config.salt.is_none());
        assert!(config.validate().is_ok());

        let audit = AuditConfig::default();
        assert!(!audit.enabled);
        assert!(audit.json_format);
    }

    #[test_case("remove", OptionalPolicy::Remove)]
    #[test_case("EMPTY", OptionalPolicy::Empty)]
    #[test_case("keep", OptionalPolicy::Keep)]
    fn test_optional_policy_parse(input: &str, expected: OptionalPolicy) {
        assert_eq!(input.parse::<OptionalPolicy>().unwrap(), expected);
    }

    #[test]
    fn test_optional_policy_rejects_unknown() {
        assert!("redact".parse::<OptionalPolicy>().is_err());
    }

    #[test]
    fn test_missing_usage_tables_rejected() {
        let config = ProfileConfig {
            usage_tables: Some(PathBuf::from("/nonexistent/tables.toml")),
            ..ProfileConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_object_class_rejected() {
        let config = ProfileConfig {
            object_class: Some("CT Image".to_string()),
            ..ProfileConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_salt_deserializes_as_secret() {
        let config: ProfileConfig = toml::from_str("salt = \"pepper\"\noptional_policy = \"keep\"").unwrap();
        assert_eq!(config.optional_policy, OptionalPolicy::Keep);
        assert!(!format!("{config:?}").contains("pepper"));
    }
}
