//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "veil.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Veil configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Put the pseudonym salt in a .env file:");
                println!("     VEIL_PROFILE_SALT=<random secret>");
                println!("  3. Validate configuration: veil validate-config");
                println!("  4. Run: veil deidentify --input record.json --output-dir out");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Commented default configuration
    fn generate_config() -> String {
        r#"# Veil Configuration File
# Attribute-level de-identification of DICOM-style records
#
# Every value may reference environment variables as ${VAR}; VEIL_* variables
# (e.g. VEIL_PROFILE_OPTIONAL_POLICY) override the file after it is read.

[application]
# trace | debug | info | warn | error
log_level = "info"

[profile]
# What happens to fields the profile lists as optional:
#   remove - delete the element
#   empty  - keep the element with a zero-length value
#   keep   - leave it untouched
optional_policy = "remove"

# Object class (SOP Class UID) used for every record instead of the one
# each record carries in (0008,0016)
# object_class = "1.2.840.10008.5.1.4.1.1.2"

# Secret mixed into every pseudonym. Without it pseudonyms can be recomputed
# by anyone holding the original value. VEIL_PROFILE_SALT sets it as well.
# salt = "${VEIL_PROFILE_SALT}"

# Usage table file replacing the built-in basic profile table
# usage_tables = "./tables/site_profile.toml"

[audit]
# One line per protected field (tag, keyword, action; never values)
enabled = false
log_path = "./audit/deidentification.log"
json_format = true

[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "./logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VeilConfig;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "veil.toml".to_string(),
            force: false,
        };

        assert_eq!(args.output, "veil.toml");
        assert!(!args.force);
    }

    #[test]
    fn test_generated_config_parses() {
        let config: VeilConfig = toml::from_str(&InitArgs::generate_config()).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.profile.salt.is_none());
        assert!(!config.audit.enabled);
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("veil.toml");
        fs::write(&path, "# mine").unwrap();

        let args = InitArgs {
            output: path.to_str().unwrap().to_string(),
            force: false,
        };
        assert_eq!(args.execute().unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().unwrap(), 0);
        assert!(fs::read_to_string(&path).unwrap().contains("[profile]"));
    }
}
