//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Veil configuration file.

use crate::anonymization::UsageResolver;
use crate::config::load_config;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading applies environment overrides and validates
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let tables = match config.profile.usage_tables {
            Some(ref path) => UsageResolver::from_file(path),
            None => UsageResolver::basic_profile(),
        };
        if let Err(e) = tables {
            println!("❌ Usage tables could not be loaded");
            println!("   Error: {e}");
            println!();
            return Ok(2);
        }

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Optional Policy: {}", config.profile.optional_policy);
        println!(
            "  Object Class: {}",
            config
                .profile
                .object_class
                .as_deref()
                .unwrap_or("(from each record)")
        );
        println!(
            "  Usage Tables: {}",
            config
                .profile
                .usage_tables
                .as_ref()
                .map_or_else(|| "built-in".to_string(), |p| p.display().to_string())
        );
        let salted = config
            .profile
            .salt
            .as_ref()
            .is_some_and(|s| !s.expose_secret().is_empty());
        println!("  Pseudonym Salt: {}", if salted { "set" } else { "not set" });
        if config.audit.enabled {
            println!("  Audit Log: {}", config.audit.log_path.display());
        } else {
            println!("  Audit Log: disabled");
        }
        if config.logging.local_enabled {
            println!(
                "  Log Files: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        }
        println!();
        Ok(0)
    }
}
