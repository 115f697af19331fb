//! Configuration management for Veil.
//!
//! # Overview
//!
//! Veil reads an optional TOML file (`veil.toml`) with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `VEIL_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use veil::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("veil.toml")?;
//! println!("Optional fields: {}", config.profile.optional_policy);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`ProfileConfig`] - optional policy, object class override, pseudonym salt, usage tables
//! - [`AuditConfig`] - audit trail
//! - [`LoggingConfig`] - log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [profile]
//! optional_policy = "remove"
//! salt = "${VEIL_PSEUDONYM_SALT}"
//!
//! [audit]
//! enabled = true
//! log_path = "./audit/deidentification.log"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use crate::anonymization::config::{AuditConfig, OptionalPolicy, ProfileConfig};
pub use loader::{load_config, load_defaults};
pub use schema::{ApplicationConfig, LoggingConfig, VeilConfig};
pub use secret::{secret_string, SecretString, SecretValue};
