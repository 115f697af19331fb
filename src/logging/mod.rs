//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - console output filtered by level or `RUST_LOG`
//! - optional JSON log files with rotation
//!
//! Field values never reach the logs; decisions are logged by tag only.
//!
//! # Example
//!
//! ```no_run
//! use veil::logging::init_logging;
//! use veil::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a profile pass
///
/// # Example
///
/// ```no_run
/// use veil::log_profile_start;
///
/// log_profile_start!("1.2.840.10008.5.1.4.1.1.2", true);
/// ```
#[macro_export]
macro_rules! log_profile_start {
    ($object_class:expr, $deidentify:expr) => {
        tracing::info!(
            object_class = %$object_class,
            deidentify = $deidentify,
            "Starting confidentiality profile"
        );
    };
}

/// Log the completion of a profile pass
///
/// # Example
///
/// ```no_run
/// use veil::log_profile_complete;
/// use veil::anonymization::ProfileReport;
/// use std::time::Duration;
///
/// let report = ProfileReport::default();
/// log_profile_complete!(&report, Duration::from_millis(3));
/// ```
#[macro_export]
macro_rules! log_profile_complete {
    ($report:expr, $duration:expr) => {
        tracing::info!(
            records = $report.records_visited,
            emptied = $report.emptied,
            replaced = $report.replaced,
            removed = $report.removed,
            restored = $report.restored,
            unclassified = $report.unclassified,
            warnings = $report.warnings.len(),
            duration_ms = $duration.as_millis() as u64,
            "Confidentiality profile completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use veil::log_error_with_context;
/// use veil::domain::DeidError;
///
/// let error = DeidError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log progress through a file set
#[macro_export]
macro_rules! log_file_progress {
    ($current:expr, $total:expr, $path:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            path = %$path,
            "Processing file"
        );
    };
}
