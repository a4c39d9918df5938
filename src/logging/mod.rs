//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console output
//! - Configurable log levels (`RUST_LOG` wins over the configured level)
//! - JSON-formatted local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use zbx_provision::logging::init_logging;
//! use zbx_provision::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Provisioning started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a provisioning step
///
/// # Example
///
/// ```no_run
/// use zbx_provision::log_step_start;
///
/// log_step_start!("install_package");
/// ```
#[macro_export]
macro_rules! log_step_start {
    ($step:expr) => {
        tracing::info!(step = %$step, "Starting step");
    };
}

/// Log a provisioning step that did not run
///
/// # Example
///
/// ```no_run
/// use zbx_provision::log_step_skipped;
///
/// log_step_skipped!("restart_service", "configuration unchanged");
/// ```
#[macro_export]
macro_rules! log_step_skipped {
    ($step:expr, $reason:expr) => {
        tracing::info!(step = %$step, reason = %$reason, "Skipping step");
    };
}

/// Log the completion of a provisioning run
///
/// # Example
///
/// ```no_run
/// use zbx_provision::log_provision_complete;
/// use std::time::Duration;
///
/// log_provision_complete!(7, Duration::from_secs(12));
/// ```
#[macro_export]
macro_rules! log_provision_complete {
    ($steps:expr, $duration:expr) => {
        tracing::info!(
            steps = $steps,
            duration_ms = $duration.as_millis(),
            "Provisioning completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use zbx_provision::log_error_with_context;
/// use zbx_provision::domain::ProvisionError;
///
/// let error = ProvisionError::Configuration("Invalid config".to_string());
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

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_compile() {
        let error = crate::domain::ProvisionError::Validation("bad".to_string());
        crate::log_step_start!("validate_inputs");
        crate::log_step_skipped!("restart_service", "configuration unchanged");
        crate::log_provision_complete!(3, std::time::Duration::from_millis(5));
        crate::log_error_with_context!(&error, "while testing");
    }
}
