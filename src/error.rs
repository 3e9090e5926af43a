//! Error types for the cockpit core.
//!
//! Errors fall into two groups:
//!
//! - **Startup errors** (configuration, missing hardware, config file access)
//!   are fatal. A cockpit that hits one at boot halts and ignores every
//!   subsequent tick.
//! - **Runtime errors** (malformed race data, unreadable persisted state,
//!   garbage address payloads) never escape a tick. They are logged and the
//!   previous state is kept. Car bus failures in the async driver are
//!   retried until too many happen in a row.
//!
//! ```rust
//! use cockpit::CockpitError;
//!
//! let error = CockpitError::missing_hardware("gyroscope");
//! assert!(error.is_fatal());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cockpit operations.
pub type Result<T, E = CockpitError> = std::result::Result<T, E>;

/// Main error type for cockpit operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CockpitError {
    #[error("Invalid configuration for '{field}': {reason}")]
    Config { field: String, reason: String },

    #[error("Required hardware missing: {component}")]
    MissingHardware { component: String },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Config file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config YAML error")]
    Yaml {
        #[from]
        source: serde_yaml_ng::Error,
    },

    #[error("Cockpit halted: {reason}")]
    Halted { reason: String },

    #[error("Car bus error: {details}")]
    Bus { details: String },
}

impl CockpitError {
    /// Returns whether this error stops the cockpit from ticking.
    pub fn is_fatal(&self) -> bool {
        match self {
            CockpitError::Config { .. } => true,
            CockpitError::MissingHardware { .. } => true,
            CockpitError::File { .. } => true,
            CockpitError::Yaml { .. } => true,
            CockpitError::Halted { .. } => true,
            CockpitError::Parse { .. } => false,
            CockpitError::Bus { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            CockpitError::Config { .. } => vec![
                "Check the driver number is between 1 and 99",
                "Use a three letter team tag or leave it empty",
                "Make sure all timing values are positive",
            ],
            CockpitError::MissingHardware { .. } => vec![
                "Check the car has exactly four wheel suspensions",
                "Add a cockpit or remote control block",
                "Create the brakelight group and add at least one gyroscope",
                "Install an antenna for race control communication",
            ],
            CockpitError::Parse { .. } => vec![
                "Check race control and car run compatible versions",
                "Wait for the next race data message",
            ],
            CockpitError::File { .. } => vec![
                "Check the config file exists and is readable",
                "Check file permissions",
            ],
            CockpitError::Yaml { .. } => vec![
                "Check the config file is valid YAML",
                "Compare field names against the documented config sections",
            ],
            CockpitError::Halted { .. } => vec![
                "Fix the startup error reported at boot",
                "Recompile or restart the cockpit",
            ],
            CockpitError::Bus { .. } => vec![
                "Check the wiring layer is still attached to the car",
                "Transient bus errors are retried with backoff",
            ],
        }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CockpitError::Config { field: field.into(), reason: reason.into() }
    }

    /// Helper constructor for missing hardware.
    pub fn missing_hardware(component: impl Into<String>) -> Self {
        CockpitError::MissingHardware { component: component.into() }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        CockpitError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for car bus failures.
    pub fn bus_error(details: impl Into<String>) -> Self {
        CockpitError::Bus { details: details.into() }
    }

    /// Helper constructor for config file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        CockpitError::File { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn error_messages_carry_their_context(
            field in "\\w+",
            reason in ".*",
            component in "[a-zA-Z ]+",
            details in ".*"
        ) {
            let config = CockpitError::config_error(field.clone(), reason.clone());
            let hardware = CockpitError::missing_hardware(component.clone());
            let parse = CockpitError::parse_error("RaceData", details.clone());

            let config_msg = config.to_string();
            prop_assert!(config_msg.contains(&field));
            prop_assert!(config_msg.contains(&reason));
            prop_assert!(hardware.to_string().contains(&component));
            prop_assert!(parse.to_string().contains(&details));
            prop_assert!(parse.to_string().contains("RaceData"));
        }
    }

    #[test]
    fn startup_errors_are_fatal() {
        assert!(CockpitError::config_error("driver.number", "out of range").is_fatal());
        assert!(CockpitError::missing_hardware("antenna").is_fatal());
        assert!(
            CockpitError::file_error(
                PathBuf::from("/cockpit.yaml"),
                std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            )
            .is_fatal()
        );
        assert!(!CockpitError::parse_error("RaceData", "bad int").is_fatal());
        assert!(!CockpitError::bus_error("read timed out").is_fatal());
    }

    #[test]
    fn every_error_has_suggestions() {
        let errors = [
            CockpitError::config_error("seed", "bad"),
            CockpitError::missing_hardware("gyroscope"),
            CockpitError::parse_error("address", "not a number"),
            CockpitError::Halted { reason: "no controller".to_string() },
            CockpitError::bus_error("disconnected"),
        ];

        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<CockpitError>();

        let error = CockpitError::missing_hardware("controller");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn yaml_errors_convert() {
        let yaml_err = serde_yaml_ng::from_str::<u32>("not: [a number").unwrap_err();
        let err: CockpitError = yaml_err.into();
        assert!(matches!(err, CockpitError::Yaml { .. }));
    }
}
