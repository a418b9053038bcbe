//! # Locator Error Types
//!
//! Structured error handling for the service locator using thiserror.
//! Nothing in the registry swallows these: callers decide whether a missing
//! or invalid service is fatal.

use crate::registry::ServiceKey;
use thiserror::Error;

/// Boxed error returned by service factories
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by registry, proxy and configuration operations
#[derive(Error, Debug)]
pub enum LocatorError {
    /// No service is registered under the key
    #[error("Service not found: {key}")]
    NotFound { key: ServiceKey },

    /// Contract mode rejected the registration; the registry is unchanged
    #[error("Contract violation registering {key}: {reason}")]
    ContractViolation { key: ServiceKey, reason: String },

    /// The key cannot be used as a registry key
    #[error("Misconfigured service key: {reason}")]
    MisconfiguredKey { reason: String },

    /// The resolved service is not of the requested Rust type
    #[error("Service {key} is not a {expected}")]
    TypeMismatch {
        key: ServiceKey,
        expected: &'static str,
    },

    /// Captured construction arguments do not fit the factory's parameters
    #[error("Argument mismatch constructing {key}: {reason}")]
    ArgumentMismatch { key: ServiceKey, reason: String },

    /// The factory itself failed
    #[error("Failed to construct {key}: {source}")]
    Construction {
        key: ServiceKey,
        #[source]
        source: BoxError,
    },

    /// The process-wide locator was installed more than once
    #[error("A process-wide service locator is already installed")]
    AlreadyInstalled,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LocatorError {
    pub fn not_found(key: &ServiceKey) -> Self {
        Self::NotFound { key: key.clone() }
    }

    pub fn contract_violation(key: &ServiceKey, reason: impl Into<String>) -> Self {
        Self::ContractViolation {
            key: key.clone(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }
}

impl From<config::ConfigError> for LocatorError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type LocatorResult<T> = std::result::Result<T, LocatorError>;
