//! # Locator Configuration
//!
//! Startup settings for the process-wide locator: contract mode, logging, and
//! how strictly the unbound-binding audit is treated. Every field has a
//! default, so an absent file yields a working configuration.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use service_locator::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads locator.toml (if present) then LOCATOR__* environment overrides
//! let config = ConfigLoader::new().with_file("locator").load()?;
//! println!("contract mode: {}", config.contract.key_is_supertype);
//! # Ok(())
//! # }
//! ```

pub mod loader;

use crate::registry::ContractPolicy;
use serde::{Deserialize, Serialize};

pub use loader::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Contract enforcement applied to registrations
    pub contract: ContractPolicy,

    pub logging: LoggingConfig,

    /// Startup binding audit
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive overriding the environment default, e.g. `"info"`
    pub level: Option<String>,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Treat unbound bindings at startup as fatal
    pub fail_on_unbound: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            fail_on_unbound: true,
        }
    }
}
