//! Configuration Loader
//!
//! Layers an optional configuration file under `LOCATOR__*` environment
//! variables using the `config` crate. Nested fields use a double underscore:
//! `LOCATOR__CONTRACT__KEY_IS_SUPERTYPE=true`.

use super::LocatorConfig;
use crate::error::LocatorResult;
use crate::registry::ContractPolicy;
use config::{Config, Environment, File};
use std::path::PathBuf;
use tracing::debug;

const ENV_PREFIX: &str = "LOCATOR";

pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_prefix: String,
    contract_defaults: Option<ContractPolicy>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: ENV_PREFIX.to_string(),
            contract_defaults: None,
        }
    }

    /// Read this file if it exists; the extension may be omitted
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Use a different environment prefix, mainly for isolated tests
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Application default for `[contract]`; the file and environment still override it
    pub fn with_contract_defaults(mut self, policy: ContractPolicy) -> Self {
        self.contract_defaults = Some(policy);
        self
    }

    pub fn load(&self) -> LocatorResult<LocatorConfig> {
        let mut builder = Config::builder();

        if let Some(policy) = &self.contract_defaults {
            builder = builder
                .set_default("contract.key_is_supertype", policy.key_is_supertype)?
                .set_default("contract.allow_instances", policy.allow_instances)?;
        }

        if let Some(file) = &self.file {
            debug!(file = %file.display(), "Loading locator configuration file");
            builder = builder.add_source(File::from(file.as_path()).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: LocatorConfig = settings.try_deserialize()?;
        debug!(?config, "Locator configuration loaded");
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        let config = ConfigLoader::new()
            .with_env_prefix("LOCATOR_LOADER_TEST_NONE")
            .load()
            .unwrap();
        assert_eq!(config, LocatorConfig::default());
        assert!(config.validation.fail_on_unbound);
        assert!(config.contract.allow_instances);
    }

    #[test]
    fn test_contract_defaults_apply_without_sources() {
        let config = ConfigLoader::new()
            .with_contract_defaults(ContractPolicy::enforced().factories_only())
            .with_env_prefix("LOCATOR_LOADER_TEST_DEFAULTS")
            .load()
            .unwrap();
        assert_eq!(config.contract, ContractPolicy::enforced().factories_only());
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let config = ConfigLoader::new()
            .with_file("/nonexistent/locator.toml")
            .with_env_prefix("LOCATOR_LOADER_TEST_MISSING")
            .load()
            .unwrap();
        assert!(!config.contract.key_is_supertype);
    }
}
