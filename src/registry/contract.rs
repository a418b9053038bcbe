//! # Contract Enforcement
//!
//! With contract mode on, a registration must satisfy the relationship its
//! key declares: an instance must provide the key's capability, and a factory
//! must produce something that does. Rust has no runtime subtype query, so the
//! check is a pluggable [`ContractValidator`]; the default one compares the
//! capabilities a [`Service`] carries against the key. Capabilities are only
//! attached by [`Service::implementing`] and [`Service::factory_of`], whose
//! signatures make the compiler prove the payload is an `Arc<C>`.

use super::key::ServiceKey;
use super::service::{Service, ServiceKind};
use serde::{Deserialize, Serialize};

/// Contract settings applied by `register`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractPolicy {
    /// Require the key to be a capability the service provides
    pub key_is_supertype: bool,
    /// With contract mode on, allow ready-made instances (otherwise factories only)
    pub allow_instances: bool,
}

impl ContractPolicy {
    pub fn disabled() -> Self {
        Self {
            key_is_supertype: false,
            allow_instances: true,
        }
    }

    pub fn enforced() -> Self {
        Self {
            key_is_supertype: true,
            allow_instances: true,
        }
    }

    pub fn factories_only(mut self) -> Self {
        self.allow_instances = false;
        self
    }
}

impl Default for ContractPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Decides whether `service` may be registered under `key` in contract mode
pub trait ContractValidator: Send + Sync {
    fn check(&self, key: &ServiceKey, service: &Service) -> Result<(), String>;
}

impl<F> ContractValidator for F
where
    F: Fn(&ServiceKey, &Service) -> Result<(), String> + Send + Sync,
{
    fn check(&self, key: &ServiceKey, service: &Service) -> Result<(), String> {
        self(key, service)
    }
}

/// Default validator: the key must be a capability the service declares
#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilityValidator;

impl ContractValidator for CapabilityValidator {
    fn check(&self, key: &ServiceKey, service: &Service) -> Result<(), String> {
        let Some(capability) = key.as_capability() else {
            return Err(format!(
                "contract mode requires a capability key, got token {key}"
            ));
        };

        if service.provides_capability(capability) {
            return Ok(());
        }

        match service.kind() {
            ServiceKind::Instance(_) => Err(format!(
                "instance of {} does not provide {capability}",
                service.type_name()
            )),
            ServiceKind::Factory(_) => Err(format!(
                "factory for {} does not produce a subtype of {capability}",
                service.type_name()
            )),
        }
    }
}
