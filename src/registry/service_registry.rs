//! # Service Registry
//!
//! Thread-safe key → service mapping with optional contract enforcement.
//!
//! ## Key Features
//!
//! - **One re-entrant lock** guards the mapping and the contract settings
//! - **Atomic check-then-insert**: the contract check and the insert share one
//!   lock acquisition, and a rejected registration leaves the mapping untouched
//! - **Last write wins**: registering an existing key overwrites it
//! - **Snapshot reads**: `list_keys` copies the keys out
//!
//! ## Usage
//!
//! ```rust
//! use service_locator::registry::{Registry, Service, ServiceKey};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new();
//! registry.register("greeting", Service::instance(String::from("hello")))?;
//!
//! let greeting = registry.resolve_as::<String>(&ServiceKey::token("greeting"))?;
//! assert_eq!(greeting.as_str(), "hello");
//! # Ok(())
//! # }
//! ```

use super::contract::{CapabilityValidator, ContractPolicy, ContractValidator};
use super::key::ServiceKey;
use super::lock::ReentrantLock;
use super::service::{ConstructionArgs, Service, ServiceKind, ServiceObject};
use crate::error::{LocatorError, LocatorResult};
use chrono::{DateTime, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A stored service with bookkeeping
#[derive(Debug, Clone)]
pub struct Registration {
    pub key: ServiceKey,
    pub service: Service,
    pub registered_at: DateTime<Utc>,
}

/// Registry statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_services: usize,
    pub instances: usize,
    pub factories: usize,
    pub contract_mode: bool,
}

struct RegistryState {
    services: HashMap<ServiceKey, Registration>,
    policy: ContractPolicy,
    validator: Arc<dyn ContractValidator>,
}

/// Mapping from [`ServiceKey`] to [`Service`]
pub struct Registry {
    state: ReentrantLock<RegistryState>,
}

impl Registry {
    /// Create an empty registry with contract mode off
    pub fn new() -> Self {
        Self::with_policy(ContractPolicy::disabled())
    }

    pub fn with_policy(policy: ContractPolicy) -> Self {
        Self {
            state: ReentrantLock::new(RegistryState {
                services: HashMap::new(),
                policy,
                validator: Arc::new(CapabilityValidator),
            }),
        }
    }

    /// Toggle contract mode; affects only later registrations
    pub fn configure(&self, contract_mode: bool) {
        self.state.write(|state| state.policy.key_is_supertype = contract_mode);
        info!(contract_mode, "Registry contract mode configured");
    }

    /// Replace both contract settings at once
    pub fn configure_with(&self, policy: ContractPolicy) {
        self.state.write(|state| state.policy = policy);
        info!(
            contract_mode = policy.key_is_supertype,
            allow_instances = policy.allow_instances,
            "Registry contract policy configured"
        );
    }

    /// Swap in a different contract validator
    pub fn set_validator(&self, validator: impl ContractValidator + 'static) {
        self.state
            .write(|state| state.validator = Arc::new(validator));
    }

    pub fn policy(&self) -> ContractPolicy {
        self.state.read(|state| state.policy)
    }

    /// Register `service` under `key`, overwriting any previous mapping
    pub fn register(&self, key: impl Into<ServiceKey>, service: Service) -> LocatorResult<()> {
        let key = key.into();
        key.validate()?;

        self.state.enter(|section| {
            let (policy, validator) =
                section.read(|state| (state.policy, Arc::clone(&state.validator)));

            if policy.key_is_supertype {
                let verdict = if !policy.allow_instances && !service.is_factory() {
                    Err(format!(
                        "instances are not allowed in contract mode, got {}",
                        service.type_name()
                    ))
                } else {
                    // The validator may re-enter the registry; no borrow is held here
                    validator.check(&key, &service)
                };

                if let Err(reason) = verdict {
                    warn!(key = %key, reason = %reason, "❌ Contract violation, registration rejected");
                    return Err(LocatorError::contract_violation(&key, reason));
                }
            }

            let type_name = service.type_name();
            let registration = Registration {
                key: key.clone(),
                service,
                registered_at: Utc::now(),
            };
            let previous = section.write(|state| state.services.insert(key.clone(), registration));

            match previous {
                Some(previous) => warn!(
                    key = %key,
                    previous = previous.service.type_name(),
                    replacement = type_name,
                    "Service registration overwritten"
                ),
                None => info!(key = %key, service = type_name, "Registered service"),
            }
            Ok(())
        })
    }

    /// Fetch the service registered under `key`
    pub fn lookup(&self, key: &ServiceKey) -> LocatorResult<Service> {
        key.validate()?;
        let service = self
            .state
            .read(|state| state.services.get(key).map(|r| r.service.clone()));

        match service {
            Some(service) => {
                debug!(key = %key, "Service lookup hit");
                Ok(service)
            }
            None => {
                debug!(key = %key, "Service lookup miss");
                Err(LocatorError::not_found(key))
            }
        }
    }

    /// Look up `key` and produce a `T`: instances are shared, factories are
    /// invoked with no arguments
    pub fn resolve_as<T: Any + Send + Sync>(&self, key: &ServiceKey) -> LocatorResult<Arc<T>> {
        let service = self.lookup(key)?;
        let object = service.construct(key, &ConstructionArgs::new())?;
        downcast_object(key, object)
    }

    pub fn has(&self, key: &ServiceKey) -> bool {
        self.state.read(|state| state.services.contains_key(key))
    }

    /// Snapshot of the registered keys, sorted
    pub fn list_keys(&self) -> Vec<ServiceKey> {
        let mut keys: Vec<ServiceKey> =
            self.state.read(|state| state.services.keys().cloned().collect());
        keys.sort();
        keys
    }

    /// Snapshot of every registration, sorted by key
    pub fn registrations(&self) -> Vec<Registration> {
        let mut registrations: Vec<Registration> =
            self.state.read(|state| state.services.values().cloned().collect());
        registrations.sort_by(|a, b| a.key.cmp(&b.key));
        registrations
    }

    pub fn stats(&self) -> RegistryStats {
        self.state.read(|state| {
            let mut stats = RegistryStats {
                contract_mode: state.policy.key_is_supertype,
                ..RegistryStats::default()
            };
            for registration in state.services.values() {
                stats.total_services += 1;
                match registration.service.kind() {
                    ServiceKind::Instance(_) => stats.instances += 1,
                    ServiceKind::Factory(_) => stats.factories += 1,
                }
            }
            stats
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn downcast_object<T: Any + Send + Sync>(
    key: &ServiceKey,
    object: ServiceObject,
) -> LocatorResult<Arc<T>> {
    object
        .downcast::<T>()
        .map_err(|_| LocatorError::TypeMismatch {
            key: key.clone(),
            expected: std::any::type_name::<T>(),
        })
}
