//! # Service Locator
//!
//! [`ServiceLocator`] pairs a [`Registry`] with a [`BindingTracker`]. The
//! free functions in this module are the process-wide entry points: they
//! forward to one locator installed at startup with [`install`], or to a
//! default one created on first use.
//!
//! ## Usage
//!
//! ```rust
//! use service_locator::locator;
//! use service_locator::registry::{Service, ServiceKey};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn info(&self, msg: &str) -> String;
//! }
//!
//! struct PlainLogger;
//! impl Logger for PlainLogger {
//!     fn info(&self, msg: &str) -> String {
//!         format!("INFO  | {msg}")
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Consumers may ask for the proxy before anything is registered
//! let logger = locator::make_proxy::<Arc<dyn Logger>>(ServiceKey::of::<dyn Logger>(), "docs");
//!
//! locator::register(
//!     ServiceKey::of::<dyn Logger>(),
//!     Service::implementing::<dyn Logger>(Arc::new(PlainLogger)),
//! )?;
//! locator::validate()?;
//!
//! assert_eq!(logger.with(|l| l.info("ready"))?, "INFO  | ready");
//! # Ok(())
//! # }
//! ```

use crate::config::LocatorConfig;
use crate::error::{LocatorError, LocatorResult};
use crate::logging::log_registry_operation;
use crate::registry::{
    Binding, BindingTracker, ContractPolicy, ContractValidator, Registry, RegistryStats,
    Requester, Service, ServiceKey, ServiceProxy, UnboundReport,
};
use std::any::Any;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Registry plus binding tracker; one instance normally lives for the whole process
pub struct ServiceLocator {
    registry: Arc<Registry>,
    tracker: BindingTracker,
}

impl ServiceLocator {
    pub fn new() -> Self {
        Self::with_policy(ContractPolicy::disabled())
    }

    pub fn with_policy(policy: ContractPolicy) -> Self {
        Self {
            registry: Arc::new(Registry::with_policy(policy)),
            tracker: BindingTracker::new(),
        }
    }

    pub fn from_config(config: &LocatorConfig) -> Self {
        Self::with_policy(config.contract)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tracker(&self) -> &BindingTracker {
        &self.tracker
    }

    pub fn configure(&self, contract_mode: bool) {
        self.registry.configure(contract_mode);
    }

    pub fn configure_with(&self, policy: ContractPolicy) {
        self.registry.configure_with(policy);
    }

    pub fn set_validator(&self, validator: impl ContractValidator + 'static) {
        self.registry.set_validator(validator);
    }

    pub fn register(&self, key: impl Into<ServiceKey>, service: Service) -> LocatorResult<()> {
        self.registry.register(key, service)
    }

    pub fn lookup(&self, key: &ServiceKey) -> LocatorResult<Service> {
        self.registry.lookup(key)
    }

    pub fn resolve_as<T: Any + Send + Sync>(&self, key: &ServiceKey) -> LocatorResult<Arc<T>> {
        self.registry.resolve_as(key)
    }

    pub fn has(&self, key: &ServiceKey) -> bool {
        self.registry.has(key)
    }

    pub fn list_keys(&self) -> Vec<ServiceKey> {
        self.registry.list_keys()
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    /// Deferred handle to `key`; the binding is recorded now, the lookup happens on first use.
    ///
    /// A malformed key is never recorded since no registration can satisfy it;
    /// the proxy reports `MisconfiguredKey` on first access instead.
    pub fn make_proxy<T: Any + Send + Sync>(
        &self,
        key: impl Into<ServiceKey>,
        requester: impl Into<Requester>,
    ) -> ServiceProxy<T> {
        let key = key.into();
        let requester = requester.into();
        match key.validate() {
            Ok(()) => self.tracker.record_binding(key.clone(), requester),
            Err(err) => warn!(
                key = %key,
                requester = %requester,
                error = %err,
                "Proxy requested with misconfigured key, binding not recorded"
            ),
        }
        ServiceProxy::new(key, Arc::clone(&self.registry))
    }

    pub fn unbound_bindings(&self) -> Vec<Binding> {
        self.tracker.unbound_bindings(&self.registry)
    }

    /// Startup audit: `Err` lists every binding whose key is still unregistered
    pub fn validate(&self) -> Result<(), UnboundReport> {
        let bindings = self.unbound_bindings();
        if bindings.is_empty() {
            info!(
                bindings = self.tracker.len(),
                services = self.registry.stats().total_services,
                "All service bindings resolved"
            );
            return Ok(());
        }

        for binding in &bindings {
            log_registry_operation(
                "validate",
                &binding.key,
                Some(binding.requester.name()),
                "unbound",
                None,
            );
        }
        warn!(unbound = bindings.len(), "Service bindings left unbound");
        Err(UnboundReport { bindings })
    }
}

impl Default for ServiceLocator {
    fn default() -> Self {
        Self::new()
    }
}

static PROCESS_LOCATOR: OnceLock<ServiceLocator> = OnceLock::new();

/// Install the process-wide locator. Must run before any other function in
/// this module touches the default one.
pub fn install(locator: ServiceLocator) -> LocatorResult<&'static ServiceLocator> {
    PROCESS_LOCATOR
        .set(locator)
        .map_err(|_| LocatorError::AlreadyInstalled)?;
    Ok(global())
}

/// The process-wide locator, created with defaults if none was installed
pub fn global() -> &'static ServiceLocator {
    PROCESS_LOCATOR.get_or_init(ServiceLocator::new)
}

pub fn configure(contract_mode: bool) {
    global().configure(contract_mode);
}

pub fn configure_with(policy: ContractPolicy) {
    global().configure_with(policy);
}

pub fn register(key: impl Into<ServiceKey>, service: Service) -> LocatorResult<()> {
    global().register(key, service)
}

pub fn lookup(key: &ServiceKey) -> LocatorResult<Service> {
    global().lookup(key)
}

pub fn resolve_as<T: Any + Send + Sync>(key: &ServiceKey) -> LocatorResult<Arc<T>> {
    global().resolve_as(key)
}

pub fn has(key: &ServiceKey) -> bool {
    global().has(key)
}

pub fn list_keys() -> Vec<ServiceKey> {
    global().list_keys()
}

pub fn make_proxy<T: Any + Send + Sync>(
    key: impl Into<ServiceKey>,
    requester: impl Into<Requester>,
) -> ServiceProxy<T> {
    global().make_proxy(key, requester)
}

pub fn unbound_bindings() -> Vec<Binding> {
    global().unbound_bindings()
}

pub fn validate() -> Result<(), UnboundReport> {
    global().validate()
}
