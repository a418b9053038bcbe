//! # Service Proxy
//!
//! A deferred handle to a service. Creating one records a binding but performs
//! no lookup; the first access looks the key up, runs the factory with any
//! captured arguments, and caches the result for every later access.
//!
//! ```text
//! Unresolved { args } ──first access──▶ Resolved(value)
//! ```
//!
//! A proxy is `!Sync`. Resolving the same unresolved proxy from two threads is
//! not supported; share the resolved `Arc<T>` from [`ServiceProxy::get`] instead.

use super::key::ServiceKey;
use super::service::ConstructionArgs;
use super::service_registry::{downcast_object, Registry};
use crate::error::LocatorResult;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

enum ProxyState<T> {
    Unresolved { args: ConstructionArgs },
    Resolved(Arc<T>),
}

/// Lazily resolved service of payload type `T`
pub struct ServiceProxy<T> {
    key: ServiceKey,
    registry: Arc<Registry>,
    state: RefCell<ProxyState<T>>,
}

impl<T: Any + Send + Sync> ServiceProxy<T> {
    pub(crate) fn new(key: ServiceKey, registry: Arc<Registry>) -> Self {
        Self {
            key,
            registry,
            state: RefCell::new(ProxyState::Unresolved {
                args: ConstructionArgs::new(),
            }),
        }
    }

    pub fn key(&self) -> &ServiceKey {
        &self.key
    }

    /// Capture constructor arguments for a factory service. Replaces earlier
    /// arguments; has no effect once the proxy is resolved.
    pub fn invoke(self, args: ConstructionArgs) -> Self {
        match &mut *self.state.borrow_mut() {
            ProxyState::Unresolved { args: captured } => *captured = args,
            ProxyState::Resolved(_) => {
                debug!(key = %self.key, "Ignoring arguments for already resolved proxy");
            }
        }
        self
    }

    pub fn is_resolved(&self) -> bool {
        matches!(*self.state.borrow(), ProxyState::Resolved(_))
    }

    /// Resolve if needed and share the service
    pub fn get(&self) -> LocatorResult<Arc<T>> {
        self.resolve()
    }

    /// Resolve if needed and run `f` against the service
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> LocatorResult<R> {
        let service = self.resolve()?;
        Ok(f(&service))
    }

    fn resolve(&self) -> LocatorResult<Arc<T>> {
        let args = match &*self.state.borrow() {
            ProxyState::Resolved(value) => return Ok(Arc::clone(value)),
            ProxyState::Unresolved { args } => args.clone(),
        };

        // Failures leave the proxy unresolved with its arguments intact
        let service = self.registry.lookup(&self.key)?;
        let object = service.construct(&self.key, &args)?;
        let value = downcast_object::<T>(&self.key, object)?;

        *self.state.borrow_mut() = ProxyState::Resolved(Arc::clone(&value));
        debug!(key = %self.key, service = service.type_name(), "Proxy resolved");
        Ok(value)
    }
}

impl<T> fmt::Debug for ServiceProxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.borrow() {
            ProxyState::Unresolved { .. } => "unresolved",
            ProxyState::Resolved(_) => "resolved",
        };
        f.debug_struct("ServiceProxy")
            .field("key", &self.key)
            .field("state", &state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LocatorError;
    use crate::registry::{ParamShape, Service};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Frombulator {
        name: String,
    }

    fn counting_factory(counter: Arc<AtomicUsize>) -> Service {
        Service::factory_with(ParamShape::none().optional("name"), move |args| {
            counter.fetch_add(1, Ordering::SeqCst);
            let name = args
                .param::<&str>("name", 0)
                .unwrap_or(&"myfrombulator")
                .to_string();
            Ok(Frombulator { name })
        })
    }

    #[test]
    fn test_proxy_before_registration() {
        let registry = Arc::new(Registry::new());
        let proxy: ServiceProxy<String> =
            ServiceProxy::new(ServiceKey::token("greeting"), Arc::clone(&registry));
        assert!(!proxy.is_resolved());

        registry
            .register("greeting", Service::instance(String::from("hello")))
            .unwrap();
        assert_eq!(proxy.with(|s| s.len()).unwrap(), 5);
        assert!(proxy.is_resolved());
    }

    #[test]
    fn test_factory_constructed_once() {
        let registry = Arc::new(Registry::new());
        let counter = Arc::new(AtomicUsize::new(0));
        registry
            .register("frombulator", counting_factory(Arc::clone(&counter)))
            .unwrap();

        let proxy: ServiceProxy<Frombulator> =
            ServiceProxy::new(ServiceKey::token("frombulator"), registry)
                .invoke(ConstructionArgs::new().arg("mark-ii"));

        assert_eq!(proxy.with(|f| f.name.clone()).unwrap(), "mark-ii");
        assert_eq!(proxy.with(|f| f.name.clone()).unwrap(), "mark-ii");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invoke_overwrites_arguments() {
        let registry = Arc::new(Registry::new());
        registry
            .register("frombulator", counting_factory(Arc::new(AtomicUsize::new(0))))
            .unwrap();

        let proxy: ServiceProxy<Frombulator> =
            ServiceProxy::new(ServiceKey::token("frombulator"), registry)
                .invoke(ConstructionArgs::new().arg("first"))
                .invoke(ConstructionArgs::new().arg("second"));
        assert_eq!(proxy.get().unwrap().name, "second");
    }

    #[test]
    fn test_missing_service_propagates_and_stays_unresolved() {
        let registry = Arc::new(Registry::new());
        let proxy: ServiceProxy<Frombulator> =
            ServiceProxy::new(ServiceKey::token("frombulator"), Arc::clone(&registry))
                .invoke(ConstructionArgs::new().arg("late"));

        assert!(proxy.get().unwrap_err().is_not_found());
        assert!(!proxy.is_resolved());

        registry
            .register("frombulator", counting_factory(Arc::new(AtomicUsize::new(0))))
            .unwrap();
        assert_eq!(proxy.get().unwrap().name, "late");
    }

    #[test]
    fn test_constructor_errors_propagate() {
        let registry = Arc::new(Registry::new());
        registry
            .register("broken", Service::factory::<u8, _>(|| Err("jammed".into())))
            .unwrap();

        let proxy: ServiceProxy<u8> = ServiceProxy::new(ServiceKey::token("broken"), registry);
        assert!(matches!(
            proxy.get(),
            Err(LocatorError::Construction { .. })
        ));
    }

    #[test]
    fn test_instance_resolution_shares_allocation() {
        let registry = Arc::new(Registry::new());
        let shared = Arc::new(String::from("shared"));
        registry
            .register("shared", Service::from_shared(Arc::clone(&shared)))
            .unwrap();

        let proxy: ServiceProxy<String> = ServiceProxy::new(ServiceKey::token("shared"), registry);
        assert!(Arc::ptr_eq(&proxy.get().unwrap(), &shared));
    }
}
