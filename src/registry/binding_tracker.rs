//! # Binding Tracker
//!
//! Records every deferred lookup made through a proxy so startup code can ask
//! which requested keys were never registered.
//!
//! The audit only sees proxies that already exist when it runs. A proxy built
//! lazily inside an initialiser that has not executed yet is invisible until
//! that code path runs, so an empty report is not proof of completeness.

use super::key::ServiceKey;
use super::service_registry::Registry;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Who asked for a service; informational only
#[derive(Clone)]
pub struct Requester {
    name: String,
    liveness: Option<Weak<dyn Any + Send + Sync>>,
}

impl Requester {
    /// A requester identified only by name, e.g. a module path
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            liveness: None,
        }
    }

    /// A requester whose liveness follows `owner` without keeping it alive
    pub fn tracked<T: Any + Send + Sync>(name: impl Into<String>, owner: &Arc<T>) -> Self {
        let weak: Weak<T> = Arc::downgrade(owner);
        let weak: Weak<dyn Any + Send + Sync> = weak;
        Self {
            name: name.into(),
            liveness: Some(weak),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Named requesters are always alive; tracked ones until their owner drops
    pub fn is_alive(&self) -> bool {
        self.liveness
            .as_ref()
            .map(|weak| weak.strong_count() > 0)
            .unwrap_or(true)
    }
}

impl fmt::Debug for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requester")
            .field("name", &self.name)
            .field("tracked", &self.liveness.is_some())
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.is_alive() {
            f.write_str(" (dropped)")?;
        }
        Ok(())
    }
}

impl From<&str> for Requester {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for Requester {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

/// A (key, requester) pair recorded when a proxy is created
#[derive(Debug, Clone)]
pub struct Binding {
    pub key: ServiceKey,
    pub requester: Requester,
    pub recorded_at: DateTime<Utc>,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} requested by {}", self.key, self.requester)
    }
}

/// Append-only list of bindings
#[derive(Default)]
pub struct BindingTracker {
    bindings: Mutex<Vec<Binding>>,
}

impl BindingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_binding(&self, key: ServiceKey, requester: Requester) {
        debug!(key = %key, requester = %requester.name(), "Recorded service binding");
        self.bindings.lock().push(Binding {
            key,
            requester,
            recorded_at: Utc::now(),
        });
    }

    /// Snapshot of every binding recorded so far
    pub fn bindings(&self) -> Vec<Binding> {
        self.bindings.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.bindings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.lock().is_empty()
    }

    /// Bindings whose key has no registration in `registry` right now
    pub fn unbound_bindings(&self, registry: &Registry) -> Vec<Binding> {
        // Copy out first so the tracker and registry locks are never held together
        let bindings = self.bindings();
        bindings
            .into_iter()
            .filter(|binding| !registry.has(&binding.key))
            .collect()
    }
}

/// Diagnostic listing of unbound bindings, for startup validation
#[derive(Debug, Clone)]
pub struct UnboundReport {
    pub bindings: Vec<Binding>,
}

impl UnboundReport {
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Distinct missing keys, sorted
    pub fn missing_keys(&self) -> Vec<ServiceKey> {
        let mut keys: Vec<ServiceKey> = self.bindings.iter().map(|b| b.key.clone()).collect();
        keys.sort();
        keys.dedup();
        keys
    }
}

impl fmt::Display for UnboundReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "failed to configure all required services. Missing bindings:"
        )?;
        for binding in &self.bindings {
            writeln!(f, "\t{binding}")?;
        }
        Ok(())
    }
}

impl std::error::Error for UnboundReport {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Service;

    #[test]
    fn test_tracker_creation() {
        let tracker = BindingTracker::new();
        assert!(tracker.is_empty());
        assert!(tracker.unbound_bindings(&Registry::new()).is_empty());
    }

    #[test]
    fn test_unbound_until_registered() {
        let tracker = BindingTracker::new();
        let registry = Registry::new();

        tracker.record_binding(ServiceKey::token("logger"), Requester::named("bla"));
        tracker.record_binding(ServiceKey::token("dioculator"), Requester::named("Bla"));

        let unbound = tracker.unbound_bindings(&registry);
        assert_eq!(unbound.len(), 2);

        registry
            .register("logger", Service::instance(String::from("log")))
            .unwrap();
        let unbound = tracker.unbound_bindings(&registry);
        assert_eq!(unbound.len(), 1);
        assert_eq!(unbound[0].key, ServiceKey::token("dioculator"));
        assert_eq!(unbound[0].requester.name(), "Bla");
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_tracked_requester_does_not_keep_owner_alive() {
        let owner = Arc::new(String::from("Dioculator"));
        let requester = Requester::tracked("dioculator::Dioculator", &owner);
        assert!(requester.is_alive());

        drop(owner);
        assert!(!requester.is_alive());
        assert_eq!(requester.to_string(), "dioculator::Dioculator (dropped)");
        assert!(Requester::named("module").is_alive());
    }

    #[test]
    fn test_report_rendering() {
        let tracker = BindingTracker::new();
        tracker.record_binding(ServiceKey::token("frombulator"), Requester::named("dioculator"));
        tracker.record_binding(ServiceKey::token("frombulator"), Requester::named("bla"));

        let report = UnboundReport {
            bindings: tracker.unbound_bindings(&Registry::new()),
        };
        let rendered = report.to_string();
        assert!(rendered.starts_with("failed to configure all required services"));
        assert!(rendered.contains("\t'frombulator' requested by dioculator"));
        assert_eq!(report.missing_keys(), vec![ServiceKey::token("frombulator")]);
    }
}
