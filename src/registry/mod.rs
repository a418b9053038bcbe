//! # Registry Infrastructure
//!
//! Building blocks of the service locator.
//!
//! ## Architecture
//!
//! ```text
//! Registry Infrastructure
//! ├── ReentrantLock     (guards every registry read and write)
//! ├── Registry          (key → service mapping, contract enforcement)
//! ├── BindingTracker    (deferred lookups, unbound-key audit)
//! └── ServiceProxy      (lazy, cached resolution through the registry)
//! ```
//!
//! Most applications go through [`crate::locator`] instead of using these
//! directly.

pub mod binding_tracker;
pub mod contract;
pub mod key;
pub mod lock;
pub mod proxy;
pub mod service;
pub mod service_registry;

// Re-export main types for easy access
pub use binding_tracker::{Binding, BindingTracker, Requester, UnboundReport};
pub use contract::{CapabilityValidator, ContractPolicy, ContractValidator};
pub use key::{Capability, ServiceKey};
pub use lock::ReentrantLock;
pub use proxy::ServiceProxy;
pub use service::{
    ConstructionArgs, Factory, ParamShape, Service, ServiceKind, ServiceObject,
};
pub use service_registry::{Registration, Registry, RegistryStats};
