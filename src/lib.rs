#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

//! # Service Locator
//!
//! A process-wide service registry that decouples constructing a component
//! from using it.
//!
//! ## Overview
//!
//! Producers register a concrete implementation under a key. Consumers
//! anywhere in the program retrieve it later, either directly or through a
//! [`ServiceProxy`] that can be created before the service is registered and
//! resolves itself on first use.
//!
//! ## Key Features
//!
//! - **Thread-safe registry** behind a single re-entrant lock
//! - **Contract mode**: optionally require every service to provide the
//!   capability its key names, checked atomically at registration
//! - **Deferred proxies** that cache their resolution and can carry factory
//!   arguments
//! - **Startup audit** listing every proxied key that was never registered
//!
//! ## Module Organization
//!
//! - [`registry`] - Lock, registry, binding tracker, proxy
//! - [`locator`] - Locator object and process-wide functions
//! - [`config`] - Configuration loading
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use service_locator::{Service, ServiceLocator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let locator = ServiceLocator::new();
//! let greeting = locator.make_proxy::<String>("greeting", "quick_start");
//!
//! locator.register("greeting", Service::instance(String::from("hello")))?;
//! locator.validate()?;
//!
//! assert_eq!(greeting.with(|g| g.to_uppercase())?, "HELLO");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod locator;
pub mod logging;
pub mod registry;

pub use config::{ConfigLoader, LocatorConfig};
pub use error::{BoxError, LocatorError, LocatorResult};
pub use locator::ServiceLocator;
pub use registry::{
    Binding, Capability, ConstructionArgs, ContractPolicy, ContractValidator, ParamShape,
    Registry, Requester, Service, ServiceKey, ServiceProxy, UnboundReport,
};
