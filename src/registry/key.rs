//! # Service Keys
//!
//! Keys come in two shapes: free-form string tokens, and capability
//! identifiers derived from a Rust type (usually a trait object such as
//! `dyn Logger`). Capability keys are what contract mode checks against.

use crate::error::{LocatorError, LocatorResult};
use std::any::TypeId;
use std::fmt;

/// Identifier for an abstract capability a service can provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capability {
    type_id: TypeId,
    name: &'static str,
}

impl Capability {
    /// Capability identified by `T`, typically `dyn SomeTrait`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Key under which a service is registered
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceKey {
    /// String token chosen by the application, e.g. `"logger"`
    Token(String),
    /// Abstract capability, e.g. `ServiceKey::of::<dyn Logger>()`
    Capability(Capability),
}

impl ServiceKey {
    pub fn token(name: impl Into<String>) -> Self {
        Self::Token(name.into())
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Capability(Capability::of::<T>())
    }

    pub fn as_capability(&self) -> Option<&Capability> {
        match self {
            Self::Capability(capability) => Some(capability),
            Self::Token(_) => None,
        }
    }

    /// Reject keys that cannot address a service
    pub fn validate(&self) -> LocatorResult<()> {
        match self {
            Self::Token(name) if name.trim().is_empty() => Err(LocatorError::MisconfiguredKey {
                reason: "service token cannot be empty".to_string(),
            }),
            Self::Token(name) if name.chars().any(char::is_control) => {
                Err(LocatorError::MisconfiguredKey {
                    reason: format!("service token {name:?} contains control characters"),
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(name) => write!(f, "'{name}'"),
            Self::Capability(capability) => write!(f, "<{capability}>"),
        }
    }
}

impl From<&str> for ServiceKey {
    fn from(name: &str) -> Self {
        Self::Token(name.to_string())
    }
}

impl From<String> for ServiceKey {
    fn from(name: String) -> Self {
        Self::Token(name)
    }
}

impl From<Capability> for ServiceKey {
    fn from(capability: Capability) -> Self {
        Self::Capability(capability)
    }
}
