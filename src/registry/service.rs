//! # Services
//!
//! A service is stored as a tagged variant: either a ready-made instance or a
//! factory paired with the shape of the arguments it accepts. Resolution code
//! matches on the tag instead of inspecting the value at runtime.
//!
//! Trait objects are registered as their owning pointer, e.g. an
//! `Arc<dyn Logger>` payload, and retrieved with the same payload type.

use super::key::{Capability, ServiceKey};
use crate::error::{BoxError, LocatorError, LocatorResult};
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Type-erased service value shared between the registry and its consumers
pub type ServiceObject = Arc<dyn Any + Send + Sync>;

type Constructor = dyn Fn(&ConstructionArgs) -> Result<ServiceObject, BoxError> + Send + Sync;

/// Arguments captured for a factory call: positional values plus named values
#[derive(Clone, Default)]
pub struct ConstructionArgs {
    positional: Vec<ServiceObject>,
    named: BTreeMap<String, ServiceObject>,
}

impl ConstructionArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.positional.push(Arc::new(value));
        self
    }

    /// Set a named argument, replacing any previous value under that name
    pub fn named<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
        self.named.insert(name.into(), Arc::new(value));
        self
    }

    pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
        self.positional.get(index)?.downcast_ref::<T>()
    }

    pub fn get_named<T: Any>(&self, name: &str) -> Option<&T> {
        self.named.get(name)?.downcast_ref::<T>()
    }

    /// Look up a parameter by name first, then by position
    pub fn param<T: Any>(&self, name: &str, index: usize) -> Option<&T> {
        self.get_named::<T>(name).or_else(|| self.get::<T>(index))
    }

    pub fn positional_len(&self) -> usize {
        self.positional.len()
    }

    pub fn named_keys(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl fmt::Debug for ConstructionArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructionArgs")
            .field("positional", &self.positional.len())
            .field("named", &self.named.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Parameters a factory accepts, checked before the factory runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamShape {
    required: Vec<&'static str>,
    optional: Vec<&'static str>,
    keywords: Vec<&'static str>,
}

impl ParamShape {
    /// A factory taking no arguments
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a required positional parameter
    pub fn required(mut self, name: &'static str) -> Self {
        self.required.push(name);
        self
    }

    /// Add an optional positional parameter; must follow the required ones
    pub fn optional(mut self, name: &'static str) -> Self {
        self.optional.push(name);
        self
    }

    /// Add a keyword-only parameter
    pub fn keyword(mut self, name: &'static str) -> Self {
        self.keywords.push(name);
        self
    }

    fn positional_names(&self) -> impl Iterator<Item = &&'static str> {
        self.required.iter().chain(self.optional.iter())
    }

    /// Check captured arguments against this shape
    pub fn check(&self, args: &ConstructionArgs) -> Result<(), String> {
        let max_positional = self.required.len() + self.optional.len();
        if args.positional_len() > max_positional {
            return Err(format!(
                "takes at most {max_positional} positional argument(s) but {} were given",
                args.positional_len()
            ));
        }

        for name in args.named_keys() {
            match self.positional_names().position(|param| *param == name) {
                Some(index) if index < args.positional_len() => {
                    return Err(format!("got multiple values for argument '{name}'"));
                }
                Some(_) => {}
                None if self.keywords.iter().any(|keyword| *keyword == name) => {}
                None => return Err(format!("got an unexpected keyword argument '{name}'")),
            }
        }

        for (index, name) in self.required.iter().enumerate() {
            let supplied = index < args.positional_len() || args.named_keys().any(|k| k == *name);
            if !supplied {
                return Err(format!("missing required argument '{name}'"));
            }
        }

        Ok(())
    }
}

/// Constructor for a service, invoked lazily by proxies
#[derive(Clone)]
pub struct Factory {
    constructor: Arc<Constructor>,
    params: ParamShape,
    produces: &'static str,
}

impl Factory {
    pub fn new<T, F>(params: ParamShape, constructor: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&ConstructionArgs) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            constructor: Arc::new(move |args| {
                constructor(args).map(|value| Arc::new(value) as ServiceObject)
            }),
            params,
            produces: std::any::type_name::<T>(),
        }
    }

    pub fn params(&self) -> &ParamShape {
        &self.params
    }

    pub fn produces(&self) -> &'static str {
        self.produces
    }

    /// Validate `args` against the parameter shape and run the constructor
    pub fn construct(&self, key: &ServiceKey, args: &ConstructionArgs) -> LocatorResult<ServiceObject> {
        self.params
            .check(args)
            .map_err(|reason| LocatorError::ArgumentMismatch {
                key: key.clone(),
                reason,
            })?;

        (self.constructor)(args).map_err(|source| LocatorError::Construction {
            key: key.clone(),
            source,
        })
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("produces", &self.produces)
            .field("params", &self.params)
            .finish()
    }
}

/// Instance-or-factory tag
#[derive(Clone)]
pub enum ServiceKind {
    Instance(ServiceObject),
    Factory(Factory),
}

/// A registrable service plus the capabilities it declares
#[derive(Clone)]
pub struct Service {
    kind: ServiceKind,
    type_name: &'static str,
    provides: BTreeSet<Capability>,
}

impl Service {
    /// Ready-made instance; `T` is the payload type consumers retrieve
    pub fn instance<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_shared(Arc::new(value))
    }

    /// Instance sharing an existing allocation, so lookups are pointer-equal to `value`
    pub fn from_shared<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            kind: ServiceKind::Instance(value),
            type_name: std::any::type_name::<T>(),
            provides: BTreeSet::new(),
        }
    }

    /// Factory taking no arguments
    pub fn factory<T, F>(constructor: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::factory_with(ParamShape::none(), move |_| constructor())
    }

    /// Factory with a declared parameter shape
    pub fn factory_with<T, F>(params: ParamShape, constructor: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&ConstructionArgs) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let factory = Factory::new(params, constructor);
        Self {
            type_name: factory.produces(),
            kind: ServiceKind::Factory(factory),
            provides: BTreeSet::new(),
        }
    }

    /// Instance of capability `C`, stored as an `Arc<C>` payload. The
    /// capability is only ever recorded from the value's own type.
    pub fn implementing<C: ?Sized + Send + Sync + 'static>(value: Arc<C>) -> Self {
        Self::instance(value).with_capability::<C>()
    }

    /// Factory for capability `C` taking no arguments
    pub fn factory_of<C, F>(constructor: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> Result<Arc<C>, BoxError> + Send + Sync + 'static,
    {
        Self::factory_of_with(ParamShape::none(), move |_| constructor())
    }

    /// Factory for capability `C` with a declared parameter shape
    pub fn factory_of_with<C, F>(params: ParamShape, constructor: F) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn(&ConstructionArgs) -> Result<Arc<C>, BoxError> + Send + Sync + 'static,
    {
        Self::factory_with(params, constructor).with_capability::<C>()
    }

    fn with_capability<C: ?Sized + 'static>(mut self) -> Self {
        self.provides.insert(Capability::of::<C>());
        self
    }

    pub fn provides_capability(&self, capability: &Capability) -> bool {
        self.provides.contains(capability)
    }

    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.provides.iter()
    }

    pub fn kind(&self) -> &ServiceKind {
        &self.kind
    }

    pub fn is_factory(&self) -> bool {
        matches!(self.kind, ServiceKind::Factory(_))
    }

    /// Name of the instance payload type, or of the type the factory produces
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow an instance payload as `T`; factories yield `None`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match &self.kind {
            ServiceKind::Instance(object) => object.downcast_ref::<T>(),
            ServiceKind::Factory(_) => None,
        }
    }

    /// Share an instance payload as `Arc<T>`; factories yield `None`
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match &self.kind {
            ServiceKind::Instance(object) => Arc::clone(object).downcast::<T>().ok(),
            ServiceKind::Factory(_) => None,
        }
    }

    /// Produce the service object: instances are shared, factories are invoked
    pub fn construct(&self, key: &ServiceKey, args: &ConstructionArgs) -> LocatorResult<ServiceObject> {
        match &self.kind {
            ServiceKind::Instance(object) => Ok(Arc::clone(object)),
            ServiceKind::Factory(factory) => factory.construct(key, args),
        }
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ServiceKind::Instance(_) => "instance",
            ServiceKind::Factory(_) => "factory",
        };
        f.debug_struct("Service")
            .field("kind", &kind)
            .field("type_name", &self.type_name)
            .field("provides", &self.provides)
            .finish()
    }
}
