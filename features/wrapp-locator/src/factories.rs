use std::{any::type_name, fmt::Debug, sync::Arc};

use crate::{
    errors::RequireError,
    types::{ComponentName, DynError, Injectable, Instance},
};

/// Result of invoking a factory
///
/// `Ok(None)` is a factory deliberately producing no usable instance.
pub type FactoryResult = Result<Option<Instance>, DynError>;

type FreeFn = dyn Fn(Args<'_>) -> FactoryResult + Send + Sync;
type BoundFn = dyn Fn(&Instance, Args<'_>) -> FactoryResult + Send + Sync;

/// Shorthand for a factory returning a usable value
pub fn provide<T: Injectable>(value: T) -> FactoryResult {
    Ok(Some(Instance::new(value)))
}

/// How a component is constructed
#[derive(Clone)]
pub enum Factory {
    /// A free constructor, called with the resolved arguments only
    Free(Arc<FreeFn>),
    /// A method bound to an owner instance
    Bound { owner: Instance, method: Arc<BoundFn> },
}
impl Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Factory::Free(_) => f.write_str("Factory::Free"),
            Factory::Bound { owner, .. } => f
                .debug_struct("Factory::Bound")
                .field("owner", &owner.type_name())
                .finish(),
        }
    }
}

impl Factory {
    pub fn free<F>(constructor: F) -> Self
    where
        F: Fn(Args<'_>) -> FactoryResult + Send + Sync + 'static,
    {
        Factory::Free(Arc::new(constructor))
    }

    /// Binds `method` to `owner`, the owner is handed back on every invocation
    pub fn bound<O, F>(owner: Arc<O>, method: F) -> Self
    where
        O: Injectable,
        F: Fn(&O, Args<'_>) -> FactoryResult + Send + Sync + 'static,
    {
        let method = bound_method(move |owner, args| {
            let owner = owner
                .downcast::<O>()
                .map_err(|actual_type| RequireError::DowncastFailed {
                    name: ComponentName::new(type_name::<O>()),
                    required_type: type_name::<O>(),
                    actual_type,
                })?;
            method(owner.as_ref(), args)
        });

        Factory::Bound {
            owner: Instance::from_arc(owner),
            method: Arc::new(method),
        }
    }

    /// Wraps a typed [ComponentFactory]
    pub fn from_component<F: ComponentFactory>(factory: F) -> Self {
        Factory::free(move |args| {
            factory
                .construct(args)
                .map(|value| Some(F::into_instance(value)))
                .map_err(Into::into)
        })
    }

    pub fn owner(&self) -> Option<&Instance> {
        match self {
            Factory::Free(_) => None,
            Factory::Bound { owner, .. } => Some(owner),
        }
    }

    /// Invokes the factory with the ordered arguments
    pub fn invoke(&self, names: &[ComponentName], values: &[Instance]) -> FactoryResult {
        let args = Args::new(names, values);
        match self {
            Factory::Free(constructor) => constructor(args),
            Factory::Bound { owner, method } => method(owner, args),
        }
    }
}

// Pins the closure signature to the higher-ranked one stored in [Factory::Bound]
fn bound_method<F>(method: F) -> F
where
    F: Fn(&Instance, Args<'_>) -> FactoryResult + Send + Sync + 'static,
{
    method
}

/// Ordered view over the resolved arguments of a factory or wiring hook
#[derive(Clone, Copy)]
pub struct Args<'a> {
    names: &'a [ComponentName],
    values: &'a [Instance],
}

impl<'a> Args<'a> {
    pub(crate) fn new(names: &'a [ComponentName], values: &'a [Instance]) -> Self {
        Self { names, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn instance(&self, index: usize) -> Option<&'a Instance> {
        self.values.get(index)
    }

    pub fn name(&self, index: usize) -> Option<&'a ComponentName> {
        self.names.get(index)
    }

    /// Typed access to the argument at `index`
    pub fn get<T: Injectable>(&self, index: usize) -> Result<Arc<T>, RequireError> {
        let instance = self
            .values
            .get(index)
            .ok_or(RequireError::ArgumentMissing {
                index,
                count: self.values.len(),
            })?;

        instance
            .downcast()
            .map_err(|actual_type| RequireError::DowncastFailed {
                name: self
                    .names
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| ComponentName::new(index.to_string())),
                required_type: type_name::<T>(),
                actual_type,
            })
    }
}

/// A typed factory providing one named component
pub trait ComponentFactory: Send + Sync + 'static {
    type Provides: Injectable;

    /// Name the component is registered under
    fn name(&self) -> ComponentName;

    /// Names of the components passed to [ComponentFactory::construct], in argument order
    fn dependencies(&self) -> Vec<ComponentName>;

    /// Constructs the component from its resolved dependencies
    fn construct(&self, args: Args<'_>) -> Result<Self::Provides, impl Into<DynError>>;

    /// Wraps the constructed value, override to attach capabilities like [crate::Close]
    fn into_instance(value: Self::Provides) -> Instance {
        Instance::new(value)
    }
}
