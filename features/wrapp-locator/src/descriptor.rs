use std::{fmt::Debug, sync::Arc};

use crate::{
    factories::{Args, ComponentFactory, Factory, FactoryResult},
    types::{ComponentName, Injectable, Instance},
    wiring::{ComponentHook, HookResult},
};

/// Instance slot of a descriptor
///
/// Once resolved the slot never changes, even when the factory produced nothing.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Pending,
    Resolved(Option<Instance>),
}

/// How to build and dependency-check one component
pub struct ComponentDescriptor {
    name: ComponentName,
    /// None for components which were registered already constructed
    factory: Option<Factory>,
    /// Factory parameters, in argument order
    required: Vec<ComponentName>,
    /// Seeded from `required`, grows to the transitive closure
    declared: Vec<ComponentName>,
    slot: Slot,
    /// Closure is complete and free of cycles
    closed: bool,
    hooks: Vec<ComponentHook>,
}
impl Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("factory", &self.factory)
            .field("required", &self.required)
            .field("declared", &self.declared)
            .field("slot", &self.slot)
            .finish()
    }
}
impl std::fmt::Display for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{{", self.name)?;
        for dependency in &self.required {
            write!(f, "{dependency},")?;
        }
        f.write_str("}")
    }
}

impl ComponentDescriptor {
    pub fn new<N>(
        name: impl Into<ComponentName>,
        dependencies: impl IntoIterator<Item = N>,
        factory: Factory,
    ) -> Self
    where
        N: Into<ComponentName>,
    {
        let required: Vec<ComponentName> = dependencies.into_iter().map(Into::into).collect();
        Self {
            name: name.into(),
            factory: Some(factory),
            declared: required.clone(),
            required,
            slot: Slot::Pending,
            closed: false,
            hooks: Vec::new(),
        }
    }

    /// Component built by a free constructor
    pub fn free<N, F>(
        name: impl Into<ComponentName>,
        dependencies: impl IntoIterator<Item = N>,
        constructor: F,
    ) -> Self
    where
        N: Into<ComponentName>,
        F: Fn(Args<'_>) -> FactoryResult + Send + Sync + 'static,
    {
        Self::new(name, dependencies, Factory::free(constructor))
    }

    /// Component built by a method of `owner`
    pub fn bound<N, O, F>(
        name: impl Into<ComponentName>,
        owner: Arc<O>,
        dependencies: impl IntoIterator<Item = N>,
        method: F,
    ) -> Self
    where
        N: Into<ComponentName>,
        O: Injectable,
        F: Fn(&O, Args<'_>) -> FactoryResult + Send + Sync + 'static,
    {
        Self::new(name, dependencies, Factory::bound(owner, method))
    }

    /// Component built by a typed factory
    pub fn from_factory<F: ComponentFactory>(factory: F) -> Self {
        let name = factory.name();
        let dependencies = factory.dependencies();
        Self::new(name, dependencies, Factory::from_component(factory))
    }

    /// Component which is already constructed, it bypasses the pipeline
    pub fn prebuilt(name: impl Into<ComponentName>, instance: Instance) -> Self {
        Self {
            name: name.into(),
            factory: None,
            required: Vec::new(),
            declared: Vec::new(),
            slot: Slot::Resolved(Some(instance)),
            closed: true,
            hooks: Vec::new(),
        }
    }

    /// Adds a deferred wiring hook, called with this component's instance after install
    pub fn with_wiring<N, F>(mut self, parameters: impl IntoIterator<Item = N>, hook: F) -> Self
    where
        N: Into<ComponentName>,
        F: for<'a> FnOnce(&Instance, Args<'a>) -> HookResult + Send + 'static,
    {
        self.hooks.push(ComponentHook::new(parameters, hook));
        self
    }

    pub fn name(&self) -> &ComponentName {
        &self.name
    }

    pub fn factory(&self) -> Option<&Factory> {
        self.factory.as_ref()
    }

    pub fn owner_instance(&self) -> Option<&Instance> {
        self.factory.as_ref().and_then(Factory::owner)
    }

    pub fn required_dependencies(&self) -> &[ComponentName] {
        &self.required
    }

    pub fn declared_dependencies(&self) -> &[ComponentName] {
        &self.declared
    }

    /// The produced instance, None while pending or when nothing was produced
    pub fn instance(&self) -> Option<&Instance> {
        match &self.slot {
            Slot::Resolved(instance) => instance.as_ref(),
            Slot::Pending => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.slot, Slot::Resolved(_))
    }

    pub(crate) fn depends_on(&self, name: &ComponentName) -> bool {
        self.declared.contains(name)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn mark_closed(&mut self) {
        self.closed = true;
    }

    /// Set union, keeps first-seen order
    pub(crate) fn merge_dependencies(&mut self, names: &[ComponentName]) {
        for name in names {
            if !self.declared.contains(name) {
                self.declared.push(name.clone());
            }
        }
    }

    /// Stores the produced value, ignored if the slot is already resolved
    pub(crate) fn resolve(&mut self, instance: Option<Instance>) {
        if let Slot::Pending = self.slot {
            self.slot = Slot::Resolved(instance);
        }
    }

    pub(crate) fn into_parts(self) -> (ComponentName, Option<Instance>, Vec<ComponentHook>) {
        let instance = match self.slot {
            Slot::Resolved(instance) => instance,
            Slot::Pending => None,
        };
        (self.name, instance, self.hooks)
    }
}
