//! Deferred wiring
//!
//! A second injection pass which runs once the registry is installed. Wiring targets
//! carry hooks that receive registry instances by name, without taking part in the
//! dependency graph. This makes it possible to hand components to objects which are not
//! components themselves, or to close loops the graph does not allow.

use std::{fmt::Debug, sync::Arc};

use crate::{
    container::Registry,
    errors::WiringError,
    factories::Args,
    types::{ComponentName, DynError, Instance},
};

pub type HookResult = Result<(), DynError>;

type HookFn = dyn for<'a> FnOnce(Args<'a>) -> HookResult + Send;
type ComponentHookFn = dyn for<'a> FnOnce(&Instance, Args<'a>) -> HookResult + Send;

/// A post-construction hook, invoked at most once
pub struct WiringHook {
    parameters: Vec<ComponentName>,
    hook: Box<HookFn>,
}
impl Debug for WiringHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WiringHook")
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl WiringHook {
    pub fn new<N, F>(parameters: impl IntoIterator<Item = N>, hook: F) -> Self
    where
        N: Into<ComponentName>,
        F: for<'a> FnOnce(Args<'a>) -> HookResult + Send + 'static,
    {
        Self {
            parameters: parameters.into_iter().map(Into::into).collect(),
            hook: Box::new(hook),
        }
    }

    pub fn parameters(&self) -> &[ComponentName] {
        &self.parameters
    }
}

/// Hook declared on a component, receiving the component's own instance once it exists
pub(crate) struct ComponentHook {
    parameters: Vec<ComponentName>,
    hook: Box<ComponentHookFn>,
}

impl ComponentHook {
    pub(crate) fn new<N, F>(parameters: impl IntoIterator<Item = N>, hook: F) -> Self
    where
        N: Into<ComponentName>,
        F: for<'a> FnOnce(&Instance, Args<'a>) -> HookResult + Send + 'static,
    {
        Self {
            parameters: parameters.into_iter().map(Into::into).collect(),
            hook: Box::new(hook),
        }
    }

    pub(crate) fn bind(self, instance: Instance) -> WiringHook {
        let hook = self.hook;
        WiringHook::new(self.parameters, move |args| hook(&instance, args))
    }
}

/// Object whose hooks are called during the wiring pass
#[derive(Debug)]
pub struct WiringTarget {
    name: String,
    hooks: Vec<WiringHook>,
}

impl WiringTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hooks: Vec::new(),
        }
    }

    pub fn with_hook<N, F>(mut self, parameters: impl IntoIterator<Item = N>, hook: F) -> Self
    where
        N: Into<ComponentName>,
        F: for<'a> FnOnce(Args<'a>) -> HookResult + Send + 'static,
    {
        self.push(WiringHook::new(parameters, hook));
        self
    }

    pub fn push(&mut self, hook: WiringHook) {
        self.hooks.push(hook);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hooks(&self) -> &[WiringHook] {
        &self.hooks
    }
}

/// Outcome of the wiring pass
#[derive(Debug, Default)]
pub struct WiringReport {
    /// Number of hooks which ran successfully
    pub invoked: usize,
    /// Failures, at most one per target
    pub failures: Vec<WiringError>,
}

impl WiringReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Returns the first hook parameter which the registry can not resolve
pub(crate) fn find_unresolved(registry: &Registry, targets: &[WiringTarget]) -> Option<WiringError> {
    targets.iter().find_map(|target| {
        target
            .hooks
            .iter()
            .flat_map(|hook| hook.parameters.iter())
            .find(|parameter| !registry.contains(*parameter))
            .map(|parameter| WiringError::UnresolvedParameter {
                target: target.name.clone(),
                parameter: parameter.clone(),
            })
    })
}

/// Runs every hook of every target with instances from the registry
///
/// A failing hook stops the remaining hooks of its own target only.
pub fn wire(registry: &Registry, targets: Vec<WiringTarget>) -> WiringReport {
    let mut report = WiringReport::default();

    for target in targets {
        tracing::debug!(
            "Wiring '{}' with {} hooks",
            target.name,
            target.hooks.len()
        );

        if let Err(error) = wire_target(registry, target, &mut report.invoked) {
            tracing::error!("{error}");
            report.failures.push(error);
        }
    }

    report
}

fn wire_target(
    registry: &Registry,
    target: WiringTarget,
    invoked: &mut usize,
) -> Result<(), WiringError> {
    let WiringTarget { name, hooks } = target;

    for WiringHook { parameters, hook } in hooks {
        let mut values = Vec::with_capacity(parameters.len());
        for parameter in &parameters {
            let instance = registry.get(parameter).ok_or_else(|| {
                WiringError::UnresolvedParameter {
                    target: name.clone(),
                    parameter: parameter.clone(),
                }
            })?;
            values.push(instance.clone());
        }

        hook(Args::new(&parameters, &values)).map_err(|error| WiringError::HookFailed {
            target: name.clone(),
            error: Arc::new(error),
        })?;
        *invoked += 1;
    }

    Ok(())
}
