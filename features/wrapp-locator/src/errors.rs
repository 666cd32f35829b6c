use std::sync::Arc;

use futures_channel::oneshot;
use thiserror::Error;

use crate::{
    dependency_graph::DependencyGraphError,
    types::{ComponentName, DynError},
};

/// Errors while loading the component set
///
/// Any of these aborts the load, no registry is installed.
#[derive(Error, Debug, Clone)]
pub enum LoadError {
    /// There are issues with the dependency graph
    #[error(transparent)]
    DependencyGraph(#[from] DependencyGraphError),
    /// One or more components ended without an instance while running strict
    #[error("Components ended without an instance: {}", join(.0))]
    NullInstance(Vec<ComponentName>),
    /// A deferred wiring target could not be wired while running strict
    #[error(transparent)]
    Wiring(#[from] WiringError),
    /// The loading thread died before reporting a result
    #[error("The load was aborted before it could complete")]
    Aborted,
}
impl From<oneshot::Canceled> for LoadError {
    fn from(_: oneshot::Canceled) -> Self {
        Self::Aborted
    }
}

/// Errors when trying to require a component from the registry
#[derive(Error, Debug, Clone)]
pub enum RequireError {
    /// No component is registered under the name
    #[error("No component with the name '{0}' exists")]
    NotFound(ComponentName),

    #[error("Failed to downcast '{name}', required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        name: ComponentName,
        required_type: &'static str,
        actual_type: &'static str,
    },

    /// A factory asked for an argument position it was not given
    #[error("Argument {index} requested, but only {count} were resolved")]
    ArgumentMissing { index: usize, count: usize },
}

/// Errors of the deferred wiring pass, reported per target
#[derive(Error, Debug, Clone)]
pub enum WiringError {
    #[error("'{target}' wants '{parameter}' but no such component is registered")]
    UnresolvedParameter {
        target: String,
        parameter: ComponentName,
    },
    #[error("Wiring hook of '{target}' failed - error: {error:?}")]
    HookFailed {
        target: String,
        error: Arc<DynError>,
    },
}

pub(crate) fn join(names: &[ComponentName]) -> String {
    names
        .iter()
        .map(ComponentName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
