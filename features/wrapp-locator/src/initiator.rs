use std::collections::HashMap;

use crate::{
    builder::Locator,
    config::LoaderConfig,
    container::{Registry, RegistryBuilder},
    dependency_graph::{DependencyGraph, DependencyGraphError},
    descriptor::ComponentDescriptor,
    errors::LoadError,
    types::ComponentName,
    wiring::{self, WiringReport, WiringTarget},
};

/// Result of a successful load
#[derive(Debug)]
pub struct Loaded {
    pub registry: Registry,
    pub wiring: WiringReport,
}

/// Runs the load pipeline for one [Locator]
pub(crate) struct Initiator {
    config: LoaderConfig,
}
impl Initiator {
    pub(crate) fn new(config: LoaderConfig) -> Initiator {
        Initiator { config }
    }

    pub(crate) fn initiate(self, blueprint: Locator) -> Result<Loaded, LoadError> {
        let (descriptors, mut targets) = blueprint.into_parts();

        tracing::debug!(
            "Initializing {} components and {} wiring targets",
            descriptors.len(),
            targets.len()
        );

        // Build and check Graph
        let mut graph = DependencyGraph::new(descriptors)?;
        graph.close_dependencies()?;
        graph.sort()?;

        instantiate_all(&mut graph)?;

        let (registry, component_targets) = self.install(graph)?;
        tracing::debug!("Installed {} components", registry.len());

        targets.extend(component_targets);
        if self.config.strict_wiring() {
            if let Some(error) = wiring::find_unresolved(&registry, &targets) {
                return Err(error.into());
            }
        }

        let wiring = wiring::wire(&registry, targets);
        tracing::debug!(
            "Wiring completed - {} hooks invoked, {} targets failed",
            wiring.invoked,
            wiring.failures.len()
        );

        Ok(Loaded { registry, wiring })
    }

    /// Checks for missing instances and moves all produced instances into a registry
    ///
    /// Wiring hooks declared on components are bound to their instance and returned as targets.
    fn install(&self, graph: DependencyGraph) -> Result<(Registry, Vec<WiringTarget>), LoadError> {
        let descriptors = graph.into_descriptors();

        let missing: Vec<ComponentName> = descriptors
            .iter()
            .filter(|descriptor| descriptor.instance().is_none())
            .map(|descriptor| descriptor.name().clone())
            .collect();
        if !missing.is_empty() {
            if self.config.fail_on_null_instance() {
                return Err(LoadError::NullInstance(missing));
            }
            for name in &missing {
                tracing::warn!("Instance for '{name}' was null, it will not be registered");
            }
        }

        let mut registry = RegistryBuilder::default();
        let mut targets = Vec::new();
        for descriptor in descriptors {
            let (name, instance, hooks) = descriptor.into_parts();
            let Some(instance) = instance else {
                if !hooks.is_empty() {
                    tracing::warn!("Skipping {} wiring hooks of '{name}'", hooks.len());
                }
                continue;
            };

            if !hooks.is_empty() {
                let mut target = WiringTarget::new(name.as_str());
                for hook in hooks {
                    target.push(hook.bind(instance.clone()));
                }
                targets.push(target);
            }

            registry.insert(name, instance)?;
        }

        Ok((registry.build(), targets))
    }
}

/// Instantiates every descriptor of the graph
///
/// Closes the graph first if that has not happened yet. Instantiation recurses along
/// the closed dependency lists and needs them to be cycle free.
pub fn instantiate_all(graph: &mut DependencyGraph) -> Result<(), DependencyGraphError> {
    graph.close_dependencies()?;

    let positions: HashMap<ComponentName, usize> = graph
        .descriptors()
        .iter()
        .enumerate()
        .map(|(index, descriptor)| (descriptor.name().clone(), index))
        .collect();

    let descriptors = graph.descriptors_mut();
    for index in 0..descriptors.len() {
        instantiate(descriptors, &positions, index)?;
    }

    Ok(())
}

/// Instantiates one descriptor after its dependencies
///
/// Does nothing if the descriptor is already resolved.
fn instantiate(
    descriptors: &mut [ComponentDescriptor],
    positions: &HashMap<ComponentName, usize>,
    index: usize,
) -> Result<(), DependencyGraphError> {
    if descriptors[index].is_resolved() {
        return Ok(());
    }

    let name = descriptors[index].name().clone();
    if descriptors[index].depends_on(&name) {
        return Err(DependencyGraphError::CircularDependency {
            from: name.clone(),
            to: name,
        });
    }

    let declared = descriptors[index].declared_dependencies().to_vec();
    for dependency in &declared {
        if let Some(&position) = positions.get(dependency) {
            instantiate(descriptors, positions, position)?;
        }
    }

    // Only direct parameters are passed, in the order the factory declared them
    let descriptor = &descriptors[index];
    let required = descriptor.required_dependencies();
    let mut names = Vec::with_capacity(required.len());
    let mut values = Vec::with_capacity(required.len());
    for dependency in required {
        let resolved = positions
            .get(dependency)
            .and_then(|&position| descriptors[position].instance());
        if let Some(instance) = resolved {
            names.push(dependency.clone());
            values.push(instance.clone());
        }
    }

    if values.len() != required.len() {
        return Err(DependencyGraphError::MissingDependency {
            component: name,
            required: required.to_vec(),
            resolved: names,
        });
    }

    let produced = match descriptor.factory() {
        Some(factory) => match factory.invoke(&names, &values) {
            Ok(Some(instance)) => {
                tracing::debug!("Constructed '{name}' as {}", instance.type_name());
                Some(instance)
            }
            Ok(None) => {
                tracing::debug!("Factory for '{name}' produced no instance");
                None
            }
            Err(error) => {
                tracing::error!("Factory for '{name}' failed - error: {error:?}");
                None
            }
        },
        None => None,
    };

    descriptors[index].resolve(produced);
    Ok(())
}
