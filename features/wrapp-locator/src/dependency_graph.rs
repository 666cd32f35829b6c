use std::collections::HashSet;

use thiserror::Error;

use crate::{
    descriptor::ComponentDescriptor,
    errors::join,
    types::ComponentName,
};

/// Working set of descriptors for one load
///
/// Owns and mutates the descriptors until they are instantiated: closes every
/// dependency list over its transitive dependencies, checks for cycles and orders
/// the set so dependencies come before their dependents.
#[derive(Debug)]
pub struct DependencyGraph {
    descriptors: Vec<ComponentDescriptor>,
}
impl DependencyGraph {
    /// Takes ownership of the descriptors, failing on the first duplicated name
    pub fn new(descriptors: Vec<ComponentDescriptor>) -> Result<Self, DependencyGraphError> {
        let mut seen = HashSet::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            if !seen.insert(descriptor.name()) {
                return Err(DependencyGraphError::Duplicate(descriptor.name().clone()));
            }
        }

        Ok(Self { descriptors })
    }

    pub fn descriptors(&self) -> &[ComponentDescriptor] {
        &self.descriptors
    }

    pub(crate) fn descriptors_mut(&mut self) -> &mut [ComponentDescriptor] {
        &mut self.descriptors
    }

    pub fn into_descriptors(self) -> Vec<ComponentDescriptor> {
        self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Grows every declared dependency list to its transitive closure
    ///
    /// Fails on the first cycle found, naming the component the cycle returns to
    /// and the component which requires it.
    pub fn close_dependencies(&mut self) -> Result<(), DependencyGraphError> {
        for index in 0..self.descriptors.len() {
            if self.descriptors[index].is_closed() {
                continue;
            }
            let mut path = Vec::new();
            close_recurse(&mut self.descriptors, index, &mut path)?;
        }

        return Ok(());

        fn close_recurse(
            descriptors: &mut [ComponentDescriptor],
            index: usize,
            path: &mut Vec<ComponentName>,
        ) -> Result<(), DependencyGraphError> {
            let name = descriptors[index].name().clone();

            // Self Dependency Check
            if descriptors[index].depends_on(&name) {
                return Err(DependencyGraphError::CircularDependency {
                    from: name.clone(),
                    to: name,
                });
            }

            path.push(name.clone());

            for other in 0..descriptors.len() {
                let dependency = descriptors[other].name().clone();
                if dependency == name || !descriptors[index].depends_on(&dependency) {
                    continue;
                }

                // Circular Dependency Check - the dependency is already being closed further up
                if path.contains(&dependency) {
                    return Err(DependencyGraphError::CircularDependency {
                        from: dependency,
                        to: name,
                    });
                }

                // Nothing to merge
                if descriptors[other].declared_dependencies().is_empty() {
                    continue;
                }

                if !descriptors[other].is_closed() {
                    close_recurse(descriptors, other, path)?;
                }

                let transitive = descriptors[other].declared_dependencies().to_vec();
                descriptors[index].merge_dependencies(&transitive);
            }

            path.pop();
            descriptors[index].mark_closed();
            Ok(())
        }
    }

    /// Reorders the descriptors so that dependencies precede their dependents
    ///
    /// Only pending descriptors are moved. Closes the graph first if that has not
    /// happened yet, so a cycle is reported instead of keeping the scan from settling.
    pub fn sort(&mut self) -> Result<(), DependencyGraphError> {
        self.close_dependencies()?;
        let descriptors = &mut self.descriptors;

        // Components with fewer dependencies tend to belong at the front
        descriptors.sort_by_key(|descriptor| descriptor.required_dependencies().len());

        let mut moves = 0_usize;
        'scan: loop {
            for current in 0..descriptors.len() {
                if descriptors[current].is_resolved() {
                    continue;
                }

                for right in current + 1..descriptors.len() {
                    if descriptors[current].depends_on(descriptors[right].name()) {
                        // Move current directly behind its dependency
                        descriptors[current..=right].rotate_left(1);
                        moves += 1;
                        continue 'scan;
                    }
                }
            }
            break;
        }

        tracing::debug!("Sorted {} components with {moves} moves", descriptors.len());
        Ok(())
    }

    pub fn position(&self, name: &ComponentName) -> Option<usize> {
        self.descriptors
            .iter()
            .position(|descriptor| descriptor.name() == name)
    }
}

#[derive(Error, Debug, Clone)]
pub enum DependencyGraphError {
    #[error("A component has been registered twice: '{0}'")]
    Duplicate(ComponentName),
    #[error("'{from}' and '{to}' require each other (circular dependency)")]
    CircularDependency {
        from: ComponentName,
        to: ComponentName,
    },
    #[error(
        "'{component}' is missing dependencies - required: [{}] resolved: [{}]",
        join(.required),
        join(.resolved)
    )]
    MissingDependency {
        component: ComponentName,
        required: Vec<ComponentName>,
        resolved: Vec<ComponentName>,
    },
}
