use std::{any::type_name, collections::BTreeMap, fmt::Debug, sync::Arc};

use crate::{
    dependency_graph::DependencyGraphError,
    errors::RequireError,
    types::{ComponentName, Injectable, Instance},
};

/// Collects registry entries, rejecting a name which is already taken
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    instances: BTreeMap<ComponentName, Instance>,
}

impl RegistryBuilder {
    pub fn insert(
        &mut self,
        name: ComponentName,
        instance: Instance,
    ) -> Result<&mut Self, DependencyGraphError> {
        if self.instances.contains_key(&name) {
            return Err(DependencyGraphError::Duplicate(name));
        }

        self.instances.insert(name, instance);
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry(Arc::new(RegistryInner {
            instances: self.instances,
        }))
    }
}

/// Registry holding all loaded component instances
///
/// Read-only once installed. Clones share the same entries.
#[derive(Clone)]
pub struct Registry(Arc<RegistryInner>);
struct RegistryInner {
    instances: BTreeMap<ComponentName, Instance>,
}
impl Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("Registry");
        for (name, instance) in &self.0.instances {
            map.field(name.as_str(), &instance.type_name());
        }
        map.finish()
    }
}

impl Registry {
    pub fn get(&self, name: impl Into<ComponentName>) -> Option<&Instance> {
        self.0.instances.get(&name.into())
    }

    /// Attempts to get the named component
    pub fn get_required(&self, name: impl Into<ComponentName>) -> Result<&Instance, RequireError> {
        let name = name.into();
        match self.0.instances.get(&name) {
            Some(instance) => Ok(instance),
            None => Err(RequireError::NotFound(name)),
        }
    }

    /// Attempts to get the named component as a `T`
    pub fn get_as<T: Injectable>(&self, name: impl Into<ComponentName>) -> Result<Arc<T>, RequireError> {
        let name = name.into();
        let instance = self.get_required(name.clone())?;
        instance
            .downcast()
            .map_err(|actual_type| RequireError::DowncastFailed {
                name,
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    pub fn contains(&self, name: impl Into<ComponentName>) -> bool {
        self.0.instances.contains_key(&name.into())
    }

    /// All entries for which `predicate` holds
    pub fn for_each<P>(&self, mut predicate: P) -> BTreeMap<ComponentName, Instance>
    where
        P: FnMut(&ComponentName, &Instance) -> bool,
    {
        self.0
            .instances
            .iter()
            .filter(|(name, instance)| predicate(name, instance))
            .map(|(name, instance)| (name.clone(), instance.clone()))
            .collect()
    }

    /// All entries with the closeable capability
    pub fn closeables(&self) -> BTreeMap<ComponentName, Instance> {
        self.for_each(|_, instance| instance.is_closeable())
    }

    pub fn names(&self) -> impl Iterator<Item = &ComponentName> {
        self.0.instances.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ComponentName, &Instance)> {
        self.0.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.0.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.instances.is_empty()
    }

    /// Closes every closeable component
    ///
    /// A failing close is logged and does not keep the others from closing.
    /// Returns the number of failures.
    pub fn close(&self) -> usize {
        let mut failures = 0;
        for (name, instance) in &self.0.instances {
            let Some(closer) = instance.closer() else {
                continue;
            };

            match closer.close() {
                Ok(()) => tracing::debug!("Closed '{name}'"),
                Err(error) => {
                    failures += 1;
                    tracing::error!("Failed to close '{name}' - error: {error:?}");
                }
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use super::*;
    use crate::types::{Close, DynError};

    struct Resource {
        order: Arc<Mutex<Vec<&'static str>>>,
        name: &'static str,
        fail: bool,
    }
    impl Close for Resource {
        fn close(&self) -> Result<(), DynError> {
            self.order.lock().unwrap().push(self.name);
            if self.fail {
                return Err("refused".into());
            }
            Ok(())
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut builder = RegistryBuilder::default();
        builder
            .insert("IntService".into(), Instance::new(6_i32))
            .unwrap();
        let registry = builder.build();

        assert_eq!(*registry.get_as::<i32>("INTSERVICE").unwrap(), 6);
        assert!(registry.get("intservice").is_some());
        assert!(matches!(
            registry.get_required("other"),
            Err(RequireError::NotFound(name)) if name.as_str() == "other"
        ));
        assert!(matches!(
            registry.get_as::<String>("intService"),
            Err(RequireError::DowncastFailed { actual_type: "i32", .. })
        ));
    }

    #[test]
    fn insert_is_fail_fast() {
        let mut builder = RegistryBuilder::default();
        builder.insert("a".into(), Instance::new(1)).unwrap();
        let error = builder.insert("A".into(), Instance::new(2)).unwrap_err();
        assert!(matches!(error, DependencyGraphError::Duplicate(_)));
        assert_eq!(*builder.build().get_as::<i32>("a").unwrap(), 1);
    }

    #[test]
    fn for_each_filters_by_caller_predicate() {
        let mut builder = RegistryBuilder::default();
        builder.insert("one".into(), Instance::new(1_u32)).unwrap();
        builder.insert("two".into(), Instance::new(2_u32)).unwrap();
        builder.insert("name".into(), Instance::new("x")).unwrap();
        let registry = builder.build();

        let numbers = registry.for_each(|_, instance| instance.is::<u32>());
        assert_eq!(numbers.len(), 2);
        let named = registry.for_each(|name, _| name.as_str().starts_with('n'));
        assert_eq!(named.keys().map(ComponentName::as_str).collect::<Vec<_>>(), ["name"]);
    }

    #[test]
    fn close_attempts_every_entry() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let resource = |name, fail| Resource {
            order: order.clone(),
            name,
            fail,
        };

        let mut builder = RegistryBuilder::default();
        builder
            .insert("a".into(), Instance::closeable(resource("a", false)))
            .unwrap()
            .insert("b".into(), Instance::closeable(resource("b", true)))
            .unwrap()
            .insert("c".into(), Instance::closeable(resource("c", false)))
            .unwrap()
            .insert("plain".into(), Instance::new(AtomicUsize::new(0)))
            .unwrap();
        let registry = builder.build();

        assert_eq!(registry.closeables().len(), 3);
        assert_eq!(registry.close(), 1);
        assert_eq!(*order.lock().unwrap(), ["a", "b", "c"]);
        assert_eq!(
            registry.get_as::<AtomicUsize>("plain").unwrap().load(Ordering::SeqCst),
            0
        );
    }
}
