use std::{
    any::{type_name, Any},
    fmt::Debug,
    sync::Arc,
};

/// All errors must be Send + Sync so a load can finish on another thread
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Components are process-lifetime singletons shared across threads,
/// so anything stored in the registry needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Capability of a component which holds resources that must be released on shutdown
pub trait Close: Send + Sync {
    fn close(&self) -> Result<(), DynError>;
}

/// Case-insensitive component name
///
/// Names are normalised to lowercase on construction, so two names compare
/// equal whenever they only differ in case.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ComponentName(String);

impl ComponentName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl std::fmt::Display for ComponentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
impl From<&str> for ComponentName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
impl From<String> for ComponentName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
impl From<&String> for ComponentName {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}
impl From<&ComponentName> for ComponentName {
    fn from(name: &ComponentName) -> Self {
        name.clone()
    }
}

/// Type erased component instance
///
/// Cloning is cheap, all clones share the same underlying value.
#[derive(Clone)]
pub struct Instance {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync + 'static>,
    closer: Option<Arc<dyn Close>>,
}
impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .field("closeable", &self.closer.is_some())
            .finish()
    }
}

impl Instance {
    pub fn new<T: Injectable>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an already shared value without cloning it
    pub fn from_arc<T: Injectable>(value: Arc<T>) -> Self {
        Instance {
            type_name: type_name::<T>(),
            value,
            closer: None,
        }
    }

    /// Wraps a value which is closed when the registry shuts down
    pub fn closeable<T: Injectable + Close>(value: T) -> Self {
        let value = Arc::new(value);
        Instance {
            type_name: type_name::<T>(),
            closer: Some(value.clone()),
            value,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: Injectable>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn is_closeable(&self) -> bool {
        self.closer.is_some()
    }

    pub fn closer(&self) -> Option<&Arc<dyn Close>> {
        self.closer.as_ref()
    }

    /// Returns the shared value, or the actual type name if it is not a `T`
    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.value.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.type_name),
        }
    }

    /// True if both instances share the same value
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}
