use std::{any::type_name, sync::Arc};

use crate::{descriptor::ComponentDescriptor, wiring::WiringHook};

/// A group of components declared by one owner object
///
/// The owner is shared with every bound factory and hook it declares, so state kept
/// on it is private to this configuration. Two configurations loaded side by side
/// never observe each other's state, even when one requires a component the other
/// declares.
///
/// # Example
/// ```rust
/// use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
/// use wrapp_locator::{provide, ComponentDescriptor, Configuration, Locator};
///
/// #[derive(Default)]
/// struct Counters {
///     created: AtomicUsize,
/// }
///
/// impl Configuration for Counters {
///     fn components(self: Arc<Self>) -> Vec<ComponentDescriptor> {
///         vec![ComponentDescriptor::bound("start", self, Vec::<&str>::new(), |owner, _| {
///             owner.created.fetch_add(1, Ordering::SeqCst);
///             provide(10_u32)
///         })]
///     }
/// }
///
/// let loaded = Locator::new().add_configuration(Counters::default()).load().unwrap();
/// assert_eq!(*loaded.registry.get_as::<u32>("start").unwrap(), 10);
/// ```
pub trait Configuration: Send + Sync + 'static {
    /// Name used for the wiring target of this configuration
    fn name(&self) -> String {
        type_name::<Self>().to_string()
    }

    /// Components declared by this configuration
    fn components(self: Arc<Self>) -> Vec<ComponentDescriptor>;

    /// Hooks called once all components are registered
    fn wiring(self: Arc<Self>) -> Vec<WiringHook> {
        Vec::new()
    }
}
