use std::{
    future::Future,
    io,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    thread::{self, JoinHandle},
};

use futures::FutureExt;
use futures_channel::oneshot;

use crate::{
    config::LoaderConfig,
    configuration::Configuration,
    descriptor::ComponentDescriptor,
    errors::LoadError,
    factories::ComponentFactory,
    initiator::{Initiator, Loaded},
    types::{ComponentName, Injectable, Instance},
    wiring::WiringTarget,
};

//////////////////////////////////////////////////////////////////////
///
/// Loading consists of three parts.
/// 1. The Locator where one registers all components, configurations and wiring targets
/// 2. The load itself, which resolves, orders and instantiates everything once
/// 3. The resulting Registry, read-only from then on
pub struct Locator {
    descriptors: Vec<ComponentDescriptor>,
    targets: Vec<WiringTarget>,
    config: LoaderConfig,
}
impl Default for Locator {
    fn default() -> Self {
        Self::new()
    }
}

impl Locator {
    pub fn new() -> Self {
        Locator {
            descriptors: Vec::new(),
            targets: Vec::new(),
            config: LoaderConfig::default(),
        }
    }
}
impl Locator {
    /// Registers an already constructed component
    pub fn add_instance<T: Injectable>(self, name: impl Into<ComponentName>, instance: T) -> Self {
        self.add_prebuilt(name, Instance::new(instance))
    }

    /// Registers an already constructed, type erased component
    pub fn add_prebuilt(self, name: impl Into<ComponentName>, instance: Instance) -> Self {
        self.add_component(ComponentDescriptor::prebuilt(name, instance))
    }

    pub fn add_component(mut self, descriptor: ComponentDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn add_factory<Factory: ComponentFactory>(self, factory: Factory) -> Self {
        self.add_component(ComponentDescriptor::from_factory(factory))
    }

    /// Registers every component and wiring hook declared by `configuration`
    pub fn add_configuration<C: Configuration>(mut self, configuration: C) -> Self {
        let configuration = Arc::new(configuration);

        self.descriptors
            .extend(configuration.clone().components());

        let hooks = configuration.clone().wiring();
        if !hooks.is_empty() {
            let mut target = WiringTarget::new(configuration.name());
            for hook in hooks {
                target.push(hook);
            }
            self.targets.push(target);
        }
        self
    }

    pub fn add_wiring_target(mut self, target: WiringTarget) -> Self {
        self.targets.push(target);
        self
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Fail the load instead of warning when a component ends without an instance
    pub fn fail_on_null_instance(mut self) -> Self {
        self.config = self.config.with_fail_on_null_instance(true);
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub(crate) fn into_parts(self) -> (Vec<ComponentDescriptor>, Vec<WiringTarget>) {
        (self.descriptors, self.targets)
    }

    /// Loads all components on the current thread
    pub fn load(self) -> Result<Loaded, LoadError> {
        Initiator::new(self.config.clone()).initiate(self)
    }

    /// Loads all components on a dedicated thread
    ///
    /// The returned handle resolves once, after the registry was installed and the
    /// wiring pass has finished. A started load can not be cancelled: dropping the
    /// handle only discards the result, the thread still runs to completion.
    pub fn load_async(self) -> LoadHandle {
        let (tx, rx) = oneshot::channel();

        // If the thread can not be spawned the sender is dropped and the handle reports Aborted
        if let Err(error) = self.spawn(move |result| {
            // Error can be ignored, it just means the handle was dropped
            let _ = tx.send(result);
        }) {
            tracing::error!("Failed to spawn loading thread - error: {error:?}");
        }

        LoadHandle { rx }
    }

    /// Loads all components on a dedicated thread and calls `callback` with the result
    pub fn load_with_callback<F>(self, callback: F) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce(Result<Loaded, LoadError>) + Send + 'static,
    {
        self.spawn(callback)
    }

    fn spawn<F>(self, on_complete: F) -> io::Result<JoinHandle<()>>
    where
        F: FnOnce(Result<Loaded, LoadError>) + Send + 'static,
    {
        thread::Builder::new()
            .name("wrapp-locator".to_string())
            .spawn(move || on_complete(self.load()))
    }
}

/// Completion of a load running on another thread
///
/// There is no way to cancel the load through this handle.
#[must_use = "the load result is only observable through the handle"]
pub struct LoadHandle {
    rx: oneshot::Receiver<Result<Loaded, LoadError>>,
}

impl Future for LoadHandle {
    type Output = Result<Loaded, LoadError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.rx.poll_unpin(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            // The loading thread died before sending, most likely a panicking factory
            Poll::Ready(Err(canceled)) => Poll::Ready(Err(canceled.into())),
            Poll::Pending => Poll::Pending,
        }
    }
}
