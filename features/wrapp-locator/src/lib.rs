//! Wrapp Locator resolves a set of named, inter-dependent components into a single
//! initialization order and instantiates each of them exactly once.
//!
//! A load is split into these steps:
//! 1. Components are registered on a [Locator], either one by one as [ComponentDescriptor]s,
//!    as typed [ComponentFactory]s or grouped in a [Configuration]
//! 2. Every dependency list is closed over its transitive dependencies, which also
//!    detects self and circular dependencies
//! 3. The components are sorted so dependencies come first and are then instantiated,
//!    each factory receiving its direct dependencies in declared order
//! 4. All instances are moved into the read-only [Registry]
//! 5. Deferred wiring hooks are called with instances from the registry
//!
//! # Examples
//!
//! ```rust
//! use wrapp_locator::{provide, ComponentDescriptor, Locator};
//!
//! let loaded = Locator::new()
//!     .add_instance("port", 8080_u16)
//!     .add_component(ComponentDescriptor::free("address", ["host", "port"], |args| {
//!         provide(format!("{}:{}", args.get::<String>(0)?, args.get::<u16>(1)?))
//!     }))
//!     .add_component(ComponentDescriptor::free("host", Vec::<&str>::new(), |_| {
//!         provide("localhost".to_string())
//!     }))
//!     .load()
//!     .unwrap();
//!
//! let address = loaded.registry.get_as::<String>("Address").unwrap();
//! assert_eq!(*address, "localhost:8080");
//! ```

pub mod builder;
pub mod config;
pub mod configuration;
pub mod container;
pub mod dependency_graph;
pub mod descriptor;
pub mod errors;
pub mod factories;
pub mod initiator;
pub mod types;
pub mod wiring;

pub use builder::{LoadHandle, Locator};
pub use config::LoaderConfig;
pub use configuration::Configuration;
pub use container::{Registry, RegistryBuilder};
pub use dependency_graph::{DependencyGraph, DependencyGraphError};
pub use descriptor::ComponentDescriptor;
pub use errors::{LoadError, RequireError, WiringError};
pub use factories::{provide, Args, ComponentFactory, Factory, FactoryResult};
pub use initiator::{instantiate_all, Loaded};
pub use types::{Close, ComponentName, DynError, Injectable, Instance};
pub use wiring::{wire, HookResult, WiringHook, WiringReport, WiringTarget};
