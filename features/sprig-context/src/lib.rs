//! Sprig Context bootstraps a component container.
//!
//! Components are registered as [`ComponentDescriptor`]s under a name. Building the
//! context runs the extension processors in a fixed order before any regular
//! component is created:
//!
//! 1. Registry processors may register or alter descriptors. They are drained until
//!    no new registry processor shows up.
//! 2. Factory processors adjust factory level configuration, tier by tier.
//! 3. Lifecycle processors are installed, they wrap the creation of every component
//!    created afterwards.
//!
//! Within each step processors are ordered by tier (priority, ordered, unordered),
//! then by their order value, then by registration order.
//!
//! # Examples
//!
//! ```rust
//! use sprig_context::{ComponentDescriptor, ContextBuilder};
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! let mut context = ContextBuilder::new()
//!     .component(
//!         "greeter",
//!         ComponentDescriptor::new(|ctx| {
//!             Ok(Greeter {
//!                 greeting: ctx.property("greeting").unwrap_or("hello").to_string(),
//!             })
//!         })
//!         .with_property("greeting", "hi"),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let greeter = context.require::<Greeter>("greeter").unwrap();
//! assert_eq!(greeter.greeting, "hi");
//! ```

pub mod bootstrap;
pub mod builder;
pub mod container;
pub mod descriptor;
pub mod errors;
pub mod listener;
pub mod ordering;
pub mod processors;
pub mod registry;
pub mod startup;
pub mod types;

pub use bootstrap::{install_lifecycle_processors, invoke_factory_processors, ContextProcessor};
pub use builder::ContextBuilder;
pub use container::ApplicationContext;
pub use descriptor::{Capability, ComponentDescriptor, PropertyValues, Role, Scope};
pub use errors::{BootstrapError, Phase, RegistryError};
pub use listener::{ApplicationEvent, ApplicationListener, ListenerRegistry};
pub use processors::{
    FactoryPostProcessor, LifecyclePostProcessor, MergedMetadataPostProcessor,
    RegistryPostProcessor, HIGHEST_PRECEDENCE, LOWEST_PRECEDENCE,
};
pub use registry::{ComponentRegistry, InstalledProcessor, SupplyContext};
pub use sprig_config::{Config, ConfigError, ConfigRegistry};
pub use startup::{ApplicationStartup, BufferingStartup, StartupStep, TracingStartup};
pub use types::{DynError, Injectable, Instance, TypeInfo};
