//! Extension points invoked by the container while it bootstraps and creates components.

use std::{any::type_name, sync::Arc};

use crate::{
    descriptor::{Capability, ComponentDescriptor},
    registry::ComponentRegistry,
    types::{DynError, Instance},
};

/// Order value of processors which should run first
pub const HIGHEST_PRECEDENCE: i32 = i32::MIN;
/// Order value of processors without an explicit order
pub const LOWEST_PRECEDENCE: i32 = i32::MAX;

/// Adjusts factory level configuration once all descriptors are structurally final
pub trait FactoryPostProcessor: Send + Sync {
    fn post_process_factory(&self, registry: &mut ComponentRegistry) -> Result<(), DynError>;

    /// Order value, only read when the descriptor is marked as ordered
    fn order(&self) -> i32 {
        LOWEST_PRECEDENCE
    }

    /// Identifies the processor in startup steps and errors
    fn describe(&self) -> String {
        type_name::<Self>().to_string()
    }
}

/// Registers or alters descriptors before any component is instantiated
///
/// Its [`FactoryPostProcessor`] callback runs after every registry processor has
/// mutated the registry.
pub trait RegistryPostProcessor: FactoryPostProcessor {
    fn post_process_registry(&self, registry: &mut ComponentRegistry) -> Result<(), DynError>;
}

/// Hooks around the initialization of every component created after its installation
pub trait LifecyclePostProcessor: Send + Sync {
    fn before_initialization(
        &self,
        instance: Instance,
        name: &str,
        registry: &ComponentRegistry,
    ) -> Result<Instance, DynError> {
        let _ = (name, registry);
        Ok(instance)
    }

    fn after_initialization(
        &self,
        instance: Instance,
        name: &str,
        registry: &ComponentRegistry,
    ) -> Result<Instance, DynError> {
        let _ = (name, registry);
        Ok(instance)
    }

    fn order(&self) -> i32 {
        LOWEST_PRECEDENCE
    }

    fn describe(&self) -> String {
        type_name::<Self>().to_string()
    }
}

/// Lifecycle processor which also sees the merged descriptor before a component is supplied
///
/// These are the "internal" processors, always installed after all others.
pub trait MergedMetadataPostProcessor: LifecyclePostProcessor {
    fn post_process_merged_descriptor(
        &self,
        descriptor: &mut ComponentDescriptor,
        name: &str,
    ) -> Result<(), DynError>;
}

/// Ties a capability to the processor view it resolves to
pub trait ProcessorKind {
    type Processor: ?Sized + Send + Sync;

    const CAPABILITY: Capability;

    fn view(instance: &Instance) -> Option<Arc<Self::Processor>>;

    fn order(processor: &Self::Processor) -> i32;
}

pub struct RegistryProcessors;
impl ProcessorKind for RegistryProcessors {
    type Processor = dyn RegistryPostProcessor;

    const CAPABILITY: Capability = Capability::RegistryProcessor;

    fn view(instance: &Instance) -> Option<Arc<Self::Processor>> {
        instance.registry_processor_view()
    }

    fn order(processor: &Self::Processor) -> i32 {
        processor.order()
    }
}

pub struct FactoryProcessors;
impl ProcessorKind for FactoryProcessors {
    type Processor = dyn FactoryPostProcessor;

    const CAPABILITY: Capability = Capability::FactoryProcessor;

    fn view(instance: &Instance) -> Option<Arc<Self::Processor>> {
        instance.factory_processor_view()
    }

    fn order(processor: &Self::Processor) -> i32 {
        processor.order()
    }
}

pub struct LifecycleProcessors;
impl ProcessorKind for LifecycleProcessors {
    type Processor = dyn LifecyclePostProcessor;

    const CAPABILITY: Capability = Capability::LifecycleProcessor;

    fn view(instance: &Instance) -> Option<Arc<Self::Processor>> {
        instance.lifecycle_processor_view()
    }

    fn order(processor: &Self::Processor) -> i32 {
        processor.order()
    }
}
