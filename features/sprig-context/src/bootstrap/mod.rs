//! Runs the extension processors while the container bootstraps.
//!
//! The order matters. Registry processors are drained first, then factory processors
//! run tier by tier, and finally the lifecycle processors are installed. Instantiating a processor can register more
//! descriptors or create other components, so resolving in a different order changes
//! what the bootstrap observes.

mod factory_phase;
mod guard;
mod installer;
mod registry_phase;

use std::sync::Arc;

pub use guard::ProcessorGuard;
pub use installer::{install_lifecycle_processors, GUARD_PROCESSOR_NAME};

use crate::{
    errors::{BootstrapError, Phase},
    processors::{FactoryPostProcessor, RegistryPostProcessor},
    registry::ComponentRegistry,
    types::DynError,
};

/// Startup step opened for every registry processor callback
pub const REGISTRY_STEP: &str = "context.registry.post-process";
/// Startup step opened for every factory processor callback
pub const FACTORY_STEP: &str = "context.factory.post-process";
/// Tag identifying the processor of a startup step
pub const PROCESSOR_TAG: &str = "post_processor";

/// Processor handed to the context directly instead of being registered as a descriptor
#[derive(Clone)]
pub enum ContextProcessor {
    Registry(Arc<dyn RegistryPostProcessor>),
    Factory(Arc<dyn FactoryPostProcessor>),
}
impl ContextProcessor {
    pub fn registry<P: RegistryPostProcessor + 'static>(processor: P) -> Self {
        ContextProcessor::Registry(Arc::new(processor))
    }

    pub fn factory<P: FactoryPostProcessor + 'static>(processor: P) -> Self {
        ContextProcessor::Factory(Arc::new(processor))
    }
}
impl std::fmt::Debug for ContextProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContextProcessor::Registry(processor) => {
                f.debug_tuple("Registry").field(&processor.describe()).finish()
            }
            ContextProcessor::Factory(processor) => {
                f.debug_tuple("Factory").field(&processor.describe()).finish()
            }
        }
    }
}

/// Drains all registry processors, then runs all factory processors
///
/// Explicit registry processors run first in the given order, followed by every
/// registry processor found in the registry until no new ones appear. Afterwards the
/// factory callbacks of all registry processors and of the explicit factory processors
/// run, and finally the factory processors found in the registry, tier by tier.
pub fn invoke_factory_processors(
    registry: &mut ComponentRegistry,
    context_processors: &[ContextProcessor],
) -> Result<(), BootstrapError> {
    let processed = registry_phase::RegistryProcessorRunner::new(registry).run(context_processors)?;
    factory_phase::FactoryProcessorRunner::new(registry, &processed).run()
}

/// Runs one processor callback inside a startup step
fn invoke_step(
    registry: &mut ComponentRegistry,
    phase: Phase,
    processor: &str,
    callback: impl FnOnce(&mut ComponentRegistry) -> Result<(), DynError>,
) -> Result<(), BootstrapError> {
    let step_name = match phase {
        Phase::RegistryProcessing => REGISTRY_STEP,
        Phase::FactoryProcessing => FACTORY_STEP,
    };
    let startup = registry.application_startup();
    let mut step = startup.start(step_name);
    step.tag(PROCESSOR_TAG, &|| processor.to_string());

    let result = callback(registry);
    step.end();

    result.map_err(|error| BootstrapError::ProcessorFailed {
        phase,
        processor: processor.to_string(),
        error,
    })
}
