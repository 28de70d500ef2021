use crate::{
    descriptor::Capability,
    errors::{BootstrapError, Phase},
    ordering::{classify, resolve_tier, sort_processors, ProcessedSet, ProcessorHandle, TierClass},
    processors::FactoryProcessors,
    registry::ComponentRegistry,
};

use super::invoke_step;

/// Runs the factory processors of the registry, tier by tier
pub(crate) struct FactoryProcessorRunner<'r> {
    registry: &'r mut ComponentRegistry,
    processed: &'r ProcessedSet,
}

impl<'r> FactoryProcessorRunner<'r> {
    pub(crate) fn new(registry: &'r mut ComponentRegistry, processed: &'r ProcessedSet) -> Self {
        FactoryProcessorRunner {
            registry,
            processed,
        }
    }

    pub(crate) fn run(self) -> Result<(), BootstrapError> {
        let candidates = self
            .registry
            .names_for_capability(Capability::FactoryProcessor, true);
        let classified = classify::<FactoryProcessors>(self.registry, &candidates, self.processed)?;

        // Each tier is only resolved once the previous one ran
        let mut priority = classified.priority;
        sort_processors(&mut priority);
        invoke_all(self.registry, priority)?;

        let mut ordered =
            resolve_tier::<FactoryProcessors>(self.registry, classified.ordered, TierClass::Ordered)?;
        sort_processors(&mut ordered);
        invoke_all(self.registry, ordered)?;

        let unordered = resolve_tier::<FactoryProcessors>(
            self.registry,
            classified.unordered,
            TierClass::Unordered,
        )?;
        invoke_all(self.registry, unordered)?;

        // Processors may have changed raw descriptors that merged ones were computed from
        self.registry.clear_metadata_cache();
        Ok(())
    }
}

fn invoke_all(
    registry: &mut ComponentRegistry,
    processors: Vec<ProcessorHandle<FactoryProcessors>>,
) -> Result<(), BootstrapError> {
    for handle in processors {
        invoke_step(registry, Phase::FactoryProcessing, &handle.name, |registry| {
            handle.processor.post_process_factory(registry)
        })?;
    }
    Ok(())
}
