use std::sync::Arc;

use crate::{
    descriptor::Capability,
    errors::{BootstrapError, Phase},
    ordering::{
        classify, resolve_tier, sort_processors, Classified, ProcessedSet, ProcessorHandle,
        TierClass,
    },
    processors::{FactoryPostProcessor, RegistryPostProcessor, RegistryProcessors},
    registry::ComponentRegistry,
};

use super::{invoke_step, ContextProcessor};

/// Drains registry processors to a fixed point
pub(crate) struct RegistryProcessorRunner<'r> {
    registry: &'r mut ComponentRegistry,
    processed: ProcessedSet,
    /// Every registry processor that ran, explicit ones first, then in discovery order
    registry_processors: Vec<(String, Arc<dyn RegistryPostProcessor>)>,
    /// Explicit processors which are factory processors only
    regular_processors: Vec<(String, Arc<dyn FactoryPostProcessor>)>,
}

impl<'r> RegistryProcessorRunner<'r> {
    pub(crate) fn new(registry: &'r mut ComponentRegistry) -> Self {
        RegistryProcessorRunner {
            registry,
            processed: ProcessedSet::default(),
            registry_processors: Vec::new(),
            regular_processors: Vec::new(),
        }
    }

    /// Runs the phase and returns the names of all processors that ran
    pub(crate) fn run(
        mut self,
        context_processors: &[ContextProcessor],
    ) -> Result<ProcessedSet, BootstrapError> {
        for processor in context_processors {
            match processor {
                ContextProcessor::Registry(processor) => {
                    let label = processor.describe();
                    self.mutate(&label, processor)?;
                    self.registry_processors.push((label, processor.clone()));
                }
                ContextProcessor::Factory(processor) => {
                    self.regular_processors
                        .push((processor.describe(), processor.clone()));
                }
            }
        }

        self.drain()?;
        self.invoke_factory_callbacks()?;
        Ok(self.processed)
    }

    /// Runs the registry processors tier by tier
    ///
    /// Priority processors run before ordered ones are even instantiated, so they can
    /// still alter those descriptors. The same holds for ordered and unordered ones.
    /// Afterwards the registry is scanned until a pass finds no new processor.
    /// There is no bound on the number of passes, a processor which keeps
    /// registering new registry processors keeps the loop going.
    fn drain(&mut self) -> Result<(), BootstrapError> {
        let mut priority = self.scan()?.priority;
        sort_processors(&mut priority);
        self.invoke_batch(priority)?;

        // Priority processors registered by the previous tier run with the ordered ones
        let classified = self.scan()?;
        let mut ordered = classified.priority;
        ordered.extend(resolve_tier::<RegistryProcessors>(
            self.registry,
            classified.ordered,
            TierClass::Ordered,
        )?);
        sort_processors(&mut ordered);
        self.invoke_batch(ordered)?;

        let mut pass = 0;
        loop {
            let classified = self.scan()?;
            if classified.is_empty() {
                break;
            }

            pass += 1;
            tracing::debug!(
                "Registry processor pass {pass} found new processors: {:?}",
                classified.names()
            );
            let batch = classified.into_sorted_batch(self.registry)?;
            self.invoke_batch(batch)?;
        }

        tracing::debug!(
            "Registry processing settled after {pass} passes, {} processors ran",
            self.registry_processors.len()
        );
        Ok(())
    }

    /// Classifies the registry processors which did not run yet
    fn scan(&mut self) -> Result<Classified<RegistryProcessors>, BootstrapError> {
        let candidates = self
            .registry
            .names_for_capability(Capability::RegistryProcessor, true);
        Ok(classify::<RegistryProcessors>(
            self.registry,
            &candidates,
            &self.processed,
        )?)
    }

    fn invoke_batch(
        &mut self,
        batch: Vec<ProcessorHandle<RegistryProcessors>>,
    ) -> Result<(), BootstrapError> {
        for handle in &batch {
            self.processed.insert(handle.name.as_str());
        }
        for handle in batch {
            self.mutate(&handle.name, &handle.processor)?;
            self.registry_processors
                .push((handle.name, handle.processor));
        }
        Ok(())
    }

    fn mutate(
        &mut self,
        label: &str,
        processor: &Arc<dyn RegistryPostProcessor>,
    ) -> Result<(), BootstrapError> {
        invoke_step(self.registry, Phase::RegistryProcessing, label, |registry| {
            processor.post_process_registry(registry)
        })
    }

    /// Factory callbacks of all registry processors, then of the explicit factory processors
    fn invoke_factory_callbacks(&mut self) -> Result<(), BootstrapError> {
        for (label, processor) in &self.registry_processors {
            invoke_step(self.registry, Phase::FactoryProcessing, label, |registry| {
                processor.post_process_factory(registry)
            })?;
        }
        for (label, processor) in &self.regular_processors {
            invoke_step(self.registry, Phase::FactoryProcessing, label, |registry| {
                processor.post_process_factory(registry)
            })?;
        }
        Ok(())
    }
}
