use crate::{
    descriptor::Capability,
    errors::BootstrapError,
    listener::{ListenerDetector, ListenerRegistry, LISTENER_DETECTOR_NAME},
    ordering::{
        classify, resolve_tier, sort_processors, ProcessedSet, ProcessorHandle, TierClass,
    },
    processors::LifecycleProcessors,
    registry::{ComponentRegistry, InstalledProcessor},
};

use super::guard::ProcessorGuard;

/// Chain name of the [`ProcessorGuard`]
pub const GUARD_PROCESSOR_NAME: &str = "sprig.internal.processor-guard";

/// Installs the lifecycle processors of the registry
///
/// The resulting chain is: the guard, the priority tier, the ordered tier, the
/// unordered tier, the internal processors (moved out of their tiers), and the
/// listener detector last.
pub fn install_lifecycle_processors(
    registry: &mut ComponentRegistry,
    listeners: &ListenerRegistry,
) -> Result<(), BootstrapError> {
    let candidates = registry.names_for_capability(Capability::LifecycleProcessor, true);

    // The guard counts itself
    let target_count = registry.installed_processor_count() + 1 + candidates.len();
    registry.install_lifecycle_processor(InstalledProcessor::new(
        GUARD_PROCESSOR_NAME,
        ProcessorGuard::new(target_count),
    ));

    let classified =
        classify::<LifecycleProcessors>(registry, &candidates, &ProcessedSet::default())?;
    let mut internal = Vec::new();

    let mut priority = classified.priority;
    collect_internal(&priority, &mut internal);
    sort_processors(&mut priority);
    install(registry, &priority);

    let mut ordered =
        resolve_tier::<LifecycleProcessors>(registry, classified.ordered, TierClass::Ordered)?;
    collect_internal(&ordered, &mut internal);
    sort_processors(&mut ordered);
    install(registry, &ordered);

    let unordered = resolve_tier::<LifecycleProcessors>(
        registry,
        classified.unordered,
        TierClass::Unordered,
    )?;
    collect_internal(&unordered, &mut internal);
    install(registry, &unordered);

    // Installing again moves them behind all regular processors
    sort_processors(&mut internal);
    install(registry, &internal);

    registry.install_lifecycle_processor(InstalledProcessor::new(
        LISTENER_DETECTOR_NAME,
        ListenerDetector::new(listeners.clone()),
    ));

    tracing::debug!(
        "Installed lifecycle processors ({} internal): {:?}",
        internal.len(),
        registry.installed_processor_names()
    );
    Ok(())
}

fn collect_internal(
    handles: &[ProcessorHandle<LifecycleProcessors>],
    internal: &mut Vec<ProcessorHandle<LifecycleProcessors>>,
) {
    internal.extend(
        handles
            .iter()
            .filter(|handle| handle.instance.merged_processor_view().is_some())
            .cloned(),
    );
}

fn install(registry: &mut ComponentRegistry, handles: &[ProcessorHandle<LifecycleProcessors>]) {
    registry.install_lifecycle_processors(handles.iter().map(|handle| InstalledProcessor {
        name: handle.name.clone(),
        processor: handle.processor.clone(),
        merged: handle.instance.merged_processor_view(),
    }));
}
