use crate::{
    descriptor::Role,
    processors::LifecyclePostProcessor,
    registry::ComponentRegistry,
    types::{DynError, Instance},
};

/// Reports components created while lifecycle processors are still being installed
///
/// Such components miss the processors installed after them. The guard only logs,
/// it never fails and never changes the component.
#[derive(Debug, Clone, Copy)]
pub struct ProcessorGuard {
    target_count: usize,
}

impl ProcessorGuard {
    /// `target_count` is the number of installed processors once installation is complete
    pub fn new(target_count: usize) -> Self {
        ProcessorGuard { target_count }
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    fn is_infrastructure(registry: &ComponentRegistry, name: &str) -> bool {
        registry
            .descriptor_for(name)
            .is_ok_and(|descriptor| descriptor.role() == Role::Infrastructure)
    }
}

impl LifecyclePostProcessor for ProcessorGuard {
    fn after_initialization(
        &self,
        instance: Instance,
        name: &str,
        registry: &ComponentRegistry,
    ) -> Result<Instance, DynError> {
        if !instance.is_lifecycle_processor()
            && !Self::is_infrastructure(registry, name)
            && registry.installed_processor_count() < self.target_count
        {
            tracing::info!(
                "Component '{name}' of type [{}] is not eligible for getting processed by all lifecycle processors (for example: not eligible for auto-proxying)",
                instance.info
            );
        }
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;
    use crate::{descriptor::ComponentDescriptor, registry::InstalledProcessor};

    const NOTICE: &str = "is not eligible for getting processed";

    struct Noop;
    impl LifecyclePostProcessor for Noop {}

    fn registry_with_guard(target_count: usize) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.install_lifecycle_processor(InstalledProcessor::new(
            "guard",
            ProcessorGuard::new(target_count),
        ));
        registry
    }

    fn notices(lines: &[&str], name: &str) -> usize {
        let needle = format!("Component '{name}'");
        lines
            .iter()
            .filter(|line| line.contains(NOTICE) && line.contains(&needle))
            .count()
    }

    #[test]
    #[traced_test]
    fn reports_component_once_while_installation_is_incomplete() {
        // Three more processors are still to come
        let mut registry = registry_with_guard(4);
        registry
            .register_descriptor("x", ComponentDescriptor::new(|_| Ok(42_u32)))
            .unwrap();

        let instance = registry.get_component("x").unwrap();

        assert_eq!(*instance.downcast::<u32>().unwrap(), 42);
        logs_assert(|lines: &[&str]| match notices(lines, "x") {
            1 => Ok(()),
            n => Err(format!("expected one notice for x, got {n}")),
        });
    }

    #[test]
    #[traced_test]
    fn stays_silent_for_processors_infrastructure_and_complete_chains() {
        let mut registry = registry_with_guard(3);
        registry
            .register_descriptor(
                "infra",
                ComponentDescriptor::new(|_| Ok(1_u8)).with_role(Role::Infrastructure),
            )
            .unwrap();
        registry
            .register_descriptor(
                "processor",
                ComponentDescriptor::lifecycle_processor(|_| Ok(Noop)),
            )
            .unwrap();
        registry
            .register_descriptor("late", ComponentDescriptor::new(|_| Ok(2_u8)))
            .unwrap();

        registry.get_component("infra").unwrap();
        registry.get_component("processor").unwrap();
        registry.install_lifecycle_processors([
            InstalledProcessor::new("a", Noop),
            InstalledProcessor::new("b", Noop),
        ]);
        registry.get_component("late").unwrap();

        assert!(!logs_contain(NOTICE));
    }
}
