use std::{any::type_name, fmt::Debug, sync::Arc};

use crate::{
    bootstrap::{install_lifecycle_processors, invoke_factory_processors, ContextProcessor},
    errors::{BootstrapError, RegistryError},
    listener::{ApplicationEvent, ListenerDetector, ListenerRegistry, LISTENER_DETECTOR_NAME},
    registry::{ComponentRegistry, InstalledProcessor},
    types::{Injectable, Instance},
};

/// A refreshed container: every processor ran and all eager singletons exist
pub struct ApplicationContext {
    registry: ComponentRegistry,
    listeners: ListenerRegistry,
    closed: bool,
}
impl Debug for ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("components", &self.registry)
            .field("listeners", &self.listeners)
            .field("closed", &self.closed)
            .finish()
    }
}

impl ApplicationContext {
    /// Runs all bootstrap phases on the registry
    ///
    /// A failed phase aborts the refresh, the registry is dropped with the error.
    pub(crate) fn refresh(
        mut registry: ComponentRegistry,
        context_processors: &[ContextProcessor],
    ) -> Result<ApplicationContext, BootstrapError> {
        let listeners = ListenerRegistry::default();
        match Self::try_refresh(&mut registry, &listeners, context_processors) {
            Ok(()) => {
                listeners.publish(&ApplicationEvent::ContextRefreshed);
                tracing::debug!(
                    "Context refreshed with {} components",
                    registry.descriptor_names().len()
                );
                Ok(ApplicationContext {
                    registry,
                    listeners,
                    closed: false,
                })
            }
            Err(error) => {
                tracing::warn!("Context refresh failed, cancelling - error: {error}");
                registry.destroy_singletons();
                Err(error)
            }
        }
    }

    fn try_refresh(
        registry: &mut ComponentRegistry,
        listeners: &ListenerRegistry,
        context_processors: &[ContextProcessor],
    ) -> Result<(), BootstrapError> {
        // Prepare: listeners created by processors are detected as well
        registry.install_lifecycle_processor(InstalledProcessor::new(
            LISTENER_DETECTOR_NAME,
            ListenerDetector::new(listeners.clone()),
        ));

        invoke_factory_processors(registry, context_processors)?;
        install_lifecycle_processors(registry, listeners)?;
        registry.preinstantiate_singletons()?;
        Ok(())
    }
}

impl ApplicationContext {
    pub fn get_component(&mut self, name: &str) -> Result<Instance, RegistryError> {
        self.registry.get_component(name)
    }

    /// Attempts to get the component as the requested type
    pub fn require<T: Injectable>(&mut self, name: &str) -> Result<Arc<T>, RegistryError> {
        self.get_component(name)?
            .downcast()
            .map_err(|actual_type| RegistryError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn publish_event(&self, event: ApplicationEvent) {
        self.listeners.publish(&event);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Publishes [`ApplicationEvent::ContextClosed`] and drops all singletons
    ///
    /// Closing twice does nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.listeners.publish(&ApplicationEvent::ContextClosed);
        self.registry.destroy_singletons();
        self.closed = true;
    }
}
