//! Application events and the processor which collects listeners.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    descriptor::Scope, processors::LifecyclePostProcessor, registry::ComponentRegistry,
    types::{DynError, Instance},
};

/// Chain name of the [`ListenerDetector`]
pub const LISTENER_DETECTOR_NAME: &str = "sprig.internal.listener-detector";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationEvent {
    /// All singletons are created and the context is ready
    ContextRefreshed,
    ContextClosed,
    Custom(String),
}

pub trait ApplicationListener: Send + Sync {
    fn on_event(&self, event: &ApplicationEvent);
}

/// Listeners of a context, shared between the context and its [`ListenerDetector`]
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Arc<Mutex<Vec<(String, Arc<dyn ApplicationListener>)>>>,
}
impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
impl ListenerRegistry {
    /// Adds a listener, returns false if one with the same name is registered already
    pub fn add(&self, name: impl Into<String>, listener: Arc<dyn ApplicationListener>) -> bool {
        let name = name.into();
        let mut listeners = self.lock();
        if listeners.iter().any(|(existing, _)| *existing == name) {
            return false;
        }
        listeners.push((name, listener));
        true
    }

    /// Delivers the event to all listeners in registration order
    pub fn publish(&self, event: &ApplicationEvent) {
        // Listeners may add further listeners, don't hold the lock while delivering
        let listeners: Vec<_> = self
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        tracing::debug!("Publishing {event:?} to {} listeners", listeners.len());
        for listener in listeners {
            listener.on_event(event);
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(String, Arc<dyn ApplicationListener>)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lifecycle processor adding every created singleton listener to the [`ListenerRegistry`]
pub struct ListenerDetector {
    listeners: ListenerRegistry,
}
impl ListenerDetector {
    pub fn new(listeners: ListenerRegistry) -> Self {
        ListenerDetector { listeners }
    }
}
impl LifecyclePostProcessor for ListenerDetector {
    fn after_initialization(
        &self,
        instance: Instance,
        name: &str,
        registry: &ComponentRegistry,
    ) -> Result<Instance, DynError> {
        let Some(listener) = instance.listener_view() else {
            return Ok(instance);
        };

        let scope = registry
            .descriptor_for(name)
            .map(|descriptor| descriptor.scope())
            .unwrap_or_default();
        match scope {
            Scope::Singleton => {
                if self.listeners.add(name, listener) {
                    tracing::debug!("Detected application listener '{name}'");
                }
            }
            Scope::Prototype => tracing::warn!(
                "Inner component '{name}' implements ApplicationListener but is not reachable for event \
                 multicasting by its containing context because it does not have singleton scope. \
                 Only top-level listener components are allowed to be of non-singleton scope."
            ),
        }
        Ok(instance)
    }

    fn describe(&self) -> String {
        LISTENER_DETECTOR_NAME.to_string()
    }
}
