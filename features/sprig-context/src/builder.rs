use std::sync::Arc;

use sprig_config::{ConfigError, ConfigRegistry};

use crate::{
    bootstrap::ContextProcessor,
    container::ApplicationContext,
    descriptor::ComponentDescriptor,
    errors::BootstrapError,
    processors::{FactoryPostProcessor, RegistryPostProcessor},
    registry::ComponentRegistry,
    startup::ApplicationStartup,
};

/// Collects everything an [`ApplicationContext`] is built from
///
/// Nothing is instantiated before [`ContextBuilder::build`], which registers all
/// descriptors and refreshes the context.
pub struct ContextBuilder {
    /// Descriptors in registration order
    components: Vec<(String, ComponentDescriptor)>,
    /// Processors handed to the context directly, run before any registered one
    context_processors: Vec<ContextProcessor>,
    config: ConfigRegistry,
    /// First failed config registration, reported by build
    config_error: Option<ConfigError>,
    startup: Option<Arc<dyn ApplicationStartup>>,
    allow_descriptor_overriding: bool,
}
impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        ContextBuilder {
            components: Vec::new(),
            context_processors: Vec::new(),
            config: ConfigRegistry::new(),
            config_error: None,
            startup: None,
            allow_descriptor_overriding: true,
        }
    }
}
impl ContextBuilder {
    pub fn component(mut self, name: impl Into<String>, descriptor: ComponentDescriptor) -> Self {
        self.components.push((name.into(), descriptor));
        self
    }

    pub fn registry_processor<P: RegistryPostProcessor + 'static>(mut self, processor: P) -> Self {
        self.context_processors
            .push(ContextProcessor::registry(processor));
        self
    }

    pub fn factory_processor<P: FactoryPostProcessor + 'static>(mut self, processor: P) -> Self {
        self.context_processors
            .push(ContextProcessor::factory(processor));
        self
    }

    /// Registers a config value, a second value of the same type fails the build
    pub fn config<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        if let Err(error) = self.config.insert(value) {
            self.config_error.get_or_insert(error);
        }
        self
    }

    pub fn startup<S: ApplicationStartup + 'static>(mut self, startup: S) -> Self {
        self.startup = Some(Arc::new(startup));
        self
    }

    pub fn allow_descriptor_overriding(mut self, allow: bool) -> Self {
        self.allow_descriptor_overriding = allow;
        self
    }

    /// Registers all descriptors and refreshes the context
    pub fn build(self) -> Result<ApplicationContext, BootstrapError> {
        let ContextBuilder {
            components,
            context_processors,
            config,
            config_error,
            startup,
            allow_descriptor_overriding,
        } = self;

        if let Some(error) = config_error {
            return Err(error.into());
        }

        tracing::debug!(
            "Building context with {} components and {} context processors",
            components.len(),
            context_processors.len()
        );

        let mut registry = ComponentRegistry::new();
        registry.set_allow_descriptor_overriding(allow_descriptor_overriding);
        if let Some(startup) = startup {
            registry.set_application_startup(startup);
        }
        *registry.config_mut() = config;
        for (name, descriptor) in components {
            registry.register_descriptor(name, descriptor)?;
        }

        ApplicationContext::refresh(registry, &context_processors)
    }
}
