use std::{
    any::{Any, TypeId},
    sync::Arc,
};

use crate::{
    listener::ApplicationListener,
    processors::{
        FactoryPostProcessor, LifecyclePostProcessor, MergedMetadataPostProcessor,
        RegistryPostProcessor,
    },
};

/// Error type returned by suppliers and processor callbacks
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Components may be shared once the container is built,
/// so anything stored in it needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// A materialized component
///
/// Besides the type erased value, an instance carries the processor views of that
/// same value, so the container can call into it without knowing its concrete type.
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    pub instance: Arc<dyn Any + Send + Sync + 'static>,
    facets: Facets,
}

#[derive(Clone, Default)]
struct Facets {
    registry: Option<Arc<dyn RegistryPostProcessor>>,
    factory: Option<Arc<dyn FactoryPostProcessor>>,
    lifecycle: Option<Arc<dyn LifecyclePostProcessor>>,
    merged: Option<Arc<dyn MergedMetadataPostProcessor>>,
    listener: Option<Arc<dyn ApplicationListener>>,
}

impl Instance {
    /// A plain component
    pub fn new<T: Injectable>(value: T) -> Self {
        Self::shared(Arc::new(value), Facets::default())
    }

    /// A processor that may alter the descriptors of the registry. It is a factory processor as well.
    pub fn registry_processor<T: RegistryPostProcessor + 'static>(processor: T) -> Self {
        let processor = Arc::new(processor);
        let facets = Facets {
            registry: Some(processor.clone()),
            factory: Some(processor.clone()),
            ..Default::default()
        };
        Self::shared(processor, facets)
    }

    pub fn factory_processor<T: FactoryPostProcessor + 'static>(processor: T) -> Self {
        let processor = Arc::new(processor);
        let facets = Facets {
            factory: Some(processor.clone()),
            ..Default::default()
        };
        Self::shared(processor, facets)
    }

    pub fn lifecycle_processor<T: LifecyclePostProcessor + 'static>(processor: T) -> Self {
        let processor = Arc::new(processor);
        let facets = Facets {
            lifecycle: Some(processor.clone()),
            ..Default::default()
        };
        Self::shared(processor, facets)
    }

    /// A lifecycle processor that also processes merged descriptors (an "internal" processor)
    pub fn merged_lifecycle_processor<T: MergedMetadataPostProcessor + 'static>(
        processor: T,
    ) -> Self {
        let processor = Arc::new(processor);
        let facets = Facets {
            lifecycle: Some(processor.clone()),
            merged: Some(processor.clone()),
            ..Default::default()
        };
        Self::shared(processor, facets)
    }

    pub fn listener<T: ApplicationListener + 'static>(listener: T) -> Self {
        let listener = Arc::new(listener);
        let facets = Facets {
            listener: Some(listener.clone()),
            ..Default::default()
        };
        Self::shared(listener, facets)
    }

    fn shared<T: Injectable>(value: Arc<T>, facets: Facets) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            instance: value,
            facets,
        }
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }

    pub fn registry_processor_view(&self) -> Option<Arc<dyn RegistryPostProcessor>> {
        self.facets.registry.clone()
    }

    pub fn factory_processor_view(&self) -> Option<Arc<dyn FactoryPostProcessor>> {
        self.facets.factory.clone()
    }

    pub fn lifecycle_processor_view(&self) -> Option<Arc<dyn LifecyclePostProcessor>> {
        self.facets.lifecycle.clone()
    }

    pub fn merged_processor_view(&self) -> Option<Arc<dyn MergedMetadataPostProcessor>> {
        self.facets.merged.clone()
    }

    pub fn listener_view(&self) -> Option<Arc<dyn ApplicationListener>> {
        self.facets.listener.clone()
    }

    pub fn is_lifecycle_processor(&self) -> bool {
        self.facets.lifecycle.is_some()
    }
}
impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}
