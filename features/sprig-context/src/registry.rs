use std::{
    any::type_name,
    collections::{HashMap, HashSet},
    fmt::Debug,
    sync::Arc,
};

use sprig_config::{Config, ConfigRegistry};

use crate::{
    descriptor::{Capability, ComponentDescriptor, Scope},
    errors::RegistryError,
    processors::{LifecyclePostProcessor, MergedMetadataPostProcessor, ProcessorKind},
    startup::{ApplicationStartup, TracingStartup},
    types::{Injectable, Instance},
};

/// Holds all component descriptors and the components created from them
///
/// Besides descriptors the registry owns the installed lifecycle processors, the
/// merged descriptor cache, the singleton cache, the factory configuration and the
/// startup recorder.
pub struct ComponentRegistry {
    descriptors: HashMap<String, ComponentDescriptor>,
    /// Names in registration order
    descriptor_names: Vec<String>,
    merged: HashMap<String, ComponentDescriptor>,
    singletons: HashMap<String, Instance>,
    /// Names of the components currently being supplied
    in_creation: HashSet<String>,
    chain: PostProcessorChain,
    config: ConfigRegistry,
    startup: Arc<dyn ApplicationStartup>,
    allow_descriptor_overriding: bool,
}
impl Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for name in &self.descriptor_names {
            let state = if self.singletons.contains_key(name) {
                "created"
            } else {
                "pending"
            };
            map.entry(name, &state);
        }
        map.finish()
    }
}
impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        ComponentRegistry {
            descriptors: HashMap::new(),
            descriptor_names: Vec::new(),
            merged: HashMap::new(),
            singletons: HashMap::new(),
            in_creation: HashSet::new(),
            chain: PostProcessorChain::default(),
            config: ConfigRegistry::new(),
            startup: Arc::new(TracingStartup),
            allow_descriptor_overriding: true,
        }
    }

    pub fn set_allow_descriptor_overriding(&mut self, allow: bool) {
        self.allow_descriptor_overriding = allow;
    }

    pub fn set_application_startup(&mut self, startup: Arc<dyn ApplicationStartup>) {
        self.startup = startup;
    }

    pub fn application_startup(&self) -> Arc<dyn ApplicationStartup> {
        self.startup.clone()
    }

    pub fn config(&self) -> &ConfigRegistry {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigRegistry {
        &mut self.config
    }
}

// Descriptors
impl ComponentRegistry {
    /// Registers a descriptor under the given name
    ///
    /// Overriding an existing descriptor keeps its registration position.
    pub fn register_descriptor(
        &mut self,
        name: impl Into<String>,
        descriptor: ComponentDescriptor,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.descriptors.contains_key(&name) {
            if !self.allow_descriptor_overriding {
                return Err(RegistryError::DuplicateDescriptor(name));
            }
            tracing::debug!("Overriding descriptor of component '{name}'");
        } else {
            self.descriptor_names.push(name.clone());
        }

        self.merged.remove(&name);
        self.descriptors.insert(name, descriptor);
        Ok(())
    }

    pub fn remove_descriptor(&mut self, name: &str) -> Result<ComponentDescriptor, RegistryError> {
        let descriptor = self
            .descriptors
            .remove(name)
            .ok_or_else(|| RegistryError::MissingDescriptor(name.to_string()))?;
        self.descriptor_names.retain(|existing| existing != name);
        self.merged.remove(name);
        Ok(descriptor)
    }

    pub fn contains_descriptor(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    pub fn descriptor_for(&self, name: &str) -> Result<&ComponentDescriptor, RegistryError> {
        self.descriptors
            .get(name)
            .ok_or_else(|| RegistryError::MissingDescriptor(name.to_string()))
    }

    /// Raw descriptor for modification
    ///
    /// Merged descriptors computed earlier are not refreshed, see [`ComponentRegistry::clear_metadata_cache`]
    pub fn descriptor_mut(&mut self, name: &str) -> Result<&mut ComponentDescriptor, RegistryError> {
        self.descriptors
            .get_mut(name)
            .ok_or_else(|| RegistryError::MissingDescriptor(name.to_string()))
    }

    /// All descriptor names in registration order
    pub fn descriptor_names(&self) -> &[String] {
        &self.descriptor_names
    }

    /// Names of all concrete descriptors declaring the capability, in registration order
    ///
    /// Only the capability table is consulted, nothing is instantiated.
    pub fn names_for_capability(
        &self,
        capability: Capability,
        include_non_singletons: bool,
    ) -> Vec<String> {
        self.descriptor_names
            .iter()
            .filter(|name| {
                self.descriptors.get(name.as_str()).is_some_and(|descriptor| {
                    !descriptor.is_abstract()
                        && self.declares(name.as_str(), capability)
                        && (include_non_singletons || descriptor.scope() == Scope::Singleton)
                })
            })
            .cloned()
            .collect()
    }

    /// Checks the capability table of a descriptor without instantiating it
    ///
    /// Capabilities declared by parents count as well, as they do for the merged descriptor.
    pub fn is_type_match(&self, name: &str, capability: Capability) -> bool {
        self.declares(name, capability)
    }

    /// Walks the raw parent chain, stops on missing parents and cycles
    fn declares(&self, name: &str, capability: Capability) -> bool {
        let mut visited: Vec<&str> = Vec::new();
        let mut current = name;
        while let Some(descriptor) = self.descriptors.get(current) {
            if descriptor.has_capability(capability) {
                return true;
            }
            visited.push(current);
            match descriptor.parent() {
                Some(parent) if !visited.contains(&parent) => current = parent,
                _ => return false,
            }
        }
        false
    }

    /// Descriptor with its parent chain merged in
    pub fn merged_descriptor(&mut self, name: &str) -> Result<ComponentDescriptor, RegistryError> {
        if let Some(merged) = self.merged.get(name) {
            return Ok(merged.clone());
        }

        let merged = self.merge(name, &mut Vec::new())?;
        self.merged.insert(name.to_string(), merged.clone());
        Ok(merged)
    }

    fn merge(
        &self,
        name: &str,
        chain: &mut Vec<String>,
    ) -> Result<ComponentDescriptor, RegistryError> {
        let descriptor = self.descriptor_for(name)?;
        let Some(parent) = descriptor.parent() else {
            return Ok(descriptor.clone());
        };

        chain.push(name.to_string());
        if chain.iter().any(|visited| visited == parent) {
            chain.push(parent.to_string());
            return Err(RegistryError::CircularParent {
                name: chain[0].clone(),
                chain: chain.clone(),
            });
        }
        if !self.descriptors.contains_key(parent) {
            return Err(RegistryError::MissingParent {
                name: name.to_string(),
                parent: parent.to_string(),
            });
        }

        let merged_parent = self.merge(parent, chain)?;
        Ok(merged_parent.merged_with_child(descriptor))
    }

    /// Drops merged descriptors of components which are not created yet
    ///
    /// Processors may have changed the raw descriptors those were computed from.
    pub fn clear_metadata_cache(&mut self) {
        let singletons = &self.singletons;
        self.merged.retain(|name, _| singletons.contains_key(name));
    }
}

// Components
impl ComponentRegistry {
    /// Resolves a component which has to declare the capability
    pub fn resolve(&mut self, name: &str, capability: Capability) -> Result<Instance, RegistryError> {
        self.descriptor_for(name)?;
        if !self.declares(name, capability) {
            return Err(RegistryError::CapabilityMismatch {
                name: name.to_string(),
                capability,
            });
        }

        self.get_component(name)
    }

    /// Resolves a processor and returns it together with its instance
    pub fn resolve_processor<K: ProcessorKind>(
        &mut self,
        name: &str,
    ) -> Result<(Instance, Arc<K::Processor>), RegistryError> {
        let instance = self.resolve(name, K::CAPABILITY)?;
        let processor = K::view(&instance).ok_or_else(|| RegistryError::CapabilityMismatch {
            name: name.to_string(),
            capability: K::CAPABILITY,
        })?;
        Ok((instance, processor))
    }

    /// Returns the cached singleton or creates the component
    pub fn get_component(&mut self, name: &str) -> Result<Instance, RegistryError> {
        if let Some(instance) = self.singletons.get(name) {
            return Ok(instance.clone());
        }

        let merged = self.merged_descriptor(name)?;
        if merged.is_abstract() {
            return Err(RegistryError::AbstractDescriptor(name.to_string()));
        }

        if !self.in_creation.insert(name.to_string()) {
            return Err(RegistryError::CircularReference(name.to_string()));
        }
        let created = self.create_component(name, merged.clone());
        self.in_creation.remove(name);
        let instance = created?;

        if merged.scope() == Scope::Singleton {
            self.singletons.insert(name.to_string(), instance.clone());
        }
        Ok(instance)
    }

    /// Typed lookup of a component
    pub fn require<T: Injectable>(&mut self, name: &str) -> Result<Arc<T>, RegistryError> {
        self.get_component(name)?
            .downcast()
            .map_err(|actual_type| RegistryError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    pub fn contains_singleton(&self, name: &str) -> bool {
        self.singletons.contains_key(name)
    }

    /// Creates every concrete, non lazy singleton in registration order
    pub fn preinstantiate_singletons(&mut self) -> Result<(), RegistryError> {
        let names: Vec<String> = self
            .descriptor_names
            .iter()
            .filter(|name| {
                self.descriptors.get(name.as_str()).is_some_and(|descriptor| {
                    !descriptor.is_abstract()
                        && !descriptor.is_lazy_init()
                        && descriptor.scope() == Scope::Singleton
                })
            })
            .cloned()
            .collect();

        tracing::debug!("Pre-instantiating {} singletons", names.len());
        for name in names {
            self.get_component(&name)?;
        }
        Ok(())
    }

    /// Drops all cached singletons
    pub fn destroy_singletons(&mut self) {
        tracing::debug!("Destroying {} singletons", self.singletons.len());
        self.singletons.clear();
    }

    fn create_component(
        &mut self,
        name: &str,
        mut descriptor: ComponentDescriptor,
    ) -> Result<Instance, RegistryError> {
        for entry in self.chain.entries.clone() {
            if let Some(merged) = &entry.merged {
                merged
                    .post_process_merged_descriptor(&mut descriptor, name)
                    .map_err(|error| RegistryError::LifecycleFailed {
                        name: name.to_string(),
                        processor: entry.name.clone(),
                        error,
                    })?;
            }
        }

        let supplier = descriptor
            .supplier()
            .cloned()
            .ok_or_else(|| RegistryError::AbstractDescriptor(name.to_string()))?;
        let mut instance = supplier(&mut SupplyContext {
            registry: self,
            name,
            descriptor: &descriptor,
        })
        .map_err(|error| RegistryError::CreationFailed {
            name: name.to_string(),
            error,
        })?;

        // The supplier may have caused further installations, use the chain as it is now
        let chain = self.chain.entries.clone();
        let registry: &ComponentRegistry = self;
        for entry in &chain {
            instance = entry
                .processor
                .before_initialization(instance, name, registry)
                .map_err(|error| entry.failed(name, error))?;
        }
        for entry in &chain {
            instance = entry
                .processor
                .after_initialization(instance, name, registry)
                .map_err(|error| entry.failed(name, error))?;
        }

        tracing::trace!("Created component '{name}' of type {}", instance.info);
        Ok(instance)
    }
}

// Lifecycle processor chain
impl ComponentRegistry {
    /// Appends the processor, moving it to the end if its name is already installed
    pub fn install_lifecycle_processor(&mut self, processor: InstalledProcessor) {
        self.chain.install(processor);
    }

    /// Bulk variant of [`ComponentRegistry::install_lifecycle_processor`], keeping the given order
    pub fn install_lifecycle_processors(
        &mut self,
        processors: impl IntoIterator<Item = InstalledProcessor>,
    ) {
        for processor in processors {
            self.chain.install(processor);
        }
    }

    pub fn installed_processor_count(&self) -> usize {
        self.chain.entries.len()
    }

    pub fn installed_processor_names(&self) -> Vec<&str> {
        self.chain
            .entries
            .iter()
            .map(|entry| entry.name.as_str())
            .collect()
    }
}

/// Lifecycle processors applied to every component creation, in order
#[derive(Default)]
struct PostProcessorChain {
    entries: Vec<InstalledProcessor>,
}
impl PostProcessorChain {
    fn install(&mut self, processor: InstalledProcessor) {
        self.entries.retain(|existing| existing.name != processor.name);
        self.entries.push(processor);
    }
}

/// An entry of the lifecycle processor chain
#[derive(Clone)]
pub struct InstalledProcessor {
    pub name: String,
    pub processor: Arc<dyn LifecyclePostProcessor>,
    /// Set for internal processors
    pub merged: Option<Arc<dyn MergedMetadataPostProcessor>>,
}
impl InstalledProcessor {
    pub fn new<P: LifecyclePostProcessor + 'static>(name: impl Into<String>, processor: P) -> Self {
        InstalledProcessor {
            name: name.into(),
            processor: Arc::new(processor),
            merged: None,
        }
    }

    fn failed(&self, component: &str, error: crate::types::DynError) -> RegistryError {
        RegistryError::LifecycleFailed {
            name: component.to_string(),
            processor: self.name.clone(),
            error,
        }
    }
}
impl Debug for InstalledProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstalledProcessor")
            .field("name", &self.name)
            .field("processor", &self.processor.describe())
            .field("internal", &self.merged.is_some())
            .finish()
    }
}

/// Handed to suppliers while they build their component
pub struct SupplyContext<'a> {
    registry: &'a mut ComponentRegistry,
    name: &'a str,
    descriptor: &'a ComponentDescriptor,
}
impl SupplyContext<'_> {
    /// Name of the component being supplied
    pub fn name(&self) -> &str {
        self.name
    }

    /// Merged descriptor of the component being supplied
    pub fn descriptor(&self) -> &ComponentDescriptor {
        self.descriptor
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.descriptor.properties().get(name)
    }

    pub fn config<T: Send + Sync + 'static>(&self) -> Option<Config<T>> {
        self.registry.config().get()
    }

    /// Looks up another component by name, creating it if needed
    pub fn component(&mut self, name: &str) -> Result<Instance, RegistryError> {
        self.registry.get_component(name)
    }

    pub fn require<T: Injectable>(&mut self, name: &str) -> Result<Arc<T>, RegistryError> {
        self.registry.require(name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::descriptor::Role;

    fn counting(counter: &Arc<AtomicUsize>) -> ComponentDescriptor {
        let counter = counter.clone();
        ComponentDescriptor::new(move |_| Ok(counter.fetch_add(1, Ordering::SeqCst)))
    }

    #[test]
    fn names_follow_registration_order() {
        let mut registry = ComponentRegistry::new();
        for name in ["c", "a", "b"] {
            registry
                .register_descriptor(name, ComponentDescriptor::new(|_| Ok(())).ordered())
                .unwrap();
        }
        registry
            .register_descriptor("base", ComponentDescriptor::template().ordered())
            .unwrap();

        assert_eq!(
            registry.names_for_capability(Capability::Ordered, true),
            vec!["c", "a", "b"]
        );
        assert!(registry.is_type_match("a", Capability::Ordered));
        assert!(!registry.is_type_match("a", Capability::PriorityOrdered));
        assert!(!registry.is_type_match("missing", Capability::Ordered));
    }

    #[test]
    fn names_can_exclude_prototypes() {
        let mut registry = ComponentRegistry::new();
        registry
            .register_descriptor("single", ComponentDescriptor::new(|_| Ok(())).ordered())
            .unwrap();
        registry
            .register_descriptor(
                "proto",
                ComponentDescriptor::new(|_| Ok(()))
                    .ordered()
                    .with_scope(Scope::Prototype),
            )
            .unwrap();

        assert_eq!(
            registry.names_for_capability(Capability::Ordered, false),
            vec!["single"]
        );
        assert_eq!(
            registry.names_for_capability(Capability::Ordered, true),
            vec!["single", "proto"]
        );
    }

    #[test]
    fn overriding_keeps_position_or_fails_when_disabled() {
        let mut registry = ComponentRegistry::new();
        registry
            .register_descriptor("a", ComponentDescriptor::new(|_| Ok(1_u8)))
            .unwrap();
        registry
            .register_descriptor("b", ComponentDescriptor::new(|_| Ok(2_u8)))
            .unwrap();
        registry
            .register_descriptor("a", ComponentDescriptor::new(|_| Ok(3_u8)))
            .unwrap();

        assert_eq!(registry.descriptor_names(), ["a", "b"]);
        assert_eq!(*registry.require::<u8>("a").unwrap(), 3);

        registry.set_allow_descriptor_overriding(false);
        let err = registry
            .register_descriptor("b", ComponentDescriptor::new(|_| Ok(4_u8)))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateDescriptor(name) if name == "b"));
    }

    #[test]
    fn singletons_are_cached_and_prototypes_are_not() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = ComponentRegistry::new();
        registry
            .register_descriptor("single", counting(&counter))
            .unwrap();
        registry
            .register_descriptor("proto", counting(&counter).with_scope(Scope::Prototype))
            .unwrap();

        assert_eq!(*registry.require::<usize>("single").unwrap(), 0);
        assert_eq!(*registry.require::<usize>("single").unwrap(), 0);
        assert_eq!(*registry.require::<usize>("proto").unwrap(), 1);
        assert_eq!(*registry.require::<usize>("proto").unwrap(), 2);
        assert!(registry.contains_singleton("single"));
        assert!(!registry.contains_singleton("proto"));
    }

    #[test]
    fn resolve_checks_capability_before_instantiating() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = ComponentRegistry::new();
        registry.register_descriptor("plain", counting(&counter)).unwrap();

        let err = registry
            .resolve("plain", Capability::FactoryProcessor)
            .unwrap_err();

        assert!(matches!(
            err,
            RegistryError::CapabilityMismatch {
                capability: Capability::FactoryProcessor,
                ..
            }
        ));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(matches!(
            registry.resolve("missing", Capability::FactoryProcessor),
            Err(RegistryError::MissingDescriptor(_))
        ));
    }

    #[test]
    fn raw_supplier_without_declared_view_is_rejected() {
        let mut registry = ComponentRegistry::new();
        registry
            .register_descriptor(
                "liar",
                ComponentDescriptor::from_supplier([Capability::LifecycleProcessor], |_| {
                    Ok(Instance::new("not a processor"))
                }),
            )
            .unwrap();

        assert!(matches!(
            registry.resolve_processor::<crate::processors::LifecycleProcessors>("liar"),
            Err(RegistryError::CapabilityMismatch { .. })
        ));
    }

    #[test]
    fn suppliers_read_merged_properties() {
        let mut registry = ComponentRegistry::new();
        registry
            .register_descriptor(
                "base",
                ComponentDescriptor::template()
                    .with_property("host", "localhost")
                    .with_property("port", "80"),
            )
            .unwrap();
        registry
            .register_descriptor(
                "server",
                ComponentDescriptor::new(|ctx| {
                    Ok(format!(
                        "{}:{}",
                        ctx.property("host").unwrap_or_default(),
                        ctx.property("port").unwrap_or_default()
                    ))
                })
                .with_parent("base")
                .with_property("port", "8080")
                .with_role(Role::Infrastructure),
            )
            .unwrap();

        assert_eq!(*registry.require::<String>("server").unwrap(), "localhost:8080");
        assert_eq!(
            registry.merged_descriptor("server").unwrap().role(),
            Role::Infrastructure
        );
        assert!(matches!(
            registry.get_component("base"),
            Err(RegistryError::AbstractDescriptor(_))
        ));
    }

    #[test]
    fn parent_problems_are_reported() {
        let mut registry = ComponentRegistry::new();
        registry
            .register_descriptor("orphan", ComponentDescriptor::new(|_| Ok(())).with_parent("gone"))
            .unwrap();
        registry
            .register_descriptor("a", ComponentDescriptor::template().with_parent("b"))
            .unwrap();
        registry
            .register_descriptor("b", ComponentDescriptor::template().with_parent("a"))
            .unwrap();

        assert!(matches!(
            registry.merged_descriptor("orphan"),
            Err(RegistryError::MissingParent { parent, .. }) if parent == "gone"
        ));
        assert!(matches!(
            registry.merged_descriptor("a"),
            Err(RegistryError::CircularParent { chain, .. }) if chain == ["a", "b", "a"]
        ));
    }

    #[test]
    fn metadata_cache_is_kept_until_cleared() {
        let mut registry = ComponentRegistry::new();
        registry
            .register_descriptor(
                "pending",
                ComponentDescriptor::new(|_| Ok(())).with_property("value", "old"),
            )
            .unwrap();
        registry
            .register_descriptor(
                "created",
                ComponentDescriptor::new(|_| Ok(())).with_property("value", "old"),
            )
            .unwrap();
        registry.get_component("created").unwrap();
        registry.merged_descriptor("pending").unwrap();

        for name in ["pending", "created"] {
            registry
                .descriptor_mut(name)
                .unwrap()
                .properties_mut()
                .set("value", "new");
        }
        assert_eq!(
            registry.merged_descriptor("pending").unwrap().properties().get("value"),
            Some("old")
        );

        registry.clear_metadata_cache();

        assert_eq!(
            registry.merged_descriptor("pending").unwrap().properties().get("value"),
            Some("new")
        );
        // Merged data of created components stays as it was used
        assert_eq!(
            registry.merged_descriptor("created").unwrap().properties().get("value"),
            Some("old")
        );
    }

    #[test]
    fn suppliers_can_look_up_other_components() {
        let mut registry = ComponentRegistry::new();
        registry
            .register_descriptor("greeting", ComponentDescriptor::new(|_| Ok("hello".to_string())))
            .unwrap();
        registry
            .register_descriptor(
                "message",
                ComponentDescriptor::new(|ctx| {
                    let greeting = ctx.require::<String>("greeting")?;
                    Ok(format!("{greeting} {}", ctx.name()))
                }),
            )
            .unwrap();

        assert_eq!(*registry.require::<String>("message").unwrap(), "hello message");
        assert!(registry.contains_singleton("greeting"));
    }

    #[test]
    fn circular_lookups_fail() {
        let mut registry = ComponentRegistry::new();
        registry
            .register_descriptor(
                "chicken",
                ComponentDescriptor::new(|ctx| ctx.component("egg").map(|_| ()).map_err(Into::into)),
            )
            .unwrap();
        registry
            .register_descriptor(
                "egg",
                ComponentDescriptor::new(|ctx| {
                    ctx.component("chicken").map(|_| ()).map_err(Into::into)
                }),
            )
            .unwrap();

        match registry.get_component("chicken").unwrap_err() {
            RegistryError::CreationFailed { name, error } => {
                assert_eq!(name, "chicken");
                assert!(error.to_string().contains("currently in creation"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!registry.contains_singleton("chicken"));
    }

    #[test]
    fn chain_moves_reinstalled_entries_to_the_end() {
        struct Noop;
        impl LifecyclePostProcessor for Noop {}

        let mut registry = ComponentRegistry::new();
        registry.install_lifecycle_processors([
            InstalledProcessor::new("a", Noop),
            InstalledProcessor::new("b", Noop),
            InstalledProcessor::new("c", Noop),
        ]);
        registry.install_lifecycle_processor(InstalledProcessor::new("a", Noop));

        assert_eq!(registry.installed_processor_names(), vec!["b", "c", "a"]);
        assert_eq!(registry.installed_processor_count(), 3);
    }

    #[test]
    fn capabilities_of_parents_are_inherited() {
        let mut registry = ComponentRegistry::new();
        registry
            .register_descriptor("base", ComponentDescriptor::template().ordered())
            .unwrap();
        registry
            .register_descriptor("child", ComponentDescriptor::new(|_| Ok(())).with_parent("base"))
            .unwrap();
        registry
            .register_descriptor("loop-a", ComponentDescriptor::template().with_parent("loop-b"))
            .unwrap();
        registry
            .register_descriptor("loop-b", ComponentDescriptor::template().with_parent("loop-a"))
            .unwrap();

        assert!(registry.is_type_match("child", Capability::Ordered));
        assert!(registry
            .merged_descriptor("child")
            .unwrap()
            .has_capability(Capability::Ordered));
        assert_eq!(
            registry.names_for_capability(Capability::Ordered, true),
            vec!["child"]
        );
        assert!(!registry.is_type_match("loop-a", Capability::Ordered));
    }

    #[test]
    fn lazy_singletons_are_not_preinstantiated() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = ComponentRegistry::new();
        registry.register_descriptor("eager", counting(&counter)).unwrap();
        registry
            .register_descriptor("lazy", counting(&counter).lazy())
            .unwrap();
        registry
            .register_descriptor("base", ComponentDescriptor::template())
            .unwrap();

        registry.preinstantiate_singletons().unwrap();

        assert!(registry.contains_singleton("eager"));
        assert!(!registry.contains_singleton("lazy"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        registry.get_component("lazy").unwrap();
        assert!(registry.contains_singleton("lazy"));
    }
}
