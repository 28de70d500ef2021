use std::{collections::BTreeSet, fmt::Display, sync::Arc};

use crate::{
    listener::ApplicationListener,
    processors::{
        FactoryPostProcessor, LifecyclePostProcessor, MergedMetadataPostProcessor,
        RegistryPostProcessor,
    },
    registry::SupplyContext,
    types::{DynError, Injectable, Instance},
};

/// Builds the instance of a component
pub type Supplier = Arc<dyn Fn(&mut SupplyContext<'_>) -> Result<Instance, DynError> + Send + Sync>;

/// Entries of the capability table of a descriptor
///
/// The table is filled when the descriptor is constructed, so the registry can answer
/// capability queries without instantiating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    RegistryProcessor,
    FactoryProcessor,
    LifecycleProcessor,
    MergedMetadataProcessor,
    EventListener,
    PriorityOrdered,
    Ordered,
}
impl Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Capability::RegistryProcessor => "a registry processor",
            Capability::FactoryProcessor => "a factory processor",
            Capability::LifecycleProcessor => "a lifecycle processor",
            Capability::MergedMetadataProcessor => "a merged metadata processor",
            Capability::EventListener => "an event listener",
            Capability::PriorityOrdered => "priority ordered",
            Capability::Ordered => "ordered",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    /// Part of the application
    #[default]
    Normal,
    /// Supports the container itself, never reported by diagnostics
    Infrastructure,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    /// One shared instance, cached by the registry
    #[default]
    Singleton,
    /// A new instance on every lookup
    Prototype,
}

/// Raw property values of a descriptor, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyValues {
    values: Vec<(String, String)>,
}
impl PropertyValues {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets a value, keeping the position of an existing entry
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.values.iter().position(|(key, _)| key == name)?;
        Some(self.values.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Applies all values of `other` on top of these
    fn overlay(&mut self, other: &PropertyValues) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }
}

/// Recipe of a single component, prior to its instantiation
#[derive(Clone)]
pub struct ComponentDescriptor {
    supplier: Option<Supplier>,
    capabilities: BTreeSet<Capability>,
    role: Role,
    scope: Scope,
    properties: PropertyValues,
    parent: Option<String>,
    is_abstract: bool,
    lazy_init: bool,
}
impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("capabilities", &self.capabilities)
            .field("role", &self.role)
            .field("scope", &self.scope)
            .field("properties", &self.properties)
            .field("parent", &self.parent)
            .field("abstract", &self.is_abstract)
            .field("lazy_init", &self.lazy_init)
            .finish()
    }
}

// Constructors
impl ComponentDescriptor {
    /// A plain component
    pub fn new<T, F>(supply: F) -> Self
    where
        T: Injectable,
        F: Fn(&mut SupplyContext<'_>) -> Result<T, DynError> + Send + Sync + 'static,
    {
        Self::from_supplier([], move |ctx| supply(ctx).map(Instance::new))
    }

    /// A processor which may register or alter descriptors before anything is instantiated
    pub fn registry_processor<P, F>(supply: F) -> Self
    where
        P: RegistryPostProcessor + 'static,
        F: Fn(&mut SupplyContext<'_>) -> Result<P, DynError> + Send + Sync + 'static,
    {
        Self::from_supplier(
            [Capability::RegistryProcessor, Capability::FactoryProcessor],
            move |ctx| supply(ctx).map(Instance::registry_processor),
        )
    }

    pub fn factory_processor<P, F>(supply: F) -> Self
    where
        P: FactoryPostProcessor + 'static,
        F: Fn(&mut SupplyContext<'_>) -> Result<P, DynError> + Send + Sync + 'static,
    {
        Self::from_supplier([Capability::FactoryProcessor], move |ctx| {
            supply(ctx).map(Instance::factory_processor)
        })
    }

    pub fn lifecycle_processor<P, F>(supply: F) -> Self
    where
        P: LifecyclePostProcessor + 'static,
        F: Fn(&mut SupplyContext<'_>) -> Result<P, DynError> + Send + Sync + 'static,
    {
        Self::from_supplier([Capability::LifecycleProcessor], move |ctx| {
            supply(ctx).map(Instance::lifecycle_processor)
        })
    }

    /// A lifecycle processor which also processes merged descriptors
    pub fn merged_lifecycle_processor<P, F>(supply: F) -> Self
    where
        P: MergedMetadataPostProcessor + 'static,
        F: Fn(&mut SupplyContext<'_>) -> Result<P, DynError> + Send + Sync + 'static,
    {
        Self::from_supplier(
            [
                Capability::LifecycleProcessor,
                Capability::MergedMetadataProcessor,
            ],
            move |ctx| supply(ctx).map(Instance::merged_lifecycle_processor),
        )
    }

    pub fn listener<L, F>(supply: F) -> Self
    where
        L: ApplicationListener + 'static,
        F: Fn(&mut SupplyContext<'_>) -> Result<L, DynError> + Send + Sync + 'static,
    {
        Self::from_supplier([Capability::EventListener], move |ctx| {
            supply(ctx).map(Instance::listener)
        })
    }

    /// An abstract descriptor, only used as parent of other descriptors
    pub fn template() -> Self {
        ComponentDescriptor {
            supplier: None,
            capabilities: BTreeSet::new(),
            role: Role::default(),
            scope: Scope::default(),
            properties: PropertyValues::default(),
            parent: None,
            is_abstract: true,
            lazy_init: false,
        }
    }

    /// Descriptor with a raw supplier and an explicit capability table
    ///
    /// The supplied instance has to expose the views for the declared capabilities,
    /// otherwise resolving it by capability fails.
    pub fn from_supplier<F>(capabilities: impl IntoIterator<Item = Capability>, supply: F) -> Self
    where
        F: Fn(&mut SupplyContext<'_>) -> Result<Instance, DynError> + Send + Sync + 'static,
    {
        ComponentDescriptor {
            supplier: Some(Arc::new(supply)),
            capabilities: capabilities.into_iter().collect(),
            is_abstract: false,
            ..Self::template()
        }
    }
}

// Builder style modifiers
impl ComponentDescriptor {
    /// Marks the component for the priority tier, implies [`Capability::Ordered`]
    pub fn priority_ordered(mut self) -> Self {
        self.capabilities.insert(Capability::PriorityOrdered);
        self.capabilities.insert(Capability::Ordered);
        self
    }

    pub fn ordered(mut self) -> Self {
        self.capabilities.insert(Capability::Ordered);
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.set(name, value);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Skipped by singleton pre-instantiation, created on first lookup
    pub fn lazy(mut self) -> Self {
        self.lazy_init = true;
        self
    }
}

// Accessors
impl ComponentDescriptor {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        self.capabilities.iter().copied()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
    }

    pub fn properties(&self) -> &PropertyValues {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut PropertyValues {
        &mut self.properties
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_lazy_init(&self) -> bool {
        self.lazy_init
    }

    pub fn set_lazy_init(&mut self, lazy_init: bool) {
        self.lazy_init = lazy_init;
    }

    pub(crate) fn supplier(&self) -> Option<&Supplier> {
        self.supplier.as_ref()
    }

    /// Merges this (already merged) parent with a child descriptor
    ///
    /// Child properties win, a child without supplier inherits the one of the parent.
    pub(crate) fn merged_with_child(self, child: &ComponentDescriptor) -> ComponentDescriptor {
        let mut properties = self.properties;
        properties.overlay(&child.properties);

        let mut capabilities = self.capabilities;
        capabilities.extend(child.capabilities.iter().copied());

        ComponentDescriptor {
            supplier: child.supplier.clone().or(self.supplier),
            capabilities,
            role: child.role,
            scope: child.scope,
            properties,
            parent: None,
            is_abstract: child.is_abstract,
            lazy_init: child.lazy_init,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_set_keeps_position() {
        let mut values = PropertyValues::default();
        values.set("first", "1");
        values.set("second", "2");
        values.set("first", "one");

        let collected: Vec<_> = values.iter().collect();
        assert_eq!(collected, vec![("first", "one"), ("second", "2")]);
        assert_eq!(values.remove("first").as_deref(), Some("one"));
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn priority_ordered_implies_ordered() {
        let descriptor = ComponentDescriptor::new(|_| Ok(1_u8)).priority_ordered();

        assert!(descriptor.has_capability(Capability::PriorityOrdered));
        assert!(descriptor.has_capability(Capability::Ordered));
        assert!(!descriptor.has_capability(Capability::LifecycleProcessor));
    }

    #[test]
    fn merged_child_overrides_parent_properties() {
        let parent = ComponentDescriptor::template()
            .with_property("host", "localhost")
            .with_property("port", "80");
        let child = ComponentDescriptor::new(|_| Ok(()))
            .with_parent("base")
            .with_property("port", "8080");

        let merged = parent.merged_with_child(&child);

        assert_eq!(merged.properties().get("host"), Some("localhost"));
        assert_eq!(merged.properties().get("port"), Some("8080"));
        assert!(!merged.is_abstract());
        assert!(merged.parent().is_none());
        assert!(merged.supplier().is_some());
    }
}
