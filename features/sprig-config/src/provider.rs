use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
};

use crate::{config::Config, errors::ConfigError};

type ConfigValue = Arc<dyn Any + Send + Sync + 'static>;

/// Factory level configuration, keyed by type.
///
/// Factory processors adjust it while the container bootstraps, component
/// suppliers read it when they build their component.
#[derive(Default, Clone)]
pub struct ConfigRegistry {
    configs: HashMap<TypeId, (&'static str, ConfigValue)>,
}
impl Debug for ConfigRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.configs.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        f.debug_set().entries(names).finish()
    }
}

impl ConfigRegistry {
    /// Initializes an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve the config value of type `T`, if one is registered
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Config<T>> {
        let (_, value) = self.configs.get(&TypeId::of::<T>())?;
        // Keyed by TypeId, so the downcast can only fail on a broken invariant
        Arc::downcast::<T>(value.clone()).ok().map(Config::new)
    }

    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.configs.contains_key(&TypeId::of::<T>())
    }

    /// Add a config value to the registry.
    ///
    /// If a value of the same type is already registered, it returns [`ConfigError::AlreadyRegistered`]
    pub fn insert<T: Send + Sync + 'static>(&mut self, config: T) -> Result<&mut Self, ConfigError> {
        let type_id = TypeId::of::<T>();

        if self.configs.contains_key(&type_id) {
            return Err(ConfigError::AlreadyRegistered(type_name::<T>()));
        }

        self.configs
            .insert(type_id, (type_name::<T>(), Arc::new(config)));
        Ok(self)
    }

    /// Can optionally add a config value to the registry.
    ///
    /// `Some(T)` behaves like [`ConfigRegistry::insert`], `None` just returns `Ok(self)` for chaining
    pub fn maybe_insert<T: Send + Sync + 'static>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.insert(c),
            None => Ok(self),
        }
    }

    /// Sets the value of type `T`, returning the one it replaced
    pub fn replace<T: Send + Sync + 'static>(&mut self, config: T) -> Option<Config<T>> {
        self.configs
            .insert(TypeId::of::<T>(), (type_name::<T>(), Arc::new(config)))
            .and_then(|(_, previous)| Arc::downcast::<T>(previous).ok())
            .map(Config::new)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
