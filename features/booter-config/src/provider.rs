use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    sync::Arc,
};

use booter::{Container, Injectable, Instance};

use crate::errors::ConfigError;

/// Name under which a config of type `T` is cached in a [Container]
pub fn config_key<T: ?Sized + 'static>() -> String {
    key_for(type_name::<T>())
}

fn key_for(type_name: &str) -> String {
    format!("config::{type_name}")
}

/// A provider to register all configs.
///
/// Configs can be registered and retrieved based on type,
/// and installed into a [Container] before booting.
#[derive(Default)]
pub struct ConfigProvider {
    configs: HashMap<TypeId, Instance>,
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn initialize() -> Self {
        Self::default()
    }

    /// Retrieve a config with specified type.
    pub fn get_config<T: Injectable>(&self) -> Result<Arc<T>, ConfigError> {
        self.configs
            .get(&TypeId::of::<T>())
            .and_then(|instance| instance.downcast().ok())
            .ok_or(ConfigError::Missing(type_name::<T>()))
    }

    /// Add a config to the registry.
    ///
    /// If the config type is already registered, it will return a [`ConfigError`]
    pub fn add_config<T: Injectable>(&mut self, config: T) -> Result<&mut Self, ConfigError> {
        let type_id = TypeId::of::<T>();

        if self.configs.contains_key(&type_id) {
            return Err(ConfigError::AlreadyRegistered(type_name::<T>()));
        }

        self.configs.insert(type_id, Instance::new(config));
        Ok(self)
    }

    /// Can optionally add a config to the registry.
    ///
    /// If the config provided is `Some(T)`, it will be the same as calling [`ConfigProvider::add_config`]
    /// If the config provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_config<T: Injectable>(&mut self, config: Option<T>) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(c),
            None => Ok(self),
        }
    }

    /// Caches every config into the container, see [config_key]
    pub fn install(&self, container: &Container) {
        for instance in self.configs.values() {
            tracing::debug!("Installing config {}", instance.type_name());
            container.cache_instance(key_for(instance.type_name()), instance.clone());
        }
    }

    /// Creates a fresh container holding all configs
    pub fn into_container(self) -> Container {
        Container::with_cached(
            self.configs
                .into_values()
                .map(|instance| (key_for(instance.type_name()), instance)),
        )
    }
}
