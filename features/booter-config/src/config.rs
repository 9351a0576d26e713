use std::{fmt, ops::Deref, sync::Arc};

use booter::{Container, ContainerError, Injectable};

use crate::{errors::ConfigError, provider::config_key};

/// Typed handle on a config cached in a [Container]
///
/// Constructors resolve configs by type instead of by name. Every handle
/// points at the same cached instance, cloning one is cheap.
///
/// # Example
/// ```rust
/// use booter::{Container, ContainerError};
/// use booter_config::{config::Config, provider::ConfigProvider};
///
/// #[derive(Clone)]
/// pub struct MyModuleConfig {
///     enabled: bool,
/// }
///
/// let mut config_provider = ConfigProvider::initialize();
/// config_provider.add_config(MyModuleConfig { enabled: true }).unwrap();
/// let container = config_provider.into_container();
///
/// container
///     .register("my-module", |c: &Container| {
///         let config = Config::<MyModuleConfig>::resolve(c)?;
///         Ok::<_, booter_config::errors::ConfigError>(config.enabled)
///     })
///     .unwrap();
///
/// assert!(*container.get_as::<bool>("my-module").unwrap());
/// ```
pub struct Config<T> {
    shared: Arc<T>,
}

// Manual impls, a config doesn't have to be Clone or Debug to be shared
impl<T> Clone for Config<T> {
    fn clone(&self) -> Self {
        Config {
            shared: Arc::clone(&self.shared),
        }
    }
}
impl<T: fmt::Debug> fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Config").field(&self.shared).finish()
    }
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.shared
    }
}
impl<T: 'static> Config<T> {
    /// Name the config is cached under in the container
    pub fn key() -> String {
        config_key::<T>()
    }

    /// The instance cached in the container, not a copy of it
    pub fn shared(&self) -> Arc<T> {
        Arc::clone(&self.shared)
    }

    pub fn into_shared(self) -> Arc<T> {
        self.shared
    }
}

impl<T: Injectable> Config<T> {
    /// Looks the config up in the container, [ConfigError::Missing] if it was never installed
    pub fn resolve(container: &Container) -> Result<Self, ConfigError> {
        match container.get_as::<T>(&Self::key()) {
            Ok(shared) => Ok(Config { shared }),
            Err(ContainerError::NotRegistered(_)) => Err(ConfigError::Missing(std::any::type_name::<T>())),
            Err(e) => Err(e.into()),
        }
    }
}
