use std::sync::Arc;

use booter::{Booter, Container};

use crate::{
    config::Config,
    errors::ConfigError,
    provider::{config_key, ConfigProvider},
};

#[derive(Debug, PartialEq)]
struct ServerConfig {
    port: u16,
}

#[derive(Debug)]
struct Server {
    port: u16,
}

#[test]
fn add_and_get_config() {
    let mut provider = ConfigProvider::initialize();
    provider
        .add_config(ServerConfig { port: 8080 })
        .unwrap()
        .maybe_add_config(None::<String>)
        .unwrap();

    assert_eq!(*provider.get_config::<ServerConfig>().unwrap(), ServerConfig { port: 8080 });
    assert!(matches!(
        provider.get_config::<String>(),
        Err(ConfigError::Missing(_))
    ));
}

#[test]
fn config_registered_twice() {
    let mut provider = ConfigProvider::initialize();
    provider.add_config(ServerConfig { port: 1 }).unwrap();

    let err = provider.add_config(ServerConfig { port: 2 }).err().unwrap();
    assert!(matches!(err, ConfigError::AlreadyRegistered(_)));
    assert_eq!(provider.get_config::<ServerConfig>().unwrap().port, 1);
}

#[test]
fn constructors_resolve_configs() {
    let mut provider = ConfigProvider::initialize();
    provider.add_config(ServerConfig { port: 3000 }).unwrap();

    let container = Container::new();
    provider.install(&container);
    container
        .register("server", |c: &Container| {
            let config = Config::<ServerConfig>::resolve(c)?;
            Ok::<_, ConfigError>(Server { port: config.port })
        })
        .unwrap();

    assert_eq!(container.get_as::<Server>("server").unwrap().port, 3000);
}

#[test]
fn missing_config() {
    let container = Container::new();

    let err = Config::<ServerConfig>::resolve(&container).err().unwrap();
    assert!(matches!(err, ConfigError::Missing(name) if name.ends_with("ServerConfig")));
}

#[test]
fn configs_are_visible_to_boot_units() {
    let mut provider = ConfigProvider::initialize();
    provider.add_config(ServerConfig { port: 9000 }).unwrap();

    let shutdown = Booter::new()
        .add_unit(move |c| {
            provider.install(&c);
            None
        })
        .boot();
    let container = shutdown.container().clone();
    shutdown.shutdown();

    let config = Config::<ServerConfig>::resolve(&container).unwrap();
    assert_eq!(config.port, 9000);
    assert_eq!(config.into_shared().port, 9000);
}

#[test]
fn config_handles_share_the_cached_instance() {
    let mut provider = ConfigProvider::initialize();
    provider.add_config(ServerConfig { port: 7000 }).unwrap();
    let container = provider.into_container();

    let config = Config::<ServerConfig>::resolve(&container).unwrap();
    let copy = config.clone();

    assert_eq!(Config::<ServerConfig>::key(), config_key::<ServerConfig>());
    assert!(Arc::ptr_eq(&config.shared(), &copy.into_shared()));
    assert!(Arc::ptr_eq(
        &config.shared(),
        &container.get_as::<ServerConfig>(&config_key::<ServerConfig>()).unwrap()
    ));
    assert_eq!(format!("{config:?}"), "Config(ServerConfig { port: 7000 })");
}
