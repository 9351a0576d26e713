use booter::ContainerError;

/// Errors when registering or retrieving configs
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The Config type is already registered
    #[error("Config '{0}' is already registered")]
    AlreadyRegistered(&'static str),
    /// The required Config is not known
    #[error("Config '{0}' is not known")]
    Missing(&'static str),
    /// The container refused the config
    #[error(transparent)]
    Container(#[from] ContainerError),
}
