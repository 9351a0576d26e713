use thiserror::Error;

use crate::types::DynError;

/// Errors returned by the [Container](crate::container::Container)
///
/// All of them are recoverable. A nested `get` failure travels back through
/// every enclosing constructor unchanged, so the top-level caller sees the original cause.
#[derive(Error, Debug)]
pub enum ContainerError {
    /// A constructor is already registered under this name
    #[error("Service '{0}' is already registered")]
    DuplicateRegistration(String),
    /// The name was already built (or cached), registering it now would never take effect
    #[error("Service '{0}' is already booted and can no longer be registered")]
    AlreadyBooted(String),
    /// No constructor and no cached instance exist for the name
    #[error("Service '{0}' is not registered")]
    NotRegistered(String),
    /// A name re-entered its own construction chain
    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },
    /// The registered constructor returned an error
    #[error("Constructor for '{service}' failed - error: {error}")]
    ConstructorFailed { service: String, error: DynError },
    /// The alias would point at itself, directly or through other aliases
    #[error("Cannot alias '{service}' as '{alias}' - the alias would resolve to itself")]
    InvalidAlias { service: String, alias: String },

    #[error("Failed to downcast '{service}', required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        service: String,
        required_type: &'static str,
        actual_type: &'static str,
    },
}

impl ContainerError {
    /// Returns the offending chain if this is a circular dependency
    pub fn cycle(&self) -> Option<&[String]> {
        match self {
            ContainerError::CircularDependency { chain } => Some(chain),
            _ => None,
        }
    }

    /// Unwraps an error returned by a constructor.
    ///
    /// Container errors raised by nested lookups are passed on as they are,
    /// anything else is attributed to the service whose constructor failed.
    pub(crate) fn from_constructor(service: &str, error: DynError) -> Self {
        match error.downcast::<ContainerError>() {
            Ok(nested) => *nested,
            Err(error) => ContainerError::ConstructorFailed {
                service: service.to_string(),
                error,
            },
        }
    }
}
