//! Booter is a small service container with a concurrent boot orchestrator.
//!
//! Booter is split into two major parts:
//! 1. Container: a registry of named services, built lazily, once, on first use
//! 2. Booter: runs independent boot units concurrently on one shared Container and
//!    collects their cleanups into a single [Shutdown]
//!
//! # Examples
//!
//! ```rust
//! use booter::{Container, ContainerError};
//!
//! let container = Container::new();
//!
//! container
//!     .register("db", |_: &Container| Ok::<_, ContainerError>("postgres://localhost".to_string()))
//!     .unwrap();
//! container
//!     .register("repo", |c: &Container| {
//!         let db = c.get_as::<String>("db")?;
//!         Ok::<_, ContainerError>(format!("repository on {db}"))
//!     })
//!     .unwrap();
//! container.alias("repo", "users").unwrap();
//!
//! let repo = container.get_as::<String>("users").unwrap();
//! assert_eq!(*repo, "repository on postgres://localhost");
//! ```
//!
//! Dependencies are discovered while constructing: a constructor asks the container
//! for what it needs. Asking for a service that is already being built on the same
//! chain fails with [ContainerError::CircularDependency] instead of recursing.
//!
//! Booter consists of the following components:
//!
//! 1. Container - registration, resolution, aliases and cached instances
//! 2. Builder / Initiator - boot units, their threads and the shutdown
//! 3. Errors - everything the container can fail with

pub mod builder;
pub mod container;
pub mod errors;
pub mod initiator;
pub mod types;

pub use builder::{boot, BootUnit, Booter, Cleanup};
pub use container::Container;
pub use errors::ContainerError;
pub use initiator::{Shutdown, ShutdownReport};
pub use types::{DynError, Injectable, Instance};
