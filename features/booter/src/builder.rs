use crate::{
    container::Container,
    initiator::{BootInitiator, Shutdown},
    types::{Injectable, Instance},
};

/// Cleanup returned by a boot unit, run once on shutdown
pub type Cleanup = Box<dyn FnOnce() + Send + 'static>;

/// An independent setup routine sharing the container with its peers
pub type BootUnit = Box<dyn FnOnce(Container) -> Option<Cleanup> + Send + 'static>;

/// Collects boot units and pre-built instances, then boots them all at once.
///
/// ```no_run
/// use booter::{Booter, Container};
///
/// let shutdown = Booter::new()
///     .add_instance("app.name", "demo".to_string())
///     .add_unit(|c: Container| {
///         c.register("greeting", |c: &Container| {
///             let name = c.get_as::<String>("app.name")?;
///             Ok::<_, booter::ContainerError>(format!("hello {name}"))
///         })
///         .ok()?;
///         Some(Box::new(|| println!("bye")))
///     })
///     .boot();
///
/// // ... run the application ...
/// shutdown.shutdown();
/// ```
pub struct Booter {
    /// Instances cached before any unit starts
    pub(crate) instances: Vec<(String, Instance)>,
    pub(crate) units: Vec<BootUnit>,
    pub(crate) thread_name_prefix: String,
}
impl Default for Booter {
    fn default() -> Self {
        Self::new()
    }
}

impl Booter {
    pub fn new() -> Self {
        Booter {
            instances: Vec::new(),
            units: Vec::new(),
            thread_name_prefix: "boot-unit".to_string(),
        }
    }
}
impl Booter {
    pub fn add_instance<T: Injectable>(mut self, name: impl Into<String>, instance: T) -> Self {
        self.instances.push((name.into(), Instance::new(instance)));
        self
    }

    pub fn add_unit<F>(mut self, unit: F) -> Self
    where
        F: FnOnce(Container) -> Option<Cleanup> + Send + 'static,
    {
        self.units.push(Box::new(unit));
        self
    }

    pub fn add_units(mut self, units: impl IntoIterator<Item = BootUnit>) -> Self {
        self.units.extend(units);
        self
    }

    /// Threads running the units are named `{prefix}-{index}`
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Starts every unit on its own thread and returns without waiting for them
    pub fn boot(self) -> Shutdown {
        BootInitiator::new(self.thread_name_prefix).initiate(
            Container::with_cached(self.instances),
            self.units,
        )
    }
}

/// Boots the given units on a fresh container
///
/// Shorthand for `Booter::new().add_units(units).boot()`
pub fn boot(units: impl IntoIterator<Item = BootUnit>) -> Shutdown {
    Booter::new().add_units(units).boot()
}
