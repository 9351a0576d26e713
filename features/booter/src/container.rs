use std::{
    any::type_name,
    collections::{HashMap, HashSet},
    fmt::Debug,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    thread::{self, ThreadId},
};

use crate::{
    errors::ContainerError,
    types::{DynError, Injectable, Instance},
};

/// Type erased constructor as stored in the registry
type Constructor = Arc<dyn Fn(&Container) -> Result<Instance, DynError> + Send + Sync>;

/// Registry of named services, constructed lazily and at most once.
///
/// The container is a cheap handle, clones share the same registry.
/// Dependencies are not declared up front: a constructor receives the container
/// and simply calls [Container::get] for whatever it needs.
///
/// Constructors run without holding the internal lock, so they can resolve
/// their own dependencies and unrelated services can be built in parallel.
/// There are no timeouts - a constructor that never returns stalls every
/// caller waiting for that service.
#[derive(Clone, Default)]
pub struct Container(Arc<ContainerInner>);

#[derive(Default)]
struct ContainerInner {
    state: Mutex<State>,
    /// Signalled whenever a construction ends
    constructed: Condvar,
}

#[derive(Default)]
struct State {
    registry: HashMap<String, Constructor>,
    booted: HashMap<String, Instance>,
    /// alias -> origin, always a single hop
    aliases: HashMap<String, String>,
    /// Names under construction, per resolving thread, in call order
    booting: HashMap<ThreadId, Vec<String>>,
    /// Name -> thread currently running its constructor
    in_flight: HashMap<String, ThreadId>,
    /// Thread -> name it is blocked on
    waiting: HashMap<ThreadId, String>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a container pre-seeded with already built instances
    pub fn with_cached<K: Into<String>>(instances: impl IntoIterator<Item = (K, Instance)>) -> Self {
        let container = Self::new();
        {
            let mut state = container.lock();
            for (name, instance) in instances {
                state.booted.insert(name.into(), instance);
            }
        }
        container
    }

    /// Registers the constructor for a service.
    ///
    /// Nothing is constructed until the service is first requested.
    pub fn register<T, E, F>(&self, name: impl Into<String>, constructor: F) -> Result<(), ContainerError>
    where
        T: Injectable,
        E: Into<DynError>,
        F: Fn(&Container) -> Result<T, E> + Send + Sync + 'static,
    {
        let name = name.into();
        let mut state = self.lock();

        if state.registry.contains_key(&name) {
            tracing::warn!("Service '{name}' registered twice");
            return Err(ContainerError::DuplicateRegistration(name));
        }
        if state.booted.contains_key(&name) {
            return Err(ContainerError::AlreadyBooted(name));
        }

        tracing::debug!("Registered service '{name}' providing {}", type_name::<T>());
        state.registry.insert(
            name,
            Arc::new(move |container: &Container| -> Result<Instance, DynError> {
                constructor(container).map(Instance::new).map_err(Into::into)
            }),
        );
        Ok(())
    }

    /// Stores an already built value under the given name, replacing any previous one
    pub fn cache<T: Injectable>(&self, name: impl Into<String>, value: T) {
        self.cache_instance(name, Instance::new(value));
    }

    pub fn cache_instance(&self, name: impl Into<String>, instance: Instance) {
        let name = name.into();
        tracing::debug!("Caching {} as '{name}'", instance.type_name());
        if self.lock().booted.insert(name.clone(), instance).is_some() {
            tracing::debug!("Cached instance '{name}' replaced a previous one");
        }
    }

    /// Makes `alias` resolve to `service`.
    ///
    /// Aliases of aliases are collapsed onto the origin, so lookups never walk
    /// more than one hop and alias cycles cannot be formed.
    /// The origin does not have to exist yet.
    pub fn alias(&self, service: impl Into<String>, alias: impl Into<String>) -> Result<(), ContainerError> {
        let (service, alias) = (service.into(), alias.into());
        if service == alias {
            return Err(ContainerError::InvalidAlias { service, alias });
        }
        let mut state = self.lock();

        let origin = state.origin(&service).to_string();
        if origin == alias {
            return Err(ContainerError::InvalidAlias { service, alias });
        }

        // Keep existing aliases of the new alias a single hop away from the origin
        for target in state.aliases.values_mut() {
            if *target == alias {
                *target = origin.clone();
            }
        }

        tracing::debug!("Aliased '{origin}' as '{alias}'");
        state.aliases.insert(alias, origin);
        Ok(())
    }

    /// Returns the instance of a service, constructing it (and its dependencies) on first use.
    ///
    /// A failed construction is not remembered, the next call runs the constructor again.
    pub fn get(&self, name: &str) -> Result<Instance, ContainerError> {
        let thread = thread::current().id();
        let mut state = self.lock();

        let service = state.origin(name).to_string();
        if service != name {
            tracing::trace!("'{name}' is an alias of '{service}'");
        }

        loop {
            if let Some(instance) = state.booted.get(&service) {
                tracing::trace!("Service '{service}' already booted");
                return Ok(instance.clone());
            }

            let Some(constructor) = state.registry.get(&service).cloned() else {
                tracing::error!("Tried to get an unregistered service: '{service}'");
                return Err(ContainerError::NotRegistered(service));
            };

            if let Some(chain) = state.cycle(thread, &service) {
                let error = ContainerError::CircularDependency { chain };
                tracing::error!("{error}");
                return Err(error);
            }

            if !state.in_flight.contains_key(&service) {
                return self.construct(state, thread, &service, constructor);
            }

            // Someone else is building it, wait for them and look again
            tracing::trace!("Waiting for service '{service}' to be constructed by another thread");
            state.waiting.insert(thread, service.clone());
            state = self
                .0
                .constructed
                .wait_while(state, |state| state.in_flight.contains_key(&service))
                .unwrap_or_else(PoisonError::into_inner);
            state.waiting.remove(&thread);
        }
    }

    /// Like [Container::get], but downcasts the instance to the expected type
    pub fn get_as<T: Injectable>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        self.get(name)?
            .downcast()
            .map_err(|actual_type| ContainerError::DowncastFailed {
                service: name.to_string(),
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    /// Strict variant of [Container::get] for callers that treat any failure as fatal
    ///
    /// # Panics
    /// If the service cannot be resolved
    #[track_caller]
    pub fn must_get(&self, name: &str) -> Instance {
        match self.get(name) {
            Ok(instance) => instance,
            Err(e) => panic!("{e}"),
        }
    }

    /// Strict variant of [Container::get_as]
    ///
    /// # Panics
    /// If the service cannot be resolved or has a different type
    #[track_caller]
    pub fn must_get_as<T: Injectable>(&self, name: &str) -> Arc<T> {
        match self.get_as(name) {
            Ok(instance) => instance,
            Err(e) => panic!("{e}"),
        }
    }

    /// True if a constructor is registered for the name (after alias resolution)
    pub fn is_registered(&self, name: &str) -> bool {
        let state = self.lock();
        state.registry.contains_key(state.origin(name))
    }

    /// True if an instance is available for the name (after alias resolution)
    pub fn is_booted(&self, name: &str) -> bool {
        let state = self.lock();
        state.booted.contains_key(state.origin(name))
    }

    /// Returns the name an alias points to, or the name itself
    pub fn resolve_alias(&self, name: &str) -> String {
        self.lock().origin(name).to_string()
    }

    /// All known service names, sorted
    pub fn services(&self) -> Vec<String> {
        self.lock().names()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Constructors never run under the lock, so a poisoned state is still consistent
        self.0.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn construct(
        &self,
        mut state: MutexGuard<'_, State>,
        thread: ThreadId,
        service: &str,
        constructor: Constructor,
    ) -> Result<Instance, ContainerError> {
        state.in_flight.insert(service.to_string(), thread);
        state.booting.entry(thread).or_default().push(service.to_string());
        drop(state);

        let construction = Construction {
            container: self,
            thread,
            service,
            finished: false,
        };

        tracing::debug!("Constructing service '{service}'");
        match constructor(self) {
            Ok(instance) => {
                construction.finish(Some(instance.clone()));
                tracing::debug!("Constructed service '{service}' ({})", instance.type_name());
                Ok(instance)
            }
            Err(error) => {
                construction.finish(None);
                let error = ContainerError::from_constructor(service, error);
                tracing::warn!("Construction of '{service}' failed: {error}");
                Err(error)
            }
        }
    }
}

impl State {
    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registry
            .keys()
            .chain(self.booted.keys())
            .collect::<HashSet<_>>()
            .into_iter()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Follows a single alias hop
    fn origin<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    /// Checks whether building `service` on `thread` would close a cycle.
    ///
    /// Returns the offending chain, ending with the repeated name.
    fn cycle(&self, thread: ThreadId, service: &str) -> Option<Vec<String>> {
        let mut chain = self.booting.get(&thread).cloned().unwrap_or_default();
        let repeats = chain.iter().any(|booting| booting == service);
        chain.push(service.to_string());
        if repeats {
            return Some(chain);
        }

        // Walk the wait-for chain across threads: if it leads back to us, waiting would deadlock
        let mut wanted = service;
        let mut visited = HashSet::new();
        while let Some(owner) = self.in_flight.get(wanted) {
            if *owner == thread {
                return Some(chain);
            }
            if !visited.insert(*owner) {
                return None;
            }

            let owner_chain = self.booting.get(owner)?;
            let position = owner_chain.iter().position(|booting| booting == wanted)?;
            chain.extend(owner_chain[position + 1..].iter().cloned());

            wanted = self.waiting.get(owner)?.as_str();
            chain.push(wanted.to_string());
        }

        None
    }

    /// Removes `service` from the construction bookkeeping of `thread`
    fn release(&mut self, thread: ThreadId, service: &str) {
        if let Some(chain) = self.booting.get_mut(&thread) {
            if chain.last().map(String::as_str) == Some(service) {
                chain.pop();
            }
            if chain.is_empty() {
                self.booting.remove(&thread);
            }
        }
        if self.in_flight.get(service) == Some(&thread) {
            self.in_flight.remove(service);
        }
    }
}

/// Releases a construction slot once the constructor returns - or unwinds
struct Construction<'a> {
    container: &'a Container,
    thread: ThreadId,
    service: &'a str,
    finished: bool,
}
impl Construction<'_> {
    fn finish(mut self, instance: Option<Instance>) {
        {
            let mut state = self.container.lock();
            // Memoize before releasing, so waiters never see an empty slot
            if let Some(instance) = instance {
                state.booted.insert(self.service.to_string(), instance);
            }
            state.release(self.thread, self.service);
        }
        self.finished = true;
        self.container.0.constructed.notify_all();
    }
}
impl Drop for Construction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::error!("Constructor for '{}' panicked", self.service);
        self.container.lock().release(self.thread, self.service);
        self.container.0.constructed.notify_all();
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        let mut map = f.debug_struct("Container");
        for name in state.names() {
            let val = if state.booted.contains_key(&name) {
                "booted"
            } else if state.in_flight.contains_key(&name) {
                "booting"
            } else {
                "registered"
            };
            map.field(&name, &val);
        }
        for (alias, origin) in &state.aliases {
            map.field(alias, &format_args!("alias of '{origin}'"));
        }
        map.finish()
    }
}
