use std::{any::Any, fmt::Debug, sync::Arc};

/// All constructor errors are boxed into this
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Boot units run on their own threads and share one container,
/// so anything stored in it needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// A constructed (or cached) service, stored without its concrete type
#[derive(Clone)]
pub struct Instance {
    type_name: &'static str,
    instance: Arc<dyn Any + Send + Sync + 'static>,
}
impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.type_name).finish()
    }
}

impl Instance {
    pub fn new<T: Injectable>(instance: T) -> Self {
        Instance {
            type_name: std::any::type_name::<T>(),
            instance: Arc::new(instance),
        }
    }

    /// Name of the type the instance was built from
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the shared instance, or the name of the actual type on mismatch
    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.type_name),
        }
    }

    /// True if both handles point to the same instance
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::as_ptr(&self.instance).cast::<()>() == Arc::as_ptr(&other.instance).cast::<()>()
    }
}
