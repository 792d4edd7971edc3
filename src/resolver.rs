//! System resolution
//!
//! The world asks a [`SystemResolver`] for a system instance by type. The
//! stock implementation, [`SystemRegistry`], is a map from system type to a
//! factory closure that builds the system from the engine context.

use std::any::TypeId;

use ahash::AHashMap;

use crate::context::Resources;
use crate::error::{EcsError, Result};
use crate::system::{BoxedSystem, EntitySystem};

/// Source of system instances
pub trait SystemResolver: Send {
    /// Build the system registered for `type_id`.
    ///
    /// Fails with `SystemNotRegistered(type_name)` when the type is unknown.
    fn resolve(
        &mut self,
        type_id: TypeId,
        type_name: &'static str,
        resources: &Resources,
    ) -> Result<BoxedSystem>;
}

type SystemFactory = Box<dyn FnMut(&Resources) -> Result<BoxedSystem> + Send>;

/// Factory map keyed by system type
#[derive(Default)]
pub struct SystemRegistry {
    factories: AHashMap<TypeId, SystemFactory>,
}

impl SystemRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `S`, replacing any previous one.
    ///
    /// The factory receives the world's resources so it can pull in
    /// whatever the system depends on.
    pub fn register<S, F>(&mut self, mut factory: F) -> &mut Self
    where
        S: EntitySystem,
        F: FnMut(&Resources) -> Result<S> + Send + 'static,
    {
        self.factories.insert(
            TypeId::of::<S>(),
            Box::new(move |resources| Ok(Box::new(factory(resources)?) as BoxedSystem)),
        );
        self
    }

    /// Register `S` built with `S::default()`
    pub fn register_default<S: EntitySystem + Default>(&mut self) -> &mut Self {
        self.register(|_| Ok(S::default()))
    }

    /// Check if a factory for `S` is registered
    pub fn contains<S: EntitySystem>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<S>())
    }

    /// Number of registered factories
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl SystemResolver for SystemRegistry {
    fn resolve(
        &mut self,
        type_id: TypeId,
        type_name: &'static str,
        resources: &Resources,
    ) -> Result<BoxedSystem> {
        let factory = self
            .factories
            .get_mut(&type_id)
            .ok_or(EcsError::SystemNotRegistered(type_name))?;
        factory(resources)
    }
}
