//! Explicit engine context
//!
//! [`Resources`] holds typed singletons (render queues, timing, device
//! handles) owned by the world. It is lent to system factories at
//! resolution time and to systems during `process`.

use std::any::{type_name, Any, TypeId};

use ahash::AHashMap;

use crate::error::{EcsError, Result};

/// Typed singleton storage
#[derive(Default)]
pub struct Resources {
    values: AHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Resources {
    /// Create an empty resource map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, returning the one it replaced
    pub fn insert<R: Send + Sync + 'static>(&mut self, resource: R) -> Option<R> {
        self.values
            .insert(TypeId::of::<R>(), Box::new(resource))
            .and_then(|old| old.downcast().ok())
            .map(|boxed| *boxed)
    }

    /// Borrow a resource, if present
    pub fn get<R: 'static>(&self) -> Option<&R> {
        self.values
            .get(&TypeId::of::<R>())
            .and_then(|r| r.downcast_ref())
    }

    /// Mutably borrow a resource, if present
    pub fn get_mut<R: 'static>(&mut self) -> Option<&mut R> {
        self.values
            .get_mut(&TypeId::of::<R>())
            .and_then(|r| r.downcast_mut())
    }

    /// Like [`get`](Self::get) but fails with `ResourceNotFound`
    pub fn fetch<R: 'static>(&self) -> Result<&R> {
        self.get::<R>()
            .ok_or(EcsError::ResourceNotFound(type_name::<R>()))
    }

    /// Like [`get_mut`](Self::get_mut) but fails with `ResourceNotFound`
    pub fn fetch_mut<R: 'static>(&mut self) -> Result<&mut R> {
        self.get_mut::<R>()
            .ok_or(EcsError::ResourceNotFound(type_name::<R>()))
    }

    /// Get a resource, inserting `R::default()` first if missing
    pub fn get_or_default<R: Default + Send + Sync + 'static>(&mut self) -> &mut R {
        let entry = self
            .values
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Box::new(R::default()));
        match entry.downcast_mut::<R>() {
            Some(resource) => resource,
            None => unreachable!("resource map keyed by TypeId"),
        }
    }

    /// Check if a resource of type `R` is stored
    pub fn contains<R: 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<R>())
    }

    /// Take a resource out of the map
    pub fn remove<R: 'static>(&mut self) -> Option<R> {
        self.values
            .remove(&TypeId::of::<R>())
            .and_then(|r| r.downcast().ok())
            .map(|boxed| *boxed)
    }

    /// Number of stored resources
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no resources are stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
