// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Entity identifiers and per-entity component storage.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::component::{Component, ComponentBundle, ComponentSet};
use crate::error::{EcsError, Result};

/// Unique entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID (e.g. one loaded from a scene file)
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

struct StoredComponent {
    name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

/// Identity plus a bag of components, at most one per type.
///
/// An entity is created standalone and becomes live once handed to
/// [`EntityWorld::add_entity`](crate::world::EntityWorld::add_entity).
pub struct Entity {
    id: EntityId,
    components: AHashMap<TypeId, StoredComponent>,
}

impl Entity {
    /// Create an empty entity with a fresh id
    pub fn new() -> Self {
        Self::with_id(EntityId::new())
    }

    /// Create an empty entity with a known id
    pub fn with_id(id: EntityId) -> Self {
        Self {
            id,
            components: AHashMap::new(),
        }
    }

    /// Get the entity's id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Attach a component.
    ///
    /// Fails with `ComponentAlreadyPresent` if a `T` is already attached; the
    /// existing instance is kept. Use [`replace_component`](Self::replace_component)
    /// to overwrite.
    pub fn add_component<T: Component>(&mut self, component: T) -> Result<()> {
        let type_id = TypeId::of::<T>();
        if self.components.contains_key(&type_id) {
            return Err(EcsError::ComponentAlreadyPresent(type_name::<T>()));
        }
        self.components.insert(
            type_id,
            StoredComponent {
                name: type_name::<T>(),
                value: Box::new(component),
            },
        );
        Ok(())
    }

    /// Attach a default-constructed component
    pub fn add_default_component<T: Component + Default>(&mut self) -> Result<()> {
        self.add_component(T::default())
    }

    /// Builder form of [`add_component`](Self::add_component)
    pub fn with_component<T: Component>(mut self, component: T) -> Result<Self> {
        self.add_component(component)?;
        Ok(self)
    }

    /// Attach several components at once; nothing is attached on failure
    pub fn add_bundle<B: ComponentBundle>(&mut self, bundle: B) -> Result<()> {
        bundle.insert_into(self)
    }

    /// Builder form of [`add_bundle`](Self::add_bundle)
    pub fn with_bundle<B: ComponentBundle>(mut self, bundle: B) -> Result<Self> {
        self.add_bundle(bundle)?;
        Ok(self)
    }

    /// Attach or overwrite a component, returning the previous instance
    pub fn replace_component<T: Component>(&mut self, component: T) -> Option<T> {
        let previous = self.components.insert(
            TypeId::of::<T>(),
            StoredComponent {
                name: type_name::<T>(),
                value: Box::new(component),
            },
        );
        previous
            .and_then(|stored| stored.value.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }

    /// Detach a component and hand it back
    pub fn remove_component<T: Component>(&mut self) -> Result<T> {
        let stored = self
            .components
            .remove(&TypeId::of::<T>())
            .ok_or(EcsError::ComponentNotFound(type_name::<T>()))?;
        stored
            .value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| EcsError::ComponentNotFound(type_name::<T>()))
    }

    /// Detach a component identified only by its runtime type id
    pub fn remove_component_by_type(
        &mut self,
        type_id: TypeId,
    ) -> Result<Box<dyn Any + Send + Sync>> {
        self.components
            .remove(&type_id)
            .map(|stored| stored.value)
            .ok_or(EcsError::ComponentNotFound("<dynamic component>"))
    }

    /// Borrow a component; `ComponentNotFound` if absent
    pub fn get_component<T: Component>(&self) -> Result<&T> {
        self.components
            .get(&TypeId::of::<T>())
            .and_then(|stored| stored.value.downcast_ref::<T>())
            .ok_or(EcsError::ComponentNotFound(type_name::<T>()))
    }

    /// Mutably borrow a component; `ComponentNotFound` if absent
    pub fn get_component_mut<T: Component>(&mut self) -> Result<&mut T> {
        self.components
            .get_mut(&TypeId::of::<T>())
            .and_then(|stored| stored.value.downcast_mut::<T>())
            .ok_or(EcsError::ComponentNotFound(type_name::<T>()))
    }

    /// Check if the entity has a `T`
    pub fn contains_component<T: Component>(&self) -> bool {
        self.components.contains_key(&TypeId::of::<T>())
    }

    /// Check by `TypeId`
    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.components.contains_key(&type_id)
    }

    /// True when every type in the set is attached
    pub fn contains_all<S: ComponentSet>(&self) -> bool {
        S::type_ids().iter().all(|id| self.contains_type(*id))
    }

    /// True when at least one type in the set is attached
    pub fn contains_any<S: ComponentSet>(&self) -> bool {
        S::type_ids().iter().any(|id| self.contains_type(*id))
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// True when no components are attached
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Type ids of the attached components, in no particular order
    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.components.keys().copied()
    }

    /// Attached component type names, sorted for stable output
    pub fn component_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.components.values().map(|s| s.name).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("components", &self.component_names())
            .finish()
    }
}
