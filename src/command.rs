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

//! Deferred world mutations
//!
//! Systems cannot add or remove entities while iterating their matched set.
//! They queue the change here instead; the world applies the queue once the
//! system's `process` returns.

use std::fmt;

use ahash::AHashMap;

use crate::component::Component;
use crate::entity::{Entity, EntityId};
use crate::error::{EcsError, Result};
use crate::world::EntityWorld;

/// Type alias for world mutation closures
pub type CommandClosure = Box<dyn FnOnce(&mut EntityWorld) -> Result<()> + Send>;

/// Deferred command for world mutations
pub enum Command {
    /// Track a new entity
    AddEntity(Entity),

    /// Untrack an entity
    RemoveEntity(EntityId),

    /// Custom world mutation
    Custom(CommandClosure),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::AddEntity(e) => f.debug_tuple("AddEntity").field(&e.id()).finish(),
            Command::RemoveEntity(id) => f.debug_tuple("RemoveEntity").field(id).finish(),
            Command::Custom(_) => write!(f, "Custom(...)"),
        }
    }
}

/// Command buffer for deferred operations
#[derive(Default, Debug)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` commands
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
        }
    }

    /// Queue an entity to be added to the world
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        self.commands.push(Command::AddEntity(entity));
        id
    }

    /// Queue an entity for removal
    pub fn remove_entity(&mut self, id: EntityId) {
        self.commands.push(Command::RemoveEntity(id));
    }

    /// Queue a custom world mutation
    pub fn add<F>(&mut self, f: F)
    where
        F: FnOnce(&mut EntityWorld) -> Result<()> + Send + 'static,
    {
        self.commands.push(Command::Custom(Box::new(f)));
    }

    /// Queue attaching a component to a live entity
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) {
        self.add(move |world| world.add_component(id, component));
    }

    /// Queue detaching a component from a live entity
    pub fn remove_component<T: Component>(&mut self, id: EntityId) {
        self.add(move |world| world.remove_component::<T>(id).map(|_| ()));
    }

    /// Apply all commands in queue order and clear the buffer.
    ///
    /// Entity adds and removes are checked against the world up front, so a
    /// duplicate or unknown id rejects the whole queue before anything runs.
    /// `Custom` commands (including queued component changes) can only fail
    /// when they run: the commands before them stay applied and the rest are
    /// dropped.
    pub fn apply(&mut self, world: &mut EntityWorld) -> Result<()> {
        if let Err(err) = self.check_entities(world) {
            self.commands.clear();
            return Err(err);
        }
        for command in self.commands.drain(..) {
            match command {
                Command::AddEntity(entity) => {
                    world.add_entity(entity)?;
                }
                Command::RemoveEntity(id) => {
                    world.remove_entity(id)?;
                }
                Command::Custom(f) => {
                    f(world)?;
                }
            }
        }
        Ok(())
    }

    /// Replay the queued entity adds and removes against the live set
    fn check_entities(&self, world: &EntityWorld) -> Result<()> {
        let mut pending: AHashMap<EntityId, bool> = AHashMap::new();
        for command in &self.commands {
            match command {
                Command::AddEntity(entity) => {
                    let id = entity.id();
                    let live = pending
                        .get(&id)
                        .copied()
                        .unwrap_or_else(|| world.contains_entity(id));
                    if live {
                        return Err(EcsError::DuplicateEntity(id));
                    }
                    pending.insert(id, true);
                }
                Command::RemoveEntity(id) => {
                    let live = pending
                        .get(id)
                        .copied()
                        .unwrap_or_else(|| world.contains_entity(*id));
                    if !live {
                        return Err(EcsError::EntityNotFound(*id));
                    }
                    pending.insert(*id, false);
                }
                Command::Custom(_) => {}
            }
        }
        Ok(())
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Drop every queued command without applying it
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}
