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

//! EntityWorld: live entities, registered systems and per-phase dispatch

use std::any::{type_name, TypeId};

use ahash::AHashMap;
use tracing::{debug, error};

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::command::CommandBuffer;
use crate::component::Component;
use crate::context::Resources;
use crate::entity::{Entity, EntityId};
use crate::error::{EcsError, Result};
use crate::phase::GameLoopType;
use crate::resolver::SystemResolver;
use crate::schedule::Schedule;
use crate::system::{BoxedSystem, EntitySystem, LoopBound, SystemContext};

/// Owner of all live entities and registered systems.
///
/// Entities are kept in insertion order and systems in registration order,
/// so every `process_all` call visits both deterministically.
pub struct EntityWorld {
    /// Live entities in insertion order
    entities: Vec<Entity>,

    /// Maps entity ids to their position in `entities`
    index: AHashMap<EntityId, usize>,

    /// Registered systems and their match sets
    schedule: Schedule,

    /// Source of system instances for `add_system`
    resolver: Option<Box<dyn SystemResolver>>,

    /// Engine context shared with factories and systems
    resources: Resources,

    /// Mutations queued by the system currently processing
    commands: CommandBuffer,
}

impl EntityWorld {
    /// Create an empty world with no resolver attached
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            index: AHashMap::new(),
            schedule: Schedule::new(),
            resolver: None,
            resources: Resources::new(),
            commands: CommandBuffer::new(),
        }
    }

    /// Create an empty world that resolves systems through `resolver`
    pub fn with_resolver<R: SystemResolver + 'static>(resolver: R) -> Self {
        let mut world = Self::new();
        world.set_resolver(resolver);
        world
    }

    /// Create a world with pre-populated resources
    pub fn with_resources(resources: Resources) -> Self {
        Self {
            resources,
            ..Self::new()
        }
    }

    /// Attach (or replace) the resolver used by `add_system`
    pub fn set_resolver<R: SystemResolver + 'static>(&mut self, resolver: R) {
        self.resolver = Some(Box::new(resolver));
    }

    /// Check if a resolver is attached
    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    // ========== Entities ==========

    /// Make an entity live.
    ///
    /// Every system that matches it receives `on_entity_added`, in
    /// registration order.
    pub fn add_entity(&mut self, entity: Entity) -> Result<EntityId> {
        let id = entity.id();
        if self.index.contains_key(&id) {
            return Err(EcsError::DuplicateEntity(id));
        }

        for slot in self.schedule.slots_mut() {
            slot.evaluate(&entity);
        }

        self.index.insert(id, self.entities.len());
        self.entities.push(entity);
        debug!(entity = %id, live = self.entities.len(), "entity added");
        Ok(id)
    }

    /// Untrack an entity and hand it back.
    ///
    /// Every system currently matching it receives `on_entity_removed` first.
    /// Later entities shift down to keep insertion order, so this is linear
    /// in the number of live entities.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<Entity> {
        let position = *self.index.get(&id).ok_or(EcsError::EntityNotFound(id))?;

        let entity = &self.entities[position];
        for slot in self.schedule.slots_mut() {
            slot.forget(entity);
        }

        self.index.remove(&id);
        let entity = self.entities.remove(position);
        for (offset, shifted) in self.entities[position..].iter().enumerate() {
            self.index.insert(shifted.id(), position + offset);
        }
        debug!(entity = %id, live = self.entities.len(), "entity removed");
        Ok(entity)
    }

    /// Same as [`remove_entity`](Self::remove_entity), keyed by an entity handle
    pub fn remove_entity_ref(&mut self, entity: &Entity) -> Result<Entity> {
        self.remove_entity(entity.id())
    }

    /// Check if an entity is live
    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Borrow a live entity; `EntityNotFound` otherwise
    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.index
            .get(&id)
            .map(|&i| &self.entities[i])
            .ok_or(EcsError::EntityNotFound(id))
    }

    /// Direct mutable access.
    ///
    /// Component changes made here are picked up by the next evaluation
    /// pass (`process_all` or `refresh`).
    pub fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        let position = *self.index.get(&id).ok_or(EcsError::EntityNotFound(id))?;
        Ok(&mut self.entities[position])
    }

    /// Live entities in insertion order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Attach a component to a live entity and re-evaluate its matches now
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> Result<()> {
        let position = *self.index.get(&id).ok_or(EcsError::EntityNotFound(id))?;
        self.entities[position].add_component(component)?;
        self.reevaluate(position);
        Ok(())
    }

    /// Detach a component from a live entity and re-evaluate its matches now
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Result<T> {
        let position = *self.index.get(&id).ok_or(EcsError::EntityNotFound(id))?;
        let component = self.entities[position].remove_component::<T>()?;
        self.reevaluate(position);
        Ok(component)
    }

    fn reevaluate(&mut self, position: usize) {
        let entity = &self.entities[position];
        for slot in self.schedule.slots_mut() {
            slot.evaluate(entity);
        }
    }

    // ========== Systems ==========

    /// Resolve `S` through the attached resolver and register it in its
    /// declared phase.
    ///
    /// Existing entities are evaluated immediately, so `on_entity_added`
    /// fires for each current match before this returns.
    pub fn add_system<S: EntitySystem + LoopBound>(&mut self) -> Result<()> {
        let type_id = TypeId::of::<S>();
        if self.schedule.contains_type(type_id) {
            return Err(EcsError::SystemAlreadyRegistered(type_name::<S>()));
        }
        let resolver = self
            .resolver
            .as_mut()
            .ok_or(EcsError::ArgumentNull("resolver"))?;
        let system = resolver.resolve(type_id, type_name::<S>(), &self.resources)?;
        self.install(type_id, S::LOOP_TYPE, system)
    }

    /// Register an already-built system in its declared phase
    pub fn add_system_instance<S: EntitySystem + LoopBound>(&mut self, system: S) -> Result<()> {
        self.add_system_in(S::LOOP_TYPE, system)
    }

    /// Register an already-built system in an explicitly chosen phase
    pub fn add_system_in<S: EntitySystem>(&mut self, phase: GameLoopType, system: S) -> Result<()> {
        self.install(TypeId::of::<S>(), phase, Box::new(system))
    }

    fn install(
        &mut self,
        type_id: TypeId,
        phase: GameLoopType,
        system: BoxedSystem,
    ) -> Result<()> {
        let index = self.schedule.insert(type_id, phase, system)?;
        if let Some(slot) = self.schedule.slot_mut(index) {
            debug!(system = slot.name(), phase = %phase, "system registered");
            slot.sync(&self.entities);
        }
        Ok(())
    }

    /// Check if a system of type `S` is registered
    pub fn contains_system<S: EntitySystem>(&self) -> bool {
        self.schedule.contains_type(TypeId::of::<S>())
    }

    /// Number of registered systems across all phases
    pub fn system_count(&self) -> usize {
        self.schedule.system_count()
    }

    /// System names bound to `phase`, in dispatch order
    pub fn systems_in(&self, phase: GameLoopType) -> Vec<&'static str> {
        self.schedule.systems_in(phase)
    }

    /// Number of entities `S` matched at its last evaluation
    pub fn matched_count<S: EntitySystem>(&self) -> Option<usize> {
        self.schedule
            .index_of(TypeId::of::<S>())
            .and_then(|i| self.schedule.slot(i))
            .map(|slot| slot.matched_count())
    }

    /// Read-only view of the registered systems
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    // ========== Dispatch ==========

    /// Run every system bound to `phase`, in registration order.
    ///
    /// For each system: re-evaluate matches (firing hooks on transitions),
    /// call `process` with the matched entities, then apply the commands it
    /// queued. An error from `process` stops the pass and is returned; that
    /// system's queued commands are dropped.
    pub fn process_all(&mut self, phase: GameLoopType) -> Result<()> {
        #[cfg(feature = "profiling")]
        let span = info_span!("world.process_all", phase = %phase, entities = self.entities.len());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        for index in self.schedule.phase_plan(phase) {
            self.run_system(index, phase)?;
        }
        Ok(())
    }

    fn run_system(&mut self, index: usize, phase: GameLoopType) -> Result<()> {
        let Some(slot) = self.schedule.slot_mut(index) else {
            return Ok(());
        };
        let name = slot.name;
        slot.sync(&self.entities);

        let mut matched: Vec<&mut Entity> = self
            .entities
            .iter_mut()
            .filter(|entity| slot.matched.contains(&entity.id()))
            .collect();

        #[cfg(feature = "profiling")]
        let span = info_span!("system.process", system = name, matched = matched.len());
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let mut ctx = SystemContext {
            resources: &mut self.resources,
            commands: &mut self.commands,
            loop_type: phase,
        };
        if let Err(err) = slot.system.process(&mut matched, &mut ctx) {
            error!(system = name, phase = %phase, error = %err, "system process failed");
            self.commands.clear();
            return Err(err);
        }
        drop(matched);

        if !self.commands.is_empty() {
            let mut commands = std::mem::take(&mut self.commands);
            let applied = commands.apply(self);
            // Hand the drained buffer back to keep its allocation
            self.commands = commands;
            if let Err(err) = applied {
                error!(system = name, phase = %phase, error = %err, "queued commands failed");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Evaluation pass for every system without processing.
    ///
    /// Fires the hooks owed for component changes made through `entity_mut`.
    pub fn refresh(&mut self) {
        for slot in self.schedule.slots_mut() {
            slot.sync(&self.entities);
        }
    }

    // ========== Resources ==========

    /// Shared engine context
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Mutable engine context
    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }
}

impl Default for EntityWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::SystemRegistry;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct Transform;
    #[derive(Debug, Default)]
    struct Sprite;

    type Log = Arc<Mutex<Vec<String>>>;

    struct SpriteSystem {
        log: Log,
    }

    impl LoopBound for SpriteSystem {
        const LOOP_TYPE: GameLoopType = GameLoopType::Render;
    }

    impl EntitySystem for SpriteSystem {
        fn name(&self) -> &'static str {
            "sprite"
        }

        fn is_match(&self, entity: &Entity) -> bool {
            entity.contains_all::<(Transform, Sprite)>()
        }

        fn process(&mut self, entities: &mut [&mut Entity], _: &mut SystemContext<'_>) -> Result<()> {
            self.log.lock().push(format!("process:{}", entities.len()));
            Ok(())
        }

        fn on_entity_added(&mut self, entity: &Entity) {
            self.log.lock().push(format!("added:{}", entity.id()));
        }

        fn on_entity_removed(&mut self, entity: &Entity) {
            self.log.lock().push(format!("removed:{}", entity.id()));
        }
    }

    fn sprite_world() -> (EntityWorld, Log) {
        let log = Log::default();
        let mut world = EntityWorld::new();
        world
            .add_system_instance(SpriteSystem { log: log.clone() })
            .unwrap();
        (world, log)
    }

    #[test]
    fn test_add_and_remove_entity() {
        let mut world = EntityWorld::new();
        let id = world.add_entity(Entity::new()).unwrap();
        assert!(world.contains_entity(id));
        assert_eq!(world.entity_count(), 1);

        let entity = world.remove_entity(id).unwrap();
        assert_eq!(entity.id(), id);
        assert!(!world.contains_entity(id));
        assert_eq!(world.remove_entity(id).unwrap_err(), EcsError::EntityNotFound(id));
    }

    #[test]
    fn test_duplicate_entity_rejected() {
        let mut world = EntityWorld::new();
        let id = EntityId::new();
        world.add_entity(Entity::with_id(id)).unwrap();
        let err = world.add_entity(Entity::with_id(id)).unwrap_err();
        assert_eq!(err, EcsError::DuplicateEntity(id));
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_remove_keeps_insertion_order() {
        let mut world = EntityWorld::new();
        let ids: Vec<_> = (0..4)
            .map(|_| world.add_entity(Entity::new()).unwrap())
            .collect();
        world.remove_entity(ids[1]).unwrap();

        let remaining: Vec<_> = world.entities().iter().map(|e| e.id()).collect();
        assert_eq!(remaining, vec![ids[0], ids[2], ids[3]]);
        assert_eq!(world.entity(ids[3]).unwrap().id(), ids[3]);
    }

    #[test]
    fn test_partial_match_processes_empty_sequence() {
        let (mut world, log) = sprite_world();
        world
            .add_entity(Entity::new().with_component(Transform).unwrap())
            .unwrap();

        world.process_all(GameLoopType::Render).unwrap();
        assert_eq!(*log.lock(), vec!["process:0".to_string()]);
    }

    #[test]
    fn test_hooks_follow_component_changes() {
        let (mut world, log) = sprite_world();
        let id = world
            .add_entity(Entity::new().with_component(Transform).unwrap())
            .unwrap();

        world.add_component(id, Sprite).unwrap();
        world.remove_component::<Sprite>(id).unwrap();
        world.add_component(id, Sprite).unwrap();

        assert_eq!(
            *log.lock(),
            vec![
                format!("added:{id}"),
                format!("removed:{id}"),
                format!("added:{id}"),
            ]
        );
    }

    #[test]
    fn test_entity_mut_changes_seen_on_refresh() {
        let (mut world, log) = sprite_world();
        let id = world.add_entity(Entity::new()).unwrap();

        world
            .entity_mut(id)
            .unwrap()
            .add_bundle((Transform, Sprite))
            .unwrap();
        assert!(log.lock().is_empty());

        world.refresh();
        assert_eq!(*log.lock(), vec![format!("added:{id}")]);
        assert_eq!(world.matched_count::<SpriteSystem>(), Some(1));
    }

    #[test]
    fn test_add_system_requires_resolver() {
        let log = Log::default();
        let mut world = EntityWorld::new();
        assert_eq!(
            world.add_system::<SpriteSystem>().unwrap_err(),
            EcsError::ArgumentNull("resolver")
        );

        let mut registry = SystemRegistry::new();
        let shared = log.clone();
        registry.register(move |_| Ok(SpriteSystem { log: shared.clone() }));
        world.set_resolver(registry);

        world.add_system::<SpriteSystem>().unwrap();
        assert!(world.contains_system::<SpriteSystem>());
        assert!(matches!(
            world.add_system::<SpriteSystem>(),
            Err(EcsError::SystemAlreadyRegistered(_))
        ));
        assert_eq!(world.systems_in(GameLoopType::Render), vec!["sprite"]);
    }

    #[test]
    fn test_resolver_without_factory() {
        let mut world = EntityWorld::with_resolver(SystemRegistry::new());
        assert!(matches!(
            world.add_system::<SpriteSystem>(),
            Err(EcsError::SystemNotRegistered(_))
        ));
        assert_eq!(world.system_count(), 0);
    }
}
