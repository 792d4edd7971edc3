//! Registration-ordered system schedule
//!
//! Holds one slot per registered system type, the per-phase dispatch order,
//! and each system's matched-entity set used to fire edge-triggered hooks.

use std::any::TypeId;

use ahash::{AHashMap, AHashSet};
use smallvec::SmallVec;
use tracing::trace;

use crate::entity::{Entity, EntityId};
use crate::error::{EcsError, Result};
use crate::phase::GameLoopType;
use crate::system::BoxedSystem;

/// Phase dispatch list; most games bind a handful of systems per phase
pub type PhasePlan = SmallVec<[usize; 8]>;

/// A registered system plus its match bookkeeping
pub struct SystemSlot {
    pub(crate) name: &'static str,
    pub(crate) loop_type: GameLoopType,
    pub(crate) system: BoxedSystem,
    pub(crate) matched: AHashSet<EntityId>,
}

impl SystemSlot {
    fn new(system: BoxedSystem, loop_type: GameLoopType) -> Self {
        Self {
            name: system.name(),
            loop_type,
            system,
            matched: AHashSet::new(),
        }
    }

    /// Diagnostic name of the system
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Phase the system is bound to
    pub fn loop_type(&self) -> GameLoopType {
        self.loop_type
    }

    /// Entities matched at the last evaluation
    pub fn matched_count(&self) -> usize {
        self.matched.len()
    }

    /// Check if `id` is in the matched set
    pub fn is_tracking(&self, id: EntityId) -> bool {
        self.matched.contains(&id)
    }

    /// Re-run `is_match` for one entity and fire a hook if membership flipped.
    ///
    /// Returns whether the entity matches now.
    pub(crate) fn evaluate(&mut self, entity: &Entity) -> bool {
        let now = self.system.is_match(entity);
        let was = self.matched.contains(&entity.id());
        match (was, now) {
            (false, true) => {
                self.matched.insert(entity.id());
                trace!(system = self.name, entity = %entity.id(), "entity matched");
                self.system.on_entity_added(entity);
            }
            (true, false) => {
                self.matched.remove(&entity.id());
                trace!(system = self.name, entity = %entity.id(), "entity unmatched");
                self.system.on_entity_removed(entity);
            }
            _ => {}
        }
        now
    }

    /// Entity is leaving the world; fire the removal hook if it was matched
    pub(crate) fn forget(&mut self, entity: &Entity) {
        if self.matched.remove(&entity.id()) {
            trace!(system = self.name, entity = %entity.id(), "matched entity removed");
            self.system.on_entity_removed(entity);
        }
    }

    /// Full evaluation pass over the live entities, in order
    pub(crate) fn sync(&mut self, entities: &[Entity]) {
        for entity in entities {
            self.evaluate(entity);
        }
    }
}

/// Registered systems in registration order
#[derive(Default)]
pub struct Schedule {
    slots: Vec<SystemSlot>,
    by_type: AHashMap<TypeId, usize>,
    by_phase: AHashMap<GameLoopType, PhasePlan>,
}

impl Schedule {
    /// Create an empty schedule
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a system. One instance per concrete type.
    pub fn insert(
        &mut self,
        type_id: TypeId,
        loop_type: GameLoopType,
        system: BoxedSystem,
    ) -> Result<usize> {
        if self.by_type.contains_key(&type_id) {
            return Err(EcsError::SystemAlreadyRegistered(system.name()));
        }
        let index = self.slots.len();
        self.slots.push(SystemSlot::new(system, loop_type));
        self.by_type.insert(type_id, index);
        self.by_phase.entry(loop_type).or_default().push(index);
        Ok(index)
    }

    /// Check if a system of this type is registered
    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.by_type.contains_key(&type_id)
    }

    /// Slot index of a registered system type
    pub fn index_of(&self, type_id: TypeId) -> Option<usize> {
        self.by_type.get(&type_id).copied()
    }

    /// Slot indices bound to `phase`, in registration order
    pub fn phase_plan(&self, phase: GameLoopType) -> PhasePlan {
        self.by_phase.get(&phase).cloned().unwrap_or_default()
    }

    /// Get a slot by index
    pub fn slot(&self, index: usize) -> Option<&SystemSlot> {
        self.slots.get(index)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut SystemSlot> {
        self.slots.get_mut(index)
    }

    /// All slots in registration order
    pub fn slots(&self) -> &[SystemSlot] {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [SystemSlot] {
        &mut self.slots
    }

    /// Number of registered systems
    pub fn system_count(&self) -> usize {
        self.slots.len()
    }

    /// Names of the systems bound to `phase`, in dispatch order
    pub fn systems_in(&self, phase: GameLoopType) -> Vec<&'static str> {
        self.phase_plan(phase)
            .iter()
            .filter_map(|&i| self.slots.get(i).map(|slot| slot.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{EntitySystem, SystemContext};

    struct Named(&'static str, u32);

    impl EntitySystem for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn is_match(&self, entity: &Entity) -> bool {
            entity
                .get_component::<u32>()
                .map(|v| *v >= self.1)
                .unwrap_or(false)
        }

        fn process(&mut self, _: &mut [&mut Entity], _: &mut SystemContext<'_>) -> Result<()> {
            Ok(())
        }
    }

    struct A;
    struct B;
    struct C;

    #[test]
    fn test_phase_plan_keeps_registration_order() {
        let mut schedule = Schedule::new();
        schedule
            .insert(TypeId::of::<A>(), GameLoopType::Update, Box::new(Named("a", 0)))
            .unwrap();
        schedule
            .insert(TypeId::of::<B>(), GameLoopType::Render, Box::new(Named("b", 0)))
            .unwrap();
        schedule
            .insert(TypeId::of::<C>(), GameLoopType::Update, Box::new(Named("c", 0)))
            .unwrap();

        assert_eq!(schedule.systems_in(GameLoopType::Update), vec!["a", "c"]);
        assert_eq!(schedule.systems_in(GameLoopType::Render), vec!["b"]);
        assert_eq!(schedule.phase_plan(GameLoopType::Update).as_slice(), &[0, 2]);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut schedule = Schedule::new();
        schedule
            .insert(TypeId::of::<A>(), GameLoopType::Update, Box::new(Named("a", 0)))
            .unwrap();
        let err = schedule
            .insert(TypeId::of::<A>(), GameLoopType::Render, Box::new(Named("a2", 0)))
            .unwrap_err();
        assert_eq!(err, EcsError::SystemAlreadyRegistered("a2"));
        assert_eq!(schedule.system_count(), 1);
        assert!(schedule.systems_in(GameLoopType::Render).is_empty());
    }

    #[test]
    fn test_evaluate_is_edge_triggered() {
        let mut schedule = Schedule::new();
        schedule
            .insert(TypeId::of::<A>(), GameLoopType::Update, Box::new(Named("a", 5)))
            .unwrap();
        let slot = schedule.slot_mut(0).unwrap();

        let mut entity = Entity::new().with_component(1u32).unwrap();
        assert!(!slot.evaluate(&entity));
        assert_eq!(slot.matched_count(), 0);

        *entity.get_component_mut::<u32>().unwrap() = 9;
        assert!(slot.evaluate(&entity));
        assert!(slot.evaluate(&entity));
        assert_eq!(slot.matched_count(), 1);

        slot.forget(&entity);
        assert!(!slot.is_tracking(entity.id()));
    }
}
