//! System trait and phase binding

use crate::command::CommandBuffer;
use crate::context::Resources;
use crate::entity::Entity;
use crate::error::Result;
use crate::phase::GameLoopType;

/// Declarative phase binding.
///
/// Read once when the system is registered; a system never changes phase.
///
/// ```ignore
/// impl LoopBound for MovementSystem {
///     const LOOP_TYPE: GameLoopType = GameLoopType::Update;
/// }
/// ```
pub trait LoopBound {
    const LOOP_TYPE: GameLoopType;
}

/// What a system can reach while processing
pub struct SystemContext<'a> {
    /// Shared engine context
    pub resources: &'a mut Resources,
    /// Entity additions/removals, applied after `process` returns
    pub commands: &'a mut CommandBuffer,
    /// Phase currently being processed
    pub loop_type: GameLoopType,
}

/// Per-frame unit of logic over the entities it matches.
///
/// The world calls `is_match` once per live entity on every evaluation pass,
/// fires `on_entity_added` / `on_entity_removed` only when the result flips,
/// and hands the matched entities to `process`.
pub trait EntitySystem: Send + 'static {
    /// Name used in logs and diagnostics
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Whether the entity belongs to this system's working set
    fn is_match(&self, entity: &Entity) -> bool;

    /// Per-frame work over the matched entities, in insertion order
    fn process(&mut self, entities: &mut [&mut Entity], ctx: &mut SystemContext<'_>)
        -> Result<()>;

    /// Entity started matching
    fn on_entity_added(&mut self, _entity: &Entity) {}

    /// Entity stopped matching or left the world
    fn on_entity_removed(&mut self, _entity: &Entity) {}
}

/// Boxed system
pub type BoxedSystem = Box<dyn EntitySystem>;
