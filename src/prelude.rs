//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use final_engine::prelude::*;
//! ```

pub use crate::builtin::{
    MovementSystem, RenderQueue, SpriteComponent, SpriteRenderSystem, TransformComponent,
    VelocityComponent,
};
pub use crate::command::CommandBuffer;
pub use crate::component::{Component, ComponentBundle, ComponentSet};
pub use crate::context::Resources;
pub use crate::debug::{Diagnostics, WorldInspector};
pub use crate::entity::{Entity, EntityId};
pub use crate::error::{EcsError, Result};
pub use crate::game_loop::{GameLoop, LoopConfig};
pub use crate::phase::GameLoopType;
pub use crate::resolver::{SystemRegistry, SystemResolver};
pub use crate::system::{EntitySystem, LoopBound, SystemContext};
pub use crate::time::Time;
pub use crate::world::EntityWorld;
