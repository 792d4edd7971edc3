// Built-in components and systems

pub mod sprite;
pub mod transform;

pub use sprite::{RenderQueue, SpriteComponent, SpriteDraw, SpriteRenderSystem};
pub use transform::{MovementSystem, TransformComponent, VelocityComponent};
