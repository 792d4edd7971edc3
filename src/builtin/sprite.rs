//! Sprite component and the render-phase collection system.
//!
//! [`SpriteRenderSystem`] does not talk to a graphics API. It fills the
//! [`RenderQueue`] resource with one [`SpriteDraw`] per visible sprite; the
//! render backend drains the queue after the `Render` phase.

use glam::{Mat4, Vec2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builtin::transform::TransformComponent;
use crate::entity::{Entity, EntityId};
use crate::error::Result;
use crate::phase::GameLoopType;
use crate::system::{EntitySystem, LoopBound, SystemContext};

/// Textured quad attached to an entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteComponent {
    /// Resource key of the texture
    pub texture: String,
    /// Quad size in world units
    pub size: Vec2,
    /// RGBA multiplier
    pub tint: [f32; 4],
    /// Draw order; lower layers are drawn first
    pub layer: i32,
    pub visible: bool,
}

impl SpriteComponent {
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            size: Vec2::ONE,
            tint: [1.0; 4],
            layer: 0,
            visible: true,
        }
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }
}

/// One sprite ready for submission
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteDraw {
    pub entity: EntityId,
    pub texture: String,
    pub model: Mat4,
    pub tint: [f32; 4],
    pub layer: i32,
}

/// Per-frame draw list consumed by the render backend
#[derive(Debug, Default)]
pub struct RenderQueue {
    sprites: Vec<SpriteDraw>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sprites in submission order
    pub fn sprites(&self) -> &[SpriteDraw] {
        &self.sprites
    }

    /// Hand the queued sprites to the backend, leaving the queue empty
    pub fn drain(&mut self) -> std::vec::Drain<'_, SpriteDraw> {
        self.sprites.drain(..)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

/// Collects visible sprites into the [`RenderQueue`], sorted by layer.
///
/// The queue is rebuilt every frame; it is created on first use.
#[derive(Debug, Default)]
pub struct SpriteRenderSystem;

impl LoopBound for SpriteRenderSystem {
    const LOOP_TYPE: GameLoopType = GameLoopType::Render;
}

impl EntitySystem for SpriteRenderSystem {
    fn name(&self) -> &'static str {
        "sprite_render"
    }

    fn is_match(&self, entity: &Entity) -> bool {
        entity.contains_all::<(TransformComponent, SpriteComponent)>()
    }

    fn process(&mut self, entities: &mut [&mut Entity], ctx: &mut SystemContext<'_>) -> Result<()> {
        let queue = ctx.resources.get_or_default::<RenderQueue>();
        queue.sprites.clear();

        for entity in entities.iter() {
            let sprite = entity.get_component::<SpriteComponent>()?;
            if !sprite.visible {
                continue;
            }
            let transform = entity.get_component::<TransformComponent>()?;
            let model = transform.matrix() * Mat4::from_scale(sprite.size.extend(1.0));
            queue.sprites.push(SpriteDraw {
                entity: entity.id(),
                texture: sprite.texture.clone(),
                model,
                tint: sprite.tint,
                layer: sprite.layer,
            });
        }

        // Stable: equal layers keep entity insertion order
        queue.sprites.sort_by_key(|draw| draw.layer);
        Ok(())
    }

    fn on_entity_added(&mut self, entity: &Entity) {
        debug!(entity = %entity.id(), "sprite tracked");
    }

    fn on_entity_removed(&mut self, entity: &Entity) {
        debug!(entity = %entity.id(), "sprite untracked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::EntityWorld;
    use glam::Vec3;

    fn sprite_entity(texture: &str, layer: i32) -> Entity {
        Entity::new()
            .with_bundle((
                TransformComponent::default(),
                SpriteComponent::new(texture).with_layer(layer),
            ))
            .unwrap()
    }

    #[test]
    fn test_queue_sorted_by_layer_and_stable() {
        let mut world = EntityWorld::new();
        world.add_system_instance(SpriteRenderSystem).unwrap();
        world.add_entity(sprite_entity("bg", 0)).unwrap();
        world.add_entity(sprite_entity("hud", 10)).unwrap();
        world.add_entity(sprite_entity("tree", 0)).unwrap();
        world.add_entity(sprite_entity("sky", -5)).unwrap();

        world.process_all(GameLoopType::Render).unwrap();

        let queue = world.resources().fetch::<RenderQueue>().unwrap();
        let order: Vec<_> = queue.sprites().iter().map(|s| s.texture.as_str()).collect();
        assert_eq!(order, vec!["sky", "bg", "tree", "hud"]);
    }

    #[test]
    fn test_hidden_sprites_skipped_and_queue_rebuilt() {
        let mut world = EntityWorld::new();
        world.add_system_instance(SpriteRenderSystem).unwrap();
        let id = world.add_entity(sprite_entity("player", 1)).unwrap();

        world.process_all(GameLoopType::Render).unwrap();
        world.process_all(GameLoopType::Render).unwrap();
        assert_eq!(world.resources().fetch::<RenderQueue>().unwrap().len(), 1);

        world
            .entity_mut(id)
            .unwrap()
            .get_component_mut::<SpriteComponent>()
            .unwrap()
            .visible = false;
        world.process_all(GameLoopType::Render).unwrap();
        assert!(world.resources().fetch::<RenderQueue>().unwrap().is_empty());
    }

    #[test]
    fn test_model_includes_sprite_size() {
        let mut world = EntityWorld::new();
        world.add_system_instance(SpriteRenderSystem).unwrap();
        world
            .add_entity(
                Entity::new()
                    .with_bundle((
                        TransformComponent::from_position(Vec3::new(5.0, 0.0, 0.0)),
                        SpriteComponent::new("wide").with_size(Vec2::new(4.0, 1.0)),
                    ))
                    .unwrap(),
            )
            .unwrap();
        world.process_all(GameLoopType::Render).unwrap();

        let queue = world.resources_mut().fetch_mut::<RenderQueue>().unwrap();
        let draws: Vec<_> = queue.drain().collect();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].model.transform_point3(Vec3::X), Vec3::new(9.0, 0.0, 0.0));
        assert!(queue.is_empty());
    }
}
