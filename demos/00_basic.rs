//! Example: a few sprites moving across the screen
//!
//! Registers the built-in systems through a resolver, drives a handful of
//! frames and prints the render queue plus an inspector summary.

use final_engine::debug::WorldInspector;
use final_engine::prelude::*;
use glam::{Vec2, Vec3};
use std::time::Duration;

fn main() -> Result<()> {
    let mut registry = SystemRegistry::new();
    registry
        .register_default::<MovementSystem>()
        .register_default::<SpriteRenderSystem>();

    let mut world = EntityWorld::with_resolver(registry);
    world.add_system::<MovementSystem>()?;
    world.add_system::<SpriteRenderSystem>()?;

    println!("Creating entities...");

    let ship = world.add_entity(Entity::new().with_bundle((
        TransformComponent::default(),
        VelocityComponent::linear(Vec3::new(1.0, 0.5, 0.0)),
        SpriteComponent::new("ship.png").with_layer(1),
    ))?)?;

    world.add_entity(Entity::new().with_bundle((
        TransformComponent::from_position(Vec3::new(0.0, -5.0, 0.0)),
        SpriteComponent::new("ground.png").with_size(Vec2::new(20.0, 1.0)),
    ))?)?;

    // Moves, but has nothing to draw
    world.add_entity(Entity::new().with_bundle((
        TransformComponent::default(),
        VelocityComponent::linear(Vec3::Y),
    ))?)?;

    println!("{}", WorldInspector::snapshot(&world));

    let mut game = GameLoop::new(world, LoopConfig::default())?;
    game.run_frames(10, Duration::from_millis(16))?;

    let world = game.world();
    for draw in world.resources().fetch::<RenderQueue>()?.sprites() {
        println!(
            "layer {} {} at {:?}",
            draw.layer,
            draw.texture,
            draw.model.transform_point3(Vec3::ZERO)
        );
    }

    if let Some(described) = WorldInspector::describe_entity(world, ship) {
        println!("{described}");
    }
    println!("Ran {} frames", game.frame_count());
    Ok(())
}
