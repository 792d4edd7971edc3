//! Spatial components and the velocity integration system.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::Result;
use crate::phase::GameLoopType;
use crate::system::{EntitySystem, LoopBound, SystemContext};
use crate::time::Time;

/// Position, rotation and scale of an entity
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformComponent {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl TransformComponent {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Local-to-world matrix (scale, then rotate, then translate)
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Linear (units/s) and angular (rad/s, scaled axis) velocity
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VelocityComponent {
    pub linear: Vec3,
    pub angular: Vec3,
}

impl VelocityComponent {
    pub fn linear(linear: Vec3) -> Self {
        Self {
            linear,
            angular: Vec3::ZERO,
        }
    }
}

/// Integrates velocity into transform using the scaled frame delta.
///
/// Requires a [`Time`] resource.
#[derive(Debug, Default)]
pub struct MovementSystem;

impl LoopBound for MovementSystem {
    const LOOP_TYPE: GameLoopType = GameLoopType::Update;
}

impl EntitySystem for MovementSystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn is_match(&self, entity: &Entity) -> bool {
        entity.contains_all::<(TransformComponent, VelocityComponent)>()
    }

    fn process(&mut self, entities: &mut [&mut Entity], ctx: &mut SystemContext<'_>) -> Result<()> {
        let dt = ctx.resources.fetch::<Time>()?.delta_seconds();
        if dt == 0.0 {
            return Ok(());
        }

        for entity in entities.iter_mut() {
            let velocity = *entity.get_component::<VelocityComponent>()?;
            let transform = entity.get_component_mut::<TransformComponent>()?;
            transform.position += velocity.linear * dt;
            if velocity.angular != Vec3::ZERO {
                let spin = Quat::from_scaled_axis(velocity.angular * dt);
                transform.rotation = (spin * transform.rotation).normalize();
            }
        }
        Ok(())
    }
}
