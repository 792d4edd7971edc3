//! World inspection and frame diagnostics

use std::collections::VecDeque;
use std::fmt;

use crate::entity::EntityId;
use crate::phase::GameLoopType;
use crate::world::EntityWorld;

/// Point-in-time summary of a world
#[derive(Clone, Debug)]
pub struct WorldSnapshot {
    pub entity_count: usize,
    pub systems: Vec<SystemInfo>,
}

/// One registered system as seen by the inspector
#[derive(Clone, Debug, PartialEq)]
pub struct SystemInfo {
    pub name: &'static str,
    pub loop_type: GameLoopType,
    pub matched: usize,
}

impl fmt::Display for WorldSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== World Summary ===")?;
        writeln!(f, "Entities: {}", self.entity_count)?;
        writeln!(f, "Systems: {}", self.systems.len())?;
        for phase in GameLoopType::ALL {
            writeln!(f, "[{phase}]")?;
            for info in self.systems.iter().filter(|s| s.loop_type == phase) {
                writeln!(f, "  {} ({} matched)", info.name, info.matched)?;
            }
        }
        Ok(())
    }
}

/// World inspector for debugging
pub struct WorldInspector;

impl WorldInspector {
    pub fn snapshot(world: &EntityWorld) -> WorldSnapshot {
        let systems = world
            .schedule()
            .slots()
            .iter()
            .map(|slot| SystemInfo {
                name: slot.name(),
                loop_type: slot.loop_type(),
                matched: slot.matched_count(),
            })
            .collect();

        WorldSnapshot {
            entity_count: world.entity_count(),
            systems,
        }
    }

    /// Component names of a live entity, plus the systems currently matching it
    pub fn describe_entity(world: &EntityWorld, id: EntityId) -> Option<String> {
        let entity = world.entity(id).ok()?;
        let matching: Vec<_> = world
            .schedule()
            .slots()
            .iter()
            .filter(|slot| slot.is_tracking(id))
            .map(|slot| slot.name())
            .collect();
        Some(format!(
            "Entity {id}: components [{}], systems [{}]",
            entity.component_names().join(", "),
            matching.join(", ")
        ))
    }
}

/// Rolling frame-time statistics
#[derive(Clone, Debug)]
pub struct Diagnostics {
    frame_times: VecDeque<f32>,
    max_samples: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::with_samples(60)
    }

    pub fn with_samples(max_samples: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
        }
    }

    /// Record a frame time in milliseconds
    pub fn record_frame_time(&mut self, time_ms: f32) {
        self.frame_times.push_back(time_ms);
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }
    }

    /// Average frame time in milliseconds
    pub fn avg_frame_time(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }

    pub fn fps(&self) -> f32 {
        let avg_ms = self.avg_frame_time();
        if avg_ms > 0.0 {
            1000.0 / avg_ms
        } else {
            0.0
        }
    }

    pub fn sample_count(&self) -> usize {
        self.frame_times.len()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::error::Result;
    use crate::system::{EntitySystem, SystemContext};

    struct Tagged;

    impl EntitySystem for Tagged {
        fn name(&self) -> &'static str {
            "tagged"
        }

        fn is_match(&self, entity: &Entity) -> bool {
            entity.contains_component::<&'static str>()
        }

        fn process(&mut self, _: &mut [&mut Entity], _: &mut SystemContext<'_>) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_snapshot_and_describe() {
        let mut world = EntityWorld::new();
        world.add_system_in(GameLoopType::Update, Tagged).unwrap();
        let id = world
            .add_entity(Entity::new().with_component("player").unwrap())
            .unwrap();
        world.add_entity(Entity::new()).unwrap();

        let snapshot = WorldInspector::snapshot(&world);
        assert_eq!(snapshot.entity_count, 2);
        assert_eq!(
            snapshot.systems,
            vec![SystemInfo {
                name: "tagged",
                loop_type: GameLoopType::Update,
                matched: 1,
            }]
        );
        assert!(snapshot.to_string().contains("tagged (1 matched)"));

        let described = WorldInspector::describe_entity(&world, id).unwrap();
        assert!(described.contains("systems [tagged]"));
        assert!(WorldInspector::describe_entity(&world, EntityId::new()).is_none());
    }

    #[test]
    fn test_diagnostics_window() {
        let mut diag = Diagnostics::with_samples(2);
        diag.record_frame_time(10.0);
        diag.record_frame_time(20.0);
        diag.record_frame_time(30.0);

        assert_eq!(diag.sample_count(), 2);
        assert_eq!(diag.avg_frame_time(), 25.0);
        assert_eq!(diag.fps(), 40.0);
        assert_eq!(Diagnostics::new().fps(), 0.0);
    }
}
