//! Frame driver
//!
//! [`GameLoop`] owns an [`EntityWorld`] and runs its phases once per frame in
//! the order given by [`LoopConfig`], advancing the [`Time`] resource first.

use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

#[cfg(feature = "profiling")]
use tracing::info_span;

use crate::debug::Diagnostics;
use crate::error::{EcsError, Result};
use crate::phase::GameLoopType;
use crate::time::Time;
use crate::world::EntityWorld;

/// Frame driver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Phases run each frame, in order
    pub phases: Vec<GameLoopType>,
    /// Initial `Time` scale
    pub time_scale: f32,
    /// Frame deltas above this are clamped (e.g. after a debugger pause)
    pub max_delta_ms: u64,
    /// Sleep to pace `run_while` at this rate; `None` runs unthrottled
    pub target_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            phases: GameLoopType::ALL.to_vec(),
            time_scale: 1.0,
            max_delta_ms: 250,
            target_fps: None,
        }
    }
}

impl LoopConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LoopConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check phase order, time scale and frame limits
    pub fn validate(&self) -> Result<()> {
        if self.phases.is_empty() {
            return Err(EcsError::InvalidConfig("phase list is empty".into()));
        }
        for (i, phase) in self.phases.iter().enumerate() {
            if self.phases[..i].contains(phase) {
                return Err(EcsError::InvalidConfig(format!(
                    "phase {phase} listed more than once"
                )));
            }
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(EcsError::InvalidConfig(format!(
                "time_scale must be finite and non-negative, got {}",
                self.time_scale
            )));
        }
        if self.max_delta_ms == 0 {
            return Err(EcsError::InvalidConfig("max_delta_ms must be positive".into()));
        }
        if self.target_fps == Some(0) {
            return Err(EcsError::InvalidConfig("target_fps must be positive".into()));
        }
        Ok(())
    }

    /// Upper bound applied to each frame delta
    pub fn max_delta(&self) -> Duration {
        Duration::from_millis(self.max_delta_ms)
    }

    fn frame_budget(&self) -> Option<Duration> {
        self.target_fps
            .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)))
    }
}

/// Drives an `EntityWorld` one frame at a time
pub struct GameLoop {
    world: EntityWorld,
    config: LoopConfig,
    diagnostics: Diagnostics,
    frames: u64,
}

impl GameLoop {
    /// Validate `config` and take ownership of `world`.
    ///
    /// If the world has no `Time` resource, inserts one scaled by
    /// `config.time_scale`. An existing `Time` keeps its own scale.
    pub fn new(mut world: EntityWorld, config: LoopConfig) -> Result<Self> {
        config.validate()?;
        let resources = world.resources_mut();
        if !resources.contains::<Time>() {
            let mut time = Time::new();
            time.set_time_scale(config.time_scale);
            resources.insert(time);
        }
        Ok(Self {
            world,
            config,
            diagnostics: Diagnostics::new(),
            frames: 0,
        })
    }

    /// The driven world
    pub fn world(&self) -> &EntityWorld {
        &self.world
    }

    /// Mutable access to the driven world, e.g. to add entities between frames
    pub fn world_mut(&mut self) -> &mut EntityWorld {
        &mut self.world
    }

    /// Stop driving and hand the world back
    pub fn into_world(self) -> EntityWorld {
        self.world
    }

    /// Active loop configuration
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Frame-time statistics over completed frames
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Frames completed without error
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Run one frame: advance `Time` by `delta` (clamped), then every
    /// configured phase in order.
    ///
    /// An error from any phase aborts the frame and is returned; later
    /// phases of that frame do not run, `Time` is rolled back and the frame
    /// is not counted. Phases that already completed keep their effects.
    pub fn step(&mut self, delta: Duration) -> Result<()> {
        let max_delta = self.config.max_delta();
        if delta > max_delta {
            warn!(frame = self.frames, ?delta, ?max_delta, "frame delta clamped");
        }
        let delta = delta.min(max_delta);
        let started = Instant::now();

        #[cfg(feature = "profiling")]
        let span = info_span!("frame", frame = self.frames, delta_ms = delta.as_secs_f32() * 1000.0);
        #[cfg(feature = "profiling")]
        let _span_guard = span.enter();

        let resources = self.world.resources_mut();
        let time_before = resources.get::<Time>().cloned();
        resources.get_or_default::<Time>().advance(delta);

        for &phase in &self.config.phases {
            if let Err(err) = self.world.process_all(phase) {
                error!(frame = self.frames, phase = %phase, error = %err, "frame aborted");
                // The aborted frame is not counted by Time either
                let resources = self.world.resources_mut();
                match time_before {
                    Some(time) => {
                        resources.insert(time);
                    }
                    None => {
                        resources.remove::<Time>();
                    }
                }
                return Err(err);
            }
        }

        self.frames += 1;
        self.diagnostics
            .record_frame_time(started.elapsed().as_secs_f32() * 1000.0);
        Ok(())
    }

    /// Run `count` frames with a fixed `delta`
    pub fn run_frames(&mut self, count: u64, delta: Duration) -> Result<()> {
        for _ in 0..count {
            self.step(delta)?;
        }
        Ok(())
    }

    /// Run frames with wall-clock deltas while `keep_running` returns true.
    ///
    /// Paces to `target_fps` when configured.
    pub fn run_while<F>(&mut self, mut keep_running: F) -> Result<()>
    where
        F: FnMut(&EntityWorld) -> bool,
    {
        let budget = self.config.frame_budget();
        let mut last = Instant::now();
        debug!(phases = ?self.config.phases, ?budget, "game loop started");

        while keep_running(&self.world) {
            let frame_start = Instant::now();
            self.step(frame_start.duration_since(last))?;
            last = frame_start;

            if let Some(budget) = budget {
                let spent = frame_start.elapsed();
                if spent < budget {
                    std::thread::sleep(budget - spent);
                }
            }
        }

        debug!(frames = self.frames, "game loop stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LoopConfig::default();
        config.validate().unwrap();
        assert_eq!(config.phases, vec![GameLoopType::Update, GameLoopType::Render]);
        assert_eq!(config.max_delta(), Duration::from_millis(250));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = LoopConfig::from_json_str(r#"{ "time_scale": 0.5 }"#).unwrap();
        assert_eq!(config.time_scale, 0.5);
        assert_eq!(config.phases, GameLoopType::ALL.to_vec());
        assert_eq!(config.target_fps, None);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let cases = [
            r#"{ "phases": [] }"#,
            r#"{ "phases": ["Update", "Update"] }"#,
            r#"{ "time_scale": -1.0 }"#,
            r#"{ "max_delta_ms": 0 }"#,
            r#"{ "target_fps": 0 }"#,
            r#"{ "phases": ["Physics"] }"#,
        ];
        for json in cases {
            assert!(
                matches!(LoopConfig::from_json_str(json), Err(EcsError::InvalidConfig(_))),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn test_step_advances_time_with_clamp() {
        let config = LoopConfig {
            max_delta_ms: 100,
            ..LoopConfig::default()
        };
        let mut game = GameLoop::new(EntityWorld::new(), config).unwrap();

        game.step(Duration::from_millis(40)).unwrap();
        game.step(Duration::from_secs(5)).unwrap();

        let time = game.world().resources().fetch::<Time>().unwrap();
        assert_eq!(time.frame_count(), 2);
        assert_eq!(time.delta(), Duration::from_millis(100));
        assert_eq!(time.elapsed(), Duration::from_millis(140));
        assert_eq!(game.frame_count(), 2);
        assert_eq!(game.diagnostics().sample_count(), 2);
    }

    #[test]
    fn test_new_keeps_existing_time_scale() {
        let mut world = EntityWorld::new();
        let mut time = Time::new();
        time.set_time_scale(0.25);
        world.resources_mut().insert(time);

        let game = GameLoop::new(world, LoopConfig::default()).unwrap();
        let time = game.world().resources().fetch::<Time>().unwrap();
        assert_eq!(time.time_scale(), 0.25);

        let config = LoopConfig {
            time_scale: 2.0,
            ..LoopConfig::default()
        };
        let game = GameLoop::new(EntityWorld::new(), config).unwrap();
        let time = game.world().resources().fetch::<Time>().unwrap();
        assert_eq!(time.time_scale(), 2.0);
    }

    #[test]
    fn test_run_while_stops() {
        let mut game = GameLoop::new(EntityWorld::new(), LoopConfig::default()).unwrap();
        let mut remaining = 3;
        game.run_while(|_| {
            remaining -= 1;
            remaining >= 0
        })
        .unwrap();
        assert_eq!(game.frame_count(), 3);
    }
}
