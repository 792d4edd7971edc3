//! Frame timing resource.
//!
//! [`Time`] is advanced once per frame by the frame driver and read by
//! systems through `SystemContext::resources`.
//!
//! ```
//! use final_engine::time::Time;
//! use std::time::Duration;
//!
//! let mut time = Time::new();
//! time.advance(Duration::from_millis(16));
//! assert_eq!(time.frame_count(), 1);
//! ```

use std::time::Duration;

/// Time resource for tracking frame timing
#[derive(Clone, Debug)]
pub struct Time {
    /// Unscaled time since last frame
    delta: Duration,
    /// Total unscaled time since start
    elapsed: Duration,
    /// Frames advanced so far
    frame_count: u64,
    /// Time scale multiplier (1.0 = normal speed)
    time_scale: f32,
}

impl Time {
    /// Create a new time resource at frame zero
    pub fn new() -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            time_scale: 1.0,
        }
    }

    /// Record one frame of `delta` wall time
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    /// Unscaled delta
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Scaled delta in seconds; what gameplay systems should integrate with
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32() * self.time_scale
    }

    /// Total unscaled time since start
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Total unscaled time in seconds
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Frames advanced so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Set time scale (1.0 = normal, 0.5 = half speed). Negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Current time scale
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Pause time (scale 0)
    pub fn pause(&mut self) {
        self.time_scale = 0.0;
    }

    /// Resume at normal speed (scale 1)
    pub fn resume(&mut self) {
        self.time_scale = 1.0;
    }

    /// Check if time is paused
    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_creation() {
        let time = Time::new();
        assert_eq!(time.frame_count(), 0);
        assert_eq!(time.time_scale(), 1.0);
        assert_eq!(time.delta_seconds(), 0.0);
    }

    #[test]
    fn test_advance_accumulates() {
        let mut time = Time::new();
        time.advance(Duration::from_millis(250));
        time.advance(Duration::from_millis(500));

        assert_eq!(time.frame_count(), 2);
        assert_eq!(time.delta(), Duration::from_millis(500));
        assert_eq!(time.elapsed(), Duration::from_millis(750));
        assert_eq!(time.delta_seconds(), 0.5);
    }

    #[test]
    fn test_time_scale_and_pause() {
        let mut time = Time::new();
        time.advance(Duration::from_secs(1));

        time.set_time_scale(0.5);
        assert_eq!(time.delta_seconds(), 0.5);

        time.set_time_scale(-3.0);
        assert!(time.is_paused());

        time.resume();
        assert!(!time.is_paused());
        assert_eq!(time.delta_seconds(), 1.0);
    }
}
