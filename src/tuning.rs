//! Data-driven simulation tuning
//!
//! Every field defaults to the matching constant in [`crate::consts`]. A JSON
//! document can override any subset:
//!
//! ```
//! let tuning = space_map::Tuning::from_json(r#"{ "ship_max_speed": 10.0 }"#).unwrap();
//! assert_eq!(tuning.ship_max_speed, 10.0);
//! assert_eq!(tuning.world_size, space_map::consts::WORLD_SIZE);
//! ```

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Runtime-tunable simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // World
    pub world_size: f32,
    pub max_frame_dt: f32,

    // Ship
    pub ship_dead_zone: f32,
    pub ship_seek_radius: f32,
    pub ship_max_speed: f32,
    pub ship_accel_gain: f32,
    pub ship_friction: f32,
    pub ship_drift_friction: f32,

    // Camera
    pub camera_follow_gain: f32,

    // Projectiles
    pub projectile_speed: f32,
    pub projectile_life: f32,
    pub shoot_cooldown_ms: f64,

    // Landing
    pub landing_duration_ms: f64,
    pub landing_settle_ms: f64,
    pub landing_final_radius: f32,
    pub landing_scale_rate: f32,

    // Radar
    pub radar_interval_ms: f64,
    pub radar_start_radius: f32,
    pub radar_max_radius: f32,
    pub radar_expansion: f32,
    pub radar_life_frames: f32,

    // Trail
    pub trail_spacing_ms: f64,
    pub trail_min_speed: f32,
    pub trail_life_ms: f32,
    pub trail_max_points: usize,

    // Hit testing
    pub hit_alpha_threshold: u8,

    // Audio
    pub engine_audio_threshold: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_size: WORLD_SIZE,
            max_frame_dt: MAX_FRAME_DT,

            ship_dead_zone: SHIP_DEAD_ZONE,
            ship_seek_radius: SHIP_SEEK_RADIUS,
            ship_max_speed: SHIP_MAX_SPEED,
            ship_accel_gain: SHIP_ACCEL_GAIN,
            ship_friction: SHIP_FRICTION,
            ship_drift_friction: SHIP_DRIFT_FRICTION,

            camera_follow_gain: CAMERA_FOLLOW_GAIN,

            projectile_speed: PROJECTILE_SPEED,
            projectile_life: PROJECTILE_LIFE,
            shoot_cooldown_ms: SHOOT_COOLDOWN_MS,

            landing_duration_ms: LANDING_DURATION_MS,
            landing_settle_ms: LANDING_SETTLE_MS,
            landing_final_radius: LANDING_FINAL_RADIUS,
            landing_scale_rate: LANDING_SCALE_RATE,

            radar_interval_ms: RADAR_INTERVAL_MS,
            radar_start_radius: RADAR_START_RADIUS,
            radar_max_radius: RADAR_MAX_RADIUS,
            radar_expansion: RADAR_EXPANSION,
            radar_life_frames: RADAR_LIFE_FRAMES,

            trail_spacing_ms: TRAIL_SPACING_MS,
            trail_min_speed: TRAIL_MIN_SPEED,
            trail_life_ms: TRAIL_LIFE_MS,
            trail_max_points: TRAIL_MAX_POINTS,

            hit_alpha_threshold: HIT_ALPHA_THRESHOLD,

            engine_audio_threshold: ENGINE_AUDIO_THRESHOLD,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Clamp values that would break the simulation's invariants
    pub fn sanitized(mut self) -> Self {
        if !(self.world_size > 0.0) {
            log::warn!("Invalid world_size {}, using default", self.world_size);
            self.world_size = WORLD_SIZE;
        }
        self.ship_friction = self.ship_friction.clamp(0.0, 1.0);
        self.ship_drift_friction = self.ship_drift_friction.clamp(0.0, 1.0);
        self.camera_follow_gain = self.camera_follow_gain.clamp(0.0, 1.0);
        self.ship_seek_radius = self.ship_seek_radius.max(1.0);
        self.landing_duration_ms = self.landing_duration_ms.max(1.0);
        self.trail_max_points = self.trail_max_points.max(2);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "projectile_speed": 900.0 }"#).unwrap();
        assert_eq!(tuning.projectile_speed, 900.0);
        assert_eq!(tuning.ship_friction, SHIP_FRICTION);
        assert_eq!(tuning.trail_max_points, TRAIL_MAX_POINTS);
    }

    #[test]
    fn test_sanitize_rejects_bad_world() {
        let tuning = Tuning::from_json(r#"{ "world_size": -5.0, "ship_friction": 3.0 }"#).unwrap();
        assert_eq!(tuning.world_size, WORLD_SIZE);
        assert_eq!(tuning.ship_friction, 1.0);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }
}
