//! Space Map - a wrap-around 2D world with orbitable planets
//!
//! Core modules:
//! - `sim`: Frame simulation (ship, camera, projectiles, planets, landing)
//! - `renderer`: World-to-screen scene building and Canvas2D painting
//! - `platform`: Browser/native platform abstraction (image assets)
//! - `persistence`: Key-value save slots with throttled writes
//! - `tuning`: Data-driven simulation balance

pub mod audio;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Simulation configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Edge length of the square toroidal world
    pub const WORLD_SIZE: f32 = 10000.0;
    /// Largest frame delta accepted by the tick (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Ship steering
    pub const SHIP_DEAD_ZONE: f32 = 10.0;
    pub const SHIP_SEEK_RADIUS: f32 = 300.0;
    /// Units per frame
    pub const SHIP_MAX_SPEED: f32 = 8.0;
    pub const SHIP_ACCEL_GAIN: f32 = 0.04;
    pub const SHIP_FRICTION: f32 = 0.88;
    /// Friction while the pointer is off the play surface (keeps momentum)
    pub const SHIP_DRIFT_FRICTION: f32 = 0.995;

    pub const CAMERA_FOLLOW_GAIN: f32 = 0.08;

    /// Projectiles (units/second, seconds, milliseconds)
    pub const PROJECTILE_SPEED: f32 = 600.0;
    pub const PROJECTILE_LIFE: f32 = 4.0;
    pub const SHOOT_COOLDOWN_MS: f64 = 333.0;

    /// Landing sequence
    pub const LANDING_DURATION_MS: f64 = 2500.0;
    pub const LANDING_SETTLE_MS: f64 = 120.0;
    /// Fraction of the initial orbit radius remaining at the end of the spiral
    pub const LANDING_FINAL_RADIUS: f32 = 0.1;
    pub const LANDING_SCALE_RATE: f32 = 1.2;

    /// Radar pulses (frames for life/expansion, milliseconds for cadence)
    pub const RADAR_INTERVAL_MS: f64 = 1200.0;
    pub const RADAR_START_RADIUS: f32 = 24.0;
    pub const RADAR_MAX_RADIUS: f32 = 70.0;
    pub const RADAR_EXPANSION: f32 = 0.4;
    pub const RADAR_LIFE_FRAMES: f32 = 110.0;

    /// Ship trail
    pub const TRAIL_SPACING_MS: f64 = 35.0;
    pub const TRAIL_MIN_SPEED: f32 = 0.6;
    pub const TRAIL_LIFE_MS: f32 = 900.0;
    pub const TRAIL_MAX_POINTS: usize = 48;

    /// Alpha above which a planet image pixel counts as solid (0-255)
    pub const HIT_ALPHA_THRESHOLD: u8 = 50;

    /// Speed above which the engine hum plays (units per frame)
    pub const ENGINE_AUDIO_THRESHOLD: f32 = 0.3;
}

/// Wrap a coordinate into `[0, size)`, including negative inputs
#[inline]
pub fn wrap(value: f32, size: f32) -> f32 {
    let r = value.rem_euclid(size);
    // rem_euclid can round up to exactly `size` for tiny negative inputs
    if r >= size { 0.0 } else { r }
}

/// Signed delta `a - b` taking the shorter way around a periodic axis.
///
/// The result lies in `(-size/2, size/2]`.
#[inline]
pub fn shortest_delta(a: f32, b: f32, size: f32) -> f32 {
    let d = (a - b).rem_euclid(size);
    if d > size * 0.5 { d - size } else { d }
}

/// Wrap both axes of a point
#[inline]
pub fn wrap_vec(p: Vec2, size: f32) -> Vec2 {
    Vec2::new(wrap(p.x, size), wrap(p.y, size))
}

/// Shortest displacement from `from` to `to` on the torus
#[inline]
pub fn torus_delta(to: Vec2, from: Vec2, size: f32) -> Vec2 {
    Vec2::new(
        shortest_delta(to.x, from.x, size),
        shortest_delta(to.y, from.y, size),
    )
}

/// Shortest distance between two points on the torus
#[inline]
pub fn torus_distance(a: Vec2, b: Vec2, size: f32) -> f32 {
    torus_delta(a, b, size).length()
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
