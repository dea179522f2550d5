//! World state and core simulation types
//!
//! Everything the frame loop mutates lives in [`WorldState`]. Positions are
//! kept wrapped into `[0, world_size)` after every mutation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::camera::ParallaxCameras;
use super::landing::LandingPhase;
use super::planet::PlanetRegistry;
use super::radar::RadarPulses;
use super::starfield::{Star, generate_stars, layer_factors};
use super::trail::Trail;
use crate::tuning::Tuning;
use crate::wrap_vec;

/// The player's ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    /// Heading (radians)
    pub angle: f32,
    /// Velocity in units per frame
    pub vel: Vec2,
}

impl Ship {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            angle: 0.0,
            vel: Vec2::ZERO,
        }
    }

    /// Instantaneous speed (units per frame)
    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Smoothed follower of the ship (or the landing orbit)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pos: Vec2,
}

/// A short-lived shot fired along the ship heading
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Velocity in units per second
    pub vel: Vec2,
    /// Seconds
    pub life: f32,
    pub max_life: f32,
}

impl Projectile {
    /// Remaining life as a 0-1 ratio
    pub fn life_ratio(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Game events emitted by a tick, consumed by the host (audio, UI, saves)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A projectile was spawned
    ShotFired,
    /// Click landed on an in-range planet; the UI should offer a landing
    PlanetSelected(u32),
    LandingStarted(u32),
    /// Spiral finished; ship now sits on the planet
    Landed(u32),
    /// Settle delay elapsed; the host should switch screens
    ScreenTransition(u32),
    EngineStart,
    EngineUpdate { velocity: f32, max_velocity: f32 },
    EngineStop,
}

/// Persisted ship/camera state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShipSnapshot {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub vx: f32,
    pub vy: f32,
    #[serde(rename = "cameraX")]
    pub camera_x: f32,
    #[serde(rename = "cameraY")]
    pub camera_y: f32,
}

/// Complete simulation state, owned by the frame loop
#[derive(Debug, Clone)]
pub struct WorldState {
    pub tuning: Tuning,
    pub ship: Ship,
    pub camera: Camera,
    /// Star layer cameras, moved in step with `camera`
    pub parallax: ParallaxCameras,
    pub stars: Vec<Star>,
    pub planets: PlanetRegistry,
    pub projectiles: Vec<Projectile>,
    pub radar: RadarPulses,
    pub trail: Trail,
    pub landing: LandingPhase,
    /// Where the ship is drawn this frame (differs from `ship.pos` while landing)
    pub ship_visual_pos: Vec2,
    pub ship_visual_angle: f32,
    /// Ship draw scale (shrinks to zero during landing)
    pub ship_scale: f32,
    /// Seconds since the world was created (star drift clock)
    pub elapsed: f32,
    /// Frame timestamp of the last tick (ms)
    pub now_ms: f64,
    /// Timestamp of the last shot, `None` before the first one
    pub last_shot_ms: Option<f64>,
    /// Continuous fire latched by a click that missed every planet
    pub firing: bool,
    pub engine_running: bool,
    next_id: u32,
}

impl WorldState {
    /// Create a world with the default planet ring and a seeded star field
    pub fn new(seed: u64, star_count: usize, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        let center = Vec2::splat(tuning.world_size * 0.5);
        let stars = generate_stars(seed, star_count, tuning.world_size);
        let planets = PlanetRegistry::default_ring(tuning.world_size);
        Self {
            ship: Ship::new(center),
            camera: Camera { pos: center },
            parallax: ParallaxCameras::new(layer_factors(), center, tuning.world_size),
            stars,
            planets,
            projectiles: Vec::new(),
            radar: RadarPulses::default(),
            trail: Trail::default(),
            landing: LandingPhase::Idle,
            ship_visual_pos: center,
            ship_visual_angle: 0.0,
            ship_scale: 1.0,
            elapsed: 0.0,
            now_ms: 0.0,
            last_shot_ms: None,
            firing: false,
            engine_running: false,
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn world_size(&self) -> f32 {
        self.tuning.world_size
    }

    pub fn is_landing(&self) -> bool {
        !matches!(self.landing, LandingPhase::Idle)
    }

    /// Capture ship and camera for persistence
    pub fn snapshot(&self) -> ShipSnapshot {
        ShipSnapshot {
            x: self.ship.pos.x,
            y: self.ship.pos.y,
            angle: self.ship.angle,
            vx: self.ship.vel.x,
            vy: self.ship.vel.y,
            camera_x: self.camera.pos.x,
            camera_y: self.camera.pos.y,
        }
    }

    /// Restore ship and camera from a saved snapshot
    pub fn restore(&mut self, snap: &ShipSnapshot) {
        let size = self.world_size();
        let finite = [snap.x, snap.y, snap.angle, snap.vx, snap.vy, snap.camera_x, snap.camera_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            log::warn!("Ignoring saved ship state with non-finite values");
            return;
        }
        self.ship.pos = wrap_vec(Vec2::new(snap.x, snap.y), size);
        self.ship.angle = snap.angle;
        self.ship.vel = Vec2::new(snap.vx, snap.vy);
        self.camera.pos = wrap_vec(Vec2::new(snap.camera_x, snap.camera_y), size);
        self.parallax.reset(self.camera.pos, size);
        self.ship_visual_pos = self.ship.pos;
        self.ship_visual_angle = self.ship.angle;
        self.trail.clear();
    }
}
