//! Frame simulation module
//!
//! All gameplay logic lives here. This module stays free of rendering and
//! platform dependencies:
//! - One tick per rendered frame, driven by real elapsed time
//! - Seeded RNG only (star field)
//! - Every position wrapped onto the torus after each mutation

pub mod camera;
pub mod landing;
pub mod planet;
pub mod projectile;
pub mod radar;
pub mod ship;
pub mod starfield;
pub mod state;
pub mod tick;
pub mod trail;

pub use camera::ParallaxCameras;
pub use landing::{LandingAnimation, LandingPhase, SpiralPose, begin_landing, spiral_pose};
pub use planet::{AlphaLookup, NoImages, Planet, PlanetPatch, PlanetRegistry, is_point_on_planet};
pub use projectile::shoot;
pub use radar::{RadarPulse, RadarPulses, bearing};
pub use ship::screen_to_world;
pub use starfield::{Star, StarClass};
pub use state::{Camera, GameEvent, Projectile, Ship, ShipSnapshot, WorldState};
pub use tick::{TickInput, tick};
pub use trail::{Trail, TrailPoint};
