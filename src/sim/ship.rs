//! Ship steering: pointer seek with inertia, friction and world wrap

use glam::Vec2;

use super::state::{Camera, Ship};
use crate::tuning::Tuning;
use crate::{torus_delta, wrap_vec};

/// Convert a pointer position in screen space to a world position.
///
/// The screen centre shows the camera position. The result is not wrapped;
/// callers measure it with `torus_delta`, which handles the seam.
#[inline]
pub fn screen_to_world(screen: Vec2, viewport: Vec2, camera: &Camera) -> Vec2 {
    screen - viewport * 0.5 + camera.pos
}

/// Advance the ship by one frame.
///
/// `pointer` is the world-space seek target, or `None` while the pointer is off
/// the play surface (no thrust, weak friction so the ship coasts).
pub fn update_ship(ship: &mut Ship, pointer: Option<Vec2>, tuning: &Tuning) {
    let friction = match pointer {
        Some(target) => {
            let delta = torus_delta(target, ship.pos, tuning.world_size);
            let distance = delta.length();
            // Heading tracks the pointer even inside the dead zone
            if distance > 0.0 {
                ship.angle = delta.y.atan2(delta.x);
            }

            if distance > tuning.ship_dead_zone {
                let speed_multiplier = (distance / tuning.ship_seek_radius).min(1.0);
                let target_speed = tuning.ship_max_speed * speed_multiplier;
                ship.vel += (delta / distance) * target_speed * tuning.ship_accel_gain;
            }
            tuning.ship_friction
        }
        None => tuning.ship_drift_friction,
    };

    ship.vel *= friction;
    ship.pos = wrap_vec(ship.pos + ship.vel, tuning.world_size);
}
