//! Projectiles: cooldown-gated spawning and time-based motion

use glam::Vec2;

use super::state::{Projectile, WorldState};
use crate::wrap_vec;

/// Fire a projectile along the ship heading.
///
/// Returns `false` (and spawns nothing) while the cooldown is running.
pub fn shoot(state: &mut WorldState, now_ms: f64) -> bool {
    if let Some(last) = state.last_shot_ms {
        if now_ms - last < state.tuning.shoot_cooldown_ms {
            return false;
        }
    }
    state.last_shot_ms = Some(now_ms);

    let id = state.next_entity_id();
    let angle = state.ship.angle;
    let speed = state.tuning.projectile_speed;
    let life = state.tuning.projectile_life;
    state.projectiles.push(Projectile {
        id,
        pos: state.ship.pos,
        vel: Vec2::new(angle.cos(), angle.sin()) * speed,
        life,
        max_life: life,
    });
    log::debug!("Projectile {} fired at heading {:.2}", id, angle);
    true
}

/// Advance every projectile by `dt` seconds and drop expired ones
pub fn update_projectiles(projectiles: &mut Vec<Projectile>, dt: f32, world_size: f32) {
    for p in projectiles.iter_mut() {
        p.pos = wrap_vec(p.pos + p.vel * dt, world_size);
        p.life -= dt;
    }
    projectiles.retain(|p| p.life > 0.0);
}
