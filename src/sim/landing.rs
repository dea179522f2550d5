//! Landing sequencer: a timed orbit spiral into a target planet
//!
//! `Idle -> Animating -> Complete -> Idle`. While animating, the ship's drawn
//! position, heading and scale come from the spiral; the physics state is
//! frozen until the terminal commit snaps it onto the planet.

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, TAU};

use super::state::{GameEvent, WorldState};
use crate::{polar_to_cartesian, torus_delta, wrap_vec};

/// An in-flight landing
#[derive(Debug, Clone, PartialEq)]
pub struct LandingAnimation {
    pub planet_id: u32,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub initial_ship: Vec2,
}

/// Ship pose along the spiral at a given progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralPose {
    pub pos: Vec2,
    pub heading: f32,
    pub scale: f32,
    pub radius: f32,
    pub angle: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LandingPhase {
    Idle,
    Animating(LandingAnimation),
    /// Ship has landed; waiting out the settle delay before the screen change
    Complete { planet_id: u32, settle_until_ms: f64 },
}

/// Compute the spiral pose for `progress` in `[0, 1]`.
///
/// One full revolution over the whole animation regardless of the starting
/// radius; the radius shrinks linearly to `final_radius` of its initial value.
pub fn spiral_pose(
    planet_pos: Vec2,
    initial_ship: Vec2,
    progress: f32,
    final_radius: f32,
    scale_rate: f32,
    world_size: f32,
) -> SpiralPose {
    let progress = progress.clamp(0.0, 1.0);
    let initial = torus_delta(initial_ship, planet_pos, world_size);
    let initial_radius = initial.length();
    let initial_angle = initial.y.atan2(initial.x);

    let angle = initial_angle + progress * TAU;
    let radius = initial_radius * (1.0 - (1.0 - final_radius) * progress);
    SpiralPose {
        pos: wrap_vec(planet_pos + polar_to_cartesian(radius, angle), world_size),
        heading: angle + FRAC_PI_2,
        scale: (1.0 - scale_rate * progress).max(0.0),
        radius,
        angle,
    }
}

/// Start a landing on `planet_id`.
///
/// Ignored (returns `false`) while another landing is in flight or if the
/// planet does not exist.
pub fn begin_landing(state: &mut WorldState, planet_id: u32, now_ms: f64) -> bool {
    if state.is_landing() {
        log::debug!("Landing on {} ignored: already landing", planet_id);
        return false;
    }
    let Some(planet) = state.planets.get(planet_id) else {
        log::warn!("Landing requested for unknown planet {}", planet_id);
        return false;
    };
    log::info!("Landing started on {} ({})", planet.name, planet_id);
    state.landing = LandingPhase::Animating(LandingAnimation {
        planet_id,
        start_ms: now_ms,
        duration_ms: state.tuning.landing_duration_ms,
        initial_ship: state.ship.pos,
    });
    true
}

/// Advance the sequencer. Writes the ship's visual pose and returns any events.
pub fn update_landing(state: &mut WorldState, now_ms: f64, events: &mut Vec<GameEvent>) {
    match state.landing.clone() {
        LandingPhase::Idle => {}
        LandingPhase::Animating(anim) => {
            let Some(planet_pos) = state.planets.get(anim.planet_id).map(|p| p.pos) else {
                // Planet vanished mid-flight; abandon the landing
                state.landing = LandingPhase::Idle;
                state.ship_scale = 1.0;
                return;
            };
            let elapsed = (now_ms - anim.start_ms).max(0.0);
            let progress = elapsed / anim.duration_ms;

            if progress >= 1.0 {
                // Terminal commit: ship sits exactly on the planet
                state.ship.pos = planet_pos;
                state.ship.vel = Vec2::ZERO;
                state.ship_visual_pos = planet_pos;
                state.ship_scale = 0.0;
                state.landing = LandingPhase::Complete {
                    planet_id: anim.planet_id,
                    settle_until_ms: now_ms + state.tuning.landing_settle_ms,
                };
                log::info!("Landed on planet {}", anim.planet_id);
                events.push(GameEvent::Landed(anim.planet_id));
                return;
            }

            let pose = spiral_pose(
                planet_pos,
                anim.initial_ship,
                progress as f32,
                state.tuning.landing_final_radius,
                state.tuning.landing_scale_rate,
                state.world_size(),
            );
            state.ship_visual_pos = pose.pos;
            state.ship_visual_angle = pose.heading;
            state.ship_scale = pose.scale;
        }
        LandingPhase::Complete { planet_id, settle_until_ms } => {
            if now_ms >= settle_until_ms {
                state.landing = LandingPhase::Idle;
                events.push(GameEvent::ScreenTransition(planet_id));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    const WORLD: f32 = 10000.0;

    #[test]
    fn test_pose_at_start_is_initial_position() {
        let planet = Vec2::new(5000.0, 5000.0);
        let ship = Vec2::new(5200.0, 5000.0);
        let pose = spiral_pose(planet, ship, 0.0, 0.1, 1.2, WORLD);
        assert!((pose.pos - ship).length() < 1e-3);
        assert_eq!(pose.scale, 1.0);
    }

    #[test]
    fn test_pose_near_end_is_ten_percent_radius() {
        let planet = Vec2::new(5000.0, 5000.0);
        let ship = Vec2::new(5200.0, 5000.0);
        let pose = spiral_pose(planet, ship, 0.9999, 0.1, 1.2, WORLD);
        assert!((pose.radius - 20.0).abs() < 0.05);
        assert_eq!(pose.scale, 0.0);
        // Scale already gone by ~0.83
        let pose = spiral_pose(planet, ship, 0.84, 0.1, 1.2, WORLD);
        assert_eq!(pose.scale, 0.0);
    }

    #[test]
    fn test_exactly_one_revolution() {
        let planet = Vec2::new(5000.0, 5000.0);
        let ship = Vec2::new(5000.0, 5300.0);
        let start = spiral_pose(planet, ship, 0.0, 0.1, 1.2, WORLD);
        let end = spiral_pose(planet, ship, 1.0, 0.1, 1.2, WORLD);
        assert!((end.angle - start.angle - TAU).abs() < 1e-4);
        // Heading is tangent to the orbit
        assert!((start.heading - (start.angle + FRAC_PI_2)).abs() < 1e-6);
    }

    #[test]
    fn test_spiral_across_seam_uses_short_radius() {
        let planet = Vec2::new(20.0, 5000.0);
        let ship = Vec2::new(9900.0, 5000.0);
        let pose = spiral_pose(planet, ship, 0.0, 0.1, 1.2, WORLD);
        assert!((pose.radius - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_state_machine_runs_to_transition() {
        let mut state = WorldState::new(3, 0, Tuning::default());
        let planet = state.planets.get(1).unwrap().clone();
        state.ship.pos = planet.pos + Vec2::new(100.0, 0.0);
        state.ship.vel = Vec2::new(3.0, 0.0);

        assert!(begin_landing(&mut state, 1, 0.0));
        // Second trigger while animating is ignored
        assert!(!begin_landing(&mut state, 2, 10.0));

        let mut events = Vec::new();
        update_landing(&mut state, 1250.0, &mut events);
        assert!(events.is_empty());
        assert!(state.ship_scale > 0.0 && state.ship_scale < 1.0);

        update_landing(&mut state, 2500.0, &mut events);
        assert_eq!(events, vec![GameEvent::Landed(1)]);
        assert_eq!(state.ship.pos, planet.pos);
        assert_eq!(state.ship.vel, Vec2::ZERO);

        // Still settling: no transition, and new landings stay blocked
        events.clear();
        update_landing(&mut state, 2550.0, &mut events);
        assert!(events.is_empty());
        assert!(!begin_landing(&mut state, 2, 2550.0));

        let settled = 2500.0 + state.tuning.landing_settle_ms;
        update_landing(&mut state, settled, &mut events);
        assert_eq!(events, vec![GameEvent::ScreenTransition(1)]);
        assert_eq!(state.landing, LandingPhase::Idle);
    }

    #[test]
    fn test_unknown_planet_is_ignored() {
        let mut state = WorldState::new(3, 0, Tuning::default());
        assert!(!begin_landing(&mut state, 77, 0.0));
        assert!(!state.is_landing());
    }
}
