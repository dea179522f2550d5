//! Per-frame simulation tick
//!
//! Core game loop that advances the world by one rendered frame. Input
//! handlers only fill a [`TickInput`]; all entity collections are touched here.

use glam::Vec2;

use super::camera::follow;
use super::landing::{begin_landing, update_landing};
use super::planet::AlphaLookup;
use super::projectile::{shoot, update_projectiles};
use super::ship::{screen_to_world, update_ship};
use super::starfield::update_stars;
use super::state::{GameEvent, WorldState};
use crate::torus_delta;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position in screen space, `None` while off the play surface
    pub pointer: Option<Vec2>,
    /// Pointer-down position this frame (one-shot)
    pub click: Option<Vec2>,
    /// Fire button/pointer currently held
    pub fire_held: bool,
    /// Landing confirmed by the UI for this planet (one-shot)
    pub confirm_landing: Option<u32>,
    /// Play surface size in pixels
    pub viewport: Vec2,
    /// Frame timestamp (ms, monotonic)
    pub now_ms: f64,
}

/// Advance the world by one frame of `dt` seconds
pub fn tick(
    state: &mut WorldState,
    input: &TickInput,
    dt: f32,
    images: &dyn AlphaLookup,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let dt = dt.clamp(0.0, state.tuning.max_frame_dt);
    let now = input.now_ms;
    let world_size = state.world_size();
    state.now_ms = now;
    state.elapsed += dt;

    if let Some(planet_id) = input.confirm_landing {
        if begin_landing(state, planet_id, now) {
            state.firing = false;
            // Sinks silence the engine on LandingStarted
            state.engine_running = false;
            events.push(GameEvent::LandingStarted(planet_id));
        }
    }

    let landing = state.is_landing();

    // A click is either a planet interaction or a shot, never both
    if let Some(click) = input.click.filter(|_| !landing) {
        let world_click = screen_to_world(click, input.viewport, &state.camera);
        let picked = state.planets.pick(
            world_click,
            state.ship.pos,
            world_size,
            images,
            state.tuning.hit_alpha_threshold,
        );
        match picked {
            Some(planet_id) => {
                state.firing = false;
                events.push(GameEvent::PlanetSelected(planet_id));
            }
            None => {
                state.firing = true;
                if shoot(state, now) {
                    events.push(GameEvent::ShotFired);
                }
            }
        }
    }

    // Releasing the button or leaving the surface stops fire at once
    if !input.fire_held || input.pointer.is_none() || landing {
        state.firing = false;
    }

    if !landing {
        let target = input
            .pointer
            .map(|p| screen_to_world(p, input.viewport, &state.camera));
        update_ship(&mut state.ship, target, &state.tuning);

        if state.firing && shoot(state, now) {
            events.push(GameEvent::ShotFired);
        }
    }

    update_projectiles(&mut state.projectiles, dt, world_size);
    update_stars(&mut state.stars, state.elapsed, world_size);

    let previous_visual = state.ship_visual_pos;
    update_landing(state, now, &mut events);
    if !state.is_landing() {
        state.ship_visual_pos = state.ship.pos;
        state.ship_visual_angle = state.ship.angle;
        state.ship_scale = 1.0;
    }

    // Camera and trail follow the drawn ship, which is the spiral while landing
    let visual = state.ship_visual_pos;
    follow(&mut state.camera, visual, state.tuning.camera_follow_gain, world_size);
    state.parallax.update(state.camera.pos, world_size);

    let frame_speed = torus_delta(visual, previous_visual, world_size).length();
    state.trail.update(visual, frame_speed, now, dt * 1000.0, &state.tuning);
    state.radar.update(visual, &state.planets, now, &state.tuning);

    update_engine(state, frame_speed, &mut events);

    events
}

/// Track the continuous engine sound against the drawn ship speed
fn update_engine(state: &mut WorldState, speed: f32, events: &mut Vec<GameEvent>) {
    let moving = speed > state.tuning.engine_audio_threshold
        && state.ship_scale > 0.0
        && !state.is_landing();
    match (moving, state.engine_running) {
        (true, false) => {
            state.engine_running = true;
            events.push(GameEvent::EngineStart);
        }
        (true, true) => events.push(GameEvent::EngineUpdate {
            velocity: speed,
            max_velocity: state.tuning.ship_max_speed,
        }),
        (false, true) => {
            state.engine_running = false;
            events.push(GameEvent::EngineStop);
        }
        (false, false) => {}
    }
}
