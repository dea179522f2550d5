//! World-to-screen scene building
//!
//! Produces a flat list of draw commands in screen pixels. Every projection
//! goes through the shortest torus delta from the camera, so entities near a
//! wrap seam are drawn on the side the player is looking at.

use glam::Vec2;
use std::f32::consts::PI;

use crate::settings::Settings;
use crate::sim::{WorldState, bearing};
use crate::torus_delta;

/// Off-screen slack before an entity is culled (pixels)
const CULL_MARGIN: f32 = 64.0;
/// Angular width of a radar arc
const RADAR_ARC_SPREAD: f32 = PI / 3.0;
const PROJECTILE_RADIUS: f32 = 3.0;
const TRAIL_MAX_WIDTH: f32 = 6.0;

pub type Rgba = [f32; 4];

/// One primitive to paint, in screen space
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Star {
        pos: Vec2,
        radius: f32,
        color_id: u8,
        alpha: f32,
    },
    /// Planet image, or a flat disc while the image is unavailable
    Planet {
        id: u32,
        pos: Vec2,
        radius: f32,
        rotation: f32,
        image_ref: String,
    },
    /// Interaction boundary, shown while the ship is in range
    RangeRing { pos: Vec2, radius: f32 },
    Projectile { pos: Vec2, radius: f32, alpha: f32 },
    TrailSegment {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Rgba,
    },
    /// Arc centred on the ship, opening toward `bearing`
    RadarArc {
        center: Vec2,
        radius: f32,
        bearing: f32,
        spread: f32,
        alpha: f32,
    },
    Ship { pos: Vec2, angle: f32, scale: f32 },
}

/// Draw commands for one frame, back to front
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub viewport: Vec2,
    pub commands: Vec<DrawCmd>,
}

impl Scene {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCmd> {
        self.commands.iter()
    }
}

/// Camera projection for one frame
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub camera: Vec2,
    pub viewport: Vec2,
    pub world_size: f32,
}

impl Projection {
    /// Screen position of a world point
    #[inline]
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        self.to_screen_from(world, self.camera)
    }

    /// Screen position of a world point seen from another camera (star layers)
    #[inline]
    pub fn to_screen_from(&self, world: Vec2, camera: Vec2) -> Vec2 {
        self.viewport * 0.5 + torus_delta(world, camera, self.world_size)
    }

    /// Whether something of `extent` pixels around `screen` can touch the view
    #[inline]
    pub fn visible(&self, screen: Vec2, extent: f32) -> bool {
        let slack = extent + CULL_MARGIN;
        screen.x >= -slack
            && screen.y >= -slack
            && screen.x <= self.viewport.x + slack
            && screen.y <= self.viewport.y + slack
    }
}

/// Interpolate colour from trail intensity (slow=blue, fast=orange)
fn intensity_color(intensity: f32, alpha: f32) -> Rgba {
    let t = intensity.clamp(0.0, 1.0);

    let (r, g, b) = if t < 0.33 {
        // Blue to cyan
        let u = t / 0.33;
        (0.2, 0.4 + 0.4 * u, 1.0)
    } else if t < 0.66 {
        // Cyan to white
        let u = (t - 0.33) / 0.33;
        (0.2 + 0.8 * u, 0.8 + 0.2 * u, 1.0)
    } else {
        // White to orange
        let u = (t - 0.66) / 0.34;
        (1.0, 1.0 - 0.4 * u, 1.0 - 0.8 * u)
    };

    [r, g, b, alpha]
}

/// Build the draw list for the current world state
pub fn build_scene(state: &WorldState, settings: &Settings, viewport: Vec2) -> Scene {
    let proj = Projection {
        camera: state.camera.pos,
        viewport,
        world_size: state.world_size(),
    };
    let mut commands = Vec::with_capacity(state.stars.len() / 4 + 64);

    push_stars(&mut commands, state, settings, &proj);
    push_planets(&mut commands, state, settings, &proj);
    push_trail(&mut commands, state, settings, &proj);
    push_projectiles(&mut commands, state, &proj);
    if settings.effective_radar() {
        push_radar(&mut commands, state, &proj);
    }

    if state.ship_scale > 0.0 {
        commands.push(DrawCmd::Ship {
            pos: proj.to_screen(state.ship_visual_pos),
            angle: state.ship_visual_angle,
            scale: state.ship_scale,
        });
    }

    Scene { viewport, commands }
}

fn push_stars(out: &mut Vec<DrawCmd>, state: &WorldState, settings: &Settings, proj: &Projection) {
    let twinkle = settings.effective_twinkle();
    for star in &state.stars {
        let pos = proj.to_screen_from(star.pos, state.parallax.camera_for(star.parallax));
        if !proj.visible(pos, star.size) {
            continue;
        }
        let brightness = if twinkle {
            crate::sim::starfield::twinkle(star, state.elapsed)
        } else {
            1.0
        };
        out.push(DrawCmd::Star {
            pos,
            radius: star.size,
            color_id: star.color_id,
            alpha: star.opacity * brightness,
        });
    }
}

fn push_planets(out: &mut Vec<DrawCmd>, state: &WorldState, settings: &Settings, proj: &Projection) {
    for planet in state.planets.iter() {
        let pos = proj.to_screen(planet.pos);
        if !proj.visible(pos, planet.interaction_radius.max(planet.radius)) {
            continue;
        }
        if settings.range_rings && planet.in_range(state.ship.pos, proj.world_size) {
            out.push(DrawCmd::RangeRing {
                pos,
                radius: planet.interaction_radius,
            });
        }
        out.push(DrawCmd::Planet {
            id: planet.id,
            pos,
            radius: planet.radius,
            rotation: planet.rotation,
            image_ref: planet.image_ref.clone(),
        });
    }
}

fn push_trail(out: &mut Vec<DrawCmd>, state: &WorldState, settings: &Settings, proj: &Projection) {
    let cap = settings.trail_points(state.tuning.trail_max_points);
    let skip = state.trail.len().saturating_sub(cap);
    let points: Vec<_> = state.trail.points().skip(skip).collect();

    for pair in points.windows(2) {
        let (older, newer) = (pair[0], pair[1]);
        let from = proj.to_screen(older.pos);
        let to = proj.to_screen(newer.pos);
        if !proj.visible(from, TRAIL_MAX_WIDTH) && !proj.visible(to, TRAIL_MAX_WIDTH) {
            continue;
        }
        let fade = newer.life_ratio() * newer.intensity;
        if fade <= 0.0 {
            continue;
        }
        out.push(DrawCmd::TrailSegment {
            from,
            to,
            width: TRAIL_MAX_WIDTH * fade,
            color: intensity_color(newer.intensity, 0.8 * fade),
        });
    }
}

fn push_projectiles(out: &mut Vec<DrawCmd>, state: &WorldState, proj: &Projection) {
    for p in &state.projectiles {
        let pos = proj.to_screen(p.pos);
        if proj.visible(pos, PROJECTILE_RADIUS) {
            out.push(DrawCmd::Projectile {
                pos,
                radius: PROJECTILE_RADIUS,
                alpha: p.life_ratio(),
            });
        }
    }
}

fn push_radar(out: &mut Vec<DrawCmd>, state: &WorldState, proj: &Projection) {
    let center = proj.to_screen(state.ship_visual_pos);
    for pulse in state.radar.iter() {
        // Planet may have been removed by a layout reload
        let Some(planet) = state.planets.get(pulse.planet_id) else {
            continue;
        };
        out.push(DrawCmd::RadarArc {
            center,
            radius: pulse.radius,
            bearing: bearing(state.ship_visual_pos, planet.pos, proj.world_size),
            spread: RADAR_ARC_SPREAD,
            alpha: pulse.life_ratio(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Planet, PlanetRegistry, TrailPoint};
    use crate::tuning::Tuning;

    const VIEW: Vec2 = Vec2::new(800.0, 600.0);

    fn world() -> WorldState {
        let mut state = WorldState::new(9, 0, Tuning::default());
        state.planets = PlanetRegistry::new(vec![Planet {
            id: 1,
            pos: Vec2::new(9950.0, 5000.0),
            radius: 40.0,
            interaction_radius: 120.0,
            rotation: 0.0,
            name: "Seam".into(),
            image_ref: "seam.png".into(),
        }]);
        state
    }

    fn planet_cmd(scene: &Scene) -> Option<Vec2> {
        scene.iter().find_map(|cmd| match cmd {
            DrawCmd::Planet { pos, .. } => Some(*pos),
            _ => None,
        })
    }

    #[test]
    fn test_planet_across_seam_is_drawn_beside_camera() {
        let mut state = world();
        state.camera.pos = Vec2::new(50.0, 5000.0);
        let scene = build_scene(&state, &Settings::default(), VIEW);
        // 100 units to the left of the camera, not 9900 to the right
        assert_eq!(planet_cmd(&scene), Some(Vec2::new(300.0, 300.0)));
    }

    #[test]
    fn test_far_planet_is_culled() {
        let mut state = world();
        state.camera.pos = Vec2::new(5000.0, 5000.0);
        let scene = build_scene(&state, &Settings::default(), VIEW);
        assert_eq!(planet_cmd(&scene), None);
    }

    #[test]
    fn test_range_ring_only_while_in_range() {
        let mut state = world();
        state.camera.pos = Vec2::new(50.0, 5000.0);
        state.ship.pos = Vec2::new(50.0, 5000.0);
        let has_ring = |s: &Scene| s.iter().any(|c| matches!(c, DrawCmd::RangeRing { .. }));
        assert!(has_ring(&build_scene(&state, &Settings::default(), VIEW)));

        state.ship.pos = Vec2::new(400.0, 5000.0);
        assert!(!has_ring(&build_scene(&state, &Settings::default(), VIEW)));
    }

    #[test]
    fn test_ship_hidden_at_zero_scale() {
        let mut state = world();
        let has_ship = |s: &Scene| s.iter().any(|c| matches!(c, DrawCmd::Ship { .. }));
        assert!(has_ship(&build_scene(&state, &Settings::default(), VIEW)));
        state.ship_scale = 0.0;
        assert!(!has_ship(&build_scene(&state, &Settings::default(), VIEW)));
    }

    #[test]
    fn test_radar_bearing_follows_live_positions() {
        let mut state = world();
        state.ship.pos = Vec2::new(30.0, 5000.0);
        state.ship_visual_pos = state.ship.pos;
        let tuning = state.tuning.clone();
        state.radar.update(state.ship.pos, &state.planets, 0.0, &tuning);

        let arc_bearing = |s: &Scene| {
            s.iter().find_map(|c| match c {
                DrawCmd::RadarArc { bearing, .. } => Some(*bearing),
                _ => None,
            })
        };
        // Planet is 80 units to the left across the seam
        let before = arc_bearing(&build_scene(&state, &Settings::default(), VIEW)).unwrap();
        assert!((before.abs() - PI).abs() < 1e-3);

        // Ship passes the planet: the same pulse now points right
        state.ship_visual_pos = Vec2::new(9900.0, 5000.0);
        let after = arc_bearing(&build_scene(&state, &Settings::default(), VIEW)).unwrap();
        assert!(after.abs() < 1e-3);

        let off = Settings { radar: false, ..Settings::default() };
        assert_eq!(arc_bearing(&build_scene(&state, &off, VIEW)), None);
    }

    #[test]
    fn test_trail_segments_fade_and_respect_quality_cap() {
        let mut state = world();
        let tuning = state.tuning.clone();
        for i in 0..20 {
            let pos = Vec2::new(5000.0 + i as f32 * 5.0, 5000.0);
            state.trail.update(pos, 8.0, i as f64 * 50.0, 50.0, &tuning);
        }
        state.camera.pos = Vec2::new(5050.0, 5000.0);

        let segments: Vec<_> = build_scene(&state, &Settings::default(), VIEW)
            .commands
            .into_iter()
            .filter_map(|c| match c {
                DrawCmd::TrailSegment { width, .. } => Some(width),
                _ => None,
            })
            .collect();
        let points = state.trail.len().min(Settings::default().trail_points(tuning.trail_max_points));
        assert_eq!(segments.len(), points - 1);
        // Newest segments are the widest
        assert!(segments.first() < segments.last());

        let off = Settings { trails: false, ..Settings::default() };
        let scene = build_scene(&state, &off, VIEW);
        assert!(!scene.iter().any(|c| matches!(c, DrawCmd::TrailSegment { .. })));
    }

    #[test]
    fn test_projection_culls_beyond_margin() {
        let proj = Projection {
            camera: Vec2::new(1000.0, 1000.0),
            viewport: VIEW,
            world_size: 10000.0,
        };
        assert_eq!(proj.to_screen(Vec2::new(1000.0, 1000.0)), VIEW * 0.5);
        assert!(!proj.visible(Vec2::new(-200.0, 10.0), 2.0));
        assert!(proj.visible(Vec2::new(-20.0, 10.0), 2.0));
    }

    fn star_positions(scene: &Scene) -> Vec<Vec2> {
        scene
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Star { pos, .. } => Some(*pos),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_stars_glide_when_camera_crosses_seam() {
        let mut state = WorldState::new(3, 30, Tuning::default());
        state.camera.pos = Vec2::new(9999.5, 5000.0);
        state.parallax.reset(state.camera.pos, 10000.0);
        // Park every star at the centre of its layer's view
        for star in state.stars.iter_mut() {
            star.pos = state.parallax.camera_for(star.parallax);
        }
        let settings = Settings::default();
        let before = star_positions(&build_scene(&state, &settings, VIEW));

        state.camera.pos = Vec2::new(0.5, 5000.0);
        state.parallax.update(state.camera.pos, 10000.0);
        let after = star_positions(&build_scene(&state, &settings, VIEW));

        assert_eq!(before.len(), 30);
        assert_eq!(after.len(), before.len());
        for (a, b) in before.iter().zip(&after) {
            // A 1-unit camera step never moves a star further than that
            assert!(a.distance(*b) <= 1.0 + 1e-3, "star jumped {}", a.distance(*b));
        }
    }

    #[test]
    fn test_intensity_color_endpoints() {
        assert_eq!(intensity_color(0.0, 1.0), [0.2, 0.4, 1.0, 1.0]);
        let fast = intensity_color(1.0, 0.5);
        assert!((fast[0] - 1.0).abs() < 1e-5 && fast[3] == 0.5);
        assert!(fast[2] < 0.3);
    }

    #[test]
    fn test_trail_point_life_drives_fade() {
        let point = TrailPoint { pos: Vec2::ZERO, life: 450.0, max_life: 900.0, intensity: 1.0 };
        assert_eq!(point.life_ratio() * point.intensity, 0.5);
    }
}
