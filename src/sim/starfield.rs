//! Layered parallax star field with gentle drift
//!
//! Generated once from a seed; stars are never added or removed. Each frame
//! recomputes the drifted position from the fixed anchor.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::wrap_vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarClass {
    Normal,
    Bright,
    Giant,
}

/// Depth layers: (parallax factor, share of the population)
const LAYERS: [(f32, f32); 3] = [(0.3, 0.5), (0.6, 0.35), (0.9, 0.15)];
/// Number of entries in the renderer's star palette
pub const STAR_COLORS: u8 = 5;
/// Drift angular speed (radians per second)
const DRIFT_SPEED: f32 = 0.15;

#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// Fixed anchor
    pub base: Vec2,
    /// Drifted position, recomputed every frame
    pub pos: Vec2,
    pub size: f32,
    pub opacity: f32,
    pub parallax: f32,
    pub color_id: u8,
    pub class: StarClass,
    pub twinkle_phase: f32,
    pub float_amplitude: Vec2,
    pub float_phase: Vec2,
}

/// Generate `count` stars spread over the whole world
pub fn generate_stars(seed: u64, count: usize, world_size: f32) -> Vec<Star> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut stars = Vec::with_capacity(count);

    for (layer, &(parallax, share)) in LAYERS.iter().enumerate() {
        let layer_count = if layer == LAYERS.len() - 1 {
            count - stars.len()
        } else {
            ((count as f32) * share).round() as usize
        };
        let layer_count = layer_count.min(count - stars.len());

        for _ in 0..layer_count {
            let roll: f32 = rng.random();
            let class = if roll < 0.03 {
                StarClass::Giant
            } else if roll < 0.15 {
                StarClass::Bright
            } else {
                StarClass::Normal
            };
            let (size, opacity) = match class {
                StarClass::Normal => (rng.random_range(0.5..1.5), rng.random_range(0.3..0.7)),
                StarClass::Bright => (rng.random_range(1.5..2.5), rng.random_range(0.6..0.9)),
                StarClass::Giant => (rng.random_range(2.5..4.0), rng.random_range(0.8..1.0)),
            };
            let base = Vec2::new(
                rng.random_range(0.0..world_size),
                rng.random_range(0.0..world_size),
            );
            stars.push(Star {
                base,
                pos: base,
                // Nearer layers draw slightly larger
                size: size * (0.7 + parallax * 0.5),
                opacity,
                parallax,
                color_id: rng.random_range(0..STAR_COLORS),
                class,
                twinkle_phase: rng.random_range(0.0..std::f32::consts::TAU),
                float_amplitude: Vec2::new(rng.random_range(2.0..12.0), rng.random_range(2.0..12.0)),
                float_phase: Vec2::new(
                    rng.random_range(0.0..std::f32::consts::TAU),
                    rng.random_range(0.0..std::f32::consts::TAU),
                ),
            });
        }
    }

    log::info!("Star field generated: {} stars in {} layers", stars.len(), LAYERS.len());
    stars
}

/// Parallax factors of the generated layers, nearest last
pub fn layer_factors() -> impl Iterator<Item = f32> {
    LAYERS.iter().map(|&(parallax, _)| parallax)
}

/// Recompute drifted positions at `time` seconds
pub fn update_stars(stars: &mut [Star], time: f32, world_size: f32) {
    let t = time * DRIFT_SPEED;
    for star in stars.iter_mut() {
        let drift = Vec2::new(
            star.float_amplitude.x * (t + star.float_phase.x).sin(),
            star.float_amplitude.y * (t + star.float_phase.y).cos(),
        );
        star.pos = wrap_vec(star.base + drift, world_size);
    }
}

/// Twinkle brightness multiplier in `[0.6, 1.0]`
pub fn twinkle(star: &Star, time: f32) -> f32 {
    let speed = match star.class {
        StarClass::Normal => 1.2,
        StarClass::Bright => 2.0,
        StarClass::Giant => 0.8,
    };
    0.8 + 0.2 * (time * speed + star.twinkle_phase).sin()
}
