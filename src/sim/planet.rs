//! Planet registry, proximity queries and per-pixel hit testing
//!
//! Planet art is irregular, so clicks are tested against the image alpha
//! channel. When no decoded image is available the planet falls back to a
//! circle of `radius`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{polar_to_cartesian, torus_delta, torus_distance, wrap_vec};

/// An orbitable planet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    /// Distance at which landing prompts and radar pulses activate
    pub interaction_radius: f32,
    pub rotation: f32,
    pub name: String,
    pub image_ref: String,
}

impl Planet {
    /// Distance from `point` to the planet centre, the short way around
    pub fn proximity(&self, point: Vec2, world_size: f32) -> f32 {
        torus_distance(self.pos, point, world_size)
    }

    /// Whether `point` lies within the interaction radius (inclusive)
    pub fn in_range(&self, point: Vec2, world_size: f32) -> bool {
        self.proximity(point, world_size) <= self.interaction_radius
    }

    /// Map a world point into normalized image coordinates (0-1 on both axes).
    ///
    /// The image is drawn as a `2 * radius` square centred on the planet and
    /// rotated by `rotation`; the rotation is undone before mapping.
    pub fn image_uv(&self, point: Vec2, world_size: f32) -> Vec2 {
        let offset = torus_delta(point, self.pos, world_size);
        let local = Vec2::from_angle(-self.rotation).rotate(offset);
        (local + Vec2::splat(self.radius)) / (2.0 * self.radius)
    }
}

/// Partial update from the layout editor; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanetPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub radius: Option<f32>,
    pub rotation: Option<f32>,
    pub interaction_radius: Option<f32>,
}

impl PlanetPatch {
    /// Fold a later patch into this one (later fields win)
    pub fn merge(&mut self, later: &PlanetPatch) {
        self.x = later.x.or(self.x);
        self.y = later.y.or(self.y);
        self.radius = later.radius.or(self.radius);
        self.rotation = later.rotation.or(self.rotation);
        self.interaction_radius = later.interaction_radius.or(self.interaction_radius);
    }

    pub fn is_empty(&self) -> bool {
        self == &PlanetPatch::default()
    }
}

/// Source of decoded image opacity, keyed by image reference
pub trait AlphaLookup {
    /// Alpha (0-255) at normalized `uv`, or `None` if the image is not available
    fn alpha_at(&self, image_ref: &str, uv: Vec2) -> Option<u8>;
}

/// No images loaded; every test falls back to the circle
pub struct NoImages;

impl AlphaLookup for NoImages {
    fn alpha_at(&self, _image_ref: &str, _uv: Vec2) -> Option<u8> {
        None
    }
}

/// Default planet names and art, placed on a ring around world centre
const DEFAULT_PLANETS: [(&str, &str, f32); 6] = [
    ("Aurelia", "planets/aurelia.png", 70.0),
    ("Cindra", "planets/cindra.png", 55.0),
    ("Verdant", "planets/verdant.png", 80.0),
    ("Glacius", "planets/glacius.png", 60.0),
    ("Umbra", "planets/umbra.png", 65.0),
    ("Solace", "planets/solace.png", 75.0),
];
const DEFAULT_RING_RADIUS: f32 = 1800.0;
const INTERACTION_MARGIN: f32 = 40.0;

/// The fixed set of planets, in stable id order
#[derive(Debug, Clone, Default)]
pub struct PlanetRegistry {
    planets: Vec<Planet>,
}

impl PlanetRegistry {
    pub fn new(mut planets: Vec<Planet>) -> Self {
        planets.sort_by_key(|p| p.id);
        Self { planets }
    }

    /// Six planets evenly spaced on a ring around the world centre
    pub fn default_ring(world_size: f32) -> Self {
        let center = Vec2::splat(world_size * 0.5);
        let count = DEFAULT_PLANETS.len();
        let planets = DEFAULT_PLANETS
            .iter()
            .enumerate()
            .map(|(i, &(name, image, radius))| {
                let theta = std::f32::consts::TAU * i as f32 / count as f32;
                Planet {
                    id: i as u32 + 1,
                    pos: wrap_vec(center + polar_to_cartesian(DEFAULT_RING_RADIUS, theta), world_size),
                    radius,
                    interaction_radius: radius + INTERACTION_MARGIN,
                    rotation: 0.0,
                    name: name.to_string(),
                    image_ref: image.to_string(),
                }
            })
            .collect();
        Self { planets }
    }

    pub fn len(&self) -> usize {
        self.planets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Planet> {
        self.planets.iter()
    }

    pub fn get(&self, id: u32) -> Option<&Planet> {
        self.planets.iter().find(|p| p.id == id)
    }

    /// Merge persisted layout records into the registry by id.
    ///
    /// Unknown ids are ignored so the planet set stays fixed.
    pub fn apply_records(&mut self, records: &[Planet], world_size: f32) {
        for record in records {
            let patch = PlanetPatch {
                x: Some(record.pos.x),
                y: Some(record.pos.y),
                radius: Some(record.radius),
                rotation: Some(record.rotation),
                interaction_radius: Some(record.interaction_radius),
            };
            if !self.update(record.id, &patch, world_size) {
                log::warn!("Ignoring saved layout for unknown planet {}", record.id);
            }
        }
    }

    /// Apply an editor patch immediately. Returns `false` for an unknown id.
    pub fn update(&mut self, id: u32, patch: &PlanetPatch, world_size: f32) -> bool {
        let Some(planet) = self.planets.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        let x = patch.x.unwrap_or(planet.pos.x);
        let y = patch.y.unwrap_or(planet.pos.y);
        planet.pos = wrap_vec(Vec2::new(x, y), world_size);
        if let Some(radius) = patch.radius {
            planet.radius = radius.max(1.0);
        }
        if let Some(rotation) = patch.rotation {
            planet.rotation = rotation;
        }
        if let Some(range) = patch.interaction_radius {
            planet.interaction_radius = range;
        }
        // Interaction radius never shrinks inside the visible disc
        planet.interaction_radius = planet.interaction_radius.max(planet.radius);
        true
    }

    /// Move a planet to a new world position
    pub fn move_to(&mut self, id: u32, pos: Vec2, world_size: f32) -> bool {
        let patch = PlanetPatch { x: Some(pos.x), y: Some(pos.y), ..Default::default() };
        self.update(id, &patch, world_size)
    }

    pub fn resize(&mut self, id: u32, radius: f32, world_size: f32) -> bool {
        let patch = PlanetPatch { radius: Some(radius), ..Default::default() };
        self.update(id, &patch, world_size)
    }

    pub fn rotate(&mut self, id: u32, rotation: f32, world_size: f32) -> bool {
        let patch = PlanetPatch { rotation: Some(rotation), ..Default::default() };
        self.update(id, &patch, world_size)
    }

    pub fn set_interaction_radius(&mut self, id: u32, range: f32, world_size: f32) -> bool {
        let patch = PlanetPatch { interaction_radius: Some(range), ..Default::default() };
        self.update(id, &patch, world_size)
    }

    /// Planets whose interaction radius contains `ship_pos`
    pub fn in_range<'a>(
        &'a self,
        ship_pos: Vec2,
        world_size: f32,
    ) -> impl Iterator<Item = &'a Planet> + 'a {
        self.planets
            .iter()
            .filter(move |p| p.in_range(ship_pos, world_size))
    }

    /// Closest in-range planet, if any
    pub fn nearest_in_range(&self, ship_pos: Vec2, world_size: f32) -> Option<&Planet> {
        self.in_range(ship_pos, world_size).min_by(|a, b| {
            a.proximity(ship_pos, world_size)
                .partial_cmp(&b.proximity(ship_pos, world_size))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Resolve a click: the first in-range planet whose visible pixels contain
    /// `point`. Planets out of range never register.
    pub fn pick(
        &self,
        point: Vec2,
        ship_pos: Vec2,
        world_size: f32,
        images: &dyn AlphaLookup,
        alpha_threshold: u8,
    ) -> Option<u32> {
        self.in_range(ship_pos, world_size)
            .find(|p| is_point_on_planet(p, point, world_size, images, alpha_threshold))
            .map(|p| p.id)
    }
}

/// Per-pixel hit test with a circle fallback when the image is unavailable
pub fn is_point_on_planet(
    planet: &Planet,
    point: Vec2,
    world_size: f32,
    images: &dyn AlphaLookup,
    alpha_threshold: u8,
) -> bool {
    let uv = planet.image_uv(point, world_size);
    let inside_square = (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y);
    if !inside_square {
        return false;
    }
    match images.alpha_at(&planet.image_ref, uv) {
        Some(alpha) => alpha > alpha_threshold,
        None => planet.proximity(point, world_size) <= planet.radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: f32 = 10000.0;

    fn planet_at(x: f32, y: f32) -> Planet {
        Planet {
            id: 1,
            pos: Vec2::new(x, y),
            radius: 50.0,
            interaction_radius: 90.0,
            rotation: 0.0,
            name: "Test".into(),
            image_ref: "test.png".into(),
        }
    }

    /// Opaque only in the left half of the image
    struct LeftHalf;

    impl AlphaLookup for LeftHalf {
        fn alpha_at(&self, _image_ref: &str, uv: Vec2) -> Option<u8> {
            Some(if uv.x < 0.5 { 255 } else { 0 })
        }
    }

    #[test]
    fn test_in_range_boundary_is_inclusive() {
        let planet = planet_at(5000.0, 5000.0);
        assert!(planet.in_range(Vec2::new(5089.0, 5000.0), WORLD));
        assert!(planet.in_range(Vec2::new(5090.0, 5000.0), WORLD));
        assert!(!planet.in_range(Vec2::new(5091.0, 5000.0), WORLD));
    }

    #[test]
    fn test_in_range_across_seam() {
        let planet = planet_at(30.0, 5000.0);
        assert!(planet.in_range(Vec2::new(9970.0, 5000.0), WORLD));
    }

    #[test]
    fn test_transparent_pixel_is_not_a_hit() {
        let planet = planet_at(5000.0, 5000.0);
        let images = LeftHalf;
        // Right of centre: inside the disc but transparent
        assert!(!is_point_on_planet(&planet, Vec2::new(5020.0, 5000.0), WORLD, &images, 50));
        // Left of centre: opaque
        assert!(is_point_on_planet(&planet, Vec2::new(4980.0, 5000.0), WORLD, &images, 50));
    }

    #[test]
    fn test_rotation_is_undone_before_sampling() {
        let mut planet = planet_at(5000.0, 5000.0);
        planet.rotation = std::f32::consts::PI;
        let images = LeftHalf;
        // Rotated half a turn, the opaque half now faces right
        assert!(is_point_on_planet(&planet, Vec2::new(5020.0, 5000.0), WORLD, &images, 50));
        assert!(!is_point_on_planet(&planet, Vec2::new(4980.0, 5000.0), WORLD, &images, 50));
    }

    #[test]
    fn test_circle_fallback_without_image() {
        let planet = planet_at(5000.0, 5000.0);
        assert!(is_point_on_planet(&planet, Vec2::new(5030.0, 5030.0), WORLD, &NoImages, 50));
        // Inside the bounding square but outside the circle
        assert!(!is_point_on_planet(&planet, Vec2::new(5045.0, 5045.0), WORLD, &NoImages, 50));
    }

    #[test]
    fn test_pick_requires_ship_in_range() {
        let registry = PlanetRegistry::new(vec![planet_at(5000.0, 5000.0)]);
        let click = Vec2::new(4990.0, 5000.0);
        let near = Vec2::new(5080.0, 5000.0);
        let far = Vec2::new(5200.0, 5000.0);
        assert_eq!(registry.pick(click, near, WORLD, &NoImages, 50), Some(1));
        assert_eq!(registry.pick(click, far, WORLD, &NoImages, 50), None);
    }

    #[test]
    fn test_update_clamps_interaction_radius() {
        let mut registry = PlanetRegistry::new(vec![planet_at(5000.0, 5000.0)]);
        assert!(registry.set_interaction_radius(1, 10.0, WORLD));
        assert_eq!(registry.get(1).unwrap().interaction_radius, 50.0);
        assert!(registry.move_to(1, Vec2::new(-20.0, 10020.0), WORLD));
        assert_eq!(registry.get(1).unwrap().pos, Vec2::new(9980.0, 20.0));
        assert!(!registry.resize(42, 10.0, WORLD));
    }

    #[test]
    fn test_patch_merge_later_wins() {
        let mut a = PlanetPatch { x: Some(1.0), radius: Some(5.0), ..Default::default() };
        let b = PlanetPatch { x: Some(2.0), rotation: Some(0.5), ..Default::default() };
        a.merge(&b);
        assert_eq!(a.x, Some(2.0));
        assert_eq!(a.radius, Some(5.0));
        assert_eq!(a.rotation, Some(0.5));
    }

    #[test]
    fn test_apply_records_ignores_unknown() {
        let mut registry = PlanetRegistry::default_ring(WORLD);
        let mut moved = registry.get(2).unwrap().clone();
        moved.pos = Vec2::new(100.0, 200.0);
        let mut stranger = moved.clone();
        stranger.id = 99;
        registry.apply_records(&[moved, stranger], WORLD);
        assert_eq!(registry.get(2).unwrap().pos, Vec2::new(100.0, 200.0));
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_nearest_in_range_prefers_closest_across_seam() {
        let mut near = planet_at(40.0, 5000.0);
        near.id = 2;
        let far = planet_at(9900.0, 5000.0);
        let registry = PlanetRegistry::new(vec![far, near]);
        // Ship at 9960: the far planet is 60 away, the near one 80 across the seam
        let ship = Vec2::new(9960.0, 5000.0);
        assert_eq!(registry.nearest_in_range(ship, WORLD).map(|p| p.id), Some(1));
        let ship = Vec2::new(10.0, 5000.0);
        assert_eq!(registry.nearest_in_range(ship, WORLD).map(|p| p.id), Some(2));
        assert!(registry.nearest_in_range(Vec2::new(5000.0, 5000.0), WORLD).is_none());
    }
}
