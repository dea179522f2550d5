//! Radar pulses: expanding arcs pointing at in-range planets
//!
//! A pulse stores only which planet it belongs to. Its bearing is derived at
//! draw time from the live ship and planet positions.

use glam::Vec2;
use std::collections::HashMap;

use super::planet::PlanetRegistry;
use crate::torus_delta;
use crate::tuning::Tuning;

#[derive(Debug, Clone, PartialEq)]
pub struct RadarPulse {
    pub planet_id: u32,
    pub radius: f32,
    pub max_radius: f32,
    /// Frames
    pub life: f32,
    pub max_life: f32,
}

impl RadarPulse {
    pub fn life_ratio(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RadarPulses {
    pulses: Vec<RadarPulse>,
    /// Last emission time per planet id
    last_emit_ms: HashMap<u32, f64>,
}

impl RadarPulses {
    /// Emit new pulses for in-range planets, then expand and expire
    pub fn update(&mut self, ship_pos: Vec2, planets: &PlanetRegistry, now_ms: f64, tuning: &Tuning) {
        for planet in planets.in_range(ship_pos, tuning.world_size) {
            let due = self
                .last_emit_ms
                .get(&planet.id)
                .is_none_or(|&last| now_ms - last >= tuning.radar_interval_ms);
            if due {
                self.last_emit_ms.insert(planet.id, now_ms);
                self.pulses.push(RadarPulse {
                    planet_id: planet.id,
                    radius: tuning.radar_start_radius,
                    max_radius: tuning.radar_max_radius,
                    life: tuning.radar_life_frames,
                    max_life: tuning.radar_life_frames,
                });
                log::debug!("Radar pulse for planet {}", planet.id);
            }
        }

        for pulse in self.pulses.iter_mut() {
            pulse.radius += tuning.radar_expansion;
            pulse.life -= 1.0;
        }
        self.pulses
            .retain(|p| p.life > 0.0 && p.radius <= p.max_radius);
    }

    pub fn iter(&self) -> impl Iterator<Item = &RadarPulse> {
        self.pulses.iter()
    }

    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }
}

/// Bearing from the ship to the planet, the short way around the torus
#[inline]
pub fn bearing(ship_pos: Vec2, planet_pos: Vec2, world_size: f32) -> f32 {
    let d = torus_delta(planet_pos, ship_pos, world_size);
    d.y.atan2(d.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::planet::Planet;
    use std::f32::consts::PI;

    fn registry() -> PlanetRegistry {
        PlanetRegistry::new(vec![Planet {
            id: 4,
            pos: Vec2::new(5000.0, 5000.0),
            radius: 50.0,
            interaction_radius: 90.0,
            rotation: 0.0,
            name: "Test".into(),
            image_ref: "test.png".into(),
        }])
    }

    #[test]
    fn test_emits_at_most_once_per_interval() {
        let tuning = Tuning::default();
        let planets = registry();
        let mut radar = RadarPulses::default();
        let ship = Vec2::new(5050.0, 5000.0);
        for frame in 0..60 {
            radar.update(ship, &planets, frame as f64 * 16.0, &tuning);
        }
        assert_eq!(radar.len(), 1);
        radar.update(ship, &planets, 1200.0, &tuning);
        assert_eq!(radar.len(), 2);
    }

    #[test]
    fn test_out_of_range_emits_nothing() {
        let tuning = Tuning::default();
        let mut radar = RadarPulses::default();
        radar.update(Vec2::new(5200.0, 5000.0), &registry(), 0.0, &tuning);
        assert!(radar.is_empty());
    }

    #[test]
    fn test_pulse_expires_at_max_radius() {
        let tuning = Tuning::default();
        let planets = registry();
        let mut radar = RadarPulses::default();
        radar.update(Vec2::new(5050.0, 5000.0), &planets, 0.0, &tuning);
        // Leave range so no new pulses appear
        let far = Vec2::new(100.0, 100.0);
        for frame in 1..200 {
            radar.update(far, &planets, frame as f64 * 16.0, &tuning);
        }
        assert!(radar.is_empty());
    }

    #[test]
    fn test_bearing_flips_across_wrap() {
        let planet = Vec2::new(10.0, 5000.0);
        // Ship just left of the seam: planet is to the right
        let before = bearing(Vec2::new(9980.0, 5000.0), planet, 10000.0);
        // Ship moved past the planet: planet is now to the left
        let after = bearing(Vec2::new(40.0, 5000.0), planet, 10000.0);
        assert!(before.abs() < 1e-4);
        assert!((after.abs() - PI).abs() < 1e-4);
        assert!(((after - before).abs() - PI).abs() < 1e-4);
    }
}
