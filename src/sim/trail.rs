//! Ship trail: a bounded, fading ribbon of recent positions

use glam::Vec2;
use std::collections::VecDeque;

use crate::tuning::Tuning;

/// Trail point for ship rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub pos: Vec2,
    /// Milliseconds
    pub life: f32,
    pub max_life: f32,
    /// Speed at the time of recording, as a 0-1 fraction of max speed
    pub intensity: f32,
}

impl TrailPoint {
    pub fn life_ratio(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Trail history (oldest first)
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
    last_append_ms: Option<f64>,
}

impl Trail {
    /// Decay existing points and record `pos` if spacing and speed allow.
    ///
    /// `speed` is the drawn ship's speed this frame in units per frame.
    pub fn update(&mut self, pos: Vec2, speed: f32, now_ms: f64, dt_ms: f32, tuning: &Tuning) {
        for point in self.points.iter_mut() {
            point.life -= dt_ms;
        }
        self.points.retain(|p| p.life > 0.0);

        let spaced = self
            .last_append_ms
            .is_none_or(|last| now_ms - last >= tuning.trail_spacing_ms);
        if spaced && speed > tuning.trail_min_speed {
            self.points.push_back(TrailPoint {
                pos,
                life: tuning.trail_life_ms,
                max_life: tuning.trail_life_ms,
                intensity: (speed / tuning.ship_max_speed).min(1.0),
            });
            self.last_append_ms = Some(now_ms);
        }

        while self.points.len() > tuning.trail_max_points {
            self.points.pop_front();
        }
    }

    /// Clear trail (on restore/teleport)
    pub fn clear(&mut self) {
        self.points.clear();
        self.last_append_ms = None;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }
}
