//! Camera follow with exponential smoothing across the wrap seam

use glam::Vec2;

use super::state::Camera;
use crate::{torus_delta, wrap_vec};

/// Move the camera a fraction `gain` of the shortest way toward `target`
pub fn follow(camera: &mut Camera, target: Vec2, gain: f32, world_size: f32) {
    let delta = torus_delta(target, camera.pos, world_size);
    camera.pos = wrap_vec(camera.pos + delta * gain, world_size);
}

/// Per-layer cameras for the parallax star field.
///
/// Each layer accumulates the real camera's short-way motion scaled by its
/// factor, so a seam crossing moves a layer by a fraction of the step.
#[derive(Debug, Clone, Default)]
pub struct ParallaxCameras {
    /// (parallax factor, layer camera position)
    layers: Vec<(f32, Vec2)>,
    last_camera: Vec2,
}

impl ParallaxCameras {
    pub fn new(factors: impl IntoIterator<Item = f32>, camera: Vec2, world_size: f32) -> Self {
        let mut cameras = Self {
            layers: factors.into_iter().map(|f| (f, Vec2::ZERO)).collect(),
            last_camera: camera,
        };
        cameras.reset(camera, world_size);
        cameras
    }

    /// Re-anchor every layer to `camera` (restore, teleport)
    pub fn reset(&mut self, camera: Vec2, world_size: f32) {
        for (factor, pos) in self.layers.iter_mut() {
            *pos = wrap_vec(camera * *factor, world_size);
        }
        self.last_camera = camera;
    }

    /// Follow the real camera's movement since the last update
    pub fn update(&mut self, camera: Vec2, world_size: f32) {
        let moved = torus_delta(camera, self.last_camera, world_size);
        for (factor, pos) in self.layers.iter_mut() {
            *pos = wrap_vec(*pos + moved * *factor, world_size);
        }
        self.last_camera = camera;
    }

    /// Camera position for stars drawn at `parallax` depth
    pub fn camera_for(&self, parallax: f32) -> Vec2 {
        self.layers
            .iter()
            .find(|(factor, _)| (factor - parallax).abs() < 1e-4)
            .map(|&(_, pos)| pos)
            .unwrap_or(self.last_camera * parallax)
    }
}
