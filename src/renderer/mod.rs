//! Rendering module
//!
//! Scene building is platform independent; painting targets a Canvas2D
//! context on the web.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;
pub use scene::{DrawCmd, Projection, Scene, build_scene};
