//! Planet image cache with decoded alpha masks
//!
//! Images load asynchronously; until a slot is `Ready` the renderer draws a
//! flat disc and hit testing falls back to the circle test.

use glam::Vec2;
use std::collections::HashMap;

use crate::sim::AlphaLookup;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
}

/// Alpha channel of a decoded image
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl AlphaMask {
    /// Decode PNG bytes and keep only the alpha channel
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        Self::from_rgba(&rgba)
    }

    pub fn from_rgba(rgba: &image::RgbaImage) -> Result<Self, ImageError> {
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::Empty);
        }
        let alpha = rgba.pixels().map(|p| p.0[3]).collect();
        Ok(Self { width, height, alpha })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Alpha at normalized coordinates; `None` outside `[0, 1]`
    pub fn sample(&self, uv: Vec2) -> Option<u8> {
        if !(0.0..=1.0).contains(&uv.x) || !(0.0..=1.0).contains(&uv.y) {
            return None;
        }
        let x = ((uv.x * self.width as f32) as u32).min(self.width - 1);
        let y = ((uv.y * self.height as f32) as u32).min(self.height - 1);
        self.alpha.get((y * self.width + x) as usize).copied()
    }
}

#[derive(Debug, Clone)]
pub enum ImageSlot {
    Pending,
    Ready(AlphaMask),
    Failed,
}

/// Image slots keyed by image reference
#[derive(Debug, Default)]
pub struct ImageCache {
    slots: HashMap<String, ImageSlot>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an image as requested. Returns `true` if a load should start.
    pub fn request(&mut self, image_ref: &str) -> bool {
        if self.slots.contains_key(image_ref) {
            return false;
        }
        self.slots.insert(image_ref.to_string(), ImageSlot::Pending);
        true
    }

    /// Store the outcome of a load
    pub fn resolve(&mut self, image_ref: &str, result: Result<AlphaMask, ImageError>) {
        let slot = match result {
            Ok(mask) => {
                log::info!("Image ready: {} ({:?})", image_ref, mask.dimensions());
                ImageSlot::Ready(mask)
            }
            Err(err) => {
                log::warn!("Image unavailable, using fallback: {} ({})", image_ref, err);
                ImageSlot::Failed
            }
        };
        self.slots.insert(image_ref.to_string(), slot);
    }

    pub fn is_ready(&self, image_ref: &str) -> bool {
        matches!(self.slots.get(image_ref), Some(ImageSlot::Ready(_)))
    }

    pub fn slot(&self, image_ref: &str) -> Option<&ImageSlot> {
        self.slots.get(image_ref)
    }
}

impl AlphaLookup for ImageCache {
    fn alpha_at(&self, image_ref: &str, uv: Vec2) -> Option<u8> {
        match self.slots.get(image_ref) {
            Some(ImageSlot::Ready(mask)) => mask.sample(uv),
            _ => None,
        }
    }
}

/// Fetch and decode an image (wasm only)
#[cfg(target_arch = "wasm32")]
pub async fn fetch_alpha_mask(url: &str) -> Result<AlphaMask, ImageError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fetch_error = |reason: String| ImageError::Fetch { url: url.to_string(), reason };
    let window = web_sys::window().ok_or_else(|| fetch_error("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| fetch_error(format!("{:?}", e)))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| fetch_error("not a Response".into()))?;
    if !response.ok() {
        return Err(fetch_error(format!("HTTP {}", response.status())));
    }
    let buffer = response
        .array_buffer()
        .map_err(|e| fetch_error(format!("{:?}", e)))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|e| fetch_error(format!("{:?}", e)))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    AlphaMask::decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    /// 4x4 image, opaque only in the top-left quadrant
    fn quadrant_image() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |x, y| {
            let a = if x < 2 && y < 2 { 255 } else { 0 };
            Rgba([200, 100, 50, a])
        })
    }

    #[test]
    fn test_sample_maps_uv_to_pixels() {
        let mask = AlphaMask::from_rgba(&quadrant_image()).unwrap();
        assert_eq!(mask.sample(Vec2::new(0.1, 0.1)), Some(255));
        assert_eq!(mask.sample(Vec2::new(0.9, 0.1)), Some(0));
        // Edge of the image clamps to the last pixel
        assert_eq!(mask.sample(Vec2::new(1.0, 1.0)), Some(0));
        assert_eq!(mask.sample(Vec2::new(1.5, 0.5)), None);
    }

    #[test]
    fn test_decode_png_bytes() {
        let mut bytes = Vec::new();
        quadrant_image()
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let mask = AlphaMask::decode(&bytes).unwrap();
        assert_eq!(mask.dimensions(), (4, 4));
        assert!(AlphaMask::decode(b"not a png").is_err());
    }

    #[test]
    fn test_cache_slots_drive_lookup() {
        let mut cache = ImageCache::new();
        assert!(cache.request("a.png"));
        assert!(!cache.request("a.png"));
        assert_eq!(cache.alpha_at("a.png", Vec2::splat(0.1)), None);

        let mask = AlphaMask::from_rgba(&quadrant_image()).unwrap();
        cache.resolve("a.png", Ok(mask));
        assert!(cache.is_ready("a.png"));
        assert_eq!(cache.alpha_at("a.png", Vec2::splat(0.1)), Some(255));

        cache.resolve("b.png", Err(ImageError::Empty));
        assert!(matches!(cache.slot("b.png"), Some(ImageSlot::Failed)));
        assert_eq!(cache.alpha_at("b.png", Vec2::splat(0.1)), None);
    }

    #[test]
    fn test_transparent_pixel_rejects_click_inside_disc() {
        use crate::sim::{Planet, is_point_on_planet};

        let mut cache = ImageCache::new();
        cache.resolve("p.png", AlphaMask::from_rgba(&quadrant_image()));
        let planet = Planet {
            id: 1,
            pos: Vec2::new(500.0, 500.0),
            radius: 40.0,
            interaction_radius: 90.0,
            rotation: 0.0,
            name: "Quad".into(),
            image_ref: "p.png".into(),
        };
        // Bottom-right of centre: within the disc, transparent pixel
        assert!(!is_point_on_planet(&planet, Vec2::new(510.0, 510.0), 10000.0, &cache, 50));
        // Top-left of centre: opaque pixel
        assert!(is_point_on_planet(&planet, Vec2::new(490.0, 490.0), 10000.0, &cache, 50));
    }
}
