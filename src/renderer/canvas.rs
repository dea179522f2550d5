//! Canvas2D painter for a [`Scene`]

use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::scene::{DrawCmd, Rgba, Scene};

/// Star palette indexed by `Star::color_id`
const STAR_PALETTE: [&str; 5] = ["#ffffff", "#cfe0ff", "#fff4d6", "#ffd2a1", "#b9c8ff"];
/// Fallback planet colours, picked by id
const PLANET_PALETTE: [&str; 6] = ["#5b8def", "#e07a5f", "#81b29a", "#f2cc8f", "#9d7bd8", "#6cc4c4"];
const BACKGROUND: &str = "#05060d";
const SHIP_SIZE: f64 = 14.0;

fn css_rgba(c: Rgba) -> String {
    format!(
        "rgba({},{},{},{})",
        (c[0] * 255.0) as u8,
        (c[1] * 255.0) as u8,
        (c[2] * 255.0) as u8,
        c[3]
    )
}

pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
}

impl CanvasRenderer {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            ctx,
            images: HashMap::new(),
        })
    }

    /// Start loading a planet image for drawing (no-op if already known)
    pub fn load_image(&mut self, image_ref: &str) {
        if self.images.contains_key(image_ref) {
            return;
        }
        match HtmlImageElement::new() {
            Ok(img) => {
                img.set_src(image_ref);
                self.images.insert(image_ref.to_string(), img);
            }
            Err(e) => log::warn!("Could not create image element: {:?}", e),
        }
    }

    fn loaded_image(&self, image_ref: &str) -> Option<&HtmlImageElement> {
        self.images
            .get(image_ref)
            .filter(|img| img.complete() && img.natural_width() > 0)
    }

    /// Paint a full frame
    pub fn render(&self, scene: &Scene) {
        let ctx = &self.ctx;
        ctx.set_global_alpha(1.0);
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, scene.viewport.x as f64, scene.viewport.y as f64);

        for cmd in scene.iter() {
            // A failed canvas call only loses this primitive
            if let Err(e) = self.draw(cmd) {
                log::debug!("Draw failed: {:?}", e);
            }
        }
        ctx.set_global_alpha(1.0);
    }

    fn draw(&self, cmd: &DrawCmd) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        match cmd {
            DrawCmd::Star { pos, radius, color_id, alpha } => {
                ctx.set_global_alpha(*alpha as f64);
                ctx.set_fill_style_str(STAR_PALETTE[*color_id as usize % STAR_PALETTE.len()]);
                ctx.begin_path();
                ctx.arc(pos.x as f64, pos.y as f64, *radius as f64, 0.0, 2.0 * PI)?;
                ctx.fill();
            }
            DrawCmd::Planet { id, pos, radius, rotation, image_ref } => {
                ctx.set_global_alpha(1.0);
                let r = *radius as f64;
                if let Some(img) = self.loaded_image(image_ref) {
                    ctx.save();
                    ctx.translate(pos.x as f64, pos.y as f64)?;
                    ctx.rotate(*rotation as f64)?;
                    let drawn = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                        img,
                        -r,
                        -r,
                        2.0 * r,
                        2.0 * r,
                    );
                    ctx.restore();
                    drawn?;
                } else {
                    ctx.set_fill_style_str(PLANET_PALETTE[*id as usize % PLANET_PALETTE.len()]);
                    ctx.begin_path();
                    ctx.arc(pos.x as f64, pos.y as f64, r, 0.0, 2.0 * PI)?;
                    ctx.fill();
                }
            }
            DrawCmd::RangeRing { pos, radius } => {
                ctx.set_global_alpha(0.35);
                ctx.set_stroke_style_str("#8fd3ff");
                ctx.set_line_width(1.5);
                ctx.begin_path();
                ctx.arc(pos.x as f64, pos.y as f64, *radius as f64, 0.0, 2.0 * PI)?;
                ctx.stroke();
            }
            DrawCmd::Projectile { pos, radius, alpha } => {
                ctx.set_global_alpha(*alpha as f64);
                ctx.set_fill_style_str("#ffe27a");
                ctx.begin_path();
                ctx.arc(pos.x as f64, pos.y as f64, *radius as f64, 0.0, 2.0 * PI)?;
                ctx.fill();
            }
            DrawCmd::TrailSegment { from, to, width, color } => {
                ctx.set_global_alpha(1.0);
                ctx.set_stroke_style_str(&css_rgba(*color));
                ctx.set_line_width(*width as f64);
                ctx.set_line_cap("round");
                ctx.begin_path();
                ctx.move_to(from.x as f64, from.y as f64);
                ctx.line_to(to.x as f64, to.y as f64);
                ctx.stroke();
            }
            DrawCmd::RadarArc { center, radius, bearing, spread, alpha } => {
                let half = (*spread as f64) * 0.5;
                let b = *bearing as f64;
                ctx.set_global_alpha(*alpha as f64);
                ctx.set_stroke_style_str("#6cf0c2");
                ctx.set_line_width(2.0);
                ctx.begin_path();
                ctx.arc(center.x as f64, center.y as f64, *radius as f64, b - half, b + half)?;
                ctx.stroke();
            }
            DrawCmd::Ship { pos, angle, scale } => {
                let s = SHIP_SIZE * *scale as f64;
                ctx.set_global_alpha(1.0);
                ctx.save();
                ctx.translate(pos.x as f64, pos.y as f64)?;
                ctx.rotate(*angle as f64)?;
                ctx.set_fill_style_str("#e8eefc");
                ctx.begin_path();
                ctx.move_to(s, 0.0);
                ctx.line_to(-0.7 * s, 0.6 * s);
                ctx.line_to(-0.4 * s, 0.0);
                ctx.line_to(-0.7 * s, -0.6 * s);
                ctx.close_path();
                ctx.fill();
                ctx.restore();
            }
        }
        Ok(())
    }
}
