use std::path::Path;

use ::image::imageops::{self, FilterType};
use resvg::tiny_skia;

use crate::assets::image;
use crate::foundation::core::Canvas;
use crate::render::composite;

/// Logo width as a fraction of output width.
const LOGO_WIDTH_FRACTION: f64 = 0.15;

/// Fixed margin from the bottom-right corner, in pixels.
const MARGIN_PX: f64 = 20.0;

/// A prepared always-on-top logo overlay.
pub struct Watermark {
    pixmap: tiny_skia::Pixmap,
    x: f64,
    y: f64,
    opacity: f32,
}

impl Watermark {
    /// Load and place a logo for the given canvas.
    ///
    /// Returns `None` (with a warning) on any failure: a missing or corrupt
    /// logo must never abort a render.
    pub fn prepare(logo_path: &Path, canvas: Canvas, opacity: f32) -> Option<Self> {
        let decoded = match image::decode_oriented(logo_path) {
            Ok(img) => img,
            Err(e) => {
                tracing::warn!(path = %logo_path.display(), "skipping watermark: {e}");
                return None;
            }
        };

        let (w, h) = decoded.dimensions();
        if w == 0 || h == 0 {
            tracing::warn!(path = %logo_path.display(), "skipping watermark: empty logo");
            return None;
        }

        let target_w = ((f64::from(canvas.width) * LOGO_WIDTH_FRACTION).round() as u32).max(1);
        let target_h = ((f64::from(h) * f64::from(target_w) / f64::from(w)).round() as u32).max(1);
        let scaled = imageops::resize(&decoded, target_w, target_h, FilterType::Lanczos3);

        let pixmap = match image::rgba_image_to_pixmap(&scaled) {
            Ok(pm) => pm,
            Err(e) => {
                tracing::warn!(path = %logo_path.display(), "skipping watermark: {e}");
                return None;
            }
        };

        Some(Self {
            x: f64::from(canvas.width) - f64::from(target_w) - MARGIN_PX,
            y: f64::from(canvas.height) - f64::from(target_h) - MARGIN_PX,
            pixmap,
            opacity: opacity.clamp(0.0, 1.0),
        })
    }

    /// Composite the logo as the topmost layer of `frame`.
    pub fn apply(&self, frame: &mut tiny_skia::Pixmap) {
        composite::draw_layer(frame, &self.pixmap, 1.0, self.x, self.y, self.opacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_logo(w: u32, h: u32) -> PathBuf {
        let dir = PathBuf::from("target").join("watermark_fixtures");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("logo_{w}x{h}.png"));
        ::image::RgbaImage::from_pixel(w, h, ::image::Rgba([0, 0, 255, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn missing_logo_degrades_to_none() {
        assert!(Watermark::prepare(Path::new("nope/logo.png"), Canvas::SQUARE, 0.3).is_none());
    }

    #[test]
    fn logo_is_scaled_to_15_percent_of_width() {
        let wm = Watermark::prepare(&fixture_logo(100, 50), Canvas::PORTRAIT, 0.3).unwrap();
        assert_eq!(wm.pixmap.width(), 162); // 1080 * 0.15
        assert_eq!(wm.pixmap.height(), 81); // aspect preserved
    }

    #[test]
    fn logo_is_anchored_bottom_right_with_margin() {
        let wm = Watermark::prepare(&fixture_logo(100, 100), Canvas::SQUARE, 0.3).unwrap();
        assert_eq!(wm.x, 1080.0 - 162.0 - 20.0);
        assert_eq!(wm.y, 1080.0 - 162.0 - 20.0);
    }

    #[test]
    fn apply_blends_with_configured_opacity() {
        let canvas = Canvas {
            width: 100,
            height: 100,
        };
        let wm = Watermark::prepare(&fixture_logo(100, 100), canvas, 0.5).unwrap();
        let mut frame = composite::black_canvas(canvas).unwrap();
        wm.apply(&mut frame);
        // Logo is 15px wide at (65, 65); sample inside it.
        let x = 70u32;
        let y = 70u32;
        let i = ((y * frame.width() + x) * 4) as usize;
        let px = &frame.data()[i..i + 4];
        assert!(px[2] > 100 && px[2] < 160, "expected ~128 blue, got {px:?}");
        assert_eq!(px[3], 255);
    }
}
