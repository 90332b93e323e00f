use image::RgbaImage;
use image::imageops::{self, FilterType};
use resvg::tiny_skia;

use crate::assets::image::rgba_image_to_pixmap;
use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};

/// Aspect-ratio difference below which the source is treated as matching
/// the canvas and fill-and-crop is used instead of a backdrop.
const NEAR_MATCH_EPSILON: f64 = 0.05;

/// Channel multiplier applied to the backdrop fill. A darken stands in for a
/// real blur here; there is no Gaussian pass.
const BACKDROP_DARKEN: f32 = 0.4;

/// Turn an arbitrary-aspect source image into an exactly canvas-sized,
/// premultiplied base layer.
///
/// Near-matching aspect: scale to cover, center-crop the overflow.
/// Mismatched aspect: letterbox the source centered over a darkened,
/// over-scaled copy of itself, so no black bands show through.
pub fn normalize(img: &RgbaImage, canvas: Canvas) -> ReelResult<tiny_skia::Pixmap> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(ReelError::render("source image has zero dimensions"));
    }

    let r = f64::from(w) / f64::from(h);
    let target = canvas.aspect();

    if (r - target).abs() < NEAR_MATCH_EPSILON {
        let covered = scale_to_cover(img, canvas.width, canvas.height);
        return rgba_image_to_pixmap(&covered);
    }

    // Fit the foreground entirely inside the canvas.
    let (fg_w, fg_h) = if r > target {
        (
            canvas.width,
            ((f64::from(canvas.width) / r).round() as u32).max(1),
        )
    } else {
        (
            ((f64::from(canvas.height) * r).round() as u32).max(1),
            canvas.height,
        )
    };
    let foreground = imageops::resize(img, fg_w, fg_h, FilterType::Lanczos3);

    // Backdrop: over-scale the same image and center-crop to the canvas.
    // Height-matched for landscape mismatches, width*2 for portrait ones;
    // extremely narrow sources get bumped so the crop always covers.
    let bg_h = if r > target {
        canvas.height
    } else {
        canvas.width * 2
    };
    let bg_w = ((f64::from(bg_h) * r).round() as u32).max(1);
    let bump = (f64::from(canvas.width) / f64::from(bg_w))
        .max(f64::from(canvas.height) / f64::from(bg_h))
        .max(1.0);
    let bg_w = ((f64::from(bg_w) * bump).ceil() as u32).max(canvas.width);
    let bg_h = ((f64::from(bg_h) * bump).ceil() as u32).max(canvas.height);

    let mut backdrop = imageops::resize(img, bg_w, bg_h, FilterType::Lanczos3);
    let backdrop = center_crop(&mut backdrop, canvas.width, canvas.height);
    let mut backdrop = darken(backdrop, BACKDROP_DARKEN);

    imageops::overlay(
        &mut backdrop,
        &foreground,
        (i64::from(canvas.width) - i64::from(fg_w)) / 2,
        (i64::from(canvas.height) - i64::from(fg_h)) / 2,
    );

    rgba_image_to_pixmap(&backdrop)
}

fn scale_to_cover(img: &RgbaImage, target_w: u32, target_h: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let scale = (f64::from(target_w) / f64::from(w)).max(f64::from(target_h) / f64::from(h));
    let scaled_w = ((f64::from(w) * scale).round() as u32).max(target_w);
    let scaled_h = ((f64::from(h) * scale).round() as u32).max(target_h);
    let mut scaled = imageops::resize(img, scaled_w, scaled_h, FilterType::Lanczos3);
    center_crop(&mut scaled, target_w, target_h)
}

fn center_crop(img: &mut RgbaImage, target_w: u32, target_h: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let x = (w.saturating_sub(target_w)) / 2;
    let y = (h.saturating_sub(target_h)) / 2;
    imageops::crop(img, x, y, target_w, target_h).to_image()
}

fn darken(mut img: RgbaImage, factor: f32) -> RgbaImage {
    for px in img.pixels_mut() {
        for c in px.0.iter_mut().take(3) {
            *c = (f32::from(*c) * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
    img
}
