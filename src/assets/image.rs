use std::path::Path;

use image::{DynamicImage, ImageDecoder, RgbaImage};
use resvg::tiny_skia;

use crate::foundation::error::{ReelError, ReelResult};

/// Decode a still image, honoring embedded EXIF orientation.
///
/// Phone photos routinely store sideways pixels plus a rotation tag; the
/// normalizer needs the upright pixel data.
pub fn decode_oriented(path: &Path) -> ReelResult<RgbaImage> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| ReelError::asset(format!("failed to open image '{}': {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| ReelError::asset(format!("failed to probe image '{}': {e}", path.display())))?;

    let mut decoder = reader.into_decoder().map_err(|e| {
        ReelError::asset(format!("failed to decode image '{}': {e}", path.display()))
    })?;
    let orientation = decoder
        .orientation()
        .unwrap_or(image::metadata::Orientation::NoTransforms);

    let mut img = DynamicImage::from_decoder(decoder).map_err(|e| {
        ReelError::asset(format!("failed to decode image '{}': {e}", path.display()))
    })?;
    img.apply_orientation(orientation);

    Ok(img.into_rgba8())
}

/// Convert straight-alpha RGBA8 pixels into a premultiplied pixmap.
pub fn rgba_image_to_pixmap(img: &RgbaImage) -> ReelResult<tiny_skia::Pixmap> {
    let (w, h) = img.dimensions();
    let size = tiny_skia::IntSize::from_wh(w, h)
        .ok_or_else(|| ReelError::render("image has zero width or height"))?;

    let mut data = img.as_raw().clone();
    premultiply_rgba8_in_place(&mut data);

    tiny_skia::Pixmap::from_vec(data, size)
        .ok_or_else(|| ReelError::render("failed to build pixmap from image data"))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        for c in px.iter_mut().take(3) {
            *c = crate::foundation::math::mul_div255_u8(u16::from(*c), a);
        }
    }
}
