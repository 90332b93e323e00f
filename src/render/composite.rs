use resvg::tiny_skia;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u8;

/// Allocate an opaque black canvas-sized pixmap.
pub fn black_canvas(canvas: Canvas) -> ReelResult<tiny_skia::Pixmap> {
    let mut pm = tiny_skia::Pixmap::new(canvas.width, canvas.height)
        .ok_or_else(|| ReelError::render("failed to allocate frame pixmap"))?;
    pm.fill(tiny_skia::Color::BLACK);
    Ok(pm)
}

/// Draw `src` over `dst` with a uniform scale, top-left placement and
/// opacity. Bilinear filtering keeps animated scaling smooth.
pub fn draw_layer(
    dst: &mut tiny_skia::Pixmap,
    src: &tiny_skia::Pixmap,
    scale: f64,
    x: f64,
    y: f64,
    opacity: f32,
) {
    if opacity <= 0.0 {
        return;
    }
    let paint = tiny_skia::PixmapPaint {
        opacity: opacity.clamp(0.0, 1.0),
        blend_mode: tiny_skia::BlendMode::SourceOver,
        quality: tiny_skia::FilterQuality::Bilinear,
    };
    let transform =
        tiny_skia::Transform::from_scale(scale as f32, scale as f32).post_translate(x as f32, y as f32);
    dst.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
}

/// Multiply color channels toward black, leaving alpha untouched. Used for
/// the global end-of-video fade.
pub fn fade_to_black(frame: &mut tiny_skia::Pixmap, factor: f32) {
    let factor = factor.clamp(0.0, 1.0);
    if factor >= 1.0 {
        return;
    }
    let f = (factor * 255.0).round() as u16;
    for px in frame.data_mut().chunks_exact_mut(4) {
        for c in px.iter_mut().take(3) {
            *c = mul_div255_u8(u16::from(*c), f);
        }
    }
}
