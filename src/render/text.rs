use std::sync::Arc;

use resvg::tiny_skia;

use crate::assets::color;
use crate::assets::font::ResolvedFont;
use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};

/// Base caption size in px at 1080 output width; scaled by `width / 1080`.
const BASE_FONT_SIZE: f64 = 70.0;

/// Padding around the measured text box when a background plate is drawn.
const PLATE_PADDING: f64 = 20.0;

/// Outline thickness. SVG strokes are centered on the glyph contour, so an
/// 8px stroke reads as a 4px outline around the fill.
const STROKE_WIDTH: f64 = 8.0;

/// Caption styling resolved from the working preset.
#[derive(Clone, Debug)]
pub struct CaptionStyle {
    /// Font resolved through the assets chain.
    pub font: ResolvedFont,
    /// Raw text color string; also feeds the stroke heuristic.
    pub color: String,
    /// Optional background plate color.
    pub bg_color: Option<String>,
}

/// A rasterized caption overlay anchored to the lower third.
#[derive(Debug)]
pub struct TextLayer {
    /// Premultiplied overlay, canvas width x 30% of canvas height.
    pub pixmap: tiny_skia::Pixmap,
    /// Top edge of the overlay in canvas coordinates.
    pub top: f64,
}

/// Rasterize a caption into a bottom-anchored overlay.
///
/// An empty (or whitespace-only) caption is a valid no-layer outcome, not an
/// error. A font that resolves but produces no glyphs degrades the same way
/// with a warning rather than failing the render.
pub fn render_caption(
    caption: &str,
    style: &CaptionStyle,
    canvas: Canvas,
) -> ReelResult<Option<TextLayer>> {
    let caption = caption.trim();
    if caption.is_empty() {
        return Ok(None);
    }

    let scale = f64::from(canvas.width) / 1080.0;
    let font_size = BASE_FONT_SIZE * scale;
    let area_w = canvas.width;
    let area_h = ((f64::from(canvas.height) * 0.3).round() as u32).max(1);

    let (fontdb, family) = build_fontdb(&style.font);
    let opt = usvg::Options {
        fontdb,
        font_family: family.clone(),
        ..usvg::Options::default()
    };

    // First pass: lay the text out at the origin to measure its tight
    // bounding box, the same way the caption has always been centered.
    let probe_svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{area_w}" height="{area_h}"><text x="0" y="{font_size}" font-family="{family}" font-size="{font_size}">{text}</text></svg>"#,
        text = xml_escape(caption),
    );
    let probe = usvg::Tree::from_str(&probe_svg, &opt)
        .map_err(|e| ReelError::render(format!("caption measurement failed: {e}")))?;
    let Some(bbox) = find_text_bbox(probe.root()) else {
        tracing::warn!(caption, "caption produced no glyphs, skipping text layer");
        return Ok(None);
    };

    let text_w = f64::from(bbox.width());
    let text_h = f64::from(bbox.height());
    let x = (f64::from(area_w) - text_w) / 2.0;
    let y = (f64::from(area_h) - text_h) / 2.0;

    // Shift the measured baseline so the tight box lands at (x, y).
    let anchor_x = x - f64::from(bbox.x());
    let baseline_y = font_size + (y - f64::from(bbox.y()));

    let fill = color::parse(&style.color)?;
    let stroke = color::stroke_for(&style.color);

    let plate = match &style.bg_color {
        Some(bg) => {
            let bg = color::parse(bg)?;
            format!(
                r#"<rect x="{rx}" y="{ry}" width="{rw}" height="{rh}" fill="{fill}"/>"#,
                rx = x - PLATE_PADDING,
                ry = y - PLATE_PADDING,
                rw = text_w + 2.0 * PLATE_PADDING,
                rh = text_h + 2.0 * PLATE_PADDING,
                fill = bg.to_svg(),
            )
        }
        None => String::new(),
    };

    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{area_w}" height="{area_h}">{plate}<text x="{anchor_x}" y="{baseline_y}" font-family="{family}" font-size="{font_size}" fill="{fill}" stroke="{stroke}" stroke-width="{STROKE_WIDTH}" stroke-linejoin="round" paint-order="stroke">{text}</text></svg>"#,
        fill = fill.to_svg(),
        stroke = stroke.to_svg(),
        text = xml_escape(caption),
    );
    let tree = usvg::Tree::from_str(&svg, &opt)
        .map_err(|e| ReelError::render(format!("caption rasterization failed: {e}")))?;

    let mut pixmap = tiny_skia::Pixmap::new(area_w, area_h)
        .ok_or_else(|| ReelError::render("failed to allocate caption pixmap"))?;
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    let bottom_margin = f64::from(canvas.height) * 0.15;
    let top = f64::from(canvas.height) - f64::from(area_h) - bottom_margin;

    Ok(Some(TextLayer { pixmap, top }))
}

/// Build the font database for caption layout: system fonts plus the
/// resolved preset font, which also becomes the requested family.
///
/// The terminal fallback must name a family that actually exists in the
/// database: fontdb's built-in generic defaults point at faces that are not
/// installed on many systems, and a family that resolves to zero faces would
/// lay out zero glyphs and drop the caption.
fn build_fontdb(font: &ResolvedFont) -> (Arc<usvg::fontdb::Database>, String) {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    let family = match font {
        ResolvedFont::File(path) => match db.load_font_file(path) {
            Ok(()) => db
                .faces()
                .find(|f| matches!(&f.source, usvg::fontdb::Source::File(p) if p == path))
                .and_then(|f| f.families.first().map(|(name, _)| name.clone())),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    "failed to load caption font, degrading to system default: {e}"
                );
                None
            }
        },
        ResolvedFont::SystemDefault => None,
    };

    let family = family.or_else(|| installed_family(&db));
    if let Some(name) = &family {
        db.set_sans_serif_family(name.clone());
    }

    (
        Arc::new(db),
        family.unwrap_or_else(|| "sans-serif".to_string()),
    )
}

/// First family present in the database, preferring one that calls itself
/// sans. `None` only on a system with no fonts at all.
fn installed_family(db: &usvg::fontdb::Database) -> Option<String> {
    let name_of = |f: &usvg::fontdb::FaceInfo| f.families.first().map(|(name, _)| name.clone());
    db.faces()
        .find(|f| {
            f.families
                .first()
                .is_some_and(|(name, _)| name.to_ascii_lowercase().contains("sans"))
        })
        .and_then(name_of)
        .or_else(|| db.faces().next().and_then(name_of))
}

fn find_text_bbox(group: &usvg::Group) -> Option<tiny_skia::Rect> {
    for child in group.children() {
        match child {
            usvg::Node::Text(t) => {
                let r = t.abs_bounding_box();
                if r.width() > 0.0 && r.height() > 0.0 {
                    return Some(r);
                }
            }
            usvg::Node::Group(g) => {
                if let Some(r) = find_text_bbox(g.as_ref()) {
                    return Some(r);
                }
            }
            usvg::Node::Path(_) | usvg::Node::Image(_) => {}
        }
    }
    None
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> CaptionStyle {
        CaptionStyle {
            font: ResolvedFont::SystemDefault,
            color: "#FFFFFF".to_string(),
            bg_color: None,
        }
    }

    fn have_fonts() -> bool {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        db.faces().next().is_some()
    }

    #[test]
    fn empty_caption_yields_no_layer() {
        let out = render_caption("", &style(), Canvas::PORTRAIT).unwrap();
        assert!(out.is_none());
        let out = render_caption("   ", &style(), Canvas::PORTRAIT).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn xml_escape_covers_markup_characters() {
        assert_eq!(xml_escape("a<b & \"c\"'"), "a&lt;b &amp; &quot;c&quot;&apos;");
        assert_eq!(xml_escape("SALE 50%"), "SALE 50%");
    }

    #[test]
    fn fallback_family_names_an_installed_face() {
        if !have_fonts() {
            eprintln!("skipping: no system fonts available");
            return;
        }
        let (db, family) = build_fontdb(&ResolvedFont::SystemDefault);
        assert!(
            db.faces()
                .any(|f| f.families.iter().any(|(name, _)| *name == family)),
            "'{family}' is not a family in the database"
        );
        // A caption laid out with the fallback must actually draw glyphs.
        let layer = render_caption("FALLBACK", &style(), Canvas::PORTRAIT)
            .unwrap()
            .expect("system-default font must still produce a text layer");
        assert!(layer.pixmap.data().iter().any(|&b| b != 0));
    }

    #[test]
    fn overlay_has_lower_third_geometry() {
        if !have_fonts() {
            eprintln!("skipping: no system fonts available");
            return;
        }
        let layer = render_caption("SALE 50%", &style(), Canvas::PORTRAIT)
            .unwrap()
            .expect("non-empty caption must produce a layer");
        assert_eq!(layer.pixmap.width(), 1080);
        assert_eq!(layer.pixmap.height(), 576); // 30% of 1920
        // Bottom margin is 15% of canvas height.
        assert_eq!(layer.top, 1920.0 - 576.0 - 288.0);
    }

    #[test]
    fn caption_is_horizontally_centered() {
        if !have_fonts() {
            eprintln!("skipping: no system fonts available");
            return;
        }
        let layer = render_caption("CENTERED", &style(), Canvas::PORTRAIT)
            .unwrap()
            .unwrap();
        let pm = &layer.pixmap;
        let (mut min_x, mut max_x) = (u32::MAX, 0u32);
        for y in 0..pm.height() {
            for x in 0..pm.width() {
                let a = pm.data()[((y * pm.width() + x) * 4 + 3) as usize];
                if a != 0 {
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                }
            }
        }
        assert!(min_x < max_x, "caption drew nothing");
        let left = f64::from(min_x);
        let right = f64::from(pm.width() - 1 - max_x);
        // The stroke is symmetric, so drawn-ink margins should match
        // closely (antialiasing can nudge one edge).
        assert!((left - right).abs() <= 2.0, "left={left} right={right}");
    }

    #[test]
    fn background_plate_is_drawn_under_text() {
        if !have_fonts() {
            eprintln!("skipping: no system fonts available");
            return;
        }
        let mut s = style();
        s.bg_color = Some("#FF0000".to_string());
        let layer = render_caption("SALE 50%", &s, Canvas::PORTRAIT)
            .unwrap()
            .unwrap();
        let pm = &layer.pixmap;
        // The plate extends 20px past the text; just inside its left edge
        // the pixel must be pure plate red.
        let mut found_plate = false;
        let y = pm.height() / 2;
        for x in 0..pm.width() {
            let i = ((y * pm.width() + x) * 4) as usize;
            let [r, g, b, a] = pm.data()[i..i + 4].try_into().unwrap();
            if a == 255 && r == 255 && g == 0 && b == 0 {
                found_plate = true;
                break;
            }
        }
        assert!(found_plate, "no solid plate pixel found on the center row");
    }
}
