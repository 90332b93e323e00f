use resvg::tiny_skia;

use crate::assets::font::ResolvedFont;
use crate::assets::image;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::job::SceneSpec;
use crate::preset::WorkingPreset;
use crate::render::composite;
use crate::render::motion::{self, AnimationKind};
use crate::render::normalize;
use crate::render::text::{self, CaptionStyle, TextLayer};

/// One prepared scene: a normalized base layer, an optional caption overlay
/// and a fixed frame budget. Every frame is a pure function of `(clip, t)`,
/// which is what makes scene preparation safe to parallelize.
pub struct SceneClip {
    base: tiny_skia::Pixmap,
    caption: Option<TextLayer>,
    animation: AnimationKind,
    duration_frames: u64,
    canvas: Canvas,
}

impl SceneClip {
    /// Decode, normalize and caption one scene.
    pub fn prepare(
        spec: &SceneSpec,
        preset: &WorkingPreset,
        font: &ResolvedFont,
        canvas: Canvas,
        duration_secs: f64,
        fps: Fps,
    ) -> ReelResult<Self> {
        if duration_secs <= 0.0 {
            return Err(ReelError::validation("scene duration must be > 0"));
        }

        let decoded = image::decode_oriented(&spec.image_path)?;
        let base = normalize::normalize(&decoded, canvas)?;

        let caption = match spec.caption.as_deref() {
            Some(c) => {
                let style = CaptionStyle {
                    font: font.clone(),
                    color: preset.text_color.clone(),
                    bg_color: preset.text_bg_color.clone(),
                };
                text::render_caption(c, &style, canvas)?
            }
            None => None,
        };

        let duration_frames = fps.secs_to_frames_floor(duration_secs).max(1);

        Ok(Self {
            base,
            caption,
            animation: preset.animation,
            duration_frames,
            canvas,
        })
    }

    /// Number of output frames this scene occupies.
    pub fn duration_frames(&self) -> u64 {
        self.duration_frames
    }

    /// Whether a caption overlay was produced.
    pub fn has_caption(&self) -> bool {
        self.caption.is_some()
    }

    /// Render the frame at local time `t` seconds: black base, animated
    /// image layer, caption on top.
    pub fn frame_at(&self, t: f64) -> ReelResult<tiny_skia::Pixmap> {
        let mut frame = composite::black_canvas(self.canvas)?;

        let placement = motion::sample(self.animation, t, self.canvas);
        let (x, y) = placement.top_left(self.canvas);
        composite::draw_layer(
            &mut frame,
            &self.base,
            placement.scale,
            x,
            y,
            placement.opacity,
        );

        if let Some(caption) = &self.caption {
            composite::draw_layer(&mut frame, &caption.pixmap, 1.0, 0.0, caption.top, 1.0);
        }

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{PresetOverrides, catalog};
    use std::path::PathBuf;

    fn fixture_image(name: &str, w: u32, h: u32, rgba: [u8; 4]) -> PathBuf {
        let dir = PathBuf::from("target").join("scene_fixtures");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{name}.png"));
        ::image::RgbaImage::from_pixel(w, h, ::image::Rgba(rgba))
            .save(&path)
            .unwrap();
        path
    }

    fn clip(caption: Option<&str>, duration_secs: f64) -> SceneClip {
        let path = fixture_image("red", 108, 192, [255, 0, 0, 255]);
        let spec = SceneSpec {
            ordinal: 0,
            image_path: path,
            caption: caption.map(str::to_string),
        };
        let preset = catalog::get("Food_Luxury")
            .unwrap()
            .to_working(PresetOverrides::default());
        SceneClip::prepare(
            &spec,
            &preset,
            &ResolvedFont::SystemDefault,
            Canvas {
                width: 108,
                height: 192,
            },
            duration_secs,
            Fps::REEL,
        )
        .unwrap()
    }

    #[test]
    fn frame_budget_follows_duration() {
        assert_eq!(clip(None, 2.0).duration_frames(), 60);
        assert_eq!(clip(None, 2.5).duration_frames(), 75);
    }

    #[test]
    fn empty_caption_produces_no_text_layer() {
        assert!(!clip(None, 2.0).has_caption());
        assert!(!clip(Some("   "), 2.0).has_caption());
    }

    #[test]
    fn frames_are_canvas_sized_and_opaque() {
        let c = clip(None, 1.0);
        let frame = c.frame_at(0.0).unwrap();
        assert_eq!((frame.width(), frame.height()), (108, 192));
        for px in frame.data().chunks_exact(4) {
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn identical_inputs_render_identical_frames() {
        let c = clip(None, 1.0);
        let a = c.frame_at(0.5).unwrap();
        let b = c.frame_at(0.5).unwrap();
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn zoom_keeps_canvas_fully_covered() {
        let c = clip(None, 3.0);
        // Food_Luxury is zoom_in_crossfade; at the end of the scene the
        // scaled layer still covers every pixel with source red.
        let frame = c.frame_at(2.9).unwrap();
        for px in frame.data().chunks_exact(4) {
            assert!(px[0] > 200, "uncovered pixel: {px:?}");
        }
    }

    #[test]
    fn zero_duration_is_rejected() {
        let path = fixture_image("tiny", 16, 16, [1, 2, 3, 255]);
        let spec = SceneSpec {
            ordinal: 0,
            image_path: path,
            caption: None,
        };
        let preset = catalog::get("Food_Luxury")
            .unwrap()
            .to_working(PresetOverrides::default());
        let err = SceneClip::prepare(
            &spec,
            &preset,
            &ResolvedFont::SystemDefault,
            Canvas::SQUARE,
            0.0,
            Fps::REEL,
        );
        assert!(err.is_err());
    }
}
