use std::path::PathBuf;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};
use crate::preset::WorkingPreset;

/// Maximum number of scenes in one reel.
pub const MAX_SCENES: usize = 5;

/// Default watermark opacity.
pub const DEFAULT_WATERMARK_OPACITY: f32 = 0.3;

/// One scene request: a still image plus an optional caption, placed by its
/// 0-based ordinal.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SceneSpec {
    /// Stable sort key; scenes render in ascending ordinal order.
    pub ordinal: u32,
    /// Source image path.
    pub image_path: PathBuf,
    /// Caption text; `None` or empty means no text layer.
    #[serde(default)]
    pub caption: Option<String>,
}

/// How per-scene durations are determined.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DurationMode {
    /// Every scene holds for this many seconds.
    PerScene(f64),
    /// The whole reel lasts this long; scenes split it evenly.
    TotalSecs(f64),
}

impl DurationMode {
    /// Resolve the duration of a single scene.
    pub fn per_scene_secs(self, scene_count: usize) -> ReelResult<f64> {
        let secs = match self {
            Self::PerScene(s) => s,
            Self::TotalSecs(total) => total / (scene_count.max(1) as f64),
        };
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ReelError::validation("scene duration must be > 0"));
        }
        Ok(secs)
    }
}

/// A complete render request, validated before any pipeline stage runs.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RenderJob {
    /// Scenes in ascending ordinal order, 1 to 5 of them.
    pub scenes: Vec<SceneSpec>,
    /// Per-job style copy (already derived from the catalog).
    pub preset: WorkingPreset,
    /// How scene durations are computed.
    pub duration: DurationMode,
    /// Output canvas.
    pub canvas: Canvas,
    /// Optional watermark logo.
    #[serde(default)]
    pub logo_path: Option<PathBuf>,
    /// Watermark opacity, 0..1.
    #[serde(default = "default_watermark_opacity")]
    pub watermark_opacity: f32,
    /// Optional background music file.
    #[serde(default)]
    pub music_path: Option<PathBuf>,
    /// Root of the bundled assets tree (`fonts/`, `bgm/`).
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    /// Output MP4 path.
    pub out_path: PathBuf,
}

fn default_watermark_opacity() -> f32 {
    DEFAULT_WATERMARK_OPACITY
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

impl RenderJob {
    /// Check every input invariant up front so bad requests fail with a
    /// user-facing message before rendering starts.
    pub fn validate(&self) -> ReelResult<()> {
        if self.scenes.is_empty() {
            return Err(ReelError::validation("at least one scene is required"));
        }
        if self.scenes.len() > MAX_SCENES {
            return Err(ReelError::validation(format!(
                "at most {MAX_SCENES} scenes are supported, got {}",
                self.scenes.len()
            )));
        }
        if !self
            .scenes
            .windows(2)
            .all(|pair| pair[0].ordinal < pair[1].ordinal)
        {
            return Err(ReelError::validation(
                "scenes must be sorted by strictly ascending ordinal",
            ));
        }
        for scene in &self.scenes {
            if !scene.image_path.is_file() {
                return Err(ReelError::validation(format!(
                    "scene {} image '{}' is not a readable file",
                    scene.ordinal,
                    scene.image_path.display()
                )));
            }
        }

        self.canvas.validate()?;
        self.duration.per_scene_secs(self.scenes.len())?;

        if !(0.0..=1.0).contains(&self.watermark_opacity) {
            return Err(ReelError::validation(
                "watermark opacity must be within 0..=1",
            ));
        }
        if self.out_path.as_os_str().is_empty() {
            return Err(ReelError::validation("output path must be non-empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{PresetOverrides, catalog};
    use std::path::PathBuf;

    fn fixture_image(name: &str) -> PathBuf {
        let dir = PathBuf::from("target").join("job_fixtures");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{name}.png"));
        ::image::RgbaImage::from_pixel(4, 4, ::image::Rgba([9, 9, 9, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn job(scene_count: u32) -> RenderJob {
        let scenes = (0..scene_count)
            .map(|i| SceneSpec {
                ordinal: i,
                image_path: fixture_image("img"),
                caption: None,
            })
            .collect();
        RenderJob {
            scenes,
            preset: catalog::get("Food_Luxury")
                .unwrap()
                .to_working(PresetOverrides::default()),
            duration: DurationMode::PerScene(2.0),
            canvas: Canvas::PORTRAIT,
            logo_path: None,
            watermark_opacity: DEFAULT_WATERMARK_OPACITY,
            music_path: None,
            assets_dir: PathBuf::from("assets"),
            out_path: PathBuf::from("target/job_fixtures/out.mp4"),
        }
    }

    #[test]
    fn valid_job_passes() {
        job(3).validate().unwrap();
    }

    #[test]
    fn rejects_zero_and_too_many_scenes() {
        assert!(job(0).validate().is_err());
        assert!(job(6).validate().is_err());
    }

    #[test]
    fn rejects_unsorted_ordinals() {
        let mut j = job(2);
        j.scenes[1].ordinal = 0;
        assert!(j.validate().is_err());
    }

    #[test]
    fn rejects_missing_image() {
        let mut j = job(1);
        j.scenes[0].image_path = PathBuf::from("missing.png");
        assert!(j.validate().is_err());
    }

    #[test]
    fn rejects_nonpositive_duration() {
        let mut j = job(1);
        j.duration = DurationMode::PerScene(0.0);
        assert!(j.validate().is_err());
    }

    #[test]
    fn total_secs_splits_evenly() {
        let secs = DurationMode::TotalSecs(15.0).per_scene_secs(5).unwrap();
        assert_eq!(secs, 3.0);
        let secs = DurationMode::TotalSecs(15.0).per_scene_secs(4).unwrap();
        assert_eq!(secs, 3.75);
    }

    #[test]
    fn json_job_defaults_optional_fields() {
        // A hand-written job file only has to name the essentials.
        let json = r##"{
            "scenes": [{ "ordinal": 0, "image_path": "a.png" }],
            "preset": {
                "preset_id": "Food_Luxury",
                "font_ref": "Mincho",
                "text_color": "#FFFFFF",
                "text_bg_color": null,
                "animation": "zoom_in_crossfade",
                "duration_secs": 3.0,
                "music_genre": null
            },
            "duration": { "PerScene": 2.0 },
            "canvas": { "width": 1080, "height": 1920 },
            "out_path": "out.mp4"
        }"##;
        let job: RenderJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.watermark_opacity, DEFAULT_WATERMARK_OPACITY);
        assert_eq!(job.logo_path, None);
        assert_eq!(job.music_path, None);
        assert_eq!(job.assets_dir, PathBuf::from("assets"));
        assert_eq!(job.scenes[0].caption, None);
    }

    #[test]
    fn rejects_out_of_range_opacity() {
        let mut j = job(1);
        j.watermark_opacity = 1.5;
        assert!(j.validate().is_err());
    }
}
