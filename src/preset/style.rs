use crate::render::motion::AnimationKind;

/// One catalog entry: a named bundle of animation, typography and color
/// choices. Catalog entries are immutable; jobs render from a
/// [`WorkingPreset`] derived with [`StylePreset::to_working`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StylePreset {
    /// Stable id, `<Category>_<Name>`.
    pub id: String,
    /// Human-readable name shown by catalog listings.
    pub display_name: String,
    /// Font reference resolved through the assets font chain.
    pub font_ref: String,
    /// Caption color as a hex string (kept as a string; the stroke-color
    /// heuristic operates on the raw text).
    pub text_color: String,
    /// Optional caption background plate color.
    pub text_bg_color: Option<String>,
    /// Scene animation.
    pub animation: AnimationKind,
    /// Default seconds per scene.
    pub duration_secs: f64,
    /// Suggested bundled-music genre.
    pub music_genre: Option<String>,
}

impl StylePreset {
    /// Category prefix: the id substring before the first `_`.
    pub fn category(&self) -> &str {
        self.id.split('_').next().unwrap_or(&self.id)
    }

    /// Derive a per-job working copy with caller overrides applied.
    /// The catalog entry itself is never mutated.
    pub fn to_working(&self, overrides: PresetOverrides) -> WorkingPreset {
        WorkingPreset {
            preset_id: self.id.clone(),
            font_ref: self.font_ref.clone(),
            text_color: overrides.text_color.unwrap_or_else(|| self.text_color.clone()),
            text_bg_color: match overrides.text_bg_color {
                Some(bg) => bg,
                None => self.text_bg_color.clone(),
            },
            animation: self.animation,
            duration_secs: overrides.duration_secs.unwrap_or(self.duration_secs),
            music_genre: self.music_genre.clone(),
        }
    }
}

/// Caller overrides applied when deriving a working preset.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct PresetOverrides {
    /// Replace the caption color.
    pub text_color: Option<String>,
    /// Outer `Some` replaces the background plate setting; `Some(None)`
    /// clears an existing plate.
    pub text_bg_color: Option<Option<String>>,
    /// Replace the per-scene duration.
    pub duration_secs: Option<f64>,
}

/// Per-job copy of a style preset, exclusively owned by one render job.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WorkingPreset {
    pub preset_id: String,
    pub font_ref: String,
    pub text_color: String,
    pub text_bg_color: Option<String>,
    pub animation: AnimationKind,
    pub duration_secs: f64,
    pub music_genre: Option<String>,
}
