use crate::foundation::core::Canvas;

/// Closed set of scene animations.
///
/// Preset ids outside this table (older catalogs carry names like
/// `fast_cut_shake` or `slow_dissolve`) resolve to [`AnimationKind::Static`],
/// a documented identity fallback rather than an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    ZoomInCrossfade,
    ZoomCenterImpact,
    SlideInLeft,
    SlideInVertical,
    PanHorizontal,
    SoftPan,
    FlashCut,
    PulseZoom,
    BounceZoom,
    #[serde(other)]
    Static,
}

impl AnimationKind {
    /// Parse an animation id. Unrecognized ids map to `Static`.
    pub fn from_id(id: &str) -> Self {
        match id {
            "zoom_in_crossfade" => Self::ZoomInCrossfade,
            "zoom_center_impact" => Self::ZoomCenterImpact,
            "slide_in_left" => Self::SlideInLeft,
            "slide_in_vertical" => Self::SlideInVertical,
            "pan_horizontal" => Self::PanHorizontal,
            "soft_pan" => Self::SoftPan,
            "flash_cut" => Self::FlashCut,
            "pulse_zoom" => Self::PulseZoom,
            "bounce_zoom" => Self::BounceZoom,
            _ => Self::Static,
        }
    }
}

/// Where a canvas-sized base layer sits at one instant.
///
/// `scale` is applied to the layer about its own top-left before placement;
/// `x`/`y` are the top-left corner in canvas pixels, `None` meaning centered
/// on that axis for the scaled layer size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub scale: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub opacity: f32,
}

impl Placement {
    fn identity() -> Self {
        Self {
            scale: 1.0,
            x: None,
            y: None,
            opacity: 1.0,
        }
    }

    /// Resolve the concrete top-left corner for a canvas-sized layer.
    pub fn top_left(self, canvas: Canvas) -> (f64, f64) {
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let x = self.x.unwrap_or((w - w * self.scale) / 2.0);
        let y = self.y.unwrap_or((h - h * self.scale) / 2.0);
        (x, y)
    }
}

/// Evaluate an animation at elapsed time `t` (seconds, `0 <= t < duration`).
///
/// All formulas are pure functions of `t`; the pipeline stays deterministic.
/// Slide and pan kinds derive offsets from canvas dimensions the same way the
/// interactive tool always has, including the positive drift pan picks up on
/// long scenes.
pub fn sample(kind: AnimationKind, t: f64, canvas: Canvas) -> Placement {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);

    match kind {
        AnimationKind::ZoomInCrossfade => Placement {
            scale: 1.0 + 0.05 * t,
            ..Placement::identity()
        },
        AnimationKind::ZoomCenterImpact => Placement {
            scale: 1.0 + 0.30 * t,
            ..Placement::identity()
        },
        AnimationKind::SlideInLeft => {
            let x = if t < 0.5 {
                Some((w * (t / 0.5 - 1.0)).min(0.0))
            } else {
                None
            };
            Placement {
                x,
                ..Placement::identity()
            }
        }
        AnimationKind::SlideInVertical => {
            let y = if t < 0.5 {
                Some((h * (t / 0.5 - 1.0)).min(0.0))
            } else {
                None
            };
            Placement {
                y,
                ..Placement::identity()
            }
        }
        AnimationKind::PanHorizontal => Placement {
            scale: 1.2,
            x: Some(-0.1 * w + 0.05 * w * t),
            y: None,
            opacity: 1.0,
        },
        AnimationKind::SoftPan => Placement {
            scale: 1.1,
            x: None,
            y: Some(-0.05 * h + 0.02 * h * t),
            opacity: 1.0,
        },
        AnimationKind::FlashCut => Placement {
            opacity: ((t / 0.1).clamp(0.0, 1.0)) as f32,
            ..Placement::identity()
        },
        AnimationKind::PulseZoom => Placement {
            scale: 1.0 + 0.05 * (3.0 * t).sin().abs(),
            ..Placement::identity()
        },
        AnimationKind::BounceZoom => Placement {
            scale: 1.0 + 0.10 * (5.0 * t).sin().abs(),
            ..Placement::identity()
        },
        AnimationKind::Static => Placement::identity(),
    }
}
