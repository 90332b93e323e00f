use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::assets::font;
use crate::audio::soundtrack::{self, ScratchGuard};
use crate::encode::ffmpeg::Mp4Sink;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::ReelResult;
use crate::job::RenderJob;
use crate::render::composite;
use crate::render::scene::SceneClip;
use crate::render::watermark::Watermark;

/// Length of the global end-of-video fade to black, in seconds.
pub const VIDEO_FADE_SECS: f64 = 3.0;

/// Render a complete reel: validate, prepare every scene, then stream each
/// output frame through the MP4 encoder.
///
/// Audio and watermark are degradable stages; scene preparation and encoding
/// are not. The whole pipeline is deterministic: identical inputs produce
/// identical frame counts and identical frames.
#[tracing::instrument(
    skip(job),
    fields(out = %job.out_path.display(), scenes = job.scenes.len())
)]
pub fn render_reel(job: &RenderJob) -> ReelResult<PathBuf> {
    job.validate()?;

    let fps = Fps::REEL;
    let per_scene_secs = job.duration.per_scene_secs(job.scenes.len())?;
    let font = font::resolve(&job.assets_dir, &job.preset.font_ref);

    // Scenes are independent; preparation (decode, normalize, caption
    // raster) is the expensive part, so it runs in parallel.
    let clips = job
        .scenes
        .par_iter()
        .map(|scene| SceneClip::prepare(scene, &job.preset, &font, job.canvas, per_scene_secs, fps))
        .collect::<ReelResult<Vec<_>>>()?;

    let total_frames: u64 = clips.iter().map(SceneClip::duration_frames).sum();
    let total_secs = fps.frames_to_secs(total_frames);

    let scratch_path = scratch_audio_path(&job.out_path);
    let _scratch = ScratchGuard::new(scratch_path.clone());
    let audio = job
        .music_path
        .as_deref()
        .and_then(|music| soundtrack::prepare(music, total_secs, &scratch_path));

    let watermark = job
        .logo_path
        .as_deref()
        .and_then(|logo| Watermark::prepare(logo, job.canvas, job.watermark_opacity));

    let mut sink = Mp4Sink::new(&job.out_path);
    sink.begin(SinkConfig {
        width: job.canvas.width,
        height: job.canvas.height,
        fps,
        audio,
    })?;
    let pushed = stream_frames(&clips, watermark.as_ref(), fps, &mut sink)?;
    sink.end()?;

    tracing::info!(frames = pushed, secs = total_secs, "reel encoded");
    Ok(job.out_path.clone())
}

/// Stream every frame of `clips`, in order, into `sink`.
///
/// Scene boundaries are hard cuts. The global fade to black covers the last
/// [`VIDEO_FADE_SECS`] of the whole reel and is applied before the watermark,
/// so the watermark stays at full strength through the fade.
fn stream_frames<S: FrameSink>(
    clips: &[SceneClip],
    watermark: Option<&Watermark>,
    fps: Fps,
    sink: &mut S,
) -> ReelResult<u64> {
    let total_frames: u64 = clips.iter().map(SceneClip::duration_frames).sum();

    let mut global: u64 = 0;
    for clip in clips {
        for local in 0..clip.duration_frames() {
            let mut frame = clip.frame_at(fps.frames_to_secs(local))?;

            let remaining_secs = fps.frames_to_secs(total_frames - global);
            if remaining_secs < VIDEO_FADE_SECS {
                composite::fade_to_black(&mut frame, (remaining_secs / VIDEO_FADE_SECS) as f32);
            }
            if let Some(wm) = watermark {
                wm.apply(&mut frame);
            }

            sink.push_frame(FrameIndex(global), frame.data())?;
            global += 1;
        }
    }
    Ok(global)
}

/// The raw-PCM scratch file lives next to the output MP4.
fn scratch_audio_path(out_path: &Path) -> PathBuf {
    out_path.with_extension("f32le")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::font::ResolvedFont;
    use crate::encode::sink::CountingSink;
    use crate::foundation::core::Canvas;
    use crate::job::SceneSpec;
    use crate::preset::{PresetOverrides, catalog};

    fn fixture_image() -> PathBuf {
        let dir = PathBuf::from("target").join("pipeline_fixtures");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("green.png");
        ::image::RgbaImage::from_pixel(54, 96, ::image::Rgba([0, 200, 0, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn clips(scene_count: u32, duration_secs: f64) -> Vec<SceneClip> {
        let preset = catalog::get("Food_Luxury")
            .unwrap()
            .to_working(PresetOverrides::default());
        (0..scene_count)
            .map(|i| {
                let spec = SceneSpec {
                    ordinal: i,
                    image_path: fixture_image(),
                    caption: None,
                };
                SceneClip::prepare(
                    &spec,
                    &preset,
                    &ResolvedFont::SystemDefault,
                    Canvas {
                        width: 54,
                        height: 96,
                    },
                    duration_secs,
                    Fps::REEL,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn streams_exact_frame_budget() {
        let clips = clips(3, 2.0);
        let mut sink = CountingSink::default();
        sink.begin(SinkConfig {
            width: 54,
            height: 96,
            fps: Fps::REEL,
            audio: None,
        })
        .unwrap();
        let pushed = stream_frames(&clips, None, Fps::REEL, &mut sink).unwrap();
        assert_eq!(pushed, 180);
        assert_eq!(sink.frames, 180);
    }

    #[test]
    fn total_secs_mode_yields_even_split() {
        // 15 seconds across 5 scenes is 3.0s per scene, 90 frames each.
        let per_scene = crate::job::DurationMode::TotalSecs(15.0)
            .per_scene_secs(5)
            .unwrap();
        let clips = clips(5, per_scene);
        let total: u64 = clips.iter().map(SceneClip::duration_frames).sum();
        assert_eq!(total, 450);
    }

    #[test]
    fn frame_counts_are_deterministic() {
        let a: u64 = clips(2, 2.5).iter().map(SceneClip::duration_frames).sum();
        let b: u64 = clips(2, 2.5).iter().map(SceneClip::duration_frames).sum();
        assert_eq!(a, b);
        assert_eq!(a, 150);
    }

    #[test]
    fn scratch_path_sits_next_to_output() {
        assert_eq!(
            scratch_audio_path(Path::new("renders/out.mp4")),
            PathBuf::from("renders/out.f32le")
        );
    }
}
