//! Reelforge turns a handful of still images into a short marketing reel.
//!
//! A render is a single call: build a [`RenderJob`] (scenes, a style preset
//! from the catalog, canvas, optional music and watermark) and pass it to
//! [`render_reel`]. Each scene becomes a fixed-length clip with one Ken
//! Burns-style animation and an optional caption; clips are hard-cut
//! together, faded to black over the last three seconds and encoded to MP4
//! through the system `ffmpeg`.
#![forbid(unsafe_code)]

pub mod assets;
pub mod audio;
pub mod encode;
pub mod foundation;
pub mod job;
pub mod pipeline;
pub mod preset;
pub mod render;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::encode::ffmpeg::{Mp4Sink, is_ffmpeg_on_path};
pub use crate::encode::sink::{AudioInput, FrameSink, SinkConfig};
pub use crate::job::{DEFAULT_WATERMARK_OPACITY, DurationMode, RenderJob, SceneSpec};
pub use crate::pipeline::render_reel;
pub use crate::preset::{PresetOverrides, StylePreset, WorkingPreset};
