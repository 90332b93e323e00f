use std::path::PathBuf;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::ReelResult;

/// Raw PCM audio attached to an encode.
#[derive(Clone, Debug)]
pub struct AudioInput {
    /// Path to interleaved little-endian `f32` samples.
    pub path: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
}

/// Encode parameters fixed for the lifetime of one sink.
#[derive(Clone, Debug)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: Fps,
    /// Optional soundtrack; `None` produces a silent video.
    pub audio: Option<AudioInput>,
}

/// Destination for a strictly ordered stream of rendered frames.
///
/// Frames are premultiplied RGBA8, `width * height * 4` bytes, pushed with
/// strictly increasing indices between `begin` and `end`.
pub trait FrameSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, rgba8_premul: &[u8]) -> ReelResult<()>;
    fn end(&mut self) -> ReelResult<()>;
}

/// Sink that only counts frames; used by tests and dry runs.
#[derive(Debug, Default)]
pub struct CountingSink {
    /// Frames accepted so far.
    pub frames: u64,
    /// Config captured at `begin`.
    pub cfg: Option<SinkConfig>,
    ended: bool,
}

impl FrameSink for CountingSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames = 0;
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, _rgba8_premul: &[u8]) -> ReelResult<()> {
        self.frames += 1;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.ended = true;
        Ok(())
    }
}

impl CountingSink {
    /// Whether `end` has been called since the last `begin`.
    pub fn ended(&self) -> bool {
        self.ended
    }
}
