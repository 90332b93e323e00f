use std::path::{Path, PathBuf};

use crate::encode::sink::AudioInput;
use crate::foundation::error::{ReelError, ReelResult};

/// Mixing sample rate across decode/loop/encode.
pub const MIX_SAMPLE_RATE: u32 = 48_000;

/// Output channel count.
pub const MIX_CHANNELS: u16 = 2;

/// Tail fade length in seconds, applied after looping/trimming.
pub const FADE_OUT_SECS: f64 = 3.0;

/// Build the soundtrack for a reel of `video_secs` seconds and write it as a
/// raw `f32le` file next to the final output.
///
/// The track is looped (repeat-and-trim) or trimmed so its sample count
/// matches the video duration exactly, then given a fixed 3-second linear
/// fade-out. Any failure degrades to silence with a warning; audio problems
/// never abort a render.
pub fn prepare(music_path: &Path, video_secs: f64, scratch_path: &Path) -> Option<AudioInput> {
    match build(music_path, video_secs, scratch_path) {
        Ok(input) => Some(input),
        Err(e) => {
            tracing::warn!(path = %music_path.display(), "rendering silent, audio failed: {e}");
            None
        }
    }
}

fn build(music_path: &Path, video_secs: f64, scratch_path: &Path) -> ReelResult<AudioInput> {
    if !music_path.is_file() {
        return Err(ReelError::asset(format!(
            "music file '{}' not found",
            music_path.display()
        )));
    }

    let pcm = decode_f32_stereo(music_path, MIX_SAMPLE_RATE)?;
    if pcm.is_empty() {
        return Err(ReelError::asset("music file decoded to zero samples"));
    }

    let needed_frames = (video_secs * f64::from(MIX_SAMPLE_RATE)).round().max(0.0) as u64;
    let fade_frames = (FADE_OUT_SECS * f64::from(MIX_SAMPLE_RATE)).round() as u64;
    let mut samples = loop_trim(&pcm, needed_frames);
    apply_tail_fade(&mut samples, fade_frames);

    write_f32le(&samples, scratch_path)?;
    Ok(AudioInput {
        path: scratch_path.to_path_buf(),
        sample_rate: MIX_SAMPLE_RATE,
        channels: MIX_CHANNELS,
    })
}

/// Repeat the source until `needed_frames` stereo frames are covered, then
/// trim to exactly that length. A source at least as long as the video is
/// trimmed directly.
pub(crate) fn loop_trim(pcm_interleaved: &[f32], needed_frames: u64) -> Vec<f32> {
    let needed = needed_frames as usize * usize::from(MIX_CHANNELS);
    let mut out = Vec::with_capacity(needed);
    while out.len() < needed {
        let take = (needed - out.len()).min(pcm_interleaved.len());
        out.extend_from_slice(&pcm_interleaved[..take]);
        if take == 0 {
            break;
        }
    }
    out
}

/// Linear fade to zero over the trailing `fade_frames` stereo frames.
/// Tracks shorter than the fade ramp down over their full length.
pub(crate) fn apply_tail_fade(samples: &mut [f32], fade_frames: u64) {
    let total_frames = samples.len() / usize::from(MIX_CHANNELS);
    let fade = (fade_frames as usize).min(total_frames);
    if fade == 0 {
        return;
    }
    let start = total_frames - fade;
    for frame in 0..fade {
        let gain = 1.0 - ((frame + 1) as f32 / fade as f32);
        let base = (start + frame) * usize::from(MIX_CHANNELS);
        for ch in 0..usize::from(MIX_CHANNELS) {
            samples[base + ch] *= gain;
        }
    }
}

/// Decode any audio file to interleaved stereo `f32` PCM via `ffmpeg`.
fn decode_f32_stereo(path: &Path, sample_rate: u32) -> ReelResult<Vec<f32>> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            &MIX_CHANNELS.to_string(),
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| ReelError::asset(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(ReelError::asset(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    if !out.stdout.len().is_multiple_of(4) {
        return Err(ReelError::asset(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let mut pcm = Vec::<f32>::with_capacity(out.stdout.len() / 4);
    for chunk in out.stdout.chunks_exact(4) {
        pcm.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    Ok(pcm)
}

fn write_f32le(samples: &[f32], out_path: &Path) -> ReelResult<()> {
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            ReelError::asset(format!(
                "failed to create audio scratch directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples.len() * 4);
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        ReelError::asset(format!(
            "failed to write audio scratch file '{}': {e}",
            out_path.display()
        ))
    })
}

/// Scratch-file guard: removes the mixed audio file when the job ends,
/// successfully or not.
pub struct ScratchGuard {
    path: PathBuf,
}

impl ScratchGuard {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        if self.path.exists()
            && let Err(e) = std::fs::remove_file(&self.path)
        {
            tracing::debug!(path = %self.path.display(), "failed to remove audio scratch: {e}");
        }
    }
}
