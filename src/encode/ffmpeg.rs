use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};

/// Streams rendered frames into a spawned system `ffmpeg` and finalizes an
/// MP4.
///
/// The output profile is fixed for reel delivery: H.264 + `yuv420p` video,
/// AAC audio when a soundtrack is attached, `+faststart` so the file plays
/// while still downloading, and the output is always overwritten. Incoming
/// frames are premultiplied RGBA over an opaque black base, so flattening
/// for the encoder reduces to forcing the alpha channel opaque.
pub struct Mp4Sink {
    out_path: PathBuf,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    started: bool,
    last_idx: Option<FrameIndex>,
}

impl Mp4Sink {
    /// Create a sink writing the finished MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            started: false,
            last_idx: None,
        }
    }

    /// Assemble the full ffmpeg invocation for one encode.
    fn reel_command(&self, cfg: &SinkConfig) -> ReelResult<Command> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Video input: raw opaque RGBA8 frames on stdin. For rawvideo `-r`
        // must precede `-i` to declare the input frame rate.
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
        ]);

        if let Some(audio) = cfg.audio.as_ref() {
            if audio.sample_rate == 0 || audio.channels == 0 {
                return Err(ReelError::validation(
                    "audio sample_rate and channels must be non-zero when audio is enabled",
                ));
            }
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path)
            .args(["-c:a", "aac", "-shortest"]);
        } else {
            cmd.arg("-an");
        }

        cmd.args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"])
            .arg(&self.out_path);
        Ok(cmd)
    }
}

impl FrameSink for Mp4Sink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.out_path)?;
        if !is_ffmpeg_on_path() {
            return Err(ReelError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = self.reel_command(&cfg)?.spawn().map_err(|e| {
            ReelError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width * cfg.height * 4) as usize];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.started = true;
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, rgba8_premul: &[u8]) -> ReelResult<()> {
        if !self.started {
            return Err(ReelError::encode("ffmpeg sink not started"));
        }
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if rgba8_premul.len() != self.scratch.len() {
            return Err(ReelError::validation(
                "frame size mismatch with width*height*4",
            ));
        }
        flatten_over_black(&mut self.scratch, rgba8_premul);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| ReelError::encode(format!("failed to write frame to ffmpeg stdin: {e}")))?;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| ReelError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.started = false;
        Ok(())
    }
}

/// Flatten premultiplied RGBA8 over an opaque black base.
///
/// Compositing premultiplied color over black leaves the color channels
/// unchanged, so the whole operation is a copy that forces alpha to 255.
fn flatten_over_black(dst: &mut [u8], src_premul: &[u8]) {
    dst.copy_from_slice(src_premul);
    for px in dst.chunks_exact_mut(4) {
        px[3] = 255;
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Fps;

    #[test]
    fn flatten_preserves_premul_color_and_forces_alpha() {
        // Fully transparent premul is all zero; over black that is black.
        let mut dst = vec![9u8; 8];
        flatten_over_black(&mut dst, &[0, 0, 0, 0, 128, 64, 32, 128]);
        assert_eq!(dst, vec![0, 0, 0, 255, 128, 64, 32, 255]);
    }

    #[test]
    fn flatten_is_identity_for_opaque_pixels() {
        let src = vec![1u8, 2, 3, 255];
        let mut dst = vec![0u8; 4];
        flatten_over_black(&mut dst, &src);
        assert_eq!(dst, src);
    }

    #[test]
    fn push_before_begin_is_rejected() {
        let mut sink = Mp4Sink::new("target/reelforge-unstarted.mp4");
        assert!(sink.push_frame(FrameIndex(0), &[0u8; 4]).is_err());
    }

    #[test]
    fn begin_rejects_odd_dimensions() {
        let mut sink = Mp4Sink::new("target/reelforge-odd.mp4");
        let err = sink
            .begin(SinkConfig {
                width: 101,
                height: 100,
                fps: Fps::REEL,
                audio: None,
            })
            .unwrap_err();
        assert!(err.to_string().contains("even"));
    }
}
