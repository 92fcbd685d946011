//! The alpha-preserving WebM encoder.
//!
//! Frames are piped as raw straight-alpha RGBA into a spawned `ffmpeg` process encoding
//! `yuva420p`. The system binary is used rather than `ffmpeg-next` to avoid native FFmpeg
//! dev header/lib requirements.

use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::assets::media::MIX_SAMPLE_RATE;
use crate::encode::Codec;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{GreenroomError, GreenroomResult};
use crate::render::frame::Frame;

#[derive(Clone, Debug)]
/// Everything the encoder needs before the first frame arrives.
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: Codec,
    /// Target video bitrate in kilobits per second.
    pub bitrate_kbps: u32,
    pub out_path: PathBuf,
    /// Interleaved stereo f32le PCM at [`MIX_SAMPLE_RATE`], muxed as Opus when present.
    pub audio_f32le: Option<PathBuf>,
}

impl EncodeConfig {
    pub fn validate(&self) -> GreenroomResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GreenroomError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // yuva420p subsamples chroma 2x2.
            return Err(GreenroomError::validation(
                "encode width/height must be even (required for yuva420p output)",
            ));
        }
        if self.fps == 0 {
            return Err(GreenroomError::validation("encode fps must be non-zero"));
        }
        if self.bitrate_kbps == 0 {
            return Err(GreenroomError::validation("encode bitrate must be non-zero"));
        }
        Ok(())
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn ensure_parent_dir(path: &Path) -> GreenroomResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            GreenroomError::encoder(format!(
                "failed to create output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }
    Ok(())
}

/// One running encode: spawned `ffmpeg`, its stdin pipe and the expected frame size.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    frame_len: usize,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig) -> GreenroomResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !is_ffmpeg_on_path() {
            return Err(GreenroomError::encoder(
                "ffmpeg is required for WebM encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

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
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
        ]);

        if let Some(audio) = &cfg.audio_f32le {
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &MIX_SAMPLE_RATE.to_string(),
                "-ac",
                "2",
            ])
            .arg("-i")
            .arg(audio);
        }

        cmd.args([
            "-c:v",
            cfg.codec.encoder_name(),
            "-pix_fmt",
            "yuva420p",
            // Alt-ref frames break alpha in libvpx.
            "-auto-alt-ref",
            "0",
            "-b:v",
            &format!("{}k", cfg.bitrate_kbps),
        ]);

        if cfg.audio_f32le.is_some() {
            cmd.args(["-c:a", "libopus", "-b:a", "128k", "-shortest"]);
        } else {
            cmd.arg("-an");
        }

        cmd.args(["-f", "webm"]).arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            GreenroomError::encoder(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GreenroomError::encoder("failed to open ffmpeg stdin"))?;

        Ok(Self {
            frame_len: (cfg.width * cfg.height * 4) as usize,
            cfg,
            child,
            stdin: Some(stdin),
        })
    }

    /// Pipe one straight-alpha RGBA frame to the encoder.
    pub fn write_frame(&mut self, frame: &Frame) -> GreenroomResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(GreenroomError::encoder(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        if frame.data.len() != self.frame_len {
            return Err(GreenroomError::encoder(
                "frame byte length mismatch with width*height*4",
            ));
        }
        if frame.premultiplied {
            return Err(GreenroomError::encoder(
                "encoder expects straight-alpha frames",
            ));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(GreenroomError::encoder("encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&frame.data).map_err(|e| {
            GreenroomError::encoder(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    /// Kill the encode and remove any partial output. Used on cancellation and render failure.
    pub fn abort(mut self) {
        drop(self.stdin.take());
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_file(&self.cfg.out_path);
    }

    /// Close stdin, wait for ffmpeg and verify the container was actually written.
    pub fn finish(mut self) -> GreenroomResult<PathBuf> {
        drop(self.stdin.take());

        let output = self.child.wait_with_output().map_err(|e| {
            GreenroomError::encoder(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GreenroomError::encoder(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let len = std::fs::metadata(&self.cfg.out_path).map(|m| m.len()).unwrap_or(0);
        if len == 0 {
            let _ = std::fs::remove_file(&self.cfg.out_path);
            return Err(GreenroomError::encoder(format!(
                "ffmpeg produced an empty output file '{}'",
                self.cfg.out_path.display()
            )));
        }

        Ok(self.cfg.out_path)
    }
}

/// lavfi source describing the solid backdrop the alpha stream is flattened onto.
fn lavfi_color_source(background: Rgb8, width: u32, height: u32, fps: u32) -> String {
    format!(
        "color=c=0x{:02x}{:02x}{:02x}:s={}x{}:r={}",
        background.r, background.g, background.b, width, height, fps
    )
}

/// Flatten an exported alpha WebM over a solid background into an opaque H.264 MP4.
pub fn remux_opaque_mp4(
    webm: &Path,
    mp4: &Path,
    background: Rgb8,
    width: u32,
    height: u32,
    fps: u32,
) -> GreenroomResult<()> {
    ensure_parent_dir(mp4)?;

    let color = lavfi_color_source(background, width, height, fps);
    let output = Command::new("ffmpeg")
        .args(["-y", "-loglevel", "error", "-f", "lavfi", "-i", &color])
        .arg("-i")
        .arg(webm)
        .args([
            "-filter_complex",
            "[0:v][1:v]overlay=shortest=1,format=yuv420p",
            "-c:v",
            "libx264",
            "-c:a",
            "aac",
            "-movflags",
            "+faststart",
        ])
        .arg(mp4)
        .output()
        .map_err(|e| GreenroomError::encoder(format!("failed to run ffmpeg remux: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GreenroomError::encoder(format!(
            "ffmpeg remux exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}
