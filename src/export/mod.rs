//! The export pipeline: settings, progress reporting and the session state machine.

pub mod session;

pub use session::ExportSession;

use crate::encode::Codec;
use crate::foundation::error::{GreenroomError, GreenroomResult};

/// Frame rates the encoder accepts.
pub const SUPPORTED_FPS: [u32; 3] = [24, 30, 60];

/// Output quality preset, mapped to a target video bitrate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Quality {
    /// 2 Mbps, previews.
    Low,
    /// 4 Mbps.
    #[default]
    Medium,
    /// 8 Mbps.
    High,
    /// 12 Mbps, masters.
    Ultra,
}

impl Quality {
    /// Target video bitrate in kilobits per second.
    pub fn bitrate_kbps(self) -> u32 {
        match self {
            Quality::Low => 2_000,
            Quality::Medium => 4_000,
            Quality::High => 8_000,
            Quality::Ultra => 12_000,
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Quality::Low),
            "medium" => Ok(Quality::Medium),
            "high" => Ok(Quality::High),
            "ultra" => Ok(Quality::Ultra),
            other => Err(format!(
                "unknown quality '{other}' (expected low, medium, high or ultra)"
            )),
        }
    }
}

/// User-facing export parameters.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExportSettings {
    /// Quality preset.
    pub quality: Quality,
    /// Output frame rate; one of [`SUPPORTED_FPS`].
    pub fps: u32,
    /// Output codec.
    pub codec: Codec,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            fps: 30,
            codec: Codec::default(),
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> GreenroomResult<()> {
        if !SUPPORTED_FPS.contains(&self.fps) {
            return Err(GreenroomError::validation(format!(
                "unsupported export fps {} (expected one of {SUPPORTED_FPS:?})",
                self.fps
            )));
        }
        Ok(())
    }
}

/// Where the export currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ExportStatus {
    /// Not started.
    #[default]
    Idle,
    /// Loading assets and mixing audio.
    Preparing,
    /// Rendering and encoding frames.
    Recording,
    /// Waiting for the encoder to close the container.
    Finalizing,
    /// Output written and verified.
    Completed,
    /// Terminal failure; partial output was removed.
    Failed,
}

/// One progress report, emitted to the session's callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    /// Current stage.
    pub status: ExportStatus,
    /// Completion in `[0, 100]`.
    pub percent: f64,
    /// Frames rendered and handed to the encoder so far.
    pub processed_frames: u64,
    /// Total frames the timeline produces: `ceil(duration * fps)`.
    pub total_frames: u64,
    /// Seconds since recording started.
    pub elapsed_sec: f64,
    /// Linear remaining-time estimate, available once at least one frame is done.
    pub estimated_remaining_sec: Option<f64>,
}

#[cfg(test)]
#[path = "../../tests/unit/export/session.rs"]
mod tests;
