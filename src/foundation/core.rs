use crate::foundation::error::{GreenroomError, GreenroomResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Full-canvas rectangle at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Visibility window `[start_sec, end_sec]` on the timeline, in seconds.
///
/// Both ends are inclusive: an element is eligible to render at exactly its start and exactly
/// its end timestamp.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    /// Window start in seconds.
    pub start_sec: f64,
    /// Window end in seconds.
    pub end_sec: f64,
}

impl TimeRange {
    /// Create a validated range with `start < end`.
    pub fn new(start_sec: f64, end_sec: f64) -> GreenroomResult<Self> {
        if !start_sec.is_finite() || !end_sec.is_finite() {
            return Err(GreenroomError::validation("time range must be finite"));
        }
        if start_sec < 0.0 {
            return Err(GreenroomError::validation("time range start must be >= 0"));
        }
        if start_sec >= end_sec {
            return Err(GreenroomError::validation(
                "time range start must be < end",
            ));
        }
        Ok(Self { start_sec, end_sec })
    }

    /// Return `true` when `t` is inside `[start, end]`.
    pub fn contains(self, t: f64) -> bool {
        self.start_sec <= t && t <= self.end_sec
    }

    /// Window length in seconds.
    pub fn duration_sec(self) -> f64 {
        self.end_sec - self.start_sec
    }
}

/// A straight RGB color with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Construct from channel values.
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Total frame count for a duration at a given frame rate: `ceil(duration * fps)`.
pub fn total_frames(duration_sec: f64, fps: u32) -> u64 {
    (duration_sec * f64::from(fps)).ceil().max(0.0) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
