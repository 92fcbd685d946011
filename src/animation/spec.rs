use crate::foundation::error::{GreenroomError, GreenroomResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Entrance animation kinds.
pub enum EnterKind {
    /// No entrance animation.
    #[default]
    None,
    /// Linear fade from transparent.
    Fade,
    /// Slide in from the left edge.
    SlideLeft,
    /// Slide in from the right edge.
    SlideRight,
    /// Slide in from above.
    SlideUp,
    /// Slide in from below.
    SlideDown,
    /// Grow from small to natural size.
    ZoomIn,
    /// Shrink from oversized to natural size.
    ZoomOut,
    /// Overshooting scale-in.
    Bounce,
    /// Horizontal unfold.
    Flip,
    /// Rotate in while fading.
    Rotate,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Exit animation kinds. Same shapes as [`EnterKind`], mirrored at the end of the window.
pub enum ExitKind {
    /// No exit animation.
    #[default]
    None,
    /// Linear fade to transparent.
    Fade,
    /// Slide out toward the left edge.
    SlideLeft,
    /// Slide out toward the right edge.
    SlideRight,
    /// Slide out upward.
    SlideUp,
    /// Slide out downward.
    SlideDown,
    /// Shrink away.
    ZoomIn,
    /// Grow past natural size while fading.
    ZoomOut,
    /// Overshooting scale-out.
    Bounce,
    /// Horizontal fold.
    Flip,
    /// Rotate out while fading.
    Rotate,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Continuous loop animation kinds, periodic over the whole visibility window.
pub enum LoopKind {
    /// No loop animation.
    #[default]
    None,
    /// Gentle periodic scale.
    Pulse,
    /// Small periodic rotation.
    Wiggle,
    /// Slow vertical drift.
    Float,
    /// Continuous rotation.
    Spin,
    /// Periodic opacity dips.
    Blink,
    /// Fast horizontal jitter.
    Shake,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Enter/exit/loop animation attached to a media clip or text overlay.
pub struct AnimationSpec {
    /// Entrance kind.
    #[serde(default)]
    pub enter: EnterKind,
    /// Entrance duration in seconds.
    #[serde(default = "default_edge_sec")]
    pub enter_sec: f64,
    /// Exit kind.
    #[serde(default)]
    pub exit: ExitKind,
    /// Exit duration in seconds.
    #[serde(default = "default_edge_sec")]
    pub exit_sec: f64,
    /// Loop kind.
    #[serde(default)]
    pub loop_kind: LoopKind,
    /// Loop speed multiplier in cycles per second.
    #[serde(default = "default_loop_speed")]
    pub loop_speed: f64,
}

fn default_edge_sec() -> f64 {
    0.5
}

fn default_loop_speed() -> f64 {
    1.0
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            enter: EnterKind::None,
            enter_sec: default_edge_sec(),
            exit: ExitKind::None,
            exit_sec: default_edge_sec(),
            loop_kind: LoopKind::None,
            loop_speed: default_loop_speed(),
        }
    }
}

impl AnimationSpec {
    /// Validate durations and speed.
    pub fn validate(&self) -> GreenroomResult<()> {
        for (name, v) in [
            ("enter_sec", self.enter_sec),
            ("exit_sec", self.exit_sec),
            ("loop_speed", self.loop_speed),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(GreenroomError::validation(format!(
                    "animation {name} must be finite and >= 0"
                )));
            }
        }
        Ok(())
    }
}
