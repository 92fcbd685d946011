use std::f64::consts::PI;

use crate::animation::spec::{AnimationSpec, EnterKind, ExitKind, LoopKind};
use crate::foundation::core::{Affine, Point, Vec2};

/// Pixel offset used by slide enter/exit shapes.
const SLIDE_OFFSET_PX: f64 = 200.0;
/// Scale amplitude of the pulse loop.
const PULSE_AMPLITUDE: f64 = 0.05;
/// Rotation amplitude of the wiggle loop, in radians.
const WIGGLE_AMPLITUDE_RAD: f64 = 0.06;
/// Vertical drift amplitude of the float loop, in pixels.
const FLOAT_AMPLITUDE_PX: f64 = 8.0;
/// Horizontal jitter amplitude of the shake loop, in pixels.
const SHAKE_AMPLITUDE_PX: f64 = 4.0;
/// Opacity floor during the dark half of the blink loop.
const BLINK_FLOOR: f64 = 0.25;

/// Sampled animation state for one element at one timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimState {
    /// Opacity multiplier in `[0, 1]`, applied on top of the element's own opacity.
    pub opacity: f64,
    /// Translation in canvas pixels.
    pub translate: Vec2,
    /// Per-axis scale about the pivot.
    pub scale: Vec2,
    /// Rotation about the pivot in radians.
    pub rotate_rad: f64,
}

impl Default for AnimState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            translate: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            rotate_rad: 0.0,
        }
    }
}

impl AnimState {
    /// Build the 2D transform for this state about `pivot` (usually the element center).
    pub fn to_affine(&self, pivot: Point) -> Affine {
        Affine::translate(self.translate)
            * Affine::translate(pivot.to_vec2())
            * Affine::rotate(self.rotate_rad)
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(-pivot.to_vec2())
    }
}

/// Sample `spec` at `relative_time` seconds into a window of `duration` seconds.
///
/// Pure: the same `(spec, relative_time, duration)` always yields the same state. Enter and
/// exit shapes can overlap on short windows; their contributions compose (opacity multiplies,
/// transforms stack).
pub fn sample(spec: &AnimationSpec, relative_time: f64, duration: f64) -> AnimState {
    let mut state = AnimState::default();
    if !relative_time.is_finite() || !duration.is_finite() || duration <= 0.0 {
        return state;
    }

    let enter_p = if spec.enter == EnterKind::None || spec.enter_sec <= 0.0 {
        1.0
    } else {
        (relative_time / spec.enter_sec).clamp(0.0, 1.0)
    };
    apply_enter(&mut state, spec.enter, enter_p);

    // Exit progress runs from fully-in (1) down to fully-out (0) at the window end.
    let exit_p = if spec.exit == ExitKind::None || spec.exit_sec <= 0.0 {
        1.0
    } else {
        ((duration - relative_time) / spec.exit_sec).clamp(0.0, 1.0)
    };
    apply_exit(&mut state, spec.exit, exit_p);

    apply_loop(&mut state, spec.loop_kind, relative_time * spec.loop_speed);

    state.opacity = state.opacity.clamp(0.0, 1.0);
    state
}

fn apply_enter(state: &mut AnimState, kind: EnterKind, p: f64) {
    match kind {
        EnterKind::None => {}
        EnterKind::Fade => state.opacity *= p,
        EnterKind::SlideLeft => {
            state.translate.x += -SLIDE_OFFSET_PX * (1.0 - p);
            state.opacity *= p;
        }
        EnterKind::SlideRight => {
            state.translate.x += SLIDE_OFFSET_PX * (1.0 - p);
            state.opacity *= p;
        }
        EnterKind::SlideUp => {
            state.translate.y += -SLIDE_OFFSET_PX * (1.0 - p);
            state.opacity *= p;
        }
        EnterKind::SlideDown => {
            state.translate.y += SLIDE_OFFSET_PX * (1.0 - p);
            state.opacity *= p;
        }
        EnterKind::ZoomIn => {
            let s = 0.5 + 0.5 * p;
            state.scale = state.scale * s;
            state.opacity *= p;
        }
        EnterKind::ZoomOut => {
            let s = 1.5 - 0.5 * p;
            state.scale = state.scale * s;
            state.opacity *= p;
        }
        EnterKind::Bounce => {
            state.scale = state.scale * ease_out_back(p).max(0.0);
            state.opacity *= p;
        }
        EnterKind::Flip => {
            state.scale.x *= p;
            state.opacity *= p;
        }
        EnterKind::Rotate => {
            state.rotate_rad += -PI * (1.0 - p);
            state.opacity *= p;
        }
    }
}

fn apply_exit(state: &mut AnimState, kind: ExitKind, p: f64) {
    match kind {
        ExitKind::None => {}
        ExitKind::Fade => state.opacity *= p,
        ExitKind::SlideLeft => {
            state.translate.x += -SLIDE_OFFSET_PX * (1.0 - p);
            state.opacity *= p;
        }
        ExitKind::SlideRight => {
            state.translate.x += SLIDE_OFFSET_PX * (1.0 - p);
            state.opacity *= p;
        }
        ExitKind::SlideUp => {
            state.translate.y += -SLIDE_OFFSET_PX * (1.0 - p);
            state.opacity *= p;
        }
        ExitKind::SlideDown => {
            state.translate.y += SLIDE_OFFSET_PX * (1.0 - p);
            state.opacity *= p;
        }
        ExitKind::ZoomIn => {
            let s = 0.5 + 0.5 * p;
            state.scale = state.scale * s;
            state.opacity *= p;
        }
        ExitKind::ZoomOut => {
            let s = 1.5 - 0.5 * p;
            state.scale = state.scale * s;
            state.opacity *= p;
        }
        ExitKind::Bounce => {
            state.scale = state.scale * ease_out_back(p).max(0.0);
            state.opacity *= p;
        }
        ExitKind::Flip => {
            state.scale.x *= p;
            state.opacity *= p;
        }
        ExitKind::Rotate => {
            state.rotate_rad += PI * (1.0 - p);
            state.opacity *= p;
        }
    }
}

fn apply_loop(state: &mut AnimState, kind: LoopKind, phase: f64) {
    let cycle = phase * 2.0 * PI;
    match kind {
        LoopKind::None => {}
        LoopKind::Pulse => {
            state.scale = state.scale * (1.0 + PULSE_AMPLITUDE * cycle.sin());
        }
        LoopKind::Wiggle => {
            state.rotate_rad += WIGGLE_AMPLITUDE_RAD * (cycle * 2.0).sin();
        }
        LoopKind::Float => {
            state.translate.y += FLOAT_AMPLITUDE_PX * (cycle * 0.5).sin();
        }
        LoopKind::Spin => {
            state.rotate_rad += cycle;
        }
        LoopKind::Blink => {
            if phase.rem_euclid(1.0) >= 0.5 {
                state.opacity *= BLINK_FLOOR;
            }
        }
        LoopKind::Shake => {
            state.translate.x += SHAKE_AMPLITUDE_PX * (cycle * 4.0).sin();
        }
    }
}

fn ease_out_back(p: f64) -> f64 {
    const C1: f64 = 1.70158;
    const C3: f64 = C1 + 1.0;
    1.0 + C3 * (p - 1.0).powi(3) + C1 * (p - 1.0).powi(2)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/sample.rs"]
mod tests;
