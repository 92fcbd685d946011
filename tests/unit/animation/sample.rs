use super::*;
use crate::animation::spec::{AnimationSpec, EnterKind, ExitKind, LoopKind};

fn fade_in(enter_sec: f64) -> AnimationSpec {
    AnimationSpec {
        enter: EnterKind::Fade,
        enter_sec,
        ..AnimationSpec::default()
    }
}

#[test]
fn default_spec_samples_to_identity() {
    let state = sample(&AnimationSpec::default(), 1.0, 4.0);
    assert_eq!(state, AnimState::default());
}

#[test]
fn fade_enter_is_linear() {
    let spec = fade_in(0.5);
    assert!((sample(&spec, 0.0, 2.0).opacity - 0.0).abs() < 1e-12);
    assert!((sample(&spec, 0.25, 2.0).opacity - 0.5).abs() < 1e-12);
    assert!((sample(&spec, 0.5, 2.0).opacity - 1.0).abs() < 1e-12);
    assert!((sample(&spec, 1.5, 2.0).opacity - 1.0).abs() < 1e-12);
}

#[test]
fn fade_exit_runs_against_window_end() {
    let spec = AnimationSpec {
        exit: ExitKind::Fade,
        exit_sec: 1.0,
        ..AnimationSpec::default()
    };
    assert!((sample(&spec, 1.0, 2.0).opacity - 1.0).abs() < 1e-12);
    assert!((sample(&spec, 1.5, 2.0).opacity - 0.5).abs() < 1e-12);
    assert!((sample(&spec, 2.0, 2.0).opacity - 0.0).abs() < 1e-12);
}

#[test]
fn short_window_composes_enter_and_exit() {
    // 0.5s window with 0.5s fades on both ends: opacity is the product of the ramps.
    let spec = AnimationSpec {
        enter: EnterKind::Fade,
        enter_sec: 0.5,
        exit: ExitKind::Fade,
        exit_sec: 0.5,
        ..AnimationSpec::default()
    };
    let state = sample(&spec, 0.25, 0.5);
    assert!((state.opacity - 0.25).abs() < 1e-12);
}

#[test]
fn slide_enter_offsets_translation_and_settles() {
    let spec = AnimationSpec {
        enter: EnterKind::SlideLeft,
        enter_sec: 1.0,
        ..AnimationSpec::default()
    };
    let mid = sample(&spec, 0.5, 4.0);
    assert!(mid.translate.x < 0.0);
    let done = sample(&spec, 1.0, 4.0);
    assert_eq!(done.translate.x, 0.0);
}

#[test]
fn zoom_enter_scales_up_to_natural_size() {
    let spec = AnimationSpec {
        enter: EnterKind::ZoomIn,
        enter_sec: 1.0,
        ..AnimationSpec::default()
    };
    let start = sample(&spec, 0.0, 4.0);
    assert!((start.scale.x - 0.5).abs() < 1e-12);
    let done = sample(&spec, 1.0, 4.0);
    assert!((done.scale.x - 1.0).abs() < 1e-12);
}

#[test]
fn spin_loop_rotation_grows_with_time() {
    let spec = AnimationSpec {
        loop_kind: LoopKind::Spin,
        loop_speed: 1.0,
        ..AnimationSpec::default()
    };
    let a = sample(&spec, 0.25, 10.0).rotate_rad;
    let b = sample(&spec, 0.5, 10.0).rotate_rad;
    assert!(b > a);
}

#[test]
fn blink_loop_dips_opacity_in_second_half_cycle() {
    let spec = AnimationSpec {
        loop_kind: LoopKind::Blink,
        loop_speed: 1.0,
        ..AnimationSpec::default()
    };
    assert!((sample(&spec, 0.25, 10.0).opacity - 1.0).abs() < 1e-12);
    assert!(sample(&spec, 0.75, 10.0).opacity < 1.0);
}

#[test]
fn sampling_is_pure() {
    let spec = AnimationSpec {
        enter: EnterKind::Bounce,
        enter_sec: 0.7,
        exit: ExitKind::SlideDown,
        exit_sec: 0.4,
        loop_kind: LoopKind::Wiggle,
        loop_speed: 2.0,
        ..AnimationSpec::default()
    };
    let first = sample(&spec, 0.33, 3.0);
    for _ in 0..10 {
        assert_eq!(sample(&spec, 0.33, 3.0), first);
    }
}

#[test]
fn degenerate_inputs_sample_to_identity() {
    let spec = fade_in(0.5);
    assert_eq!(sample(&spec, 0.25, 0.0), AnimState::default());
    assert_eq!(sample(&spec, f64::NAN, 2.0), AnimState::default());
    assert_eq!(sample(&spec, 0.25, f64::INFINITY), AnimState::default());
}

#[test]
fn to_affine_of_identity_state_is_identity() {
    let affine = AnimState::default().to_affine(Point::new(100.0, 50.0));
    let p = affine * Point::new(3.0, 7.0);
    assert!((p.x - 3.0).abs() < 1e-9);
    assert!((p.y - 7.0).abs() < 1e-9);
}

#[test]
fn to_affine_scales_about_the_pivot() {
    let state = AnimState {
        scale: Vec2::new(2.0, 2.0),
        ..AnimState::default()
    };
    let pivot = Point::new(10.0, 10.0);
    let affine = state.to_affine(pivot);
    // Pivot is fixed, other points move away from it.
    let at_pivot = affine * pivot;
    assert!((at_pivot.x - 10.0).abs() < 1e-9);
    assert!((at_pivot.y - 10.0).abs() < 1e-9);
    let moved = affine * Point::new(11.0, 10.0);
    assert!((moved.x - 12.0).abs() < 1e-9);
}
