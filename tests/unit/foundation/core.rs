use super::*;

#[test]
fn time_range_rejects_inverted_and_degenerate_windows() {
    assert!(TimeRange::new(1.0, 5.0).is_ok());
    assert!(TimeRange::new(5.0, 5.0).is_err());
    assert!(TimeRange::new(5.0, 1.0).is_err());
    assert!(TimeRange::new(-1.0, 5.0).is_err());
    assert!(TimeRange::new(f64::NAN, 5.0).is_err());
    assert!(TimeRange::new(0.0, f64::INFINITY).is_err());
}

#[test]
fn time_range_contains_is_inclusive_on_both_ends() {
    let range = TimeRange::new(2.0, 4.0).unwrap();
    assert!(range.contains(2.0));
    assert!(range.contains(3.0));
    assert!(range.contains(4.0));
    assert!(!range.contains(1.999));
    assert!(!range.contains(4.001));
}

#[test]
fn time_range_duration() {
    let range = TimeRange::new(1.5, 4.0).unwrap();
    assert!((range.duration_sec() - 2.5).abs() < 1e-12);
}

#[test]
fn total_frames_rounds_up() {
    assert_eq!(total_frames(10.0, 30), 300);
    assert_eq!(total_frames(1.01, 30), 31);
    assert_eq!(total_frames(0.001, 24), 1);
    assert_eq!(total_frames(0.0, 60), 0);
}

#[test]
fn resolution_rect_spans_canvas() {
    let r = Resolution {
        width: 1920,
        height: 1080,
    };
    assert_eq!(r.rect(), Rect::new(0.0, 0.0, 1920.0, 1080.0));
}
