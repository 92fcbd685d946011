use super::*;
use crate::foundation::core::TimeRange;
use crate::timeline::model::CaptionStyle;

fn track(cues: Vec<CaptionCue>) -> CaptionTrack {
    CaptionTrack {
        id: "captions".to_string(),
        style: CaptionStyle {
            font: None,
            font_size_px: 42.0,
            color: crate::foundation::core::Rgb8::new(255, 255, 255),
            background: None,
            outline: None,
            anchor: CaptionAnchor::Bottom,
        },
        cues,
    }
}

fn cue(text: &str, start: f64, end: f64) -> CaptionCue {
    CaptionCue {
        text: text.to_string(),
        range: TimeRange::new(start, end).unwrap(),
    }
}

#[test]
fn active_cue_matches_inclusive_window() {
    let track = track(vec![cue("one", 1.0, 2.0), cue("two", 3.0, 4.0)]);
    assert!(active_cue(&track, 0.5).is_none());
    assert_eq!(active_cue(&track, 1.0).unwrap().text, "one");
    assert_eq!(active_cue(&track, 2.0).unwrap().text, "one");
    assert!(active_cue(&track, 2.5).is_none());
    assert_eq!(active_cue(&track, 3.5).unwrap().text, "two");
}

#[test]
fn overlapping_cues_resolve_to_the_first() {
    let track = track(vec![cue("first", 0.0, 5.0), cue("second", 2.0, 6.0)]);
    assert_eq!(active_cue(&track, 3.0).unwrap().text, "first");
    assert_eq!(active_cue(&track, 5.5).unwrap().text, "second");
}

#[test]
fn empty_track_has_no_active_cue() {
    assert!(active_cue(&track(vec![]), 1.0).is_none());
}
