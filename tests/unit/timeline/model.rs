use super::*;
use crate::foundation::core::{Resolution, Rgb8};

fn project_json(duration: f64) -> String {
    format!(
        r#"{{
            "name": "demo",
            "resolution": {{ "width": 1920, "height": 1080 }},
            "duration_sec": {duration},
            "media": [
                {{
                    "id": "clip-1",
                    "source": "footage.mp4",
                    "kind": "Video",
                    "placement": {{ "range": {{ "start_sec": 0.0, "end_sec": 5.0 }}, "row": 0 }}
                }}
            ],
            "texts": [
                {{
                    "id": "title",
                    "content": "Hello",
                    "font_size_px": 64.0,
                    "color": {{ "r": 255, "g": 255, "b": 255 }},
                    "placement": {{ "range": {{ "start_sec": 1.0, "end_sec": 4.0 }}, "row": 1 }}
                }}
            ]
        }}"#
    )
}

#[test]
fn project_deserializes_with_defaults() {
    let project: Project = serde_json::from_str(&project_json(10.0)).unwrap();
    project.validate().unwrap();

    assert_eq!(project.background, Rgb8::new(0, 0, 0));
    assert_eq!(project.resolution, Resolution { width: 1920, height: 1080 });
    assert!(project.chats.is_empty());
    assert!(project.caption_tracks.is_empty());

    let clip = &project.media[0];
    assert_eq!(clip.placement.opacity_pct, 100.0);
    assert_eq!(clip.volume_pct, 100.0);
    assert_eq!(clip.trim_start_sec, 0.0);
    assert!(clip.chroma_key.is_none());
    assert_eq!(clip.animation, AnimationSpec::default());

    let text = &project.texts[0];
    assert_eq!(text.case, TextCase::None);
    assert!(!text.underline);
}

#[test]
fn validate_rejects_zero_canvas_and_bad_duration() {
    let mut project: Project = serde_json::from_str(&project_json(10.0)).unwrap();
    project.resolution.width = 0;
    assert!(project.validate().is_err());

    let mut project: Project = serde_json::from_str(&project_json(10.0)).unwrap();
    project.duration_sec = 0.0;
    assert!(project.validate().is_err());
}

#[test]
fn validate_rejects_blank_text_content() {
    let mut project: Project = serde_json::from_str(&project_json(10.0)).unwrap();
    project.texts[0].content = "   ".to_string();
    assert!(project.validate().is_err());
}

#[test]
fn validate_rejects_negative_trim_and_volume() {
    let mut project: Project = serde_json::from_str(&project_json(10.0)).unwrap();
    project.media[0].trim_start_sec = -0.5;
    assert!(project.validate().is_err());

    let mut project: Project = serde_json::from_str(&project_json(10.0)).unwrap();
    project.media[0].volume_pct = f64::NAN;
    assert!(project.validate().is_err());
}

#[test]
fn rejected_retime_keeps_prior_window() {
    let mut placement = Placement::new(1.0, 5.0, 0).unwrap();
    let before = placement.range;

    assert!(placement.set_range(6.0, 2.0).is_err());
    assert_eq!(placement.range, before);

    placement.set_range(2.0, 8.0).unwrap();
    assert_eq!(placement.range.start_sec, 2.0);
    assert_eq!(placement.range.end_sec, 8.0);
}

#[test]
fn rejected_cue_retime_keeps_prior_window() {
    let mut cue = CaptionCue {
        text: "hi".to_string(),
        range: crate::foundation::core::TimeRange::new(0.0, 2.0).unwrap(),
    };
    assert!(cue.set_range(3.0, 3.0).is_err());
    assert_eq!(cue.range.start_sec, 0.0);
    assert_eq!(cue.range.end_sec, 2.0);
}

#[test]
fn geometry_rect_matches_fields() {
    let g = Geometry {
        x: 10.0,
        y: 20.0,
        width: 100.0,
        height: 50.0,
    };
    let r = g.rect();
    assert_eq!((r.x0, r.y0, r.x1, r.y1), (10.0, 20.0, 110.0, 70.0));
}

#[test]
fn clip_gain_clamps_volume() {
    let mut project: Project = serde_json::from_str(&project_json(10.0)).unwrap();
    project.media[0].volume_pct = 250.0;
    assert_eq!(project.media[0].gain(), 1.0);
    project.media[0].volume_pct = 50.0;
    assert!((project.media[0].gain() - 0.5).abs() < 1e-6);
}
