use super::*;
use crate::animation::spec::AnimationSpec;
use crate::foundation::core::{Resolution, Rgb8};
use crate::timeline::model::{MediaKind, TextCase};

fn clip(id: &str, start: f64, end: f64, row: u32) -> MediaClip {
    MediaClip {
        id: id.to_string(),
        source: format!("{id}.png"),
        kind: MediaKind::Image,
        placement: Placement::new(start, end, row).unwrap(),
        geometry: None,
        trim_start_sec: 0.0,
        volume_pct: 100.0,
        chroma_key: None,
        animation: AnimationSpec::default(),
    }
}

fn text(id: &str, start: f64, end: f64, row: u32) -> TextOverlay {
    TextOverlay {
        id: id.to_string(),
        content: "hello".to_string(),
        font: None,
        font_size_px: 48.0,
        color: Rgb8::new(255, 255, 255),
        case: TextCase::None,
        background: None,
        outline: None,
        underline: false,
        placement: Placement::new(start, end, row).unwrap(),
        geometry: None,
        animation: AnimationSpec::default(),
    }
}

fn project(media: Vec<MediaClip>, texts: Vec<TextOverlay>) -> Project {
    Project {
        name: "test".to_string(),
        resolution: Resolution {
            width: 640,
            height: 360,
        },
        duration_sec: 10.0,
        background: Rgb8::new(0, 0, 0),
        media,
        texts,
        chats: Vec::new(),
        caption_tracks: Vec::new(),
    }
}

fn ids<'a>(refs: &[ElementRef<'a>]) -> Vec<&'a str> {
    refs.iter()
        .map(|e| match e {
            ElementRef::Media(c) => c.id.as_str(),
            ElementRef::Text(t) => t.id.as_str(),
            ElementRef::Chat(c) => c.id.as_str(),
        })
        .collect()
}

#[test]
fn effective_z_derives_from_row_unless_overridden() {
    let mut placement = Placement::new(0.0, 1.0, 0).unwrap();
    assert_eq!(effective_z(&placement), 1000);
    placement.row = 1;
    assert_eq!(effective_z(&placement), 990);
    placement.z_index = Some(42);
    assert_eq!(effective_z(&placement), 42);
}

#[test]
fn effective_z_handles_extreme_rows() {
    let mut placement = Placement::new(0.0, 1.0, u32::MAX).unwrap();
    assert_eq!(effective_z(&placement), 1000 - i64::from(u32::MAX) * 10);
    placement.z_index = Some(i32::MIN);
    assert_eq!(effective_z(&placement), i64::from(i32::MIN));
}

#[test]
fn visibility_is_inclusive_on_both_window_ends() {
    let p = project(vec![clip("a", 2.0, 4.0, 0)], vec![]);
    assert!(visible_at(1.999, &p).is_empty());
    assert_eq!(visible_at(2.0, &p).len(), 1);
    assert_eq!(visible_at(4.0, &p).len(), 1);
    assert!(visible_at(4.001, &p).is_empty());
}

#[test]
fn lower_rows_paint_in_front() {
    // Row 1 resolves to z 990, row 0 to z 1000, so the row-1 clip paints first.
    let p = project(
        vec![clip("front", 0.0, 5.0, 0), clip("back", 0.0, 5.0, 1)],
        vec![],
    );
    assert_eq!(ids(&visible_at(1.0, &p)), vec!["back", "front"]);
}

#[test]
fn explicit_z_overrides_row_order() {
    let mut top = clip("top", 0.0, 5.0, 3);
    top.placement.z_index = Some(5000);
    let p = project(vec![top, clip("base", 0.0, 5.0, 0)], vec![]);
    assert_eq!(ids(&visible_at(1.0, &p)), vec!["base", "top"]);
}

#[test]
fn equal_z_ties_keep_input_order() {
    let p = project(
        vec![clip("m1", 0.0, 5.0, 0), clip("m2", 0.0, 5.0, 0)],
        vec![text("t1", 0.0, 5.0, 0)],
    );
    assert_eq!(ids(&visible_at(1.0, &p)), vec!["m1", "m2", "t1"]);
}

#[test]
fn resolution_is_deterministic() {
    let p = project(
        vec![
            clip("a", 0.0, 5.0, 2),
            clip("b", 1.0, 6.0, 0),
            clip("c", 0.0, 9.0, 1),
        ],
        vec![text("t", 0.0, 9.0, 4)],
    );
    let first = ids(&visible_at(3.0, &p));
    for _ in 0..10 {
        assert_eq!(ids(&visible_at(3.0, &p)), first);
    }
    assert_eq!(first, vec!["t", "a", "c", "b"]);
}
