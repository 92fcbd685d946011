use super::*;

#[test]
fn apply_case_transforms() {
    assert_eq!(apply_case("Hello World", TextCase::None), "Hello World");
    assert_eq!(apply_case("Hello World", TextCase::Upper), "HELLO WORLD");
    assert_eq!(apply_case("Hello World", TextCase::Lower), "hello world");
    assert_eq!(
        apply_case("hello brave new world", TextCase::Capitalize),
        "Hello Brave New World"
    );
}

#[test]
fn capitalize_handles_unicode_and_extra_whitespace() {
    assert_eq!(apply_case("über  alles", TextCase::Capitalize), "Über  Alles");
    assert_eq!(apply_case("", TextCase::Capitalize), "");
}

#[test]
fn background_paths_cover_the_text_block() {
    use kurbo::Shape as _;

    let (w, h) = (200.0, 60.0);
    let inner = Rect::new(0.0, 0.0, w, h);
    for shape in [
        BackgroundShape::Rectangle,
        BackgroundShape::Rounded,
        BackgroundShape::Pill,
        BackgroundShape::Bubble,
        BackgroundShape::Marker,
        BackgroundShape::SpeechBubble,
    ] {
        let path = background_path(shape, w, h);
        let bounds = path.bounding_box();
        assert!(
            bounds.width() >= inner.width(),
            "{shape:?} narrower than text block"
        );
        assert!(!path.elements().is_empty());
    }
}

#[test]
fn underline_background_sits_below_the_block() {
    use kurbo::Shape as _;

    let path = background_path(BackgroundShape::Underline, 200.0, 60.0);
    let bounds = path.bounding_box();
    assert!(bounds.y0 >= 60.0, "underline bar overlaps the text block");
    assert!(bounds.height() > 0.0);
}

#[test]
fn text_brush_carries_full_alpha() {
    let brush = TextBrush::from_rgb8(Rgb8::new(10, 20, 30));
    assert_eq!((brush.r, brush.g, brush.b, brush.a), (10, 20, 30, 255));
}

#[test]
fn shaper_rejects_bad_sizes() {
    let mut shaper = TextShaper::new();
    assert!(
        shaper
            .layout_plain("x", &[], 0.0, TextBrush::default(), None)
            .is_err()
    );
    assert!(
        shaper
            .layout_plain("x", &[], f32::NAN, TextBrush::default(), None)
            .is_err()
    );
}
