use super::*;

fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < 2e-3, "{a} != {b}");
}

#[test]
fn gray_has_neutral_chroma() {
    let (y, cb, cr) = rgb_to_ycbcr(0.5, 0.5, 0.5);
    assert_close(y, 0.5);
    assert_close(cb, 0.5);
    assert_close(cr, 0.5);
}

#[test]
fn ycbcr_roundtrips_primaries() {
    for (r, g, b) in [
        (1.0, 0.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, 0.0, 1.0),
        (0.2, 0.7, 0.4),
    ] {
        let (y, cb, cr) = rgb_to_ycbcr(r, g, b);
        let (r2, g2, b2) = ycbcr_to_rgb(y, cb, cr);
        assert_close(r, r2);
        assert_close(g, g2);
        assert_close(b, b2);
    }
}

#[test]
fn pure_green_sits_far_from_neutral_chroma() {
    let (_, cb, cr) = rgb_to_ycbcr(0.0, 1.0, 0.0);
    let d = ((cb - 0.5).powi(2) + (cr - 0.5).powi(2)).sqrt();
    assert!(d > 0.4, "green chroma distance {d} too small");
}

#[test]
fn hex_parses_six_digits() {
    assert_eq!(hex_to_rgb("#00ff00").unwrap(), Rgb8::new(0, 255, 0));
    assert_eq!(hex_to_rgb("1A2b3C").unwrap(), Rgb8::new(26, 43, 60));
}

#[test]
fn hex_parses_three_digits_by_expansion() {
    assert_eq!(hex_to_rgb("#0f0").unwrap(), Rgb8::new(0, 255, 0));
    assert_eq!(hex_to_rgb("abc").unwrap(), Rgb8::new(0xaa, 0xbb, 0xcc));
}

#[test]
fn hex_rejects_bad_input() {
    assert!(hex_to_rgb("#00ff0").is_err());
    assert!(hex_to_rgb("zzzzzz").is_err());
    assert!(hex_to_rgb("").is_err());
}
