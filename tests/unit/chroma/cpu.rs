use super::*;
use crate::foundation::core::Rgb8;

fn green_params() -> ChromaKeyParams {
    ChromaKeyParams {
        key_color: Rgb8::new(0, 255, 0),
        similarity: 0.4,
        smoothness: 0.1,
        spill_suppress: 1.0,
    }
}

fn solid_frame(color: [u8; 4], w: usize, h: usize) -> Vec<u8> {
    color.repeat(w * h)
}

#[test]
fn key_colored_pixels_become_fully_transparent() {
    let src = solid_frame([0, 255, 0, 255], 4, 4);
    let out = CpuKeyer::new().key(&src, 4, 4, &green_params()).unwrap();
    for px in out.chunks_exact(4) {
        assert_eq!(px[3], 0, "green pixel kept alpha {}", px[3]);
        // Premultiplied output: fully transparent means fully black.
        assert_eq!(&px[..3], &[0, 0, 0]);
    }
}

#[test]
fn chroma_distant_pixels_stay_opaque_and_unchanged() {
    let src = solid_frame([255, 0, 0, 255], 4, 4);
    let out = CpuKeyer::new().key(&src, 4, 4, &green_params()).unwrap();
    for px in out.chunks_exact(4) {
        assert_eq!(px, &[255, 0, 0, 255]);
    }
}

#[test]
fn opaque_subject_survives_inside_green_field() {
    let w = 5usize;
    let mut src = solid_frame([0, 255, 0, 255], w, w);
    let center = (2 * w + 2) * 4;
    src[center..center + 4].copy_from_slice(&[200, 30, 40, 255]);

    let out = CpuKeyer::new().key(&src, w as u32, w as u32, &green_params()).unwrap();
    assert_eq!(out[center + 3], 255, "subject pixel was keyed out");
    // A far corner has uniformly transparent neighbors, so edge refinement leaves it alone.
    assert_eq!(out[3], 0);
}

#[test]
fn key_rejects_out_of_range_params() {
    let mut params = green_params();
    params.similarity = 1.5;
    let src = solid_frame([0, 255, 0, 255], 2, 2);
    assert!(CpuKeyer::new().key(&src, 2, 2, &params).is_err());
}

#[test]
fn key_rejects_mismatched_buffer() {
    let src = vec![0u8; 3];
    assert!(CpuKeyer::new().key(&src, 2, 2, &green_params()).is_err());
}

#[test]
fn despill_is_identity_at_full_alpha() {
    let rgb = [0.3, 0.8, 0.4];
    assert_eq!(despill(rgb, 1, 1.0, 1.0), rgb);
}

#[test]
fn despill_is_identity_without_excess() {
    // Green is not dominant in value, nothing to remove.
    let rgb = [0.9, 0.5, 0.6];
    assert_eq!(despill(rgb, 1, 0.5, 1.0), rgb);
}

#[test]
fn despill_caps_dominant_channel_at_low_alpha() {
    let rgb = [0.4, 0.9, 0.5];
    let out = despill(rgb, 1, 0.0, 1.0);
    assert!(
        out[1] <= out[0].max(out[2]) + 1e-6,
        "green {} still dominates ({}, {})",
        out[1],
        out[0],
        out[2]
    );
    assert!(out[1] < rgb[1]);
    assert!(out[0] >= rgb[0] && out[2] >= rgb[2]);
}

#[test]
fn despill_strength_scales_with_suppression() {
    let rgb = [0.4, 0.9, 0.5];
    let strong = despill(rgb, 1, 0.3, 1.0);
    let weak = despill(rgb, 1, 0.3, 0.2);
    assert!(strong[1] < weak[1]);
}

#[test]
fn dominant_channel_follows_key_color() {
    let mut params = green_params();
    assert_eq!(params.key_color_dominant(), 1);
    params.key_color = Rgb8::new(0, 10, 250);
    assert_eq!(params.key_color_dominant(), 2);
    params.key_color = Rgb8::new(250, 10, 0);
    assert_eq!(params.key_color_dominant(), 0);
}

#[test]
fn base_alpha_band_is_smooth() {
    let params = green_params();
    let (_, key_cb, key_cr) = crate::chroma::colorspace::rgb_to_ycbcr(0.0, 1.0, 0.0);

    let a_key = base_alpha(&[0, 255, 0, 255], key_cb, key_cr, &params);
    let a_far = base_alpha(&[255, 0, 0, 255], key_cb, key_cr, &params);
    assert_eq!(a_key, 0.0);
    assert_eq!(a_far, 1.0);

    // With the band widened, a washed-out green lands between the extremes.
    let mut wide = params;
    wide.smoothness = 1.0;
    let a_mid = base_alpha(&[60, 230, 60, 255], key_cb, key_cr, &wide);
    assert!(a_mid > 0.0 && a_mid < 1.0, "mid alpha {a_mid}");
}
