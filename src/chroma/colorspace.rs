//! RGB <-> YCbCr conversion and hex color parsing.
//!
//! Both keyer back ends share these functions so their segmentation math cannot drift apart.
//! Coefficients are ITU-R BT.601; all channels are normalized to `[0, 1]` and the chroma planes
//! carry a `+0.5` bias so a neutral gray sits at `(cb, cr) = (0.5, 0.5)`.

use crate::foundation::core::Rgb8;
use crate::foundation::error::{GreenroomError, GreenroomResult};

/// Convert normalized RGB to YCbCr (BT.601, chroma biased by `+0.5`).
pub fn rgb_to_ycbcr(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = -0.168_736 * r - 0.331_264 * g + 0.5 * b + 0.5;
    let cr = 0.5 * r - 0.418_688 * g - 0.081_312 * b + 0.5;
    (y, cb, cr)
}

/// Inverse of [`rgb_to_ycbcr`]. Output channels are clamped to `[0, 1]`.
pub fn ycbcr_to_rgb(y: f32, cb: f32, cr: f32) -> (f32, f32, f32) {
    let cb = cb - 0.5;
    let cr = cr - 0.5;
    let r = y + 1.402 * cr;
    let g = y - 0.344_136 * cb - 0.714_136 * cr;
    let b = y + 1.772 * cb;
    (r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
}

/// Parse a 3- or 6-digit hex color, with or without a leading `#`. No alpha channel.
pub fn hex_to_rgb(hex: &str) -> GreenroomResult<Rgb8> {
    let s = hex.trim().trim_start_matches('#');
    let expand = |c: u8| (c << 4) | c;

    match s.len() {
        3 => {
            let r = hex_nibble(s.as_bytes()[0], hex)?;
            let g = hex_nibble(s.as_bytes()[1], hex)?;
            let b = hex_nibble(s.as_bytes()[2], hex)?;
            Ok(Rgb8::new(expand(r), expand(g), expand(b)))
        }
        6 => {
            let byte = |i: usize| -> GreenroomResult<u8> {
                let hi = hex_nibble(s.as_bytes()[i], hex)?;
                let lo = hex_nibble(s.as_bytes()[i + 1], hex)?;
                Ok((hi << 4) | lo)
            };
            Ok(Rgb8::new(byte(0)?, byte(2)?, byte(4)?))
        }
        _ => Err(GreenroomError::validation(format!(
            "hex color '{hex}' must have 3 or 6 digits"
        ))),
    }
}

fn hex_nibble(c: u8, full: &str) -> GreenroomResult<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(GreenroomError::validation(format!(
            "hex color '{full}' contains a non-hex digit"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chroma/colorspace.rs"]
mod tests;
