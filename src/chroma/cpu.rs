//! CPU chroma-key back end.
//!
//! Runs the shared keying algorithm in two row-parallel passes: pass one computes each pixel's
//! base alpha from chroma-plane distance, pass two refines edges against the four direct
//! neighbors, suppresses spill, desaturates residual fringing and writes premultiplied output.

use rayon::prelude::*;

use crate::chroma::colorspace::rgb_to_ycbcr;
use crate::chroma::{ChromaKeyParams, ChromaKeyer, check_dims};
use crate::foundation::error::GreenroomResult;
use crate::foundation::math::{lerp_f32, mul_div255_u8, smoothstep};

/// Alpha variance among direct neighbors above which a pixel is blended toward them.
const EDGE_VARIANCE_CUTOFF: f32 = 0.02;
/// Blend factor applied when edge refinement triggers.
const EDGE_BLEND: f32 = 0.5;
/// Fraction of the removed spill redistributed into each of the other two channels.
const SPILL_REDISTRIBUTE: f32 = 0.25;
/// Strength of the luma-gray desaturation applied to semi-transparent pixels.
const DESATURATE_FACTOR: f32 = 0.4;

/// Always-available CPU keyer.
#[derive(Debug, Default)]
pub struct CpuKeyer;

impl CpuKeyer {
    /// Construct the CPU back end.
    pub fn new() -> Self {
        Self
    }
}

impl ChromaKeyer for CpuKeyer {
    fn key(
        &mut self,
        src_rgba8: &[u8],
        width: u32,
        height: u32,
        params: &ChromaKeyParams,
    ) -> GreenroomResult<Vec<u8>> {
        check_dims(src_rgba8.len(), width, height)?;
        params.validate()?;

        let w = width as usize;
        let h = height as usize;
        let (_, key_cb, key_cr) = rgb_to_ycbcr(
            f32::from(params.key_color.r) / 255.0,
            f32::from(params.key_color.g) / 255.0,
            f32::from(params.key_color.b) / 255.0,
        );

        let mut alpha = vec![0.0f32; w * h];
        alpha
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, alpha_row)| {
                let row = &src_rgba8[y * w * 4..(y + 1) * w * 4];
                for (x, px) in row.chunks_exact(4).enumerate() {
                    alpha_row[x] = base_alpha(px, key_cb, key_cr, params);
                }
            });

        let mut out = vec![0u8; src_rgba8.len()];
        out.par_chunks_mut(w * 4)
            .enumerate()
            .for_each(|(y, out_row)| {
                let src_row = &src_rgba8[y * w * 4..(y + 1) * w * 4];
                for x in 0..w {
                    let mut a = alpha[y * w + x];
                    a = refine_edge(a, x, y, w, h, &alpha);

                    let px = &src_row[x * 4..x * 4 + 4];
                    let mut rgb = [
                        f32::from(px[0]) / 255.0,
                        f32::from(px[1]) / 255.0,
                        f32::from(px[2]) / 255.0,
                    ];
                    if a > 0.1 && a < 0.9 {
                        rgb = despill(rgb, params.key_color_dominant(), a, params.spill_suppress);
                    }
                    if a > 0.0 && a < 0.9 {
                        rgb = desaturate(rgb, a);
                    }

                    let a8 = (a * 255.0).floor().clamp(0.0, 255.0) as u8;
                    let o = &mut out_row[x * 4..x * 4 + 4];
                    for c in 0..3 {
                        let c8 = (rgb[c].clamp(0.0, 1.0) * 255.0).round() as u16;
                        o[c] = mul_div255_u8(c8, u16::from(a8));
                    }
                    o[3] = a8;
                }
            });

        Ok(out)
    }

    fn name(&self) -> &'static str {
        "cpu"
    }
}

/// Map one straight-alpha pixel to a base alpha via chroma-plane distance.
///
/// Luminance is intentionally ignored so shadows and highlights on the key color still key out.
fn base_alpha(px: &[u8], key_cb: f32, key_cr: f32, params: &ChromaKeyParams) -> f32 {
    let (_, cb, cr) = rgb_to_ycbcr(
        f32::from(px[0]) / 255.0,
        f32::from(px[1]) / 255.0,
        f32::from(px[2]) / 255.0,
    );
    let d = ((cb - key_cb).powi(2) + (cr - key_cr).powi(2)).sqrt();
    let threshold = params.similarity * 0.5;
    if d >= threshold {
        1.0
    } else {
        smoothstep(threshold * (1.0 - params.smoothness), threshold, d)
    }
}

/// Blend a pixel's alpha toward its four direct neighbors when their alphas disagree strongly.
///
/// Without this, the distance threshold alone produces visible stair-stepping on diagonal edges.
fn refine_edge(a: f32, x: usize, y: usize, w: usize, h: usize, alpha: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    let mut count = 0u32;
    let mut neighbors = [0.0f32; 4];
    if x > 0 {
        neighbors[count as usize] = alpha[y * w + x - 1];
        sum += neighbors[count as usize];
        count += 1;
    }
    if x + 1 < w {
        neighbors[count as usize] = alpha[y * w + x + 1];
        sum += neighbors[count as usize];
        count += 1;
    }
    if y > 0 {
        neighbors[count as usize] = alpha[(y - 1) * w + x];
        sum += neighbors[count as usize];
        count += 1;
    }
    if y + 1 < h {
        neighbors[count as usize] = alpha[(y + 1) * w + x];
        sum += neighbors[count as usize];
        count += 1;
    }
    if count == 0 {
        return a;
    }

    let mean = sum / count as f32;
    let mut variance = 0.0f32;
    for &n in &neighbors[..count as usize] {
        variance += (n - mean) * (n - mean);
    }
    variance /= count as f32;

    if variance > EDGE_VARIANCE_CUTOFF {
        lerp_f32(a, mean, EDGE_BLEND)
    } else {
        a
    }
}

/// Shrink the key color's dominant channel toward the other two on semi-transparent pixels.
///
/// A fraction of the removed amount is redistributed into the other two channels so
/// despilled edges do not end up visibly darker than their surroundings.
pub(crate) fn despill(rgb: [f32; 3], dominant: usize, alpha: f32, spill_suppress: f32) -> [f32; 3] {
    let mut out = rgb;
    let others: [usize; 2] = match dominant {
        0 => [1, 2],
        1 => [0, 2],
        _ => [0, 1],
    };
    let excess = rgb[dominant] - rgb[others[0]].max(rgb[others[1]]);
    if excess <= 0.0 {
        return out;
    }

    let cut = excess * (1.0 - alpha) * spill_suppress;
    out[dominant] = (out[dominant] - cut).clamp(0.0, 1.0);
    for o in others {
        out[o] = (out[o] + cut * SPILL_REDISTRIBUTE).clamp(0.0, 1.0);
    }
    out
}

/// Pull a semi-transparent pixel toward its luma gray to hide residual color fringing.
fn desaturate(rgb: [f32; 3], alpha: f32) -> [f32; 3] {
    let gray = 0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2];
    let t = (1.0 - alpha) * DESATURATE_FACTOR;
    [
        lerp_f32(rgb[0], gray, t),
        lerp_f32(rgb[1], gray, t),
        lerp_f32(rgb[2], gray, t),
    ]
}

impl ChromaKeyParams {
    /// Index of the key color's strongest channel (0 = red, 1 = green, 2 = blue).
    pub(crate) fn key_color_dominant(&self) -> usize {
        let c = [self.key_color.r, self.key_color.g, self.key_color.b];
        let mut best = 0;
        for i in 1..3 {
            if c[i] > c[best] {
                best = i;
            }
        }
        best
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chroma/cpu.rs"]
mod tests;
