//! Chroma keying: remove a solid background color from a source image and suppress color spill.
//!
//! Two back ends implement the same contract behind [`ChromaKeyer`]: a CPU path that is always
//! available, and an optional GPU compute path (feature `gpu`). Back-end selection is a
//! capability fallback, not a user choice: [`create_keyer`] probes GPU availability once per
//! process and falls back to the CPU path permanently on any initialization failure.
//!
//! The two back ends deliberately keep their historical threshold conventions: the CPU path maps
//! `similarity` to a distance threshold of `similarity * 0.5`, while the GPU path uses
//! `(1 - similarity) * 0.4`, biasing it toward more aggressive keying. They agree at the
//! extremes (key-colored pixels key out, chroma-distant pixels stay opaque) but can differ in
//! the partial band at the same parameter value.

pub mod colorspace;
pub mod cpu;
#[cfg(feature = "gpu")]
pub mod gpu;

use std::sync::OnceLock;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{GreenroomError, GreenroomResult};

/// Per-clip chroma key parameters. Immutable for the duration of one export.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChromaKeyParams {
    /// Background color to remove.
    pub key_color: Rgb8,
    /// Keying tolerance in `[0, 1]`.
    pub similarity: f32,
    /// Width of the partial-transparency band in `[0, 1]`.
    pub smoothness: f32,
    /// Strength of spill suppression on semi-transparent pixels in `[0, 1]`.
    pub spill_suppress: f32,
}

impl ChromaKeyParams {
    /// Validate that all scalar parameters are finite and in `[0, 1]`.
    pub fn validate(&self) -> GreenroomResult<()> {
        for (name, v) in [
            ("similarity", self.similarity),
            ("smoothness", self.smoothness),
            ("spill_suppress", self.spill_suppress),
        ] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(GreenroomError::validation(format!(
                    "chroma key {name} must be in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// A chroma-key back end.
///
/// `key` consumes a straight-alpha RGBA8 image and produces a premultiplied-alpha RGBA8 image
/// of the same dimensions, ready for source-over compositing.
pub trait ChromaKeyer: Send {
    /// Remove `params.key_color` from `src_rgba8` (straight alpha, row-major, `w * h * 4` bytes).
    fn key(
        &mut self,
        src_rgba8: &[u8],
        width: u32,
        height: u32,
        params: &ChromaKeyParams,
    ) -> GreenroomResult<Vec<u8>>;

    /// Back-end name for diagnostics.
    fn name(&self) -> &'static str;
}

static GPU_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Create the best available keyer for this process.
///
/// The GPU probe runs at most once per process lifetime; after the first failure every
/// subsequent call returns the CPU back end without re-probing. GPU init failure is never
/// surfaced to the caller.
pub fn create_keyer() -> Box<dyn ChromaKeyer> {
    #[cfg(feature = "gpu")]
    {
        let available = *GPU_AVAILABLE.get_or_init(|| match gpu::GpuKeyer::new() {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("gpu keyer unavailable, using cpu path: {e}");
                false
            }
        });
        if available {
            match gpu::GpuKeyer::new() {
                Ok(keyer) => return Box::new(keyer),
                Err(e) => {
                    tracing::debug!("gpu keyer init failed after successful probe: {e}");
                }
            }
        }
    }
    #[cfg(not(feature = "gpu"))]
    {
        let _ = &GPU_AVAILABLE;
    }
    Box::new(cpu::CpuKeyer::new())
}

pub(crate) fn check_dims(src_len: usize, width: u32, height: u32) -> GreenroomResult<()> {
    let expected = width as usize * height as usize * 4;
    if src_len != expected || expected == 0 {
        return Err(GreenroomError::render(format!(
            "chroma key source has {src_len} bytes, expected {expected} for {width}x{height}"
        )));
    }
    Ok(())
}
