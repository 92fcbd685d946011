//! Resource preparation: media probing/decoding and the per-export asset store.

pub mod media;
pub mod store;

pub use media::{AudioPcm, MIX_SAMPLE_RATE, VideoSourceInfo};
pub use store::PreparedAssets;
