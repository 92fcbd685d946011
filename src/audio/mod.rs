//! Audio mixing for export: per-clip gain into one shared stereo mix.

pub mod mix;

pub use mix::{AudioManifest, AudioSegment, build_audio_manifest, mix_manifest};
