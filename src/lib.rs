//! Greenroom: a timeline-driven video compositor with chroma keying.
//!
//! A [`timeline::model::Project`] describes a canvas, a duration and a set of timed elements:
//! media clips (optionally chroma-keyed), text overlays, chat simulations and caption tracks.
//! [`render::FrameCompositor`] resolves the scene graph at any timestamp and paints one
//! premultiplied RGBA frame; [`export::ExportSession`] drives the full render-and-encode loop
//! into an alpha-preserving WebM via the system `ffmpeg`.
//!
//! Rendering is deterministic: the same project and timestamp always produce the same pixels,
//! whether sampled in isolation or inside an export run.

#![forbid(unsafe_code)]

pub mod animation;
pub mod assets;
pub mod audio;
pub mod chroma;
pub mod encode;
pub mod export;
pub mod foundation;
pub mod render;
pub mod timeline;

pub use chroma::{ChromaKeyParams, ChromaKeyer, create_keyer};
pub use export::{ExportSession, ExportSettings, ExportStatus, Progress, Quality};
pub use foundation::error::{GreenroomError, GreenroomResult};
pub use render::{Frame, FrameCompositor};
pub use timeline::model::Project;
