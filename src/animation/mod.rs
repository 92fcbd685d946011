//! Per-element animation: closed enter/exit/loop enumerations and a pure sampler.
//!
//! Animation is a pure function of an element's relative time and duration. Nothing here
//! mutates element state, so rendering any timestamp in isolation matches the same timestamp
//! inside a full export run.

pub mod sample;
pub mod spec;

pub use sample::{AnimState, sample};
pub use spec::{AnimationSpec, EnterKind, ExitKind, LoopKind};
