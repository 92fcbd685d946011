//! Timeline data model and scene-graph resolution.
//!
//! The model is pure data: the renderer borrows a frozen snapshot per frame and never mutates
//! it. [`resolve::visible_at`] turns the snapshot plus a timestamp into the paint order.

pub mod model;
pub mod resolve;

pub use model::Project;
pub use resolve::{ElementRef, effective_z, visible_at};
