//! Scene-graph resolution: which elements are visible at a timestamp, and in what order.

use crate::timeline::model::{ChatOverlay, MediaClip, Placement, Project, TextOverlay};

/// A borrowed reference to one paintable timeline element.
///
/// Caption cues are not part of the resolved order; the compositor always renders the active
/// cue last, above every other layer.
#[derive(Clone, Copy, Debug)]
pub enum ElementRef<'a> {
    /// A video or image clip.
    Media(&'a MediaClip),
    /// A text overlay.
    Text(&'a TextOverlay),
    /// A chat overlay.
    Chat(&'a ChatOverlay),
}

impl ElementRef<'_> {
    /// The element's timeline placement.
    pub fn placement(&self) -> &Placement {
        match self {
            ElementRef::Media(c) => &c.placement,
            ElementRef::Text(t) => &t.placement,
            ElementRef::Chat(c) => &c.placement,
        }
    }
}

/// Resolved paint-order value: the explicit override when present, else derived from the row.
///
/// Lower values paint first and end up visually behind. Row 0 maps to 1000, row 1 to 990, so
/// lower rows paint in front of higher rows by default. Widened so the derived value cannot
/// overflow for any `u32` row.
pub fn effective_z(placement: &Placement) -> i64 {
    placement
        .z_index
        .map(i64::from)
        .unwrap_or_else(|| 1000 - i64::from(placement.row) * 10)
}

/// Elements visible at `t`, sorted ascending by effective z (painter's algorithm).
///
/// Visibility is inclusive on both window ends. The sort is stable, so ties keep input order
/// (media, then texts, then chats). Pure and deterministic: identical `(t, project)` inputs
/// always produce the identical order, which is what makes a standalone scrub preview of any
/// frame match the same frame inside a full export run.
pub fn visible_at(t: f64, project: &Project) -> Vec<ElementRef<'_>> {
    let mut visible: Vec<ElementRef<'_>> = Vec::new();
    for clip in &project.media {
        if clip.placement.range.contains(t) {
            visible.push(ElementRef::Media(clip));
        }
    }
    for text in &project.texts {
        if text.placement.range.contains(t) {
            visible.push(ElementRef::Text(text));
        }
    }
    for chat in &project.chats {
        if chat.placement.range.contains(t) {
            visible.push(ElementRef::Chat(chat));
        }
    }
    visible.sort_by_key(|e| effective_z(e.placement()));
    visible
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/resolve.rs"]
mod tests;
