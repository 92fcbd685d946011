//! Caption-track renderer: timed cues with track-level styling.

use crate::assets::store::PreparedAssets;
use crate::foundation::core::{Affine, Point, Resolution, Vec2};
use crate::foundation::error::{GreenroomError, GreenroomResult};
use crate::render::text::{TextBrush, TextShaper, draw_layout_glyphs, draw_layout_outline};
use crate::render::{affine_to_cpu, color_from_rgb8, rect_to_cpu};
use crate::timeline::model::{CaptionAnchor, CaptionCue, CaptionTrack};

/// Captions wrap at this fraction of the canvas width.
const WRAP_FRACTION: f64 = 0.8;
/// Padding around the caption text inside its background box.
const BOX_PAD_PX: f64 = 10.0;
/// Vertical inset from the anchored edge.
const EDGE_INSET_PX: f64 = 48.0;

/// The cue active at `t`, if any. Overlapping cues resolve to the first match.
pub fn active_cue(track: &CaptionTrack, t: f64) -> Option<&CaptionCue> {
    track.cues.iter().find(|cue| cue.range.contains(t))
}

/// Render one caption track at timestamp `t`. A track with no active cue draws nothing.
pub fn render_caption(
    ctx: &mut vello_cpu::RenderContext,
    shaper: &mut TextShaper,
    track: &CaptionTrack,
    t: f64,
    assets: &PreparedAssets,
    canvas: Resolution,
) -> GreenroomResult<()> {
    let Some(cue) = active_cue(track, t) else {
        return Ok(());
    };

    let style = &track.style;
    let font_bytes = assets.font(style.font.as_deref()).ok_or_else(|| {
        GreenroomError::resource(format!("caption track '{}' has no usable font", track.id))
    })?;
    let font = vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
        0,
    );

    let wrap = (f64::from(canvas.width) * WRAP_FRACTION) as f32;
    let layout = shaper.layout_plain(
        &cue.text,
        &font_bytes,
        style.font_size_px,
        TextBrush::from_rgb8(style.color),
        Some(wrap),
    )?;
    let block_w = f64::from(layout.width());
    let block_h = f64::from(layout.height());

    let x = (f64::from(canvas.width) - block_w) / 2.0;
    let y = match style.anchor {
        CaptionAnchor::Top => EDGE_INSET_PX,
        CaptionAnchor::Middle => (f64::from(canvas.height) - block_h) / 2.0,
        CaptionAnchor::Bottom => f64::from(canvas.height) - block_h - EDGE_INSET_PX,
    };
    let origin = Point::new(x, y);

    ctx.set_transform(affine_to_cpu(Affine::translate(origin.to_vec2())));

    if let Some(bg) = style.background {
        ctx.set_paint(color_from_rgb8(bg, 255));
        ctx.fill_rect(&rect_to_cpu(crate::foundation::core::Rect::new(
            -BOX_PAD_PX,
            -BOX_PAD_PX,
            block_w + BOX_PAD_PX,
            block_h + BOX_PAD_PX,
        )));
    }

    if let Some(outline) = &style.outline {
        draw_layout_outline(ctx, &layout, &font, outline);
    }
    draw_layout_glyphs(ctx, &layout, &font, Vec2::ZERO, None);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/caption.rs"]
mod tests;
