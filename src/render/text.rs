//! Text shaping and the text-overlay renderer.

use crate::animation::sample;
use crate::assets::store::PreparedAssets;
use crate::foundation::core::{Point, Rect, Resolution, Rgb8, Vec2};
use crate::foundation::error::{GreenroomError, GreenroomResult};
use crate::render::{affine_to_cpu, bezpath_to_cpu, color_from_rgb8};
use crate::timeline::model::{BackgroundShape, TextCase, TextOutline, TextOverlay};

/// Padding between the wrapped text block and its background shape, in pixels.
const BACKGROUND_PAD_PX: f64 = 12.0;
/// Horizontal skew of the marker background, in pixels.
const MARKER_SKEW_PX: f64 = 10.0;
/// Underline offset below the baseline, as a fraction of font size.
const UNDERLINE_OFFSET: f32 = 0.12;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color carried through Parley layout.
pub struct TextBrush {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl TextBrush {
    pub(crate) fn from_rgb8(c: Rgb8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 255,
        }
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
}

impl Default for TextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper {
    /// Construct a shaper with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape and lay out plain text using the provided font bytes and styling.
    pub fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrush,
        max_width_px: Option<f32>,
    ) -> GreenroomResult<parley::Layout<TextBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(GreenroomError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            GreenroomError::resource("no font families registered from font bytes")
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| GreenroomError::resource("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        if let Some(w) = max_width_px {
            layout.break_all_lines(Some(w));
            layout.align(
                Some(w),
                parley::Alignment::Start,
                parley::AlignmentOptions::default(),
            );
        } else {
            layout.break_all_lines(None);
        }

        Ok(layout)
    }
}

/// Apply the element's case transform before measuring.
pub fn apply_case(text: &str, case: TextCase) -> String {
    match case {
        TextCase::None => text.to_string(),
        TextCase::Upper => text.to_uppercase(),
        TextCase::Lower => text.to_lowercase(),
        TextCase::Capitalize => text
            .split_inclusive(char::is_whitespace)
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect(),
    }
}

/// Build the background path for a wrapped text block of `width` x `height` at the origin.
///
/// Padding is already included in the returned shape.
pub fn background_path(shape: BackgroundShape, width: f64, height: f64) -> kurbo::BezPath {
    use kurbo::Shape;

    let pad = BACKGROUND_PAD_PX;
    let outer = Rect::new(-pad, -pad, width + pad, height + pad);
    match shape {
        BackgroundShape::Rectangle => outer.to_path(0.1),
        BackgroundShape::Rounded => kurbo::RoundedRect::from_rect(outer, 8.0).to_path(0.1),
        BackgroundShape::Pill => {
            kurbo::RoundedRect::from_rect(outer, outer.height() / 2.0).to_path(0.1)
        }
        BackgroundShape::Bubble => kurbo::Ellipse::new(
            outer.center(),
            (outer.width() / 1.6, outer.height() / 1.4),
            0.0,
        )
        .to_path(0.1),
        BackgroundShape::Marker => {
            let mut path = kurbo::BezPath::new();
            path.move_to((outer.x0 + MARKER_SKEW_PX, outer.y0 + outer.height() * 0.15));
            path.line_to((outer.x1 + MARKER_SKEW_PX, outer.y0 + outer.height() * 0.15));
            path.line_to((outer.x1 - MARKER_SKEW_PX, outer.y1 - outer.height() * 0.1));
            path.line_to((outer.x0 - MARKER_SKEW_PX, outer.y1 - outer.height() * 0.1));
            path.close_path();
            path
        }
        BackgroundShape::Underline => {
            Rect::new(outer.x0, height + pad * 0.25, outer.x1, height + pad * 0.75).to_path(0.1)
        }
        BackgroundShape::SpeechBubble => {
            let mut path = kurbo::RoundedRect::from_rect(outer, 10.0).to_path(0.1);
            let tail_x = outer.x0 + outer.width() * 0.2;
            path.move_to((tail_x, outer.y1 - 2.0));
            path.line_to((tail_x + 18.0, outer.y1 - 2.0));
            path.line_to((tail_x - 4.0, outer.y1 + 16.0));
            path.close_path();
            path
        }
    }
}

/// Paint every glyph run of `layout` with `color`, offset by `offset` in layout space.
pub(crate) fn draw_layout_glyphs(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrush>,
    font: &vello_cpu::peniko::FontData,
    offset: Vec2,
    color: Option<Rgb8>,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };

            let brush = run.style().brush;
            let paint = match color {
                Some(c) => color_from_rgb8(c, 255),
                None => vello_cpu::peniko::Color::from_rgba8(brush.r, brush.g, brush.b, brush.a),
            };
            ctx.set_paint(paint);

            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x + offset.x as f32,
                y: g.y + offset.y as f32,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

/// Paint an outline by refilling the glyphs at eight compass offsets behind the fill.
pub(crate) fn draw_layout_outline(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrush>,
    font: &vello_cpu::peniko::FontData,
    outline: &TextOutline,
) {
    let d = f64::from(outline.width_px.max(0.5));
    let offsets = [
        (-d, 0.0),
        (d, 0.0),
        (0.0, -d),
        (0.0, d),
        (-d, -d),
        (d, -d),
        (-d, d),
        (d, d),
    ];
    for (dx, dy) in offsets {
        draw_layout_glyphs(ctx, layout, font, Vec2::new(dx, dy), Some(outline.color));
    }
}

/// Fill underline bars under each line of `layout`.
pub(crate) fn draw_underline(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrush>,
    color: Rgb8,
    font_size_px: f32,
) {
    let thickness = (font_size_px / 14.0).max(1.5) as f64;
    ctx.set_paint(color_from_rgb8(color, 255));
    for line in layout.lines() {
        let mut min_x = f32::MAX;
        let mut max_x = f32::MIN;
        let mut baseline = 0.0f32;
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            min_x = min_x.min(run.offset());
            max_x = max_x.max(run.offset() + run.advance());
            baseline = run.baseline();
        }
        if min_x >= max_x {
            continue;
        }
        let y = f64::from(baseline + font_size_px * UNDERLINE_OFFSET);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            f64::from(min_x),
            y,
            f64::from(max_x),
            y + thickness,
        ));
    }
}

/// Render one text overlay at timestamp `t`.
pub fn render_text(
    ctx: &mut vello_cpu::RenderContext,
    shaper: &mut TextShaper,
    text: &TextOverlay,
    t: f64,
    assets: &PreparedAssets,
    canvas: Resolution,
) -> GreenroomResult<()> {
    let font_bytes = assets.font(text.font.as_deref()).ok_or_else(|| {
        GreenroomError::resource(format!("text '{}' has no usable font", text.id))
    })?;
    let font = vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
        0,
    );

    let content = apply_case(&text.content, text.case);
    let wrap_width = text.geometry.map(|g| g.width as f32);
    let layout = shaper.layout_plain(
        &content,
        &font_bytes,
        text.font_size_px,
        TextBrush::from_rgb8(text.color),
        wrap_width,
    )?;
    let block_w = f64::from(layout.width());
    let block_h = f64::from(layout.height());

    // Block origin: explicit geometry, else centered on the canvas.
    let origin = match text.geometry {
        Some(g) => Point::new(g.x, g.y),
        None => Point::new(
            (f64::from(canvas.width) - block_w) / 2.0,
            (f64::from(canvas.height) - block_h) / 2.0,
        ),
    };

    let range = text.placement.range;
    let state = sample(&text.animation, t - range.start_sec, range.duration_sec());
    let opacity = (text.placement.opacity() * state.opacity) as f32;
    if opacity <= 0.0 {
        return Ok(());
    }

    // Animation is keyed off the text center, in canvas space.
    let pivot = Point::new(origin.x + block_w / 2.0, origin.y + block_h / 2.0);
    let place = state.to_affine(pivot) * crate::foundation::core::Affine::translate(origin.to_vec2());
    ctx.set_transform(affine_to_cpu(place));

    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }

    if let Some(bg) = text.background {
        let alpha = ((bg.opacity_pct / 100.0).clamp(0.0, 1.0) * 255.0).round() as u8;
        ctx.set_paint(color_from_rgb8(bg.color, alpha));
        let path = background_path(bg.shape, block_w, block_h);
        ctx.fill_path(&bezpath_to_cpu(&path));
    }

    if let Some(outline) = &text.outline {
        draw_layout_outline(ctx, &layout, &font, outline);
    }
    draw_layout_glyphs(ctx, &layout, &font, Vec2::ZERO, None);
    if text.underline {
        draw_underline(ctx, &layout, text.color, text.font_size_px);
    }

    if opacity < 1.0 {
        ctx.pop_layer();
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
