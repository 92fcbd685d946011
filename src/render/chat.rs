//! Chat-overlay renderer: Instagram/WhatsApp conversations revealed over time.
//!
//! The overlay keeps an internal reveal schedule independent of the outer clip: each message
//! appears after its authored time, or after a typing delay derived from its length. The
//! conversation is drawn to a fixed 9:16 offscreen buffer at double pixel density and then
//! scale-fit into the frame.

use crate::assets::store::PreparedAssets;
use crate::foundation::core::{Affine, Rgb8};
use crate::foundation::core::Resolution;
use crate::foundation::error::{GreenroomError, GreenroomResult};
use crate::render::text::{TextBrush, TextShaper, draw_layout_glyphs};
use crate::render::{
    affine_to_cpu, bezpath_to_cpu, color_from_rgb8, image_paint, premul_bytes_to_pixmap,
    premultiply_rgba8,
};
use crate::timeline::model::{ChatMessage, ChatOverlay, ChatPlatform};

/// Characters typed per second when no timing is authored.
const TYPING_SPEED_CPS: f64 = 15.0;
/// Shortest derived per-message delay.
const MIN_MESSAGE_SEC: f64 = 0.8;
/// Longest derived per-message delay.
const MAX_MESSAGE_SEC: f64 = 3.0;

/// Offscreen buffer: 9:16 at 2x density for crisp downscaling.
const OFFSCREEN_W: u16 = 1080;
const OFFSCREEN_H: u16 = 1920;

const HEADER_H: f64 = 160.0;
const BUBBLE_PAD: f64 = 28.0;
const BUBBLE_GAP: f64 = 20.0;
const BUBBLE_RADIUS: f64 = 28.0;
const AVATAR_SIZE: f64 = 72.0;
const SIDE_MARGIN: f64 = 36.0;
const MESSAGE_FONT_PX: f32 = 40.0;
const SENDER_FONT_PX: f32 = 28.0;
const SENDER_GAP: f64 = 8.0;
const SENDER_COLOR: Rgb8 = Rgb8 {
    r: 120,
    g: 120,
    b: 120,
};

struct Palette {
    background: Rgb8,
    header: Rgb8,
    header_text: Rgb8,
    incoming: Rgb8,
    incoming_text: Rgb8,
    outgoing: Rgb8,
    outgoing_text: Rgb8,
}

fn palette(platform: ChatPlatform) -> Palette {
    match platform {
        ChatPlatform::Instagram => Palette {
            background: Rgb8::new(255, 255, 255),
            header: Rgb8::new(255, 255, 255),
            header_text: Rgb8::new(0, 0, 0),
            incoming: Rgb8::new(239, 239, 239),
            incoming_text: Rgb8::new(0, 0, 0),
            outgoing: Rgb8::new(55, 151, 240),
            outgoing_text: Rgb8::new(255, 255, 255),
        },
        ChatPlatform::WhatsApp => Palette {
            background: Rgb8::new(236, 229, 221),
            header: Rgb8::new(7, 94, 84),
            header_text: Rgb8::new(255, 255, 255),
            incoming: Rgb8::new(255, 255, 255),
            incoming_text: Rgb8::new(17, 27, 33),
            outgoing: Rgb8::new(220, 248, 198),
            outgoing_text: Rgb8::new(17, 27, 33),
        },
    }
}

/// Reveal time of each message, in seconds relative to the overlay's window start.
///
/// Authored `appear_at_sec` values pin a message; unauthored messages follow the previous
/// reveal after a typing delay derived from character count. The schedule is monotonic.
pub fn reveal_schedule(messages: &[ChatMessage]) -> Vec<f64> {
    let mut out = Vec::with_capacity(messages.len());
    let mut cursor = 0.0f64;
    for msg in messages {
        let reveal = match msg.appear_at_sec {
            Some(at) => at.max(cursor),
            None => {
                let typing =
                    (msg.text.chars().count() as f64 / TYPING_SPEED_CPS)
                        .clamp(MIN_MESSAGE_SEC, MAX_MESSAGE_SEC);
                cursor + typing
            }
        };
        cursor = reveal;
        out.push(reveal);
    }
    out
}

/// Display name drawn above an incoming bubble. Outgoing messages never carry one.
pub fn sender_label(msg: &ChatMessage) -> Option<&str> {
    if msg.outgoing {
        return None;
    }
    msg.sender
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Render one chat overlay at timestamp `t`.
pub fn render_chat(
    ctx: &mut vello_cpu::RenderContext,
    shaper: &mut TextShaper,
    chat: &ChatOverlay,
    t: f64,
    assets: &PreparedAssets,
    canvas: Resolution,
) -> GreenroomResult<()> {
    let opacity = chat.placement.opacity() as f32;
    if opacity <= 0.0 {
        return Ok(());
    }

    let font_bytes = assets.font(None).ok_or_else(|| {
        GreenroomError::resource(format!("chat '{}' has no usable font", chat.id))
    })?;
    let font = vello_cpu::peniko::FontData::new(
        vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
        0,
    );

    let colors = palette(chat.platform);
    let rt = t - chat.placement.range.start_sec;
    let schedule = reveal_schedule(&chat.messages);
    let revealed = schedule.iter().filter(|&&at| at <= rt).count();

    let mut off = vello_cpu::RenderContext::new(OFFSCREEN_W, OFFSCREEN_H);
    off.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

    off.set_paint(color_from_rgb8(colors.background, 255));
    off.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(OFFSCREEN_W),
        f64::from(OFFSCREEN_H),
    ));

    draw_messages(
        &mut off,
        shaper,
        chat,
        &font_bytes,
        &font,
        &colors,
        revealed,
        assets,
    )?;
    draw_header(&mut off, shaper, chat, &font_bytes, &font, &colors)?;

    off.flush();
    let mut pixmap = vello_cpu::Pixmap::new(OFFSCREEN_W, OFFSCREEN_H);
    off.render_to_pixmap(&mut pixmap);

    // Aspect-preserving scale-fit into the target rectangle, centered.
    let target = chat
        .geometry
        .map(|g| g.rect())
        .unwrap_or_else(|| canvas.rect());
    let (ow, oh) = (f64::from(OFFSCREEN_W), f64::from(OFFSCREEN_H));
    let scale = (target.width() / ow).min(target.height() / oh);
    let tx = target.x0 + (target.width() - ow * scale) / 2.0;
    let ty = target.y0 + (target.height() - oh * scale) / 2.0;

    ctx.set_transform(affine_to_cpu(
        Affine::translate((tx, ty)) * Affine::scale(scale),
    ));
    ctx.set_paint(image_paint(pixmap));
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, ow, oh));
    if opacity < 1.0 {
        ctx.pop_layer();
    }
    Ok(())
}

fn draw_header(
    off: &mut vello_cpu::RenderContext,
    shaper: &mut TextShaper,
    chat: &ChatOverlay,
    font_bytes: &[u8],
    font: &vello_cpu::peniko::FontData,
    colors: &Palette,
) -> GreenroomResult<()> {
    off.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    off.set_paint(color_from_rgb8(colors.header, 255));
    off.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(OFFSCREEN_W),
        HEADER_H,
    ));

    if chat.title.is_empty() {
        return Ok(());
    }
    let layout = shaper.layout_plain(
        &chat.title,
        font_bytes,
        MESSAGE_FONT_PX * 1.2,
        TextBrush::from_rgb8(colors.header_text),
        Some(OFFSCREEN_W as f32 - 2.0 * SIDE_MARGIN as f32),
    )?;
    let y = (HEADER_H - f64::from(layout.height())) / 2.0;
    off.set_transform(vello_cpu::kurbo::Affine::translate((SIDE_MARGIN, y)));
    draw_layout_glyphs(off, &layout, font, crate::foundation::core::Vec2::ZERO, None);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_messages(
    off: &mut vello_cpu::RenderContext,
    shaper: &mut TextShaper,
    chat: &ChatOverlay,
    font_bytes: &[u8],
    font: &vello_cpu::peniko::FontData,
    colors: &Palette,
    revealed: usize,
    assets: &PreparedAssets,
) -> GreenroomResult<()> {
    let wrap = OFFSCREEN_W as f32 * 0.62;
    let mut bottom = f64::from(OFFSCREEN_H) - BUBBLE_GAP;

    // Newest revealed message sits at the bottom; older messages stack upward and scroll off
    // behind the header once the viewport is full.
    for msg in chat.messages[..revealed].iter().rev() {
        let (bubble_color, text_color) = if msg.outgoing {
            (colors.outgoing, colors.outgoing_text)
        } else {
            (colors.incoming, colors.incoming_text)
        };
        let layout = shaper.layout_plain(
            &msg.text,
            font_bytes,
            MESSAGE_FONT_PX,
            TextBrush::from_rgb8(text_color),
            Some(wrap),
        )?;
        let text_w = f64::from(layout.width());
        let text_h = f64::from(layout.height());
        let bubble_w = text_w + 2.0 * BUBBLE_PAD;
        let bubble_h = text_h + 2.0 * BUBBLE_PAD;

        let label = match sender_label(msg) {
            Some(name) => Some(shaper.layout_plain(
                name,
                font_bytes,
                SENDER_FONT_PX,
                TextBrush::from_rgb8(SENDER_COLOR),
                Some(wrap),
            )?),
            None => None,
        };
        let label_h = label
            .as_ref()
            .map(|l| f64::from(l.height()) + SENDER_GAP)
            .unwrap_or(0.0);

        let top = bottom - bubble_h;
        if top - label_h < HEADER_H + BUBBLE_GAP {
            break;
        }

        let x = if msg.outgoing {
            f64::from(OFFSCREEN_W) - SIDE_MARGIN - bubble_w
        } else {
            SIDE_MARGIN + AVATAR_SIZE + BUBBLE_GAP
        };

        off.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        off.set_paint(color_from_rgb8(bubble_color, 255));
        let bubble = kurbo::RoundedRect::new(x, top, x + bubble_w, top + bubble_h, BUBBLE_RADIUS);
        off.fill_path(&bezpath_to_cpu(&kurbo::Shape::to_path(&bubble, 0.1)));

        if !msg.outgoing {
            draw_avatar(off, msg, assets, SIDE_MARGIN, top + bubble_h - AVATAR_SIZE);
        }

        if let Some(label) = &label {
            off.set_transform(vello_cpu::kurbo::Affine::translate((
                x + BUBBLE_PAD,
                top - label_h,
            )));
            draw_layout_glyphs(off, label, font, crate::foundation::core::Vec2::ZERO, None);
        }

        off.set_transform(vello_cpu::kurbo::Affine::translate((
            x + BUBBLE_PAD,
            top + BUBBLE_PAD,
        )));
        draw_layout_glyphs(off, &layout, font, crate::foundation::core::Vec2::ZERO, None);

        bottom = top - label_h - BUBBLE_GAP;
    }
    Ok(())
}

fn draw_avatar(
    off: &mut vello_cpu::RenderContext,
    msg: &ChatMessage,
    assets: &PreparedAssets,
    x: f64,
    y: f64,
) {
    off.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

    if let Some(avatar) = msg.avatar.as_deref()
        && let Some(img) = assets.image(avatar)
        && let Ok(pixmap) = premul_bytes_to_pixmap(
            &premultiply_rgba8(&img.rgba8),
            img.width,
            img.height,
        )
    {
        let scale = AVATAR_SIZE / f64::from(img.width.max(1));
        off.set_transform(affine_to_cpu(
            Affine::translate((x, y)) * Affine::scale(scale),
        ));
        off.set_paint(image_paint(pixmap));
        off.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(img.width),
            f64::from(img.height),
        ));
        return;
    }

    // Missing avatar degrades to a neutral disc.
    off.set_paint(color_from_rgb8(Rgb8::new(189, 189, 189), 255));
    let circle = kurbo::Circle::new(
        (x + AVATAR_SIZE / 2.0, y + AVATAR_SIZE / 2.0),
        AVATAR_SIZE / 2.0,
    );
    off.fill_path(&bezpath_to_cpu(&kurbo::Shape::to_path(&circle, 0.1)));
}

#[cfg(test)]
#[path = "../../tests/unit/render/chat.rs"]
mod tests;
